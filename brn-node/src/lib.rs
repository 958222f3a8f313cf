//! Frame processing node: detect, back-project, annotate, publish

pub mod config;
pub mod draw;
pub mod messages;
pub mod node;
pub mod processor;
pub mod selection;
pub mod sink;

pub use config::{NodeConfig, NodeSettings, ProcessorConfig};
pub use messages::{Header, ImageMessage, PoseStamped, Stamp};
pub use node::{Event, Node};
pub use processor::{CycleReport, FrameProcessor, ProcessOutcome};
pub use selection::RaySelection;
pub use sink::{CollectingSink, OutputSink};

pub use brn_core::CameraInfo;
