pub mod camera;
pub mod detect;
pub mod error;
pub mod frame;

pub use camera::{Camera, CameraInfo, CameraModel, Intrinsics, Ray};
pub use detect::{detect, Circle, CircleDetector, DetectionParams};
pub use error::{BrnError, CameraError, FrameDecodeError, ParamsError, Result};
pub use frame::{Frame, PixelEncoding};
