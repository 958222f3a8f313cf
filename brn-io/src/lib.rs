pub mod error;
pub mod frames;
pub mod json;

pub use error::{IoError, Result};
pub use frames::{read_frame, read_frame_as, write_frame};
pub use json::{load_camera_info, load_json, save_json};
