use brn_core::FrameDecodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameDecodeError),
}

pub type Result<T> = std::result::Result<T, IoError>;
