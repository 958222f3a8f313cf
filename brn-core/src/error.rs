use thiserror::Error;

/// Common errors across the detection pipeline
#[derive(Error, Debug)]
pub enum BrnError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Frame decode error: {0}")]
    FrameDecode(#[from] FrameDecodeError),

    #[error("Invalid detection parameters: {0}")]
    Params(#[from] ParamsError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Intrinsic matrix is singular")]
    SingularMatrix,

    #[error("Intrinsic matrix contains non-finite values")]
    NonFinite,

    #[error("No valid calibration received yet")]
    NotCalibrated,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameDecodeError {
    #[error("Unsupported pixel encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Row step {step} is smaller than {min} bytes")]
    InvalidStep { step: usize, min: usize },

    #[error("Frame buffer holds {got} bytes, expected {expected}")]
    BufferSize { expected: usize, got: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("Blur kernel size must be odd and positive, got {0}")]
    KernelSize(usize),

    #[error("Blur sigma must be positive, got {0}")]
    Sigma(f64),

    #[error("Accumulator resolution must be at least 1, got {0}")]
    AccumResolution(f64),

    #[error("Threshold {name} must be positive, got {value}")]
    Threshold { name: &'static str, value: f64 },

    #[error("Radius range [{min}, {max}] is empty")]
    RadiusRange { min: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, BrnError>;
