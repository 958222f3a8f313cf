//! Circle detection: grayscale, Gaussian blur, gradient Hough transform
//!
//! The detector is stateless apart from its parameters. Every call works on a
//! fresh 8-bit luma plane of the frame, so detections never leak between
//! frames. Blur and Sobel come from `imageproc`; Canny stays local because
//! the Hough vote needs each edge pixel's gradient direction.

mod blur;
mod edges;
mod hough;

pub use blur::{gaussian_blur, gaussian_kernel};
pub use edges::{canny, sobel, EdgePoint, Gradients};
pub use hough::hough_circles;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ParamsError;
use crate::frame::Frame;

/// Candidate circle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
    /// Edge pixels lying on the chosen radius
    pub support: usize,
}

impl Circle {
    /// Center rounded to the nearest pixel
    pub fn pixel_center(&self) -> (i64, i64) {
        (self.center.x.round() as i64, self.center.y.round() as i64)
    }
}

/// Tuning of the detection chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Gaussian kernel width, odd
    pub blur_kernel_size: usize,
    pub blur_sigma: f64,
    /// Upper Canny threshold; the lower one is half of it
    pub edge_threshold: f64,
    /// Image pixels per accumulator cell
    pub accum_resolution: f64,
    pub min_center_distance: f64,
    /// Votes a center needs, and edge pixels a radius needs
    pub accum_threshold: f64,
    pub min_radius: u32,
    pub max_radius: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            blur_kernel_size: 7,
            blur_sigma: 2.0,
            edge_threshold: 150.0,
            accum_resolution: 2.0,
            min_center_distance: 40.0,
            accum_threshold: 70.0,
            min_radius: 20,
            max_radius: 100,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(ParamsError::KernelSize(self.blur_kernel_size));
        }
        if !(self.blur_sigma > 0.0 && self.blur_sigma.is_finite()) {
            return Err(ParamsError::Sigma(self.blur_sigma));
        }
        if !(self.accum_resolution >= 1.0 && self.accum_resolution.is_finite()) {
            return Err(ParamsError::AccumResolution(self.accum_resolution));
        }
        for (name, value) in [
            ("edge_threshold", self.edge_threshold),
            ("accum_threshold", self.accum_threshold),
            ("min_center_distance", self.min_center_distance),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ParamsError::Threshold { name, value });
            }
        }
        if self.max_radius == 0 || self.min_radius > self.max_radius {
            return Err(ParamsError::RadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        Ok(())
    }
}

/// Circle detector with validated parameters
#[derive(Debug, Clone)]
pub struct CircleDetector {
    params: DetectionParams,
}

impl CircleDetector {
    pub fn new(params: DetectionParams) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Detect circles, strongest center first
    ///
    /// An empty result means no target in view; it is not an error.
    #[instrument(
        level = "debug",
        skip(self, frame),
        fields(width = frame.width(), height = frame.height())
    )]
    pub fn detect(&self, frame: &Frame) -> Vec<Circle> {
        let gray = frame.to_luma8();
        let kernel = gaussian_kernel(self.params.blur_kernel_size, self.params.blur_sigma);
        let smoothed = gaussian_blur(&gray, &kernel);

        let gradients = sobel(&smoothed);
        let high = self.params.edge_threshold as f32;
        let low = (high / 2.0).max(1.0);
        let edges = canny(&gradients, low, high);

        let circles = hough_circles(&edges, gradients.dim(), &self.params);
        debug!(edges = edges.len(), circles = circles.len(), "detection done");
        circles
    }
}

impl Default for CircleDetector {
    fn default() -> Self {
        Self {
            params: DetectionParams::default(),
        }
    }
}

/// One-shot detection with explicit parameters
pub fn detect(frame: &Frame, params: &DetectionParams) -> Result<Vec<Circle>, ParamsError> {
    Ok(CircleDetector::new(params.clone())?.detect(frame))
}

#[cfg(test)]
pub(crate) mod test_frames {
    use image::Rgb;

    use crate::frame::{Frame, PixelEncoding};

    /// White frame with filled black disks
    pub fn disks(width: usize, height: usize, disks: &[(f64, f64, f64)]) -> Frame {
        let mut frame = Frame::filled(width, height, PixelEncoding::Bgr8, Rgb([255, 255, 255]));
        for y in 0..height {
            for x in 0..width {
                let inside = disks.iter().any(|&(cx, cy, r)| {
                    let (dx, dy) = (x as f64 - cx, y as f64 - cy);
                    dx * dx + dy * dy <= r * r
                });
                if inside {
                    frame.put_rgb(x, y, Rgb([0, 0, 0]));
                }
            }
        }
        frame
    }
}
