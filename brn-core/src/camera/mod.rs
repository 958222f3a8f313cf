//! Camera models and back-projection

mod calibration;
mod pinhole;
mod ray;

pub use calibration::{Camera, CameraInfo};
pub use pinhole::Intrinsics;
pub use ray::Ray;

use nalgebra::Vector3;

/// Generic CameraModel
pub trait CameraModel {
    /// Project 3D point in camera frame to image coordinates
    /// Returns None if point is behind camera
    fn project(&self, point_camera: &Vector3<f64>) -> Option<(f64, f64)>;

    /// Unproject image coordinates to a ray in camera frame
    fn unproject(&self, pixel: (f64, f64)) -> Ray;
}
