use super::{CameraModel, Ray};
use crate::error::CameraError;
use nalgebra::{Matrix3, Vector3};

// Relative bound on |det(K)| against ||K||^3 below which K counts as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Pinhole intrinsics: K and its inverse, always a matching pair
#[derive(Debug, Clone, PartialEq)]
pub struct Intrinsics {
    k: Matrix3<f64>,
    k_inv: Matrix3<f64>,
}

impl Intrinsics {
    /// Validate K and invert it by LU decomposition
    pub fn new(k: Matrix3<f64>) -> Result<Self, CameraError> {
        if k.iter().any(|v| !v.is_finite()) {
            return Err(CameraError::NonFinite);
        }

        let scale = k.norm();
        if scale == 0.0 || k.determinant().abs() <= SINGULAR_TOLERANCE * scale.powi(3) {
            return Err(CameraError::SingularMatrix);
        }

        let k_inv = k.lu().try_inverse().ok_or(CameraError::SingularMatrix)?;
        if k_inv.iter().any(|v| !v.is_finite()) {
            return Err(CameraError::SingularMatrix);
        }

        Ok(Self { k, k_inv })
    }

    /// Build from the usual pinhole parameters
    pub fn from_params(fx: f64, fy: f64, cx: f64, cy: f64) -> Result<Self, CameraError> {
        Self::new(Matrix3::new(fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0))
    }

    /// Build from 9 row-major values
    pub fn from_row_major(values: &[f64; 9]) -> Result<Self, CameraError> {
        Self::new(Matrix3::from_row_slice(values))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.k
    }

    pub fn inverse(&self) -> &Matrix3<f64> {
        &self.k_inv
    }

    /// Get focal lengths
    pub fn focal_length(&self) -> (f64, f64) {
        (self.k[(0, 0)], self.k[(1, 1)])
    }

    /// Get principal point
    pub fn principal_point(&self) -> (f64, f64) {
        (self.k[(0, 2)], self.k[(1, 2)])
    }
}

impl CameraModel for Intrinsics {
    fn project(&self, point_camera: &Vector3<f64>) -> Option<(f64, f64)> {
        if point_camera.z <= 0.0 {
            return None;
        }

        let p = self.k * point_camera;
        Some((p.x / p.z, p.y / p.z))
    }

    fn unproject(&self, pixel: (f64, f64)) -> Ray {
        Ray::new(self.k_inv * Vector3::new(pixel.0, pixel.1, 1.0))
    }
}
