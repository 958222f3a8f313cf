use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{CameraModel, Intrinsics, Ray};
use crate::error::CameraError;

/// Calibration message: intrinsic matrix K and projection matrix P, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub k: [f64; 9],
    pub p: [f64; 9],
}

impl CameraInfo {
    /// Message carrying the same matrix as both K and P
    pub fn from_intrinsics(k: &Matrix3<f64>) -> Self {
        let mut values = [0.0; 9];
        for (i, v) in values.iter_mut().enumerate() {
            *v = k[(i / 3, i % 3)];
        }
        Self { k: values, p: values }
    }

    pub fn intrinsic_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_row_slice(&self.k)
    }

    pub fn projection_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_row_slice(&self.p)
    }
}

/// Latest calibration of the camera
///
/// K and K^-1 live in one [`Intrinsics`] value that is only swapped after a
/// successful inversion, so a rejected update never disturbs a working one.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    intrinsics: Option<Intrinsics>,
    projection: Option<Matrix3<f64>>,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace K, recomputing K^-1
    #[instrument(level = "debug", skip(self))]
    pub fn set_intrinsics(&mut self, k: Matrix3<f64>) -> Result<(), CameraError> {
        let intrinsics = Intrinsics::new(k)?;
        debug!(
            focal_length = ?intrinsics.focal_length(),
            principal_point = ?intrinsics.principal_point(),
            "intrinsics updated"
        );
        self.intrinsics = Some(intrinsics);
        Ok(())
    }

    /// Apply a calibration message
    ///
    /// P is stored only when K is accepted.
    pub fn set_calibration(&mut self, info: &CameraInfo) -> Result<(), CameraError> {
        self.set_intrinsics(info.intrinsic_matrix())?;
        self.projection = Some(info.projection_matrix());
        Ok(())
    }

    /// Ray through `pixel`: K^-1 * (x, y, 1)
    pub fn back_project(&self, pixel: (f64, f64)) -> Result<Ray, CameraError> {
        self.intrinsics
            .as_ref()
            .map(|intrinsics| intrinsics.unproject(pixel))
            .ok_or(CameraError::NotCalibrated)
    }

    pub fn is_calibrated(&self) -> bool {
        self.intrinsics.is_some()
    }

    pub fn intrinsics(&self) -> Option<&Intrinsics> {
        self.intrinsics.as_ref()
    }

    /// Projection matrix from the last accepted calibration
    pub fn projection(&self) -> Option<&Matrix3<f64>> {
        self.projection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vga() -> Matrix3<f64> {
        Matrix3::new(525.0, 0.0, 319.5, 0.0, 525.0, 239.5, 0.0, 0.0, 1.0)
    }

    #[test]
    fn test_not_calibrated() {
        let camera = Camera::new();
        assert!(!camera.is_calibrated());
        assert_eq!(
            camera.back_project((10.0, 10.0)).unwrap_err(),
            CameraError::NotCalibrated
        );
    }

    #[test]
    fn test_identity_back_projection() {
        let mut camera = Camera::new();
        camera.set_intrinsics(Matrix3::identity()).unwrap();

        let ray = camera.back_project((100.0, 100.0)).unwrap();
        assert_eq!(*ray.direction(), nalgebra::Vector3::new(100.0, 100.0, 1.0));
    }

    #[test]
    fn test_singular_update_keeps_previous() {
        let mut camera = Camera::new();
        camera.set_intrinsics(vga()).unwrap();
        let before = camera.intrinsics().unwrap().inverse().clone_owned();

        let mut singular = vga();
        singular[(2, 2)] = 0.0;
        singular[(1, 1)] = 0.0;
        let err = camera.set_intrinsics(singular).unwrap_err();
        assert_eq!(err, CameraError::SingularMatrix);

        assert_eq!(*camera.intrinsics().unwrap().inverse(), before);
        assert_eq!(*camera.intrinsics().unwrap().matrix(), vga());
    }

    #[test]
    fn test_singular_first_update_stays_uncalibrated() {
        let mut camera = Camera::new();
        assert!(camera.set_intrinsics(Matrix3::zeros()).is_err());
        assert!(!camera.is_calibrated());
    }

    #[test]
    fn test_set_calibration_stores_projection() {
        let mut camera = Camera::new();
        let mut info = CameraInfo::from_intrinsics(&vga());
        info.p[2] = 320.0;
        camera.set_calibration(&info).unwrap();

        assert_eq!(*camera.intrinsics().unwrap().matrix(), vga());
        assert_eq!(camera.projection().unwrap()[(0, 2)], 320.0);
    }

    #[test]
    fn test_rejected_calibration_keeps_projection() {
        let mut camera = Camera::new();
        camera.set_calibration(&CameraInfo::from_intrinsics(&vga())).unwrap();

        let bad = CameraInfo {
            k: [0.0; 9],
            p: [1.0; 9],
        };
        assert!(camera.set_calibration(&bad).is_err());
        assert_eq!(camera.projection().unwrap()[(0, 0)], 525.0);
    }

    #[test]
    fn test_camera_info_row_major() {
        let info = CameraInfo::from_intrinsics(&vga());
        assert_eq!(info.k, [525.0, 0.0, 319.5, 0.0, 525.0, 239.5, 0.0, 0.0, 1.0]);
        assert_eq!(info.intrinsic_matrix(), vga());
    }
}
