//! JSON settings and calibration files

use std::fs;
use std::path::Path;

use brn_core::CameraInfo;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

/// Deserialize a JSON file; fields missing from it keep their defaults
/// where the target type uses `#[serde(default)]`
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value = serde_json::from_str(&text)?;
    debug!(path = %path.display(), "loaded json");
    Ok(value)
}

pub fn save_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}

/// Read a `{ "k": [..9], "p": [..9] }` calibration file
///
/// Only the shape is checked here; singular matrices are rejected when the
/// calibration is applied.
pub fn load_camera_info<P: AsRef<Path>>(path: P) -> Result<CameraInfo> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_camera_info() {
        let file = file_with(
            r#"{
                "k": [500, 0, 320, 0, 500, 240, 0, 0, 1],
                "p": [500, 0, 320, 0, 500, 240, 0, 0, 1]
            }"#,
        );
        let info = load_camera_info(file.path()).unwrap();
        assert_eq!(info.k[0], 500.0);
        assert_eq!(info.k[5], 240.0);
        assert_eq!(info.intrinsic_matrix()[(1, 2)], 240.0);
    }

    #[test]
    fn test_short_matrix_is_rejected() {
        let file = file_with(r#"{ "k": [1, 0, 0], "p": [1, 0, 0] }"#);
        assert!(matches!(
            load_camera_info(file.path()),
            Err(IoError::Json(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        let info = CameraInfo {
            k: [2.0, 0.0, 1.0, 0.0, 2.0, 1.0, 0.0, 0.0, 1.0],
            p: [0.0; 9],
        };
        save_json(&path, &info).unwrap();
        assert_eq!(load_camera_info(&path).unwrap(), info);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_json::<CameraInfo, _>(dir.path().join("nope.json")),
            Err(IoError::Io(_))
        ));
    }
}
