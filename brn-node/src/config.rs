use std::time::Duration;

use brn_core::DetectionParams;
use serde::{Deserialize, Serialize};

use crate::selection::RaySelection;

/// Behaviour of one detect-and-publish cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub detection: DetectionParams,
    pub selection: RaySelection,
    /// Publish unit rays instead of raw K^-1 * p
    pub normalize_ray: bool,
    /// Draw the fixed reference box at the frame center
    pub diagnostic_overlay: bool,
    pub image_frame_id: String,
    pub ray_frame_id: String,
    /// Radius of the filled center marker, pixels
    pub marker_radius: u32,
    /// Line width of the circle outline and reference box, pixels
    pub line_thickness: u32,
    /// Side of the reference box, pixels
    pub box_size: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            detection: DetectionParams::default(),
            selection: RaySelection::default(),
            normalize_ray: false,
            diagnostic_overlay: true,
            image_frame_id: "camera".to_string(),
            ray_frame_id: "ray_direction".to_string(),
            marker_radius: 5,
            line_thickness: 3,
            box_size: 20,
        }
    }
}

/// Loop settings of the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Process/publish rate in Hz
    pub rate_hz: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { rate_hz: 10.0 }
    }
}

impl NodeConfig {
    /// Loop period; zero (no throttling) for a non-positive or non-finite rate
    pub fn period(&self) -> Duration {
        if !(self.rate_hz > 0.0 && self.rate_hz.is_finite()) {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(1.0 / self.rate_hz).unwrap_or(Duration::ZERO)
    }
}

/// Everything a node reads from its settings file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub processor: ProcessorConfig,
    pub node: NodeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ProcessorConfig::default();
        assert_eq!(cfg.selection, RaySelection::Last);
        assert!(!cfg.normalize_ray);
        assert!(cfg.diagnostic_overlay);
        assert_eq!(cfg.image_frame_id, "camera");
        assert_eq!(cfg.ray_frame_id, "ray_direction");
        assert_eq!(NodeConfig::default().period(), Duration::from_millis(100));
    }

    #[test]
    fn test_period_guards_bad_rates() {
        assert_eq!(NodeConfig { rate_hz: 0.0 }.period(), Duration::ZERO);
        assert_eq!(NodeConfig { rate_hz: -5.0 }.period(), Duration::ZERO);
        assert_eq!(NodeConfig { rate_hz: f64::NAN }.period(), Duration::ZERO);
        assert_eq!(NodeConfig { rate_hz: 1e-320 }.period(), Duration::ZERO);
    }

    #[test]
    fn test_settings_from_partial_json() {
        let json = r#"{
            "processor": {
                "selection": "largest",
                "detection": { "accum_threshold": 50 }
            },
            "node": { "rate_hz": 30 }
        }"#;
        let settings: NodeSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.processor.selection, RaySelection::Largest);
        assert_eq!(settings.processor.detection.accum_threshold, 50.0);
        assert_eq!(settings.processor.detection.min_radius, 20);
        assert!(settings.processor.diagnostic_overlay);
        assert_eq!(settings.node.rate_hz, 30.0);
    }
}
