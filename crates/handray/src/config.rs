//! Top-level tracker configuration.
//!
//! Every tunable constant is reachable from [`TrackerConfig`]; a JSON file only
//! needs to name the fields it overrides.

use std::path::Path;

use crate::gesture::GestureConfig;
use crate::hand::HandDetectConfig;

/// Errors from loading or validating a [`TrackerConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {e}"),
            Self::Parse(e) => write!(f, "failed to parse config JSON: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Per-hand region, ray and selection parameters.
    pub detect: HandDetectConfig,
    /// Pointer control policy.
    pub gesture: GestureConfig,
    /// Use joints the body tracker only inferred.
    pub accept_inferred_joints: bool,
    /// Depth frames a body observation stays usable without a new body frame.
    pub stale_after_depth_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detect: HandDetectConfig::default(),
            gesture: GestureConfig::default(),
            accept_inferred_joints: false,
            stale_after_depth_frames: 2,
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the detection and gesture stages cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detect;
        if d.region.half_width <= 0 {
            return Err(ConfigError::Invalid("region.half_width must be > 0".into()));
        }
        if !d.region.below_factor.is_finite() || d.region.below_factor <= 0.0 {
            return Err(ConfigError::Invalid(
                "region.below_factor must be finite and > 0".into(),
            ));
        }
        if d.region.quantum_mm <= 0 {
            return Err(ConfigError::Invalid("region.quantum_mm must be > 0".into()));
        }
        if d.finger_fan.scan_width <= 0 || d.finger_fan.max_steps == 0 {
            return Err(ConfigError::Invalid(
                "finger_fan.scan_width and finger_fan.max_steps must be > 0".into(),
            ));
        }
        if !d.finger_fan.offset_divisor.is_finite() || d.finger_fan.offset_divisor <= 0.0 {
            return Err(ConfigError::Invalid(
                "finger_fan.offset_divisor must be finite and > 0".into(),
            ));
        }
        if d.thumb_fan.rays == 0 {
            return Err(ConfigError::Invalid("thumb_fan.rays must be >= 1".into()));
        }
        let f = &d.fingertips;
        if f.min_coefficient.is_nan()
            || f.min_coefficient <= 0.0
            || f.initial_coefficient.is_nan()
            || f.initial_coefficient < f.min_coefficient
        {
            return Err(ConfigError::Invalid(format!(
                "fingertips: need 0 < min_coefficient ({}) <= initial_coefficient ({})",
                f.min_coefficient, f.initial_coefficient
            )));
        }
        if !f.coefficient_decrement.is_finite() || f.coefficient_decrement < 0.0 {
            return Err(ConfigError::Invalid(
                "fingertips.coefficient_decrement must be >= 0".into(),
            ));
        }
        if !d.thumb.coefficient.is_finite() || d.thumb.coefficient <= 0.0 {
            return Err(ConfigError::Invalid("thumb.coefficient must be > 0".into()));
        }

        let g = &self.gesture;
        if g.jitter_min_px.is_nan() || g.jitter_min_px < 0.0 || g.jitter_min_px >= g.jump_max_px {
            return Err(ConfigError::Invalid(format!(
                "gesture: need 0 <= jitter_min_px ({}) < jump_max_px ({})",
                g.jitter_min_px, g.jump_max_px
            )));
        }
        if g.dwell_click_frames == 0 {
            return Err(ConfigError::Invalid(
                "gesture.dwell_click_frames must be >= 1".into(),
            ));
        }
        if self.stale_after_depth_frames == 0 {
            return Err(ConfigError::Invalid(
                "stale_after_depth_frames must be >= 1".into(),
            ));
        }
        Ok(())
    }
}
