//! Game settings
//!
//! Solver quality and control tuning. Hosts keep these as JSON next to
//! their other preferences.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Which accelerometer convention the host platform reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccelConvention {
    /// Samples in m/s² including gravity, normalised by earth gravity
    #[default]
    Standard,
    /// Samples already in units of g, with a fixed -90° offset on y
    /// (older Gecko browsers)
    GeckoLegacy,
}

impl AccelConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccelConvention::Standard => "Standard",
            AccelConvention::GeckoLegacy => "GeckoLegacy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(AccelConvention::Standard),
            "gecko" | "geckolegacy" | "mozilla" => Some(AccelConvention::GeckoLegacy),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Solver ===
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Longest frame the simulation will advance in one tick; longer
    /// frames (tab hidden, debugger pause) are clamped to this
    pub max_frame_seconds: f32,

    // === Controls ===
    pub accel_convention: AccelConvention,
    /// Gravity per arrow key
    pub key_gravity: f32,
    /// A key only acts while gravity toward the opposite side is below this
    pub key_gravity_ceiling: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
            max_frame_seconds: 0.1,

            accel_convention: AccelConvention::Standard,
            key_gravity: KEY_GRAVITY,
            key_gravity_ceiling: KEY_GRAVITY_CEILING,
        }
    }
}

impl Settings {
    /// Parse settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded settings ({})", settings.accel_convention.as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.max_frame_seconds)
            || !positive(self.key_gravity)
            || !positive(self.key_gravity_ceiling)
        {
            return Err(ConfigError::InvalidSettings(format!(
                "max_frame_seconds={} key_gravity={} key_gravity_ceiling={}",
                self.max_frame_seconds, self.key_gravity, self.key_gravity_ceiling
            )));
        }
        Ok(())
    }
}
