//! Detection threshold configuration

use alerting::AlertToggles;
use data_validator::{ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Thresholds and alert toggles, owned by the host and read once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// EAR below this counts as eyes closed
    pub ear_threshold: f32,

    /// MAR above this counts as mouth open (yawn candidate)
    pub mar_threshold: f32,

    /// Continuous eye closure before a fatigue verdict (seconds)
    pub closure_duration_sec: f32,

    /// Play alert sounds
    pub sound_enabled: bool,

    /// Repeat the alert sound while the alert stays active
    pub continuous_enabled: bool,

    /// Show the visual alert overlay
    pub visual_enabled: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            mar_threshold: 0.6,
            closure_duration_sec: 1.5,
            sound_enabled: true,
            continuous_enabled: true,
            visual_enabled: true,
        }
    }
}

impl ThresholdConfig {
    /// Create strict config (earlier detection)
    pub fn strict() -> Self {
        Self {
            ear_threshold: 0.28,
            mar_threshold: 0.5,
            closure_duration_sec: 1.0,
            ..Default::default()
        }
    }

    /// Create lenient config (fewer false alarms)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.2,
            mar_threshold: 0.75,
            closure_duration_sec: 2.5,
            ..Default::default()
        }
    }

    /// Alert channel switches
    pub fn toggles(&self) -> AlertToggles {
        AlertToggles {
            sound: self.sound_enabled,
            continuous: self.continuous_enabled,
            visual: self.visual_enabled,
        }
    }

    /// Range-check every threshold
    pub fn validate(&self, validator: &Validator) -> Result<(), ValidationError> {
        validator.validate_ear_threshold(self.ear_threshold as f64)?;
        validator.validate_mar_threshold(self.mar_threshold as f64)?;
        validator.validate_closure_duration(self.closure_duration_sec as f64)?;
        Ok(())
    }
}
