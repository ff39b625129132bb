//! PulseVision Replay Host
//!
//! Drives the fatigue engine from a recorded landmark stream and reports alerts through logs.

use alerting::AlertConfig;
use dms::{DmsError, ThresholdConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

mod replay;

pub use replay::{format_elapsed, parse_record, replay, FrameRecord, LogChannels, ReplaySummary};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "PULSEVISION";
/// Optional configuration file name (any format the `config` crate recognizes)
pub const CONFIG_FILE: &str = "pulsevision";

/// Replay host errors
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] DmsError),

    #[error("No recording given")]
    NoInput,
}

/// Logging options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Include debug-level events
    pub verbose: bool,
}

/// Replay options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// JSON-lines landmark recording
    pub path: Option<PathBuf>,
    /// Sleep between frames so the replay runs at recorded speed
    pub realtime: bool,
}

/// Full host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub thresholds: ThresholdConfig,
    pub alerts: AlertConfig,
    pub replay: ReplaySettings,
    pub logging: LogSettings,
}

impl AppConfig {
    /// Defaults, then `pulsevision.toml` if present, then `PULSEVISION__*` variables
    /// (e.g. `PULSEVISION__THRESHOLDS__EAR_THRESHOLD=0.22`)
    pub fn load() -> Result<Self, ReplayError> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(file: &str) -> Result<Self, ReplayError> {
        Self::layered(file, environment())
    }

    fn layered(file: &str, env: config::Environment) -> Result<Self, ReplayError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(file).required(false))
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Initialize logging
pub fn init_logging(settings: &LogSettings) -> Result<(), SetGlobalDefaultError> {
    let level = if settings.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_from("does-not-exist/pulsevision").unwrap();
        assert_eq!(config.thresholds.ear_threshold, 0.25);
        assert_eq!(config.thresholds.mar_threshold, 0.6);
        assert_eq!(config.alerts.cooldown_ms, 3000);
        assert!(config.thresholds.sound_enabled);
        assert!(config.replay.path.is_none());
        assert!(!config.replay.realtime);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("pulsevision-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("pulsevision.toml");
        std::fs::write(
            &file,
            "[thresholds]\near_threshold = 0.2\nsound_enabled = false\n\n[replay]\nrealtime = true\n",
        )
        .unwrap();

        let config = AppConfig::load_from(file.to_str().unwrap()).unwrap();
        assert_eq!(config.thresholds.ear_threshold, 0.2);
        assert!(!config.thresholds.sound_enabled);
        // Untouched keys keep their defaults
        assert_eq!(config.thresholds.closure_duration_sec, 1.5);
        assert!(config.replay.realtime);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = std::env::temp_dir().join(format!("pulsevision-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("pulsevision.toml");
        std::fs::write(&file, "[thresholds]\near_threshold = 0.2\n").unwrap();

        let vars: config::Map<String, String> = [
            ("PULSEVISION__THRESHOLDS__EAR_THRESHOLD", "0.22"),
            ("PULSEVISION__THRESHOLDS__VISUAL_ENABLED", "false"),
            ("PULSEVISION__ALERTS__COOLDOWN_MS", "5000"),
            ("OTHERAPP__THRESHOLDS__MAR_THRESHOLD", "0.9"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config =
            AppConfig::layered(file.to_str().unwrap(), environment().source(Some(vars))).unwrap();
        assert!((config.thresholds.ear_threshold - 0.22).abs() < 1e-6);
        assert!(!config.thresholds.visual_enabled);
        assert_eq!(config.alerts.cooldown_ms, 5000);
        // Other prefixes are ignored
        assert_eq!(config.thresholds.mar_threshold, 0.6);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
