//! Runtime settings.
//!
//! Every field has a default so `Settings::default()` always works. With the `config`
//! feature, settings can also be read from a TOML file:
//!
//! ```toml
//! tick_interval_ms = 1000
//! frame_interval_ms = 16
//! swap_style = "animated"
//!
//! [transitions]
//! poll_cap = 1000
//! progress_interval = 100
//! ```
//!
//! Missing keys take their defaults, unknown keys are rejected.

use crate::error::{ListError, Result};
use crate::sequencer::{TimeoutPolicy, TRANSITION_POLL_CAP, TRANSITION_PROGRESS_INTERVAL};
use crate::swap::TextSwapStyle;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::Deserialize;
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

/// Bounded-wait settings for transitions, in frames
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct TransitionSettings {
    pub poll_cap: u32,
    pub progress_interval: u32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            poll_cap: TRANSITION_POLL_CAP,
            progress_interval: TRANSITION_PROGRESS_INTERVAL,
        }
    }
}

/// Settings for the refresh driver and the demo host
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct Settings {
    /// Milliseconds between refresh ticks
    pub tick_interval_ms: u64,
    /// Milliseconds between frames
    pub frame_interval_ms: u64,
    pub transitions: TransitionSettings,
    pub swap_style: TextSwapStyle,
    /// Duration of one fade in the terminal presenter
    pub fade_ms: u64,
    /// Seed of the market simulation
    pub seed: u64,
    /// Probability (0.0..=1.0) that the market changes between two ticks
    pub churn: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            frame_interval_ms: 16,
            transitions: TransitionSettings::default(),
            swap_style: TextSwapStyle::Immediate,
            fade_ms: 250,
            seed: 7,
            churn: 0.6,
        }
    }
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy {
            poll_cap: self.transitions.poll_cap,
            progress_interval: self.transitions.progress_interval,
        }
    }

    /// Reject values the host loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(ListError::config("tick_interval_ms must be greater than zero"));
        }
        if self.frame_interval_ms == 0 {
            return Err(ListError::config("frame_interval_ms must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.churn) {
            return Err(ListError::config(format!(
                "churn must be between 0.0 and 1.0, got {}",
                self.churn
            )));
        }
        Ok(())
    }

    /// Parse settings from TOML text
    #[cfg(feature = "config")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| ListError::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ListError::io(format!("Failed to read {}", path.display()), e))?;
        Self::from_toml_str(&text)
    }

    /// `<config_dir>/listsync/config.toml`
    #[cfg(feature = "config")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("listsync").join("config.toml"))
    }

    /// Load from `explicit` if given, else from the default path when that file exists,
    /// else fall back to defaults
    #[cfg(feature = "config")]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_toml_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::info!("Loading settings from {}", path.display());
                Self::from_toml_file(path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.timeout_policy(), TimeoutPolicy::default());
        assert_eq!(settings.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let settings = Settings {
            tick_interval_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ListError::ConfigError { .. })));
    }

    #[cfg(feature = "config")]
    mod file {
        use super::*;
        use std::io::Write;

        #[test]
        fn partial_file_keeps_defaults() {
            let settings = Settings::from_toml_str(
                r#"
                tick_interval_ms = 250
                swap_style = "animated"

                [transitions]
                poll_cap = 10
                "#,
            )
            .unwrap();

            assert_eq!(settings.tick_interval_ms, 250);
            assert_eq!(settings.swap_style, TextSwapStyle::Animated);
            assert_eq!(settings.transitions.poll_cap, 10);
            assert_eq!(
                settings.transitions.progress_interval,
                TRANSITION_PROGRESS_INTERVAL
            );
            assert_eq!(settings.fade_ms, Settings::default().fade_ms);
        }

        #[test]
        fn unknown_keys_are_rejected() {
            let err = Settings::from_toml_str("tick_interval = 5").unwrap_err();
            assert!(matches!(err, ListError::ConfigError { .. }));
        }

        #[test]
        fn invalid_values_are_rejected() {
            assert!(Settings::from_toml_str("churn = 1.5").is_err());
        }

        #[test]
        fn loads_explicit_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "seed = 42\nfade_ms = 0").unwrap();

            let settings = Settings::load(Some(file.path())).unwrap();
            assert_eq!(settings.seed, 42);
            assert_eq!(settings.fade_ms, 0);
        }

        #[test]
        fn missing_explicit_file_is_an_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("absent.toml");
            let err = Settings::load(Some(missing.as_path())).unwrap_err();
            assert!(matches!(err, ListError::IoError { .. }));
        }
    }
}
