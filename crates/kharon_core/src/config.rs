//! # Bridge Configuration
//!
//! Loaded once at startup, before the engine instance is created. The
//! drive mode is fixed for the life of a bridge; the two strategies are
//! never mixed within one instance.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default bounded wait for the render thread to acknowledge a stop.
pub const DEFAULT_TEARDOWN_TIMEOUT_MS: u64 = 250;

/// How frame ticks are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// A dedicated render thread pulls frames as fast as the display
    /// pipeline accepts them, independent of lifecycle callbacks.
    ContinuousPull,
    /// No frame-pull thread; the host produces frames synchronously
    /// through its own surface-event callbacks.
    EventDriven,
}

impl DriveMode {
    /// Returns `true` if this mode owns a dedicated render thread.
    #[inline]
    #[must_use]
    pub const fn has_render_thread(self) -> bool {
        matches!(self, Self::ContinuousPull)
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML text did not parse.
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Startup configuration for a bridge instance.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Frame production strategy. Fixed for the instance's lifetime.
    pub drive_mode: DriveMode,
    /// Bounded wait for the render thread's stop acknowledgement during
    /// surface/instance teardown, in milliseconds.
    pub teardown_timeout_ms: u64,
    /// Minimum interval between pulled frames, in microseconds.
    /// Zero means uncapped: tick as fast as the display pipeline accepts,
    /// relying on the native side's present call to pace.
    pub min_frame_interval_us: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            drive_mode: DriveMode::ContinuousPull,
            teardown_timeout_ms: DEFAULT_TEARDOWN_TIMEOUT_MS,
            min_frame_interval_us: 0,
        }
    }
}

impl BridgeConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] on unusable values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the teardown timeout is zero;
    /// an unbounded-zero wait would turn every surface teardown into a
    /// race against the render thread.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.teardown_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "teardown_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Teardown timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn teardown_timeout(&self) -> Duration {
        Duration::from_millis(self.teardown_timeout_ms)
    }

    /// Frame pacing interval, `None` when uncapped.
    #[inline]
    #[must_use]
    pub fn frame_interval(&self) -> Option<Duration> {
        if self.min_frame_interval_us == 0 {
            None
        } else {
            Some(Duration::from_micros(self.min_frame_interval_us))
        }
    }
}
