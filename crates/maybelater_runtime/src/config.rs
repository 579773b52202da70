//! Runtime configuration.

use maybelater_core::{CoreError, CoreResult, Duration};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Timing knobs for one run, all in seconds
///
/// Missing fields in a config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Panic mode starts once the deadline is closer than this
    pub panic_window_secs: f64,
    /// Deterministic variables idle longer than this are deleted
    pub idle_expiry_secs: f64,
    /// Wall-clock budget for migrating procrastinated work
    pub procrastination_timeout_secs: f64,
    /// Delay for statements spawned by a matched conditional
    pub conditional_delay_secs: f64,
    /// Same, once in panic mode
    pub panic_conditional_delay_secs: f64,
    /// Offset every queued entry collapses to on escalation
    pub collapse_offset_secs: f64,
    /// Pause between procrastination and draining its events
    pub procrastination_grace_secs: f64,
    /// Longest single wait while a procrastinated event is not yet due
    pub idle_poll_secs: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            panic_window_secs: 5.0,
            idle_expiry_secs: 30.0,
            procrastination_timeout_secs: 10.0,
            conditional_delay_secs: 0.1,
            panic_conditional_delay_secs: 0.001,
            collapse_offset_secs: 0.001,
            procrastination_grace_secs: 1.0,
            idle_poll_secs: 0.01,
        }
    }
}

impl RuntimeConfig {
    /// Parse from JSON text
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or a value is invalid
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Check every value is a finite, non-negative number of seconds and
    /// the idle poll interval is at least one nanosecond
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first bad field
    pub fn validate(&self) -> CoreResult<()> {
        let fields = [
            ("panic_window_secs", self.panic_window_secs),
            ("idle_expiry_secs", self.idle_expiry_secs),
            ("procrastination_timeout_secs", self.procrastination_timeout_secs),
            ("conditional_delay_secs", self.conditional_delay_secs),
            ("panic_conditional_delay_secs", self.panic_conditional_delay_secs),
            ("collapse_offset_secs", self.collapse_offset_secs),
            ("procrastination_grace_secs", self.procrastination_grace_secs),
            ("idle_poll_secs", self.idle_poll_secs),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Validation {
                    field: field.to_string(),
                    reason: format!("expected non-negative seconds, got {}", value),
                });
            }
        }
        if self.idle_poll().is_zero() {
            return Err(CoreError::Validation {
                field: "idle_poll_secs".to_string(),
                reason: format!("expected a positive interval, got {}", self.idle_poll_secs),
            });
        }
        Ok(())
    }

    /// Panic window
    #[must_use]
    pub fn panic_window(&self) -> Duration {
        Duration::from_secs_f64(self.panic_window_secs)
    }

    /// Idle expiry threshold
    #[must_use]
    pub fn idle_expiry(&self) -> Duration {
        Duration::from_secs_f64(self.idle_expiry_secs)
    }

    /// Procrastination timeout
    #[must_use]
    pub fn procrastination_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.procrastination_timeout_secs)
    }

    /// Delay for statements spawned by a conditional
    #[must_use]
    pub fn conditional_delay(&self, panic: bool) -> Duration {
        if panic {
            Duration::from_secs_f64(self.panic_conditional_delay_secs)
        } else {
            Duration::from_secs_f64(self.conditional_delay_secs)
        }
    }

    /// Collapse offset
    #[must_use]
    pub fn collapse_offset(&self) -> Duration {
        Duration::from_secs_f64(self.collapse_offset_secs)
    }

    /// Procrastination grace pause
    #[must_use]
    pub fn procrastination_grace(&self) -> Duration {
        Duration::from_secs_f64(self.procrastination_grace_secs)
    }

    /// Idle poll interval
    #[must_use]
    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs_f64(self.idle_poll_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.panic_window(), Duration::from_secs(5));
        assert_eq!(config.idle_expiry(), Duration::from_secs(30));
        assert_eq!(config.procrastination_timeout(), Duration::from_secs(10));
        assert_eq!(config.conditional_delay(false), Duration::from_millis(100));
        assert_eq!(config.conditional_delay(true), Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RuntimeConfig::from_json(r#"{"idle_expiry_secs": 2.5}"#).unwrap();
        assert_eq!(config.idle_expiry(), Duration::from_millis(2500));
        assert_eq!(config.panic_window(), Duration::from_secs(5));
    }

    #[test]
    fn test_negative_value_rejected() {
        let err = RuntimeConfig::from_json(r#"{"panic_window_secs": -1}"#).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "panic_window_secs"));
    }

    #[test]
    fn test_zero_idle_poll_rejected() {
        let err = RuntimeConfig::from_json(r#"{"idle_poll_secs": 0}"#).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "idle_poll_secs"));

        let err = RuntimeConfig::from_json(r#"{"idle_poll_secs": 1e-12}"#).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "idle_poll_secs"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"procrastination_timeout_secs": 3}}"#).unwrap();
        let config = RuntimeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.procrastination_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuntimeConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
