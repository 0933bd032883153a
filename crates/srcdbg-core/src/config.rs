#![forbid(unsafe_code)]

//! Debugger configuration.
//!
//! # Defaults
//!
//! | Setting | Default | Range | Description |
//! |---------|---------|-------|-------------|
//! | `autocomplete_debounce_ms` | 250 | 0-2000 | Quiescence window before an autocomplete request |
//! | `show_call_sites` | false | - | Mark call sites that hold no breakpoint |
//!
//! # Environment Variables
//!
//! | Variable | Type | Description |
//! |----------|------|-------------|
//! | `SRCDBG_AUTOCOMPLETE_DEBOUNCE_MS` | u64 | Autocomplete debounce window |
//! | `SRCDBG_SHOW_CALL_SITES` | bool | "1" or "true" enables call-site markers |
//!
//! # Loading from TOML (feature `config-file`)
//!
//! ```toml
//! autocomplete_debounce_ms = 300
//! show_call_sites = true
//! ```

use std::fmt;
#[cfg(feature = "config-file")]
use std::path::Path;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Default autocomplete debounce window.
pub const DEFAULT_AUTOCOMPLETE_DEBOUNCE_MS: u64 = 250;

/// Maximum allowed autocomplete debounce window.
pub const MAX_AUTOCOMPLETE_DEBOUNCE_MS: u64 = 2_000;

/// Tunables for the debugger UI core.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct DebuggerConfig {
    /// Quiescence window (ms) after the last keystroke in the condition
    /// editor before autocomplete matches are requested.
    pub autocomplete_debounce_ms: u64,

    /// Initial value of the "show call sites" toggle.
    pub show_call_sites: bool,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            autocomplete_debounce_ms: DEFAULT_AUTOCOMPLETE_DEBOUNCE_MS,
            show_call_sites: false,
        }
    }
}

impl DebuggerConfig {
    #[must_use]
    /// Windows longer than `u64::MAX` milliseconds saturate; [`validated`]
    /// clamps the result.
    ///
    /// [`validated`]: Self::validated
    pub fn with_autocomplete_debounce(mut self, window: Duration) -> Self {
        self.autocomplete_debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_show_call_sites(mut self, show: bool) -> Self {
        self.show_call_sites = show;
        self
    }

    #[must_use]
    pub fn autocomplete_debounce(&self) -> Duration {
        Duration::from_millis(self.autocomplete_debounce_ms)
    }

    /// Load config from environment variables, clamped to valid ranges.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary key lookup.
    ///
    /// Unset or unparsable values keep their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("SRCDBG_AUTOCOMPLETE_DEBOUNCE_MS")
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.autocomplete_debounce_ms = ms;
        }

        if let Some(val) = lookup("SRCDBG_SHOW_CALL_SITES") {
            let val = val.trim();
            config.show_call_sites = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config.validated()
    }

    /// Clamp values to their valid ranges.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.autocomplete_debounce_ms = self
            .autocomplete_debounce_ms
            .min(MAX_AUTOCOMPLETE_DEBOUNCE_MS);
        self
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.autocomplete_debounce_ms <= MAX_AUTOCOMPLETE_DEBOUNCE_MS
    }

    /// Parse from a TOML string. Out-of-range values are rejected.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        if config.is_valid() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(format!(
                "autocomplete_debounce_ms must be at most {MAX_AUTOCOMPLETE_DEBOUNCE_MS}, got {}",
                config.autocomplete_debounce_ms
            )))
        }
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }
}

/// Errors from loading a [`DebuggerConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// A value is out of range.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O error: {err}"),
            #[cfg(feature = "config-file")]
            Self::Toml(err) => write!(f, "config TOML error: {err}"),
            Self::Validation(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            #[cfg(feature = "config-file")]
            Self::Toml(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = DebuggerConfig::default();
        assert_eq!(config.autocomplete_debounce(), Duration::from_millis(250));
        assert!(!config.show_call_sites);
        assert!(config.is_valid());
    }

    #[test]
    fn lookup_overrides_and_clamps() {
        let config = DebuggerConfig::from_lookup(lookup(&[
            ("SRCDBG_AUTOCOMPLETE_DEBOUNCE_MS", "9000"),
            ("SRCDBG_SHOW_CALL_SITES", "TRUE"),
        ]));
        assert_eq!(config.autocomplete_debounce_ms, MAX_AUTOCOMPLETE_DEBOUNCE_MS);
        assert!(config.show_call_sites);
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let config = DebuggerConfig::from_lookup(lookup(&[
            ("SRCDBG_AUTOCOMPLETE_DEBOUNCE_MS", "soon"),
            ("SRCDBG_SHOW_CALL_SITES", "yes please"),
        ]));
        assert_eq!(config, DebuggerConfig::default());
    }

    #[test]
    fn builders() {
        let config = DebuggerConfig::default()
            .with_autocomplete_debounce(Duration::from_millis(100))
            .with_show_call_sites(true);
        assert_eq!(config.autocomplete_debounce_ms, 100);
        assert!(config.show_call_sites);
    }

    #[test]
    fn huge_debounce_saturates_then_clamps() {
        let config = DebuggerConfig::default().with_autocomplete_debounce(Duration::MAX);
        assert_eq!(config.autocomplete_debounce_ms, u64::MAX);
        assert_eq!(config.validated().autocomplete_debounce_ms, MAX_AUTOCOMPLETE_DEBOUNCE_MS);
    }

    #[test]
    fn validation_error_display() {
        let err = ConfigError::Validation("bad".into());
        assert_eq!(err.to_string(), "invalid config: bad");
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_round_trip_and_partial_files() {
        let config = DebuggerConfig::from_toml_str("show_call_sites = true\n").expect("parse");
        assert!(config.show_call_sites);
        assert_eq!(config.autocomplete_debounce_ms, DEFAULT_AUTOCOMPLETE_DEBOUNCE_MS);

        assert!(matches!(
            DebuggerConfig::from_toml_str("autocomplete_debounce_ms = 5000"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            DebuggerConfig::from_toml_str("autocomplete_debounce_ms = \"x\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_file_loading() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("srcdbg.toml");
        std::fs::write(&path, "autocomplete_debounce_ms = 120\n").expect("write");
        let config = DebuggerConfig::from_toml_file(&path).expect("load");
        assert_eq!(config.autocomplete_debounce_ms, 120);

        let missing = DebuggerConfig::from_toml_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
