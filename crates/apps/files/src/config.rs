//! Static configuration and per-user preferences for the file manager.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Preference-store key for [`FileManagerPrefs`].
pub const FILE_MANAGER_PREFS_KEY: &str = "hosting-panel.file-manager.prefs.v1";
/// Default bound for every network request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default suffix appended to pasted copies.
pub const DEFAULT_COPY_SUFFIX: &str = "_copy";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Configuration parse and validation failures.
pub enum ConfigError {
    /// The TOML source did not parse.
    #[error("invalid file manager config: {0}")]
    Parse(String),
    /// A field holds an unusable value.
    #[error("invalid file manager config field `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Deployment-level settings for a file manager session.
pub struct FileManagerConfig {
    /// Timeout applied to every network request, in milliseconds.
    pub request_timeout_ms: u64,
    /// Suffix appended to the name of a pasted copy.
    pub copy_suffix: String,
    /// Whether hidden entries are shown when the user has no stored preference.
    pub show_hidden: bool,
    /// Editor language used when the extension is unknown.
    pub editor_language_fallback: String,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
            show_hidden: false,
            editor_language_fallback: "plaintext".to_string(),
        }
    }
}

impl FileManagerConfig {
    /// Parses and validates a TOML document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document does not parse or a field is unusable.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero timeout or an empty or nested copy suffix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_ms",
                reason: "must be greater than zero",
            });
        }
        if self.copy_suffix.is_empty() || self.copy_suffix.contains('/') {
            return Err(ConfigError::Invalid {
                field: "copy_suffix",
                reason: "must be a non-empty name fragment without `/`",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Per-user view preferences persisted through a [`PrefsStore`](panel_host::PrefsStore).
pub struct FileManagerPrefs {
    /// Explicit hidden-entry choice; `None` defers to [`FileManagerConfig::show_hidden`].
    #[serde(default)]
    pub show_hidden: Option<bool>,
    /// Domain selected in the previous session.
    #[serde(default)]
    pub last_domain: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let config = FileManagerConfig::from_toml_str(
            r#"
            request_timeout_ms = 5000
            show_hidden = true
            "#,
        )
        .expect("valid config");
        assert_eq!(
            config,
            FileManagerConfig {
                request_timeout_ms: 5000,
                show_hidden: true,
                ..FileManagerConfig::default()
            }
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = FileManagerConfig::from_toml_str("request_timeout_ms = 0").expect_err("zero");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "request_timeout_ms",
                ..
            }
        ));
        let err = FileManagerConfig::from_toml_str("copy_suffix = \"a/b\"").expect_err("slash");
        assert!(matches!(err, ConfigError::Invalid { field: "copy_suffix", .. }));
        assert!(matches!(
            FileManagerConfig::from_toml_str("request_timeout_ms = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn prefs_tolerate_missing_fields() {
        let prefs: FileManagerPrefs = serde_json::from_str("{}").expect("empty prefs");
        assert_eq!(prefs, FileManagerPrefs::default());
    }
}
