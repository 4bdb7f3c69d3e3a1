//! Declarative configuration for forms and form items.
//!
//! Both [`FormItemConfig`] and [`ScopeConfig`] deserialize from YAML or JSON,
//! so item behaviour can live alongside the rest of an application's
//! settings:
//!
//! ```yaml
//! # item.yaml
//! status: invalid
//! message:
//!   invalid: "Please enter a valid email"
//!   validating: "Checking..."
//! required: true
//! has_feedback: true
//! ```
//!
//! A bare string is shorthand for the `invalid` message:
//!
//! ```yaml
//! message: "Please enter a valid email"
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::control::ValidateStatus;
use crate::item::MessageOverrides;
use crate::locale::Locale;

/// Error returned when configuration cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported config format \"{}\": expected .yaml, .yml or .json", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Horizontal alignment of an item's label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelAlign {
    Start,
    #[default]
    End,
}

/// Item message configuration: a bare string or one string per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageConfig {
    Text(String),
    PerStatus(HashMap<ValidateStatus, String>),
}

impl From<&MessageConfig> for MessageOverrides {
    fn from(config: &MessageConfig) -> Self {
        match config {
            MessageConfig::Text(text) => MessageOverrides::from(text.as_str()),
            MessageConfig::PerStatus(by_status) => by_status
                .iter()
                .map(|(status, text)| (*status, text.as_str()))
                .collect(),
        }
    }
}

/// Settings of one form item.
///
/// Every field is optional; unset layout fields fall back to the enclosing
/// [`ScopeConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormItemConfig {
    /// Displayed status override.
    pub status: Option<ValidateStatus>,
    /// Message overrides.
    pub message: Option<MessageConfig>,
    /// Marks the label as required.
    pub required: bool,
    pub colonless: Option<bool>,
    pub label_align: Option<LabelAlign>,
    pub has_feedback: Option<bool>,
}

impl FormItemConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads from a `.yaml`, `.yml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_path(path.as_ref())
    }
}

/// Form-level defaults shared by every item of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeConfig {
    pub colonless: bool,
    pub label_align: LabelAlign,
    pub has_feedback: bool,
    /// Initial locale; the process-wide default when unset.
    pub locale: Option<Locale>,
}

impl ScopeConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads from a `.yaml`, `.yml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_path(path.as_ref())
    }
}

fn load_path<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let is_json = match extension.as_deref() {
        Some("yaml") | Some("yml") => false,
        Some("json") => true,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loading config");

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_config_message_shorthand() {
        let config = FormItemConfig::from_yaml_str("message: required").unwrap();
        assert_eq!(config.message, Some(MessageConfig::Text("required".into())));

        let overrides = MessageOverrides::from(config.message.as_ref().unwrap());
        assert!(overrides.get(ValidateStatus::Invalid).is_some());
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_item_config_per_status_messages() {
        let config = FormItemConfig::from_yaml_str(
            "status: validating\nmessage:\n  invalid: bad\n  validating: wait\nrequired: true\n",
        )
        .unwrap();

        assert_eq!(config.status, Some(ValidateStatus::Validating));
        assert!(config.required);
        let overrides = MessageOverrides::from(config.message.as_ref().unwrap());
        assert_eq!(overrides.len(), 2);
        assert!(overrides.get(ValidateStatus::Valid).is_none());
    }

    #[test]
    fn test_item_config_json() {
        let config =
            FormItemConfig::from_json_str(r#"{"has_feedback": true, "label_align": "start"}"#)
                .unwrap();
        assert_eq!(config.has_feedback, Some(true));
        assert_eq!(config.label_align, Some(LabelAlign::Start));
        assert_eq!(config.colonless, None);
    }

    #[test]
    fn test_item_config_rejects_unknown_fields() {
        let result = FormItemConfig::from_yaml_str("colour: red");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_item_config_rejects_unknown_status() {
        let result = FormItemConfig::from_json_str(r#"{"status": "pending"}"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_scope_config_defaults() {
        let config = ScopeConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ScopeConfig::default());
        assert_eq!(config.label_align, LabelAlign::End);
    }

    #[test]
    fn test_scope_config_locale() {
        let config = ScopeConfig::from_yaml_str("locale:\n  type: fr\nhas_feedback: true\n").unwrap();
        assert_eq!(config.locale, Some(Locale::new("fr")));
        assert!(config.has_feedback);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = FormItemConfig::from_path("item.toml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let err = FormItemConfig::from_path("/nonexistent/item.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/item.yaml"));
    }
}
