//! Edit session configuration.
//!
//! `SessionConfig` carries the limits and user-facing prompt texts of an edit
//! session. Hosts either use the defaults or load a JSON document.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::normalize_text;

const DEFAULT_TITLE_MAX_CHARS: usize = 40;
const DEFAULT_UPLOADING_NOTICE: &str = "Uploading attachment...";
const DEFAULT_REMOVAL_BLOCKED_NOTICE: &str = "Attachments that are still uploading cannot be removed.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Longest title the title field accepts, in characters
    pub title_max_chars: usize,
    /// Prompt shown while an attachment is being uploaded
    pub uploading_notice: String,
    /// Prompt shown when removing an attachment that is still uploading
    pub removal_blocked_notice: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            uploading_notice: DEFAULT_UPLOADING_NOTICE.to_string(),
            removal_blocked_notice: DEFAULT_REMOVAL_BLOCKED_NOTICE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config document. Missing keys take defaults.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validated()
    }

    /// Check limits and normalize notice texts.
    pub fn validated(self) -> Result<Self> {
        if self.title_max_chars == 0 {
            return Err(Error::InvalidInput(
                "title_max_chars must be greater than zero".to_string(),
            ));
        }
        let uploading_notice = normalize_text(&self.uploading_notice).ok_or_else(|| {
            Error::InvalidInput("uploading_notice must not be empty".to_string())
        })?;
        let removal_blocked_notice =
            normalize_text(&self.removal_blocked_notice).ok_or_else(|| {
                Error::InvalidInput("removal_blocked_notice must not be empty".to_string())
            })?;

        Ok(Self {
            title_max_chars: self.title_max_chars,
            uploading_notice,
            removal_blocked_notice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_title_limit_is_forty() {
        assert_eq!(SessionConfig::default().title_max_chars, 40);
    }

    #[test]
    fn from_json_fills_missing_keys() {
        let config = SessionConfig::from_json(r#"{"title_max_chars": 12}"#).unwrap();
        assert_eq!(
            config,
            SessionConfig {
                title_max_chars: 12,
                ..SessionConfig::default()
            }
        );
    }

    #[test]
    fn from_json_trims_notices() {
        let config = SessionConfig::from_json(r#"{"uploading_notice": "  Sending...  "}"#).unwrap();
        assert_eq!(config.uploading_notice, "Sending...");
    }

    #[test]
    fn from_json_rejects_invalid_values() {
        assert!(SessionConfig::from_json(r#"{"title_max_chars": 0}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"removal_blocked_notice": "   "}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"unknown": true}"#).is_err());
        assert!(SessionConfig::from_json("not json").is_err());
    }
}
