//! Per-user editor settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Setting type tag the store files editor-mode preferences under.
pub const EDIT_MODE_SETTING_TYPE: &str = "edit_mode";

/// Editor input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Markdown source editing
    Markdown,
    /// Rendered (what-you-see-is-what-you-get) editing
    Wysiwyg,
}

impl EditMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Wysiwyg => "wysiwyg",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" => Ok(Self::Markdown),
            "wysiwyg" => Ok(Self::Wysiwyg),
            other => Err(Error::InvalidInput(format!("unknown edit mode: {other}"))),
        }
    }
}

/// Stored editor-mode preference of the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSetting {
    pub id: i64,
    pub object_version_number: i64,
    /// None once the preference has been cleared
    #[serde(default)]
    pub edit_mode: Option<EditMode>,
}

/// Create-or-update request for the editor-mode preference.
///
/// `id` and `object_version_number` are set only when updating an existing
/// preference record. An absent `edit_mode` clears the preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditModeSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_version_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_mode: Option<EditMode>,
    #[serde(rename = "type")]
    pub setting_type: String,
}

impl EditModeSetting {
    /// Build the request for `mode`, updating `existing` when there is one.
    #[must_use]
    pub fn for_mode(edit_mode: Option<EditMode>, existing: Option<&UserSetting>) -> Self {
        Self {
            id: existing.map(|setting| setting.id),
            object_version_number: existing.map(|setting| setting.object_version_number),
            edit_mode,
            setting_type: EDIT_MODE_SETTING_TYPE.to_string(),
        }
    }

    #[must_use]
    pub const fn is_create(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_mode_parse() {
        assert_eq!("Markdown".parse::<EditMode>().unwrap(), EditMode::Markdown);
        assert_eq!(" wysiwyg ".parse::<EditMode>().unwrap(), EditMode::Wysiwyg);
        assert!("rich".parse::<EditMode>().is_err());
    }

    #[test]
    fn test_mode_setting_create_for_first_time_user() {
        let setting = EditModeSetting::for_mode(Some(EditMode::Wysiwyg), None);
        assert!(setting.is_create());
        assert_eq!(setting.object_version_number, None);
        assert_eq!(setting.setting_type, "edit_mode");
    }

    #[test]
    fn test_mode_setting_update_carries_id_and_version() {
        let existing = UserSetting {
            id: 5,
            object_version_number: 2,
            edit_mode: Some(EditMode::Markdown),
        };
        let setting = EditModeSetting::for_mode(Some(EditMode::Wysiwyg), Some(&existing));
        assert_eq!(setting.id, Some(5));
        assert_eq!(setting.object_version_number, Some(2));
        assert_eq!(setting.edit_mode, Some(EditMode::Wysiwyg));

        let value = serde_json::to_value(&setting).unwrap();
        assert_eq!(value["type"], "edit_mode");
        assert_eq!(value["editMode"], "wysiwyg");
    }

    #[test]
    fn test_mode_setting_clear_omits_mode() {
        let existing = UserSetting {
            id: 5,
            object_version_number: 2,
            edit_mode: Some(EditMode::Markdown),
        };
        let setting = EditModeSetting::for_mode(None, Some(&existing));
        assert!(!setting.is_create());

        let value = serde_json::to_value(&setting).unwrap();
        assert!(value.get("editMode").is_none());
        assert_eq!(value["id"], 5);
    }

    #[test]
    fn test_user_setting_without_mode_deserializes() {
        let setting: UserSetting =
            serde_json::from_str(r#"{"id": 3, "objectVersionNumber": 1}"#).unwrap();
        assert_eq!(setting.edit_mode, None);
    }
}
