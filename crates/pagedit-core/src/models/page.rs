//! Page model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::settings::UserSetting;

/// Server-assigned page identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(i64);

impl PageId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// The canonical (last saved) version of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: PageId,
    /// Content version the attachments are filed under
    pub version_id: i64,
    /// Optimistic-concurrency counter; edits must carry the latest value
    pub object_version_number: i64,
    pub title: String,
    /// Markdown source
    pub content: String,
}

/// Workspace tree node the page hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSpace {
    pub id: i64,
}

/// Everything the store knows about the page being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSnapshot {
    pub page_info: PageInfo,
    /// Absent for users who never picked an editor mode
    #[serde(default)]
    pub user_setting: Option<UserSetting>,
    pub work_space: WorkSpace,
    /// Whether an unsaved server-side draft exists for the page
    #[serde(default)]
    pub has_draft: bool,
}

/// Payload of a full document save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocEdit {
    pub title: String,
    pub content: String,
    pub minor_edit: bool,
    pub object_version_number: i64,
}

/// Payload of a content-only draft save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSaveDoc {
    pub content: String,
}

/// Page display mode tracked by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    View,
    Edit,
}
