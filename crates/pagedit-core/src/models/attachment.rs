//! Attachment model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

use super::page::PageId;

/// Server-assigned attachment identifier. Only exists once an upload completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(i64);

impl AttachmentId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttachmentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Lifecycle of an entry in the attachment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStatus {
    #[default]
    Uploading,
    Done,
    Removed,
}

/// An entry of the page's attachment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Absent until the upload completes server-side
    #[serde(default)]
    pub id: Option<AttachmentId>,
    /// Client-side identifier, stable from the moment the file is picked
    pub uid: String,
    /// File name
    pub name: String,
    #[serde(default)]
    pub status: AttachmentStatus,
}

impl Attachment {
    /// A file that was picked but has not been stored yet.
    pub fn uploading(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            uid: uid.into(),
            name: name.into(),
            status: AttachmentStatus::Uploading,
        }
    }

    /// A stored attachment. Its uid is the server id.
    pub fn persisted(id: AttachmentId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            uid: id.to_string(),
            name: name.into(),
            status: AttachmentStatus::Done,
        }
    }

    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Copy of this entry with a new status.
    #[must_use]
    pub fn with_status(&self, status: AttachmentStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Copy as the upload widget lists it: stored files are keyed by their id.
    #[must_use]
    pub fn for_display(&self) -> Self {
        match self.id {
            Some(id) => Self {
                uid: id.to_string(),
                ..self.clone()
            },
            None => self.clone(),
        }
    }
}

/// A file handed over by the upload widget before it is transferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub uid: String,
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let uid = uid.into().trim().to_string();
        let name = name.into().trim().to_string();

        if uid.is_empty() {
            return Err(Error::InvalidInput("Upload uid cannot be empty".to_string()));
        }
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Upload file name cannot be empty".to_string(),
            ));
        }

        Ok(Self { uid, name, bytes })
    }
}

/// Upload dispatched to the page store, which owns the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_id: PageId,
    pub version_id: i64,
    /// Temporary id used to match the finished upload to its list entry
    pub uid: String,
}

/// Change event of the upload widget: the file that changed and the list the
/// widget would show afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListChange {
    pub file: Attachment,
    pub file_list: Vec<Attachment>,
}

impl FileListChange {
    /// Event for removing `file` from `current`.
    #[must_use]
    pub fn removal(file: &Attachment, current: &[Attachment]) -> Self {
        let file_list = current
            .iter()
            .filter(|entry| entry.uid != file.uid)
            .cloned()
            .collect();
        Self {
            file: file.with_status(AttachmentStatus::Removed),
            file_list,
        }
    }
}
