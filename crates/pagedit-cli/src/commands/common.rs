use std::fs;
use std::path::Path;

use pagedit_core::models::{Attachment, AttachmentId, EditMode, UploadFile};
use pagedit_core::session::{Notice, SessionEvent};
use pagedit_core::{EditSession, EditorHandle, MemoryPageStore, SessionConfig};
use serde::Serialize;

use crate::error::CliError;

/// Editor stand-in holding the content a command will save.
#[derive(Debug, Clone)]
pub struct FixedEditor {
    content: String,
    mode: Option<EditMode>,
}

impl FixedEditor {
    pub const fn new(content: String, mode: Option<EditMode>) -> Self {
        Self { content, mode }
    }
}

impl EditorHandle for FixedEditor {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn mode(&self) -> Option<EditMode> {
        self.mode
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AttachmentItem {
    pub id: Option<i64>,
    pub uid: String,
    pub name: String,
    pub status: String,
}

impl From<&Attachment> for AttachmentItem {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.map(AttachmentId::get),
            uid: attachment.uid.clone(),
            name: attachment.name.clone(),
            status: format!("{:?}", attachment.status).to_lowercase(),
        }
    }
}

pub fn load_store(page_path: &Path) -> Result<MemoryPageStore, CliError> {
    if !page_path.exists() {
        return Err(CliError::PageNotFound(page_path.to_path_buf()));
    }
    let payload = fs::read_to_string(page_path)?;
    Ok(MemoryPageStore::from_json(&payload)?)
}

pub fn write_store(page_path: &Path, store: &MemoryPageStore) -> Result<(), CliError> {
    fs::write(page_path, store.to_json()?)?;
    Ok(())
}

pub fn load_config(config_path: Option<&Path>) -> Result<SessionConfig, CliError> {
    let Some(path) = config_path else {
        return Ok(SessionConfig::default());
    };
    let payload = fs::read_to_string(path)
        .map_err(|error| CliError::Config(format!("{}: {error}", path.display())))?;
    SessionConfig::from_json(&payload)
        .map_err(|error| CliError::Config(format!("{}: {error}", path.display())))
}

/// Open an edit session whose notices are printed to stderr.
pub fn open_session(
    page_path: &Path,
    config: SessionConfig,
) -> Result<EditSession<MemoryPageStore>, CliError> {
    let store = load_store(page_path)?;
    let session = EditSession::new(store, config);
    session.subscribe(|event| match event {
        SessionEvent::Notice(notice) => eprintln!("{}", notice_line(notice)),
        SessionEvent::StateChanged(state) => tracing::debug!(
            "title={:?} loading={} pending_removals={}",
            state.title,
            state.loading,
            state.pending_removals.len()
        ),
    });
    Ok(session)
}

pub fn notice_line(notice: &Notice) -> String {
    match notice {
        Notice::Uploading { file_name, message } | Notice::RemovalBlocked { file_name, message } => {
            format!("{message} ({file_name})")
        }
    }
}

pub fn read_upload(path: &Path) -> Result<UploadFile, CliError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidAttachmentPath(path.to_path_buf()))?;
    let bytes = fs::read(path)?;
    Ok(UploadFile::new(new_upload_uid(), name, bytes)?)
}

pub fn new_upload_uid() -> String {
    format!("upload-{}", uuid::Uuid::now_v7())
}

pub fn parse_attachment_id(raw: &str) -> Result<AttachmentId, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidAttachmentId(raw.trim().to_string()))
}
