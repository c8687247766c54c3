use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] pagedit_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Page snapshot not found: {}", .0.display())]
    PageNotFound(PathBuf),
    #[error("Attachment id must be a number: {0}")]
    InvalidAttachmentId(String),
    #[error("No attachment with id {0} on this page")]
    AttachmentNotFound(String),
    #[error("Attachment path has no file name: {}", .0.display())]
    InvalidAttachmentPath(PathBuf),
    #[error("Configuration error: {0}")]
    Config(String),
}
