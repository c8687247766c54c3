//! pagedit-core - Core library for pagedit
//!
//! This crate contains the page models, the page store and editor seams, and
//! the edit session controller that sequences title edits, attachment
//! changes, saves, and auto-saves against a page store.

pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod util;

pub use config::SessionConfig;
pub use editor::EditorHandle;
pub use error::{Error, Result};
pub use models::{Attachment, AttachmentId, DocSnapshot, EditMode, PageId, PageInfo};
pub use session::EditSession;
pub use store::{MemoryPageStore, PageStore};
