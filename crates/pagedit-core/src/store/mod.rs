//! Page store seam.
//!
//! The page store is the authority for the document, its attachments, and the
//! user's editor-mode preference. Edit sessions receive one at construction.

mod memory;

pub use memory::{Draft, MemoryPageStore, PageSnapshot, StoreCall, StoreOp};

use crate::error::Result;
use crate::models::{
    Attachment, AttachmentId, AutoSaveDoc, DocEdit, DocSnapshot, EditModeSetting, PageId,
    UploadRequest, ViewMode,
};

/// Operations an edit session needs from the page store.
///
/// Methods without a return value are fire-and-forget: the store schedules
/// the work and reports its own progress.
#[allow(async_fn_in_trait)]
pub trait PageStore {
    /// Save title and content as the new canonical version of the page
    async fn edit_doc(&self, work_space_id: i64, doc: DocEdit) -> Result<()>;

    /// Store a content-only draft
    async fn auto_save_doc(&self, page_id: PageId, doc: AutoSaveDoc) -> Result<()>;

    /// Transfer a file and attach it to the page
    fn upload_file(&self, request: UploadRequest);

    /// Delete stored attachments
    async fn batch_delete_files(&self, ids: &[AttachmentId]) -> Result<()>;

    /// Drop the unsaved draft of a page
    fn delete_draft_doc(&self, page_id: PageId);

    /// Create or update the user's editor-mode preference
    fn edit_default_mode(&self, setting: EditModeSetting);

    /// Replace the displayed attachment list
    fn set_file_list(&self, files: Vec<Attachment>);

    /// Switch the page between viewing and editing
    fn set_mode(&self, mode: ViewMode);

    /// Current page state
    fn doc(&self) -> DocSnapshot;

    /// Displayed attachment list
    fn file_list(&self) -> Vec<Attachment>;
}
