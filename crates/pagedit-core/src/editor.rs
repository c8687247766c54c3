//! Editor widget seam.

use crate::models::EditMode;

/// Read access to a mounted rich-text editor.
///
/// The session holds at most one handle. While no editor is attached, saves
/// fall back to empty content and no reported mode.
pub trait EditorHandle {
    /// Current document content as markdown source
    fn content(&self) -> String;

    /// Current input mode, if the editor has settled on one
    fn mode(&self) -> Option<EditMode>;
}
