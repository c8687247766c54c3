use std::path::Path;

use pagedit_core::PageStore;
use serde::Serialize;

use crate::commands::common::{load_store, AttachmentItem};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct PageView {
    pub id: i64,
    pub title: String,
    pub object_version_number: i64,
    pub has_draft: bool,
    pub edit_mode: Option<String>,
    pub attachments: Vec<AttachmentItem>,
}

pub fn page_view(page_path: &Path) -> Result<PageView, CliError> {
    let store = load_store(page_path)?;
    let doc = store.doc();
    Ok(PageView {
        id: doc.page_info.id.get(),
        title: doc.page_info.title,
        object_version_number: doc.page_info.object_version_number,
        has_draft: doc.has_draft,
        edit_mode: doc
            .user_setting
            .and_then(|setting| setting.edit_mode)
            .map(|mode| mode.to_string()),
        attachments: store.file_list().iter().map(AttachmentItem::from).collect(),
    })
}

pub fn run_show(page_path: &Path, as_json: bool) -> Result<(), CliError> {
    let view = page_view(page_path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let draft = if view.has_draft { " (draft pending)" } else { "" };
    println!("{} [{}] v{}{}", view.title, view.id, view.object_version_number, draft);
    if view.attachments.is_empty() {
        println!("No attachments.");
    }
    for attachment in &view.attachments {
        let id = attachment
            .id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        println!("  {id:>6}  {}  {}", attachment.name, attachment.status);
    }
    Ok(())
}
