use std::fs;
use std::path::Path;

use pagedit_core::models::{Attachment, FileListChange};
use pagedit_core::session::AutoSaveOutcome;
use pagedit_core::{EditMode, EditSession, MemoryPageStore, PageStore, SessionConfig};

use crate::cli::EditArgs;
use crate::commands::common::{
    open_session, parse_attachment_id, read_upload, write_store, FixedEditor,
};
use crate::error::CliError;

pub async fn run_edit(
    args: &EditArgs,
    page_path: &Path,
    config: SessionConfig,
) -> Result<(), CliError> {
    let session = open_session(page_path, config)?;
    let result = apply_edit(&session, args).await;

    // Store calls that went through before a failure still count.
    write_store(page_path, session.store())?;
    let version = result?;
    println!("{version}");
    Ok(())
}

/// Drive `session` through the requested edits. Returns the page's object
/// version afterwards.
pub async fn apply_edit(
    session: &EditSession<MemoryPageStore>,
    args: &EditArgs,
) -> Result<i64, CliError> {
    let content = match (&args.content, &args.content_file) {
        (Some(content), _) => content.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => current_content(session),
    };
    let mode = match args.mode.as_deref() {
        Some(raw) => Some(raw.parse::<EditMode>()?),
        None => session.initial_mode(),
    };
    session.attach_editor(FixedEditor::new(content, mode));

    if let Some(title) = &args.title {
        session.change_title(title)?;
    }

    for path in &args.attach {
        let upload = read_upload(path)?;
        let pending = Attachment::uploading(upload.uid.clone(), upload.name.clone());
        let mut file_list = session.file_list();
        file_list.push(pending.clone());
        session.change_file_list(FileListChange {
            file: pending,
            file_list,
        })?;
        session.before_upload(upload)?;
    }

    for raw_id in &args.remove {
        let id = parse_attachment_id(raw_id)?;
        let file_list = session.file_list();
        let target = file_list
            .iter()
            .find(|entry| entry.id == Some(id))
            .ok_or_else(|| CliError::AttachmentNotFound(id.to_string()))?;
        session.change_file_list(FileListChange::removal(target, &file_list))?;
    }

    if args.autosave_only {
        if session.auto_save().await != AutoSaveOutcome::Saved {
            eprintln!("Draft was not saved.");
        }
    } else {
        let outcome = session.save().await?;
        tracing::info!(
            "Saved \"{}\" ({} attachment(s) removed)",
            outcome.doc.title,
            outcome.removed.len()
        );
    }

    Ok(session.store().doc().page_info.object_version_number)
}

/// Content the editor opens with: the draft if one exists, else the page.
fn current_content(session: &EditSession<MemoryPageStore>) -> String {
    session
        .store()
        .snapshot()
        .draft
        .map_or_else(|| session.page_info().content.clone(), |draft| draft.content)
}
