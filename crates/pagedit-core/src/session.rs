//! Edit session controller.
//!
//! An [`EditSession`] lives from entering edit mode until the page is saved or
//! the edit is cancelled. It owns the local title, the loading flag, and the
//! attachments marked for removal, and it orders the store calls of a save:
//! removed attachments are purged before the document save that reflects
//! their absence.
//!
//! All methods take `&self` so a host can share the session between UI
//! callbacks on one thread. No internal borrow is held across an `.await`.

use std::cell::{Cell, RefCell};
use std::future::Future;

use crate::config::SessionConfig;
use crate::editor::EditorHandle;
use crate::error::{Error, Result};
use crate::models::{
    Attachment, AttachmentId, AttachmentStatus, AutoSaveDoc, DocEdit, EditMode,
    EditModeSetting, FileListChange, PageInfo, UploadFile, UploadRequest, ViewMode, WorkSpace,
};
use crate::store::PageStore;
use crate::util::{normalize_text, truncate_chars};

/// Whether the session still accepts edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    /// Saved or cancelled; the host switches the page back to viewing
    Closed,
}

/// Observable local state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub title: String,
    pub loading: bool,
    /// Stored attachments removed during this session, in removal order
    pub pending_removals: Vec<AttachmentId>,
    pub phase: SessionPhase,
}

/// User-facing prompt raised by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Uploading { file_name: String, message: String },
    RemovalBlocked { file_name: String, message: String },
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Uploading { message, .. } | Self::RemovalBlocked { message, .. } => message,
        }
    }
}

/// Delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// How an attachment list change was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileListOutcome {
    /// List passed to the store unchanged
    Accepted,
    /// Stored attachment will be deleted on save
    MarkedForRemoval(AttachmentId),
    /// Removal of an unfinished upload was refused and the file put back
    Blocked,
}

/// What a successful save committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub doc: DocEdit,
    /// Attachments the save asked the store to delete
    pub removed: Vec<AttachmentId>,
    /// Whether that deletion failed (the document was saved regardless)
    pub removal_failed: bool,
    /// Preference request sent because the editor mode differed from the
    /// one recorded at session start
    pub mode_update: Option<EditModeSetting>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveOutcome {
    Saved,
    Failed,
    /// Not dispatched: the session is closed or a save is in flight
    Skipped,
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// Controller of one page edit.
pub struct EditSession<S: PageStore> {
    store: S,
    config: SessionConfig,
    page_info: PageInfo,
    work_space: WorkSpace,
    initial_mode: Option<EditMode>,
    editor: RefCell<Option<Box<dyn EditorHandle>>>,
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
}

impl<S: PageStore> EditSession<S> {
    /// Start editing the page the store currently serves.
    pub fn new(store: S, config: SessionConfig) -> Self {
        let doc = store.doc();
        let initial_mode = doc.user_setting.as_ref().and_then(|setting| setting.edit_mode);
        let title = doc.page_info.title.clone();
        tracing::debug!("Editing page {}", doc.page_info.id);

        Self {
            store,
            config,
            page_info: doc.page_info,
            work_space: doc.work_space,
            initial_mode,
            editor: RefCell::new(None),
            state: RefCell::new(SessionState {
                title,
                loading: false,
                pending_removals: Vec::new(),
                phase: SessionPhase::Editing,
            }),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Page as it was when the session started
    pub const fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    /// Editor mode of the user's stored preference when the session started
    pub const fn initial_mode(&self) -> Option<EditMode> {
        self.initial_mode
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn pending_removals(&self) -> Vec<AttachmentId> {
        self.state.borrow().pending_removals.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().phase == SessionPhase::Closed
    }

    /// Attachment list as the upload widget shows it.
    pub fn file_list(&self) -> Vec<Attachment> {
        self.store
            .file_list()
            .iter()
            .map(Attachment::for_display)
            .collect()
    }

    /// Attach the mounted editor, replacing any previous one.
    pub fn attach_editor(&self, editor: impl EditorHandle + 'static) {
        *self.editor.borrow_mut() = Some(Box::new(editor));
    }

    pub fn detach_editor(&self) {
        self.editor.borrow_mut().take();
    }

    /// Register a callback for state changes and notices.
    ///
    /// Callbacks run synchronously and must not subscribe or unsubscribe.
    pub fn subscribe(&self, listener: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Update the local title, cut to the configured length. Nothing is stored
    /// until save.
    pub fn change_title(&self, text: &str) -> Result<()> {
        self.ensure_editing()?;
        let title = truncate_chars(text, self.config.title_max_chars);
        self.update_state(|state| state.title = title);
        Ok(())
    }

    /// Apply a change event from the upload widget.
    pub fn change_file_list(&self, change: FileListChange) -> Result<FileListOutcome> {
        self.ensure_editing()?;
        let FileListChange { file, mut file_list } = change;

        if file.status != AttachmentStatus::Removed {
            self.store.set_file_list(file_list);
            return Ok(FileListOutcome::Accepted);
        }

        if let Some(id) = file.id {
            if !self.state.borrow().pending_removals.contains(&id) {
                self.update_state(|state| state.pending_removals.push(id));
            }
            tracing::debug!("Attachment {} marked for removal", id);
            self.store.set_file_list(file_list);
            return Ok(FileListOutcome::MarkedForRemoval(id));
        }

        tracing::warn!("Refusing to remove attachment {} while it uploads", file.uid);
        self.emit(&SessionEvent::Notice(Notice::RemovalBlocked {
            file_name: file.name.clone(),
            message: self.config.removal_blocked_notice.clone(),
        }));
        file_list.retain(|entry| entry.uid != file.uid);
        file_list.insert(0, file.with_status(AttachmentStatus::Uploading));
        self.store.set_file_list(file_list);
        Ok(FileListOutcome::Blocked)
    }

    /// Hand a picked file to the store for upload.
    ///
    /// Always returns `false`: the store owns the transport, so the widget
    /// must not run its own upload.
    pub fn before_upload(&self, file: UploadFile) -> Result<bool> {
        self.ensure_editing()?;
        let request = UploadRequest {
            file_name: file.name,
            bytes: file.bytes,
            page_id: self.page_info.id,
            version_id: self.page_info.version_id,
            uid: file.uid,
        };

        self.emit(&SessionEvent::Notice(Notice::Uploading {
            file_name: request.file_name.clone(),
            message: self.config.uploading_notice.clone(),
        }));
        tracing::debug!("Uploading {} to page {}", request.uid, request.page_id);
        self.store.upload_file(request);
        Ok(false)
    }

    /// Leave edit mode without saving. Drops the page's draft if the store
    /// still holds one.
    pub fn cancel(&self) -> Result<()> {
        self.ensure_editing()?;
        let doc = self.store.doc();
        if doc.has_draft {
            tracing::debug!("Discarding draft of page {}", doc.page_info.id);
            self.store.delete_draft_doc(doc.page_info.id);
        }
        self.close();
        tracing::info!("Cancelled edit of page {}", self.page_info.id);
        Ok(())
    }

    /// Save title and editor content as the new version of the page.
    ///
    /// The loading flag is raised as soon as this is called, before the
    /// returned future is first polled, and lowered exactly once when the
    /// store answers or the future is dropped. Attachments marked for removal
    /// are deleted first; the document save runs whether or not that deletion
    /// succeeds. On failure the title and removals are kept so the user can
    /// retry.
    pub fn save(&self) -> impl Future<Output = Result<SaveOutcome>> + '_ {
        let started = self.begin_save();
        async move {
            let loading = started?;
            self.run_save(loading).await
        }
    }

    fn begin_save(&self) -> Result<LoadingGuard<'_, S>> {
        self.ensure_editing()?;
        if self.is_loading() {
            return Err(Error::SaveInProgress);
        }
        self.update_state(|state| state.loading = true);
        Ok(LoadingGuard { session: self })
    }

    async fn run_save(&self, loading: LoadingGuard<'_, S>) -> Result<SaveOutcome> {
        let (content, reported_mode) = self.read_editor();
        let doc_state = self.store.doc();
        let (title, removals) = {
            let state = self.state.borrow();
            (state.title.clone(), state.pending_removals.clone())
        };

        let doc = DocEdit {
            title: normalize_text(&title).unwrap_or_else(|| self.page_info.title.clone()),
            content,
            minor_edit: false,
            object_version_number: doc_state.page_info.object_version_number,
        };

        let mode_update = (reported_mode != self.initial_mode).then(|| {
            EditModeSetting::for_mode(reported_mode, doc_state.user_setting.as_ref())
        });
        if let Some(setting) = &mode_update {
            match setting.edit_mode {
                Some(mode) => tracing::debug!("Storing {} as preferred editor mode", mode),
                None => tracing::debug!("Clearing preferred editor mode"),
            }
            self.store.edit_default_mode(setting.clone());
        }

        let mut removal_failed = false;
        if !removals.is_empty() {
            if let Err(error) = self.store.batch_delete_files(&removals).await {
                tracing::warn!("Failed to delete removed attachments: {}", error);
                removal_failed = true;
            }
        }

        let result = self
            .store
            .edit_doc(self.work_space.id, doc.clone())
            .await;
        drop(loading);

        match result {
            Ok(()) => {
                self.close();
                tracing::info!("Saved page {}", self.page_info.id);
                Ok(SaveOutcome {
                    doc,
                    removed: removals,
                    removal_failed,
                    mode_update,
                })
            }
            Err(error) => {
                tracing::error!("Failed to save page {}: {}", self.page_info.id, error);
                Err(error)
            }
        }
    }

    /// Push the current editor content as a draft. Failures are logged only.
    pub async fn auto_save(&self) -> AutoSaveOutcome {
        if self.is_closed() || self.is_loading() {
            tracing::debug!("Skipping auto-save of page {}", self.page_info.id);
            return AutoSaveOutcome::Skipped;
        }

        let (content, _) = self.read_editor();
        match self
            .store
            .auto_save_doc(self.page_info.id, AutoSaveDoc { content })
            .await
        {
            Ok(()) => AutoSaveOutcome::Saved,
            Err(error) => {
                tracing::warn!("Auto-save of page {} failed: {}", self.page_info.id, error);
                AutoSaveOutcome::Failed
            }
        }
    }

    fn ensure_editing(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    fn read_editor(&self) -> (String, Option<EditMode>) {
        self.editor
            .borrow()
            .as_ref()
            .map_or_else(|| (String::new(), None), |editor| (editor.content(), editor.mode()))
    }

    fn close(&self) {
        self.store.set_mode(ViewMode::View);
        self.update_state(|state| {
            state.phase = SessionPhase::Closed;
            state.pending_removals.clear();
        });
    }

    fn update_state(&self, apply: impl FnOnce(&mut SessionState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            apply(&mut state);
            state.clone()
        };
        self.emit(&SessionEvent::StateChanged(snapshot));
    }

    fn emit(&self, event: &SessionEvent) {
        for (_, listener) in self.listeners.borrow_mut().iter_mut() {
            listener(event);
        }
    }
}

/// Lowers the loading flag of a save when dropped.
struct LoadingGuard<'a, S: PageStore> {
    session: &'a EditSession<S>,
}

impl<S: PageStore> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.session.update_state(|state| state.loading = false);
    }
}
