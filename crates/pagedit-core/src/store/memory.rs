//! In-memory page store.
//!
//! Keeps one page with its stored attachments, draft, and editor-mode
//! preference. Uploads complete immediately. Every call is recorded so hosts
//! and tests can inspect what a session dispatched.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use super::PageStore;
use crate::error::{Error, Result};
use crate::models::{
    Attachment, AttachmentId, AttachmentStatus, AutoSaveDoc, DocEdit, DocSnapshot,
    EditModeSetting, PageId, PageInfo, UploadRequest, UserSetting, ViewMode, WorkSpace,
};
use crate::util::unix_timestamp_ms_now;

/// Unsaved working copy of the page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub content: String,
    /// Unix ms
    pub saved_at: i64,
}

/// Persistable state of a [`MemoryPageStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub page_info: PageInfo,
    pub work_space: WorkSpace,
    #[serde(default)]
    pub user_setting: Option<UserSetting>,
    #[serde(default)]
    pub draft: Option<Draft>,
    /// Stored attachments
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub mode: ViewMode,
    /// Id the next upload receives. Never reused after a deletion.
    #[serde(default)]
    pub next_attachment_id: i64,
}

impl PageSnapshot {
    /// A fresh page with no attachments, draft, or preference.
    pub fn new(page_info: PageInfo, work_space: WorkSpace) -> Self {
        Self {
            page_info,
            work_space,
            user_setting: None,
            draft: None,
            attachments: Vec::new(),
            mode: ViewMode::View,
            next_attachment_id: 1,
        }
    }

    /// Raise the id counter above every stored attachment. Snapshots written
    /// without a counter start right after their highest id.
    fn settle_attachment_ids(&mut self) {
        let highest = self
            .attachments
            .iter()
            .filter_map(|attachment| attachment.id)
            .map(AttachmentId::get)
            .max()
            .unwrap_or(0);
        self.next_attachment_id = self.next_attachment_id.max(highest + 1);
    }

    fn allocate_attachment_id(&mut self) -> AttachmentId {
        self.settle_attachment_ids();
        let id = AttachmentId::new(self.next_attachment_id);
        self.next_attachment_id += 1;
        id
    }
}

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    EditDoc,
    AutoSaveDoc,
    BatchDeleteFiles,
}

/// A call received by the store, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    EditDoc { work_space_id: i64, doc: DocEdit },
    AutoSaveDoc { page_id: PageId, doc: AutoSaveDoc },
    UploadFile {
        uid: String,
        file_name: String,
        page_id: PageId,
        version_id: i64,
        size: usize,
    },
    BatchDeleteFiles(Vec<AttachmentId>),
    DeleteDraftDoc(PageId),
    EditDefaultMode(EditModeSetting),
    SetFileList(Vec<Attachment>),
    SetMode(ViewMode),
}

/// Single-threaded in-memory implementation of [`PageStore`].
#[derive(Debug)]
pub struct MemoryPageStore {
    state: RefCell<PageSnapshot>,
    file_list: RefCell<Vec<Attachment>>,
    calls: RefCell<Vec<StoreCall>>,
    pending_failures: RefCell<Vec<StoreOp>>,
}

impl MemoryPageStore {
    /// Create a store serving `snapshot`. The displayed list starts out as the
    /// stored attachments.
    pub fn new(mut snapshot: PageSnapshot) -> Self {
        snapshot.settle_attachment_ids();
        let file_list = snapshot
            .attachments
            .iter()
            .map(Attachment::for_display)
            .collect();
        Self {
            state: RefCell::new(snapshot),
            file_list: RefCell::new(file_list),
            calls: RefCell::new(Vec::new()),
            pending_failures: RefCell::new(Vec::new()),
        }
    }

    /// Load a store from a JSON snapshot document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let snapshot: PageSnapshot = serde_json::from_str(payload)?;
        Ok(Self::new(snapshot))
    }

    /// Copy of the persistable state.
    pub fn snapshot(&self) -> PageSnapshot {
        self.state.borrow().clone()
    }

    /// Serialize the persistable state as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.state.borrow())?)
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    /// Make the next call of `op` fail with a storage error.
    pub fn fail_next(&self, op: StoreOp) {
        self.pending_failures.borrow_mut().push(op);
    }

    fn record(&self, call: StoreCall) {
        self.calls.borrow_mut().push(call);
    }

    fn take_failure(&self, op: StoreOp) -> Result<()> {
        let mut failures = self.pending_failures.borrow_mut();
        if let Some(index) = failures.iter().position(|pending| *pending == op) {
            failures.remove(index);
            return Err(Error::Storage(format!("{op:?} failed")));
        }
        Ok(())
    }
}

impl PageStore for MemoryPageStore {
    async fn edit_doc(&self, work_space_id: i64, doc: DocEdit) -> Result<()> {
        self.record(StoreCall::EditDoc {
            work_space_id,
            doc: doc.clone(),
        });
        self.take_failure(StoreOp::EditDoc)?;

        let mut state = self.state.borrow_mut();
        if state.work_space.id != work_space_id {
            return Err(Error::NotFound(format!("work space {work_space_id}")));
        }
        let current = state.page_info.object_version_number;
        if doc.object_version_number != current {
            return Err(Error::VersionConflict {
                submitted: doc.object_version_number,
                current,
            });
        }

        state.page_info.title = doc.title;
        state.page_info.content = doc.content;
        state.page_info.object_version_number = current + 1;
        state.draft = None;
        tracing::debug!(
            "Saved page {} at version {}",
            state.page_info.id,
            state.page_info.object_version_number
        );
        Ok(())
    }

    async fn auto_save_doc(&self, page_id: PageId, doc: AutoSaveDoc) -> Result<()> {
        self.record(StoreCall::AutoSaveDoc {
            page_id,
            doc: doc.clone(),
        });
        self.take_failure(StoreOp::AutoSaveDoc)?;

        let mut state = self.state.borrow_mut();
        if state.page_info.id != page_id {
            return Err(Error::NotFound(format!("page {page_id}")));
        }
        state.draft = Some(Draft {
            content: doc.content,
            saved_at: unix_timestamp_ms_now(),
        });
        Ok(())
    }

    fn upload_file(&self, request: UploadRequest) {
        self.record(StoreCall::UploadFile {
            uid: request.uid.clone(),
            file_name: request.file_name.clone(),
            page_id: request.page_id,
            version_id: request.version_id,
            size: request.bytes.len(),
        });

        let mut state = self.state.borrow_mut();
        if state.page_info.id != request.page_id {
            tracing::warn!("Dropping upload for unknown page {}", request.page_id);
            return;
        }

        let id = state.allocate_attachment_id();
        let mut stored = Attachment::persisted(id, request.file_name);
        stored.uid = request.uid.clone();
        state.attachments.push(stored.clone());

        let mut file_list = self.file_list.borrow_mut();
        match file_list.iter_mut().find(|entry| entry.uid == request.uid) {
            Some(entry) => {
                entry.id = Some(id);
                entry.status = AttachmentStatus::Done;
            }
            None => file_list.push(stored),
        }
        tracing::debug!("Stored attachment {} ({})", id, request.uid);
    }

    async fn batch_delete_files(&self, ids: &[AttachmentId]) -> Result<()> {
        self.record(StoreCall::BatchDeleteFiles(ids.to_vec()));
        self.take_failure(StoreOp::BatchDeleteFiles)?;

        let mut state = self.state.borrow_mut();
        if let Some(missing) = ids
            .iter()
            .find(|id| !state.attachments.iter().any(|a| a.id == Some(**id)))
        {
            return Err(Error::NotFound(format!("attachment {missing}")));
        }
        state
            .attachments
            .retain(|attachment| !matches!(attachment.id, Some(id) if ids.contains(&id)));
        Ok(())
    }

    fn delete_draft_doc(&self, page_id: PageId) {
        self.record(StoreCall::DeleteDraftDoc(page_id));
        let mut state = self.state.borrow_mut();
        if state.page_info.id == page_id {
            state.draft = None;
        }
    }

    fn edit_default_mode(&self, setting: EditModeSetting) {
        self.record(StoreCall::EditDefaultMode(setting.clone()));
        let mut state = self.state.borrow_mut();

        match (setting.id, state.user_setting.clone()) {
            (None, existing) => {
                state.user_setting = Some(UserSetting {
                    id: existing.map_or(1, |existing| existing.id + 1),
                    object_version_number: 1,
                    edit_mode: setting.edit_mode,
                });
            }
            (Some(id), Some(existing))
                if existing.id == id
                    && Some(existing.object_version_number) == setting.object_version_number =>
            {
                state.user_setting = Some(UserSetting {
                    object_version_number: existing.object_version_number + 1,
                    edit_mode: setting.edit_mode,
                    ..existing
                });
            }
            (Some(id), _) => {
                tracing::warn!("Ignoring stale editor mode update for setting {}", id);
            }
        }
    }

    fn set_file_list(&self, files: Vec<Attachment>) {
        self.record(StoreCall::SetFileList(files.clone()));
        *self.file_list.borrow_mut() = files;
    }

    fn set_mode(&self, mode: ViewMode) {
        self.record(StoreCall::SetMode(mode));
        self.state.borrow_mut().mode = mode;
    }

    fn doc(&self) -> DocSnapshot {
        let state = self.state.borrow();
        DocSnapshot {
            page_info: state.page_info.clone(),
            user_setting: state.user_setting.clone(),
            work_space: state.work_space,
            has_draft: state.draft.is_some(),
        }
    }

    fn file_list(&self) -> Vec<Attachment> {
        self.file_list.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EditMode;
    use pretty_assertions::assert_eq;

    fn page_store() -> MemoryPageStore {
        let mut snapshot = PageSnapshot::new(
            PageInfo {
                id: PageId::new(1),
                version_id: 10,
                object_version_number: 3,
                title: "Intro".to_string(),
                content: "# Intro".to_string(),
            },
            WorkSpace { id: 100 },
        );
        snapshot.attachments = vec![Attachment::persisted(AttachmentId::new(4), "a.png")];
        MemoryPageStore::new(snapshot)
    }

    fn edit(version: i64) -> DocEdit {
        DocEdit {
            title: "New".to_string(),
            content: "body".to_string(),
            minor_edit: false,
            object_version_number: version,
        }
    }

    #[tokio::test]
    async fn edit_doc_bumps_version_and_clears_draft() {
        let store = page_store();
        store
            .auto_save_doc(PageId::new(1), AutoSaveDoc { content: "wip".to_string() })
            .await
            .unwrap();
        assert!(store.doc().has_draft);

        store.edit_doc(100, edit(3)).await.unwrap();

        let doc = store.doc();
        assert_eq!(doc.page_info.title, "New");
        assert_eq!(doc.page_info.object_version_number, 4);
        assert!(!doc.has_draft);
    }

    #[tokio::test]
    async fn edit_doc_rejects_stale_version() {
        let store = page_store();
        let error = store.edit_doc(100, edit(2)).await.unwrap_err();
        assert!(matches!(
            error,
            Error::VersionConflict {
                submitted: 2,
                current: 3
            }
        ));
        assert_eq!(store.doc().page_info.title, "Intro");
    }

    #[tokio::test]
    async fn edit_doc_rejects_unknown_work_space() {
        let store = page_store();
        assert!(matches!(
            store.edit_doc(7, edit(3)).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let store = page_store();
        store.fail_next(StoreOp::EditDoc);
        assert!(matches!(
            store.edit_doc(100, edit(3)).await,
            Err(Error::Storage(_))
        ));
        assert!(store.edit_doc(100, edit(3)).await.is_ok());
    }

    #[test]
    fn upload_completes_pending_entry() {
        let store = page_store();
        let mut list = store.file_list();
        list.push(Attachment::uploading("tmp", "b.txt"));
        store.set_file_list(list);

        store.upload_file(UploadRequest {
            file_name: "b.txt".to_string(),
            bytes: vec![1, 2, 3],
            page_id: PageId::new(1),
            version_id: 10,
            uid: "tmp".to_string(),
        });

        let uploaded = store
            .file_list()
            .into_iter()
            .find(|entry| entry.uid == "tmp")
            .unwrap();
        assert_eq!(uploaded.id, Some(AttachmentId::new(5)));
        assert_eq!(uploaded.status, AttachmentStatus::Done);
        assert_eq!(store.snapshot().attachments.len(), 2);
    }

    #[tokio::test]
    async fn batch_delete_removes_stored_attachments() {
        let store = page_store();
        store
            .batch_delete_files(&[AttachmentId::new(4)])
            .await
            .unwrap();
        assert!(store.snapshot().attachments.is_empty());
        assert!(matches!(
            store.batch_delete_files(&[AttachmentId::new(4)]).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleted_attachment_ids_are_not_reused() {
        let store = page_store();
        store.upload_file(UploadRequest {
            file_name: "b.txt".to_string(),
            bytes: vec![1],
            page_id: PageId::new(1),
            version_id: 10,
            uid: "first".to_string(),
        });
        store
            .batch_delete_files(&[AttachmentId::new(5)])
            .await
            .unwrap();

        store.upload_file(UploadRequest {
            file_name: "c.txt".to_string(),
            bytes: vec![2],
            page_id: PageId::new(1),
            version_id: 10,
            uid: "second".to_string(),
        });

        let ids: Vec<_> = store
            .snapshot()
            .attachments
            .iter()
            .filter_map(|attachment| attachment.id)
            .collect();
        assert_eq!(ids, vec![AttachmentId::new(4), AttachmentId::new(6)]);
        assert_eq!(store.snapshot().next_attachment_id, 7);
    }

    #[test]
    fn id_counter_survives_reload_after_deletion() {
        let store = page_store();
        assert_eq!(store.snapshot().next_attachment_id, 5);

        let mut snapshot = store.snapshot();
        snapshot.attachments.clear();
        let payload = serde_json::to_string(&snapshot).unwrap();
        let restored = MemoryPageStore::from_json(&payload).unwrap();
        restored.upload_file(UploadRequest {
            file_name: "d.txt".to_string(),
            bytes: Vec::new(),
            page_id: PageId::new(1),
            version_id: 10,
            uid: "later".to_string(),
        });
        assert_eq!(
            restored.snapshot().attachments[0].id,
            Some(AttachmentId::new(5))
        );
    }

    #[test]
    fn snapshot_without_counter_starts_after_highest_id() {
        let payload = r#"{
            "pageInfo": {"id": 1, "versionId": 10, "objectVersionNumber": 3, "title": "Intro", "content": ""},
            "workSpace": {"id": 100},
            "attachments": [{"id": 9, "uid": "9", "name": "a.png", "status": "done"}]
        }"#;
        let store = MemoryPageStore::from_json(payload).unwrap();
        assert_eq!(store.snapshot().next_attachment_id, 10);
    }

    #[test]
    fn edit_default_mode_creates_then_updates() {
        let store = page_store();
        store.edit_default_mode(EditModeSetting::for_mode(Some(EditMode::Markdown), None));
        let created = store.doc().user_setting.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.object_version_number, 1);

        store.edit_default_mode(EditModeSetting::for_mode(
            Some(EditMode::Wysiwyg),
            Some(&created),
        ));
        let updated = store.doc().user_setting.unwrap();
        assert_eq!(updated.edit_mode, Some(EditMode::Wysiwyg));
        assert_eq!(updated.object_version_number, 2);

        // Stale version is ignored.
        store.edit_default_mode(EditModeSetting::for_mode(
            Some(EditMode::Markdown),
            Some(&created),
        ));
        assert_eq!(
            store.doc().user_setting.unwrap().edit_mode,
            Some(EditMode::Wysiwyg)
        );
    }

    #[test]
    fn edit_default_mode_without_mode_clears_preference() {
        let store = page_store();
        store.edit_default_mode(EditModeSetting::for_mode(Some(EditMode::Markdown), None));
        let created = store.doc().user_setting.unwrap();

        store.edit_default_mode(EditModeSetting::for_mode(None, Some(&created)));
        let cleared = store.doc().user_setting.unwrap();
        assert_eq!(cleared.id, created.id);
        assert_eq!(cleared.edit_mode, None);
        assert_eq!(cleared.object_version_number, 2);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let store = page_store();
        store.set_mode(ViewMode::Edit);
        let restored = MemoryPageStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(restored.snapshot(), store.snapshot());
        assert_eq!(restored.file_list(), store.file_list());
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let store = page_store();
        store.delete_draft_doc(PageId::new(1));
        store.set_mode(ViewMode::View);
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::DeleteDraftDoc(PageId::new(1)),
                StoreCall::SetMode(ViewMode::View),
            ]
        );
    }
}
