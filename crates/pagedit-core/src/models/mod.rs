//! Data models for pagedit

mod attachment;
mod page;
mod settings;

pub use attachment::{
    Attachment, AttachmentId, AttachmentStatus, FileListChange, UploadFile, UploadRequest,
};
pub use page::{AutoSaveDoc, DocEdit, DocSnapshot, PageId, PageInfo, ViewMode, WorkSpace};
pub use settings::{EditMode, EditModeSetting, UserSetting, EDIT_MODE_SETTING_TYPE};
