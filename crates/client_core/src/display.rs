//! Presentation-facing state derived by the controller: file card, status
//! banner, and the enabled state of the question controls.

use shared::domain::StatusKind;

pub const READY_TO_UPLOAD: &str = "Ready to upload";
pub const PROCESSING: &str = "Processing...";
pub const PLACEHOLDER_LOCKED: &str = "Upload a document first...";
pub const PLACEHOLDER_READY: &str = "Ask a question about your document...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileReadiness {
    ReadyToUpload,
    Processing,
    Processed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub file_name: String,
    pub detail: String,
    pub readiness: FileReadiness,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub kind: StatusKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub file_info: Option<FileInfo>,
    pub status: Option<StatusBanner>,
    pub question_enabled: bool,
    pub send_enabled: bool,
    pub question_placeholder: &'static str,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            file_info: None,
            status: None,
            question_enabled: false,
            send_enabled: false,
            question_placeholder: PLACEHOLDER_LOCKED,
        }
    }
}

impl DisplayState {
    pub(crate) fn show_file(
        &mut self,
        file_name: &str,
        detail: impl Into<String>,
        readiness: FileReadiness,
    ) {
        self.file_info = Some(FileInfo {
            file_name: file_name.to_string(),
            detail: detail.into(),
            readiness,
        });
    }

    pub(crate) fn clear_file(&mut self) {
        self.file_info = None;
    }

    pub(crate) fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(StatusBanner {
            kind,
            message: message.into(),
        });
    }

    pub(crate) fn dismiss_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn unlock_questions(&mut self) {
        self.question_enabled = true;
        self.send_enabled = true;
        self.question_placeholder = PLACEHOLDER_READY;
    }
}
