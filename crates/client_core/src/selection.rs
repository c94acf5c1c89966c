//! Tracks which file the user intends to upload. Performs no I/O.

use std::{path::PathBuf, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub content: FileContent,
}

impl PickedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            content: FileContent::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            content: FileContent::Bytes(bytes.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Chooser,
    Drop,
}

/// The file chosen but not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub name: String,
    pub content: FileContent,
    pub source: SelectionSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Selected { file_name: String },
    Cleared,
}

#[derive(Debug, Default)]
pub struct SelectionTracker {
    pending: Option<PendingSelection>,
    drop_hover: bool,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending selection with the first of `files`, or clears it
    /// when the event carried none.
    pub fn observe(&mut self, source: SelectionSource, files: Vec<PickedFile>) -> SelectionChange {
        if source == SelectionSource::Drop {
            self.drop_hover = false;
        }
        match files.into_iter().next() {
            Some(file) => {
                tracing::debug!(file_name = %file.name, ?source, "file selected");
                let file_name = file.name.clone();
                self.pending = Some(PendingSelection {
                    name: file.name,
                    content: file.content,
                    source,
                });
                SelectionChange::Selected { file_name }
            }
            None => {
                tracing::debug!(?source, "selection cleared");
                self.pending = None;
                SelectionChange::Cleared
            }
        }
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    pub fn set_drop_hover(&mut self, hovering: bool) {
        self.drop_hover = hovering;
    }

    pub fn drop_hover(&self) -> bool {
        self.drop_hover
    }
}
