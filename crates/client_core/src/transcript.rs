//! Append-only conversation log plus the transient typing marker.

use shared::domain::{EntryRole, TranscriptEntry};

use crate::markup::{self, RenderedMessage};

pub const TYPING_PLACEHOLDER: &str = "Thinking...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub entry: TranscriptEntry,
    pub body: RenderedMessage,
}

/// One visible row: a finalized entry or the typing marker of an outstanding query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptRow<'a> {
    Entry(&'a RenderedEntry),
    Typing,
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<RenderedEntry>,
    typing_owner: Option<u64>,
    scroll_requested: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, entry: TranscriptEntry) -> usize {
        let body = match entry.role {
            EntryRole::Bot => markup::render_bot_text(&entry.text),
            EntryRole::User | EntryRole::System => markup::render_plain_text(&entry.text),
        };
        self.entries.push(RenderedEntry { entry, body });
        self.scroll_requested = true;
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[RenderedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn show_typing(&mut self, request_id: u64) {
        self.typing_owner = Some(request_id);
        self.scroll_requested = true;
    }

    /// Removes the typing marker if `request_id` owns it. Returns whether it was removed.
    pub(crate) fn clear_typing(&mut self, request_id: u64) -> bool {
        if self.typing_owner == Some(request_id) {
            self.typing_owner = None;
            true
        } else {
            false
        }
    }

    pub fn is_typing(&self) -> bool {
        self.typing_owner.is_some()
    }

    pub fn rows(&self) -> impl Iterator<Item = TranscriptRow<'_>> {
        self.entries
            .iter()
            .map(TranscriptRow::Entry)
            .chain(self.typing_owner.map(|_| TranscriptRow::Typing))
    }

    /// Returns true once after every change that should bring the newest row into view.
    pub(crate) fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_duplicates() {
        let mut transcript = Transcript::new();
        transcript.append(TranscriptEntry::user("hi"));
        transcript.append(TranscriptEntry::user("hi"));
        transcript.append(TranscriptEntry::bot("**hello**"));

        let texts: Vec<_> = transcript
            .entries()
            .iter()
            .map(|row| row.entry.text.as_str())
            .collect();
        assert_eq!(texts, vec!["hi", "hi", "**hello**"]);
        assert_eq!(transcript.entries()[2].body.html, "<strong>hello</strong>");
    }

    #[test]
    fn typing_row_trails_entries_and_belongs_to_one_request() {
        let mut transcript = Transcript::new();
        transcript.append(TranscriptEntry::user("question"));
        transcript.show_typing(7);

        let rows: Vec<_> = transcript.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], TranscriptRow::Typing);

        assert!(!transcript.clear_typing(8));
        assert!(transcript.clear_typing(7));
        assert!(!transcript.clear_typing(7));
        assert_eq!(transcript.rows().count(), 1);
    }

    #[test]
    fn scroll_request_is_consumed() {
        let mut transcript = Transcript::new();
        assert!(!transcript.take_scroll_request());
        transcript.append(TranscriptEntry::system("ready"));
        assert!(transcript.take_scroll_request());
        assert!(!transcript.take_scroll_request());
    }
}
