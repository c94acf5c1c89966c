use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRole {
    User,
    System,
    Bot,
}

impl EntryRole {
    pub fn label(self) -> &'static str {
        match self {
            EntryRole::User => "You",
            EntryRole::System => "System",
            EntryRole::Bot => "Assistant",
        }
    }
}

/// One line of the conversation transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: EntryRole,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(role: EntryRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(EntryRole::User, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(EntryRole::System, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(EntryRole::Bot, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}
