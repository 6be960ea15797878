use serde::{Deserialize, Serialize};

/// Who produced a message in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Aria,
}

/// A persisted transcript entry. Only sender and text survive a page
/// reload; display timestamps are regenerated at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub sender: Sender,
    pub text: String,
}

impl StoredMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn aria(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Aria,
            text: text.into(),
        }
    }
}

/// A link pulled out of an assistant response during formatting.
/// Ephemeral — built per formatting call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub label: String,
    pub url: String,
    pub full_match: String,
}
