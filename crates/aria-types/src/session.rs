use serde::{Deserialize, Serialize};

use crate::message::{Sender, StoredMessage};

/// A visitor's conversation state, persisted to browser storage under a
/// session-id-scoped key. Field names match the stored JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
    /// Epoch milliseconds of the last save
    #[serde(default)]
    pub timestamp: u64,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            conversation_id: None,
            name: None,
            email: None,
            phone: None,
            messages: Vec::new(),
            timestamp: 0,
        }
    }

    /// The intake form is skipped when contact details are already on file.
    pub fn has_contact_info(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
            && self.email.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn push_message(&mut self, sender: Sender, text: impl Into<String>) {
        self.messages.push(StoredMessage {
            sender,
            text: text.into(),
        });
    }

    /// Most recent user message, used as context when labeling links.
    pub fn last_user_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.as_str())
            .unwrap_or("")
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}
