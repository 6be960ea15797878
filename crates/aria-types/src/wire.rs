use serde::{Deserialize, Serialize};
use serde_json::Value;

/// AJAX action names, fixed per operation on the WordPress side
pub mod actions {
    pub const SEND_MESSAGE: &str = "aria_send_message";
    pub const START_CONVERSATION: &str = "aria_start_conversation";
    pub const SUBMIT_FEEDBACK: &str = "aria_submit_feedback";
    pub const TRACK_EVENT: &str = "aria_track_event";
}

/// The `{ success, data }` envelope every AJAX endpoint returns.
/// Transport failures are normalized into this shape rather than thrown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
}

impl AjaxResponse {
    /// Synthetic failure carrying a user-facing message, used when a
    /// request never reaches (or never leaves for) the server.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: serde_json::json!({ "message": message.into() }),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

/// Payload of a successful `aria_send_message` response
#[derive(Debug, Clone, Deserialize)]
pub struct MessageData {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Side-effect directive name, paired with `data`
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Payload of a successful `aria_start_conversation` response
#[derive(Debug, Clone, Deserialize)]
pub struct StartData {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub greeting: Option<String>,
}

/// A server-requested side effect attached to a message response
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    RequestHuman(Value),
    ShowProducts(Value),
    CollectFeedback(Value),
    ShowArticles(Value),
    CollectEmail,
    EndConversation,
}

impl Directive {
    /// Map the wire `action` string and its payload to a directive.
    /// Unknown actions are ignored rather than rejected.
    pub fn parse(action: &str, data: Value) -> Option<Self> {
        match action {
            "request_human" => Some(Directive::RequestHuman(data)),
            "show_products" => Some(Directive::ShowProducts(data)),
            "collect_feedback" => Some(Directive::CollectFeedback(data)),
            "show_articles" => Some(Directive::ShowArticles(data)),
            "collect_email" => Some(Directive::CollectEmail),
            "end_conversation" => Some(Directive::EndConversation),
            _ => None,
        }
    }
}
