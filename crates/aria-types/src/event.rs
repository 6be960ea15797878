use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Theme;

/// Render instructions emitted by the controllers.
/// The DOM layer subscribes to these and applies them imperatively;
/// the controllers never touch the DOM themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WidgetEvent {
    /// Slide the panel open
    OpenPanel,
    /// Collapse back to the floating button
    ClosePanel,

    /// Show the name/email/phone intake form over the transcript
    ShowIntakeForm,
    HideIntakeForm,
    /// Inline validation or submit failure on the intake form
    ShowIntakeError { message: String },

    /// Append a user message (plain text, escaped by the renderer)
    AppendUserMessage { text: String },
    /// Append formatted assistant HTML (already escaped by the formatter)
    AppendAssistantHtml { html: String },
    /// Append an assistant-style error notice
    AppendSystemMessage { text: String },
    ClearTranscript,

    ShowTyping,
    HideTyping,
    SetInputEnabled { enabled: bool },

    /// Swap theme classes in place, no re-render
    SetTheme { theme: Theme },

    /// Ask the host to fire a replay timer after the given delay
    ScheduleReplay { delay_ms: u32 },

    /// Server-directed surfaces attached to a message response
    ShowProducts { payload: Value },
    ShowArticles { payload: Value },
    ShowFeedbackPrompt { prompt: String },

    /// Embed only: switch between the intake view and the chat view
    ShowChatView,
    ShowFormView,
}
