use serde::{Deserialize, Serialize};

/// Localized UI text supplied by the host page. Every field has an English
/// fallback so a partial `strings` object still renders a usable widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiStrings {
    pub title: String,
    pub welcome_message: String,
    pub input_placeholder: String,
    pub send_button: String,
    pub intake_title: String,
    pub name_label: String,
    pub email_label: String,
    pub phone_label: String,
    pub start_button: String,
    pub error_connection: String,
    pub error_session_expired: String,
    pub error_name_required: String,
    pub error_email_invalid: String,
    pub email_prompt: String,
    pub email_reprompt: String,
    pub feedback_prompt: String,
    pub feedback_thanks: String,
    pub human_handoff: String,
    pub conversation_ended: String,
}

impl Default for UiStrings {
    fn default() -> Self {
        Self {
            title: "Chat with us".to_string(),
            welcome_message: "Hi! How can I help you today?".to_string(),
            input_placeholder: "Type your message...".to_string(),
            send_button: "Send".to_string(),
            intake_title: "Start a conversation".to_string(),
            name_label: "Name".to_string(),
            email_label: "Email".to_string(),
            phone_label: "Phone (optional)".to_string(),
            start_button: "Start Chat".to_string(),
            error_connection: "Sorry, I couldn't connect. Please try again in a moment."
                .to_string(),
            error_session_expired: "This page has been open a while — please refresh to continue chatting."
                .to_string(),
            error_name_required: "Please tell us your name to get started.".to_string(),
            error_email_invalid: "That doesn't look like a valid email address.".to_string(),
            email_prompt: "Could you share your email so we can follow up?".to_string(),
            email_reprompt: "Hmm, that email doesn't look right. Mind trying again?".to_string(),
            feedback_prompt: "Was this conversation helpful?".to_string(),
            feedback_thanks: "Thanks for the feedback!".to_string(),
            human_handoff: "Connecting you with a member of our team...".to_string(),
            conversation_ended: "This conversation has ended. Send a message to start a new one."
                .to_string(),
        }
    }
}
