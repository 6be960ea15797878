//! Inline-embed controller.
//!
//! A simpler sibling of the floating widget: two views, one-way
//! transition on valid intake, and a close action that is a hard reset
//! back to the form (conversation id and transcript cleared), not a
//! pause. Each embed container on a page gets its own instance; nothing
//! is shared between them.

use std::rc::Rc;

use aria_types::config::HostConfig;
use aria_types::event::WidgetEvent;
use aria_types::message::Sender;
use aria_types::session::SessionData;
use aria_types::strings::UiStrings;
use aria_types::wire::{actions, Directive, MessageData, StartData};

use crate::event_bus::EventBus;
use crate::format;
use crate::gateway::RequestGateway;
use crate::session::SessionStore;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedState {
    FormView,
    ChatView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmbedInput {
    IntakeSubmitted {
        name: String,
        email: String,
        phone: String,
        message: String,
    },
    MessageSubmitted(String),
    /// Back/close control: full reset to the intake form
    CloseClicked,
}

pub struct EmbedController {
    strings: UiStrings,
    state: EmbedState,
    session_id: String,
    session: SessionData,
    store: SessionStore,
    gateway: Rc<RequestGateway>,
    bus: EventBus,
    in_flight: bool,
}

impl EmbedController {
    pub fn new(
        host: &HostConfig,
        store: SessionStore,
        gateway: Rc<RequestGateway>,
        bus: EventBus,
    ) -> Self {
        let session_id = store.get_or_create_session_id();
        let session = store.load_for_init(&session_id);
        Self {
            strings: host.strings.clone(),
            state: EmbedState::FormView,
            session_id,
            session,
            store,
            gateway,
            bus,
            in_flight: false,
        }
    }

    pub fn state(&self) -> EmbedState {
        self.state
    }

    pub fn session(&self) -> &SessionData {
        &self.session
    }

    pub async fn handle(&mut self, input: EmbedInput) {
        match input {
            EmbedInput::IntakeSubmitted {
                name,
                email,
                phone,
                message,
            } => self.submit_intake(name, email, phone, message).await,
            EmbedInput::MessageSubmitted(text) => self.submit_message(text).await,
            EmbedInput::CloseClicked => self.reset(),
        }
    }

    async fn submit_intake(&mut self, name: String, email: String, phone: String, message: String) {
        if self.state != EmbedState::FormView {
            return;
        }
        let name = name.trim().to_string();
        let email = email.trim().to_string();
        let phone = phone.trim().to_string();

        if name.is_empty() {
            self.bus.emit(WidgetEvent::ShowIntakeError {
                message: self.strings.error_name_required.clone(),
            });
            return;
        }
        if !validate::is_valid_email(&email) {
            self.bus.emit(WidgetEvent::ShowIntakeError {
                message: self.strings.error_email_invalid.clone(),
            });
            return;
        }

        let resp = self
            .gateway
            .send(
                actions::START_CONVERSATION,
                &[
                    ("session_id", &self.session_id),
                    ("name", &name),
                    ("email", &email),
                    ("phone", &phone),
                ],
            )
            .await;

        if !resp.success {
            let message = resp
                .message()
                .unwrap_or(&self.strings.error_connection)
                .to_string();
            self.bus.emit(WidgetEvent::ShowIntakeError { message });
            return;
        }

        self.session.name = Some(name);
        self.session.email = Some(email);
        self.session.phone = if phone.is_empty() { None } else { Some(phone) };

        let start: StartData = serde_json::from_value(resp.data).unwrap_or(StartData {
            conversation_id: None,
            greeting: None,
        });
        if start.conversation_id.is_some() {
            self.session.conversation_id = start.conversation_id;
        }

        // One-way transition into the chat view
        self.state = EmbedState::ChatView;
        self.bus.emit(WidgetEvent::ShowChatView);

        let greeting = start
            .greeting
            .unwrap_or_else(|| self.strings.welcome_message.clone());
        self.append_aria_text(&greeting);
        self.save();

        let message = message.trim().to_string();
        if !message.is_empty() {
            self.dispatch_send(message).await;
        }
    }

    async fn submit_message(&mut self, text: String) {
        let text = text.trim().to_string();
        if text.is_empty() || self.in_flight || self.state != EmbedState::ChatView {
            return;
        }
        self.dispatch_send(text).await;
    }

    async fn dispatch_send(&mut self, text: String) {
        self.bus.emit(WidgetEvent::AppendUserMessage { text: text.clone() });
        self.session.push_message(Sender::User, &text);
        self.save();

        self.in_flight = true;
        self.bus.emit(WidgetEvent::ShowTyping);
        self.bus.emit(WidgetEvent::SetInputEnabled { enabled: false });

        let conversation_id = self.session.conversation_id.clone().unwrap_or_default();
        let resp = self
            .gateway
            .send(
                actions::SEND_MESSAGE,
                &[
                    ("message", &text),
                    ("session_id", &self.session_id),
                    ("conversation_id", &conversation_id),
                ],
            )
            .await;

        self.in_flight = false;
        self.bus.emit(WidgetEvent::HideTyping);
        self.bus.emit(WidgetEvent::SetInputEnabled { enabled: true });

        if !resp.success {
            let message = resp
                .message()
                .unwrap_or(&self.strings.error_connection)
                .to_string();
            self.bus.emit(WidgetEvent::AppendSystemMessage { text: message });
            return;
        }

        let data: MessageData = match serde_json::from_value(resp.data) {
            Ok(d) => d,
            Err(e) => {
                log::error!("malformed message payload: {}", e);
                self.bus.emit(WidgetEvent::AppendSystemMessage {
                    text: self.strings.error_connection.clone(),
                });
                return;
            }
        };

        if data.conversation_id.is_some() {
            self.session.conversation_id = data.conversation_id.clone();
        }

        let html = format::format_response(&data.response, self.session.last_user_message());
        self.bus.emit(WidgetEvent::AppendAssistantHtml { html });
        self.session.push_message(Sender::Aria, data.response.clone());
        self.save();

        if let Some(action) = data.action.as_deref() {
            match Directive::parse(action, data.data.clone()) {
                Some(Directive::EndConversation) => {
                    self.session.conversation_id = None;
                    self.append_aria_text(&self.strings.conversation_ended.clone());
                    self.save();
                }
                Some(Directive::ShowProducts(payload)) => {
                    self.bus.emit(WidgetEvent::ShowProducts { payload });
                }
                Some(Directive::ShowArticles(payload)) => {
                    self.bus.emit(WidgetEvent::ShowArticles { payload });
                }
                Some(Directive::CollectFeedback(payload)) => {
                    let prompt = payload
                        .get("prompt")
                        .and_then(|v| v.as_str())
                        .unwrap_or(&self.strings.feedback_prompt)
                        .to_string();
                    self.bus.emit(WidgetEvent::ShowFeedbackPrompt { prompt });
                }
                Some(Directive::RequestHuman(_)) => {
                    self.append_aria_text(&self.strings.human_handoff.clone());
                }
                // Email is captured by the embed intake form up front
                Some(Directive::CollectEmail) => {}
                None => log::debug!("ignoring unknown directive: {}", action),
            }
        }
    }

    /// Hard reset: clear the conversation and transcript and show the
    /// intake form again. Contact details are kept for pre-fill.
    fn reset(&mut self) {
        self.session.conversation_id = None;
        self.session.messages.clear();
        self.save();
        self.state = EmbedState::FormView;
        self.bus.emit(WidgetEvent::ClearTranscript);
        self.bus.emit(WidgetEvent::ShowFormView);
    }

    fn append_aria_text(&mut self, text: &str) {
        self.bus.emit(WidgetEvent::AppendAssistantHtml {
            html: format::format_response(text, self.session.last_user_message()),
        });
        self.session.push_message(Sender::Aria, text);
    }

    fn save(&mut self) {
        self.store.save(&self.session_id, &mut self.session);
    }
}
