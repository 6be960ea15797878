//! Floating-widget controller.
//!
//! The state machine is an explicit tagged union rather than a pile of
//! boolean flags: `Closed ⇄ Open(phase)`, where the phase tracks the
//! intake form and mid-conversation email capture. Exactly one request is
//! in flight at a time; the typing indicator is hidden exactly once when
//! its response (success or failure) arrives.

use std::rc::Rc;

use aria_types::config::{HostConfig, Theme, WidgetConfig};
use aria_types::event::WidgetEvent;
use aria_types::message::Sender;
use aria_types::session::SessionData;
use aria_types::strings::UiStrings;
use aria_types::wire::{actions, Directive, MessageData, StartData};

use crate::event_bus::EventBus;
use crate::format;
use crate::gateway::RequestGateway;
use crate::session::{keys, SessionStore};
use crate::validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Open(OpenPhase),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenPhase {
    /// Intake form shown; free-form messaging blocked until it submits
    AwaitingUserInfo,
    Ready,
    /// The next user message is treated as an email address. The message
    /// that triggered the capture replays once the address is on file.
    AwaitingEmail { pending_message: String },
}

/// Inputs, translated from DOM events by the platform adapter
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetInput {
    ToggleClicked,
    AutoOpenElapsed,
    IntakeSubmitted {
        name: String,
        email: String,
        phone: String,
        message: String,
    },
    MessageSubmitted(String),
    /// The replay timer scheduled after email capture fired
    ReplayElapsed,
    FeedbackGiven {
        helpful: bool,
    },
    SystemThemeChanged {
        prefers_dark: bool,
    },
}

pub struct WidgetController {
    config: WidgetConfig,
    strings: UiStrings,
    state: WidgetState,
    theme: Theme,
    session_id: String,
    session: SessionData,
    store: SessionStore,
    gateway: Rc<RequestGateway>,
    bus: EventBus,
    in_flight: bool,
    replayed: bool,
    pending_replay: Option<String>,
}

impl WidgetController {
    pub fn new(
        host: &HostConfig,
        store: SessionStore,
        gateway: Rc<RequestGateway>,
        bus: EventBus,
        system_prefers_dark: bool,
    ) -> Self {
        let session_id = store.get_or_create_session_id();
        let session = store.load_for_init(&session_id);
        let theme = host.config.theme.resolve(system_prefers_dark);
        bus.emit(WidgetEvent::SetTheme { theme });

        Self {
            config: host.config.clone(),
            strings: host.strings.clone(),
            state: WidgetState::Closed,
            theme,
            session_id,
            session,
            store,
            gateway,
            bus,
            in_flight: false,
            replayed: false,
            pending_replay: None,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn session(&self) -> &SessionData {
        &self.session
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, WidgetState::Open(_))
    }

    /// Whether the composition root should schedule the auto-open timer
    pub fn wants_auto_open(&self) -> bool {
        self.config.auto_open_delay_ms > 0 && !self.store.id_flag_get(keys::INTERACTED)
    }

    pub fn auto_open_delay_ms(&self) -> u32 {
        self.config.auto_open_delay_ms
    }

    pub async fn handle(&mut self, input: WidgetInput) {
        match input {
            WidgetInput::ToggleClicked => self.toggle().await,
            WidgetInput::AutoOpenElapsed => self.auto_open().await,
            WidgetInput::IntakeSubmitted {
                name,
                email,
                phone,
                message,
            } => self.submit_intake(name, email, phone, message).await,
            WidgetInput::MessageSubmitted(text) => self.submit_message(text).await,
            WidgetInput::ReplayElapsed => self.replay_pending().await,
            WidgetInput::FeedbackGiven { helpful } => self.submit_feedback(helpful).await,
            WidgetInput::SystemThemeChanged { prefers_dark } => {
                self.system_theme_changed(prefers_dark)
            }
        }
    }

    // ─── Open / close ────────────────────────────────────────

    async fn toggle(&mut self) {
        self.store.id_flag_set(keys::INTERACTED);
        match self.state {
            WidgetState::Closed => self.open().await,
            WidgetState::Open(_) => self.close(),
        }
    }

    /// Auto-open fires once, and only while the visitor has neither
    /// interacted nor already opened the panel.
    async fn auto_open(&mut self) {
        if self.state != WidgetState::Closed || self.store.id_flag_get(keys::INTERACTED) {
            return;
        }
        self.open().await;
    }

    async fn open(&mut self) {
        let phase = if self.session.has_contact_info() {
            OpenPhase::Ready
        } else {
            OpenPhase::AwaitingUserInfo
        };
        self.state = WidgetState::Open(phase.clone());
        self.bus.emit(WidgetEvent::OpenPanel);
        self.bus.emit(WidgetEvent::SetTheme { theme: self.theme });

        if phase == OpenPhase::AwaitingUserInfo {
            self.bus.emit(WidgetEvent::ShowIntakeForm);
        }

        self.replay_recent_messages();

        if self.session.messages.is_empty()
            && phase == OpenPhase::Ready
            && !self.store.flag_get(keys::RETURNING_VISITOR)
        {
            self.append_aria_text(&self.strings.welcome_message.clone());
            self.save();
        }

        self.track("widget_opened").await;
    }

    fn close(&mut self) {
        self.state = WidgetState::Closed;
        self.bus.emit(WidgetEvent::ClosePanel);
        self.save();
    }

    /// Replay a fresh transcript into the panel, once per page view
    fn replay_recent_messages(&mut self) {
        if self.replayed {
            return;
        }
        self.replayed = true;
        if !self.store.is_recent(&self.session) {
            return;
        }
        let mut last_user = String::new();
        for msg in self.session.messages.clone() {
            match msg.sender {
                Sender::User => {
                    self.bus.emit(WidgetEvent::AppendUserMessage {
                        text: msg.text.clone(),
                    });
                    last_user = msg.text;
                }
                Sender::Aria => {
                    self.bus.emit(WidgetEvent::AppendAssistantHtml {
                        html: format::format_response(&msg.text, &last_user),
                    });
                }
            }
        }
    }

    // ─── Intake flow ─────────────────────────────────────────

    async fn submit_intake(&mut self, name: String, email: String, phone: String, message: String) {
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

        self.state = WidgetState::Open(OpenPhase::Ready);
        self.bus.emit(WidgetEvent::HideIntakeForm);
        self.store.flag_set(keys::RETURNING_VISITOR);

        let greeting = start
            .greeting
            .unwrap_or_else(|| self.strings.welcome_message.clone());
        self.append_aria_text(&greeting);
        self.save();

        self.track("conversation_started").await;

        let message = message.trim().to_string();
        if !message.is_empty() {
            self.dispatch_send(message, true).await;
        }
    }

    // ─── Messaging ───────────────────────────────────────────

    async fn submit_message(&mut self, text: String) {
        let text = text.trim().to_string();
        if text.is_empty() || self.in_flight {
            return;
        }

        match self.state.clone() {
            WidgetState::Closed | WidgetState::Open(OpenPhase::AwaitingUserInfo) => {}
            WidgetState::Open(OpenPhase::AwaitingEmail { pending_message }) => {
                self.capture_email(text, pending_message);
            }
            WidgetState::Open(OpenPhase::Ready) => {
                if self.config.require_email && self.session.email.is_none() {
                    self.intercept_for_email(text);
                } else {
                    self.dispatch_send(text, true).await;
                }
            }
        }
    }

    /// `require_email` is on and no address is on file: show the user's
    /// message, ask for an email, and hold the message for replay.
    fn intercept_for_email(&mut self, text: String) {
        self.append_user_text(&text);
        self.append_aria_text(&self.strings.email_prompt.clone());
        self.save();
        self.state = WidgetState::Open(OpenPhase::AwaitingEmail {
            pending_message: text,
        });
    }

    /// The intercepted message replays automatically after a short delay;
    /// an invalid address reprompts without leaving the capture state.
    fn capture_email(&mut self, text: String, pending_message: String) {
        self.bus
            .emit(WidgetEvent::AppendUserMessage { text: text.clone() });

        if !validate::is_valid_email(&text) {
            self.append_aria_text(&self.strings.email_reprompt.clone());
            return;
        }

        self.session.email = Some(text.trim().to_string());
        self.save();
        self.state = WidgetState::Open(OpenPhase::Ready);

        if pending_message.is_empty() {
            return;
        }
        self.pending_replay = Some(pending_message);
        self.bus.emit(WidgetEvent::ScheduleReplay {
            delay_ms: self.config.replay_delay_ms,
        });
    }

    async fn replay_pending(&mut self) {
        if let Some(text) = self.pending_replay.take() {
            // The user message is already in the transcript from the
            // original submit; only the send is repeated.
            self.dispatch_send(text, false).await;
        }
    }

    async fn dispatch_send(&mut self, text: String, append_user: bool) {
        if append_user {
            self.append_user_text(&text);
            self.save();
        }

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

        // New conversation id replaces the old one atomically
        if data.conversation_id.is_some() {
            self.session.conversation_id = data.conversation_id.clone();
        }

        let html = format::format_response(&data.response, self.session.last_user_message());
        self.bus.emit(WidgetEvent::AppendAssistantHtml { html });
        self.session.push_message(Sender::Aria, data.response.clone());
        self.save();

        if let Some(action) = data.action.as_deref() {
            if let Some(directive) = Directive::parse(action, data.data.clone()) {
                self.apply_directive(directive);
            } else {
                log::debug!("ignoring unknown directive: {}", action);
            }
        }
    }

    fn apply_directive(&mut self, directive: Directive) {
        match directive {
            Directive::RequestHuman(_) => {
                self.append_aria_text(&self.strings.human_handoff.clone());
            }
            Directive::ShowProducts(payload) => {
                self.bus.emit(WidgetEvent::ShowProducts { payload });
            }
            Directive::ShowArticles(payload) => {
                self.bus.emit(WidgetEvent::ShowArticles { payload });
            }
            Directive::CollectFeedback(payload) => {
                let prompt = payload
                    .get("prompt")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&self.strings.feedback_prompt)
                    .to_string();
                self.bus.emit(WidgetEvent::ShowFeedbackPrompt { prompt });
            }
            Directive::CollectEmail => {
                if self.session.email.is_none() {
                    self.append_aria_text(&self.strings.email_prompt.clone());
                    self.state = WidgetState::Open(OpenPhase::AwaitingEmail {
                        pending_message: String::new(),
                    });
                }
            }
            Directive::EndConversation => {
                self.session.conversation_id = None;
                self.append_aria_text(&self.strings.conversation_ended.clone());
                self.save();
            }
        }
    }

    // ─── Feedback / tracking ─────────────────────────────────

    async fn submit_feedback(&mut self, helpful: bool) {
        let conversation_id = self.session.conversation_id.clone().unwrap_or_default();
        let rating = if helpful { "helpful" } else { "not_helpful" };
        let resp = self
            .gateway
            .send(
                actions::SUBMIT_FEEDBACK,
                &[
                    ("conversation_id", &conversation_id),
                    ("session_id", &self.session_id),
                    ("rating", rating),
                ],
            )
            .await;

        if resp.success {
            self.append_aria_text(&self.strings.feedback_thanks.clone());
        } else {
            self.bus.emit(WidgetEvent::AppendSystemMessage {
                text: self.strings.error_connection.clone(),
            });
        }
    }

    /// Fire-and-forget analytics; failures are only logged
    async fn track(&self, event: &str) {
        let resp = self
            .gateway
            .send(
                actions::TRACK_EVENT,
                &[("event", event), ("session_id", &self.session_id)],
            )
            .await;
        if !resp.success {
            log::debug!("track {} failed", event);
        }
    }

    // ─── Theme ───────────────────────────────────────────────

    fn system_theme_changed(&mut self, prefers_dark: bool) {
        if !self.config.theme.follows_system() {
            return;
        }
        let theme = self.config.theme.resolve(prefers_dark);
        if theme != self.theme {
            self.theme = theme;
            self.bus.emit(WidgetEvent::SetTheme { theme });
        }
    }

    // ─── Helpers ─────────────────────────────────────────────

    fn append_user_text(&mut self, text: &str) {
        self.bus.emit(WidgetEvent::AppendUserMessage {
            text: text.to_string(),
        });
        self.session.push_message(Sender::User, text);
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

    #[cfg(test)]
    pub(crate) fn force_awaiting_email(&mut self, pending_message: String) {
        self.state = WidgetState::Open(OpenPhase::AwaitingEmail { pending_message });
    }

    #[cfg(test)]
    pub(crate) fn clear_email(&mut self) {
        self.session.email = None;
    }

    #[cfg(test)]
    pub(crate) fn force_in_flight(&mut self) {
        self.in_flight = true;
    }
}
