//! Floating widget markup: a toggle bubble plus a hidden panel holding
//! the transcript, intake form, feedback bar, and input row. `apply`
//! translates controller events into imperative DOM updates.

use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlInputElement};

use aria_types::config::{HostConfig, Theme};
use aria_types::event::WidgetEvent;
use aria_types::session::SessionData;
use aria_types::{Result, WidgetError};

use super::{js_err, render};

pub struct WidgetDom {
    document: Document,
    root: HtmlElement,
    panel: HtmlElement,
    pub toggle: HtmlButtonElement,
    transcript: HtmlElement,
    typing: HtmlElement,
    intake: HtmlElement,
    pub intake_name: HtmlInputElement,
    pub intake_email: HtmlInputElement,
    pub intake_phone: HtmlInputElement,
    pub intake_message: HtmlInputElement,
    pub intake_submit: HtmlButtonElement,
    intake_error: HtmlElement,
    feedback: HtmlElement,
    feedback_label: HtmlElement,
    pub feedback_yes: HtmlButtonElement,
    pub feedback_no: HtmlButtonElement,
    pub input: HtmlInputElement,
    pub send: HtmlButtonElement,
}

impl WidgetDom {
    /// Build the widget markup and attach it to `<body>`. Listeners are
    /// wired by the composition root, not here.
    pub fn mount(document: &Document, host: &HostConfig) -> Result<Self> {
        let strings = &host.strings;

        let root = render::el(document, "div", "aria-widget")?;
        root.set_id("aria-chat-widget");
        root.class_list()
            .add_1(host.config.position.css_class())
            .map_err(js_err)?;

        let toggle = render::button(document, "aria-toggle", "\u{1F4AC}")?;
        let _ = toggle.set_attribute("aria-label", &strings.title);

        let panel = render::el(document, "div", "aria-panel")?;
        panel.set_hidden(true);

        let header = render::el(document, "div", "aria-header")?;
        header.set_text_content(Some(&strings.title));

        let transcript = render::el(document, "div", "aria-transcript")?;

        let typing = render::el(document, "div", "aria-typing")?;
        typing.set_text_content(Some("\u{2026}"));
        typing.set_hidden(true);

        // Intake form, shown over the transcript until contact info exists
        let intake = render::el(document, "div", "aria-intake")?;
        intake.set_hidden(true);
        let intake_title = render::el(document, "div", "aria-intake-title")?;
        intake_title.set_text_content(Some(&strings.intake_title));
        let intake_name = render::text_input(document, "text", "aria-intake-name", &strings.name_label)?;
        let intake_email =
            render::text_input(document, "email", "aria-intake-email", &strings.email_label)?;
        let intake_phone =
            render::text_input(document, "tel", "aria-intake-phone", &strings.phone_label)?;
        let intake_message = render::text_input(
            document,
            "text",
            "aria-intake-message",
            &strings.input_placeholder,
        )?;
        let intake_error = render::el(document, "div", "aria-intake-error")?;
        intake_error.set_hidden(true);
        let intake_submit = render::button(document, "aria-start", &strings.start_button)?;
        for child in [
            &intake_title,
            intake_name.as_ref(),
            intake_email.as_ref(),
            intake_phone.as_ref(),
            intake_message.as_ref(),
            &intake_error,
            intake_submit.as_ref(),
        ] {
            intake.append_child(child).map_err(js_err)?;
        }

        let feedback = render::el(document, "div", "aria-feedback")?;
        feedback.set_hidden(true);
        let feedback_label = render::el(document, "span", "aria-feedback-label")?;
        let feedback_yes = render::button(document, "aria-feedback-btn", "\u{1F44D}")?;
        let feedback_no = render::button(document, "aria-feedback-btn", "\u{1F44E}")?;
        feedback.append_child(&feedback_label).map_err(js_err)?;
        feedback.append_child(&feedback_yes).map_err(js_err)?;
        feedback.append_child(&feedback_no).map_err(js_err)?;

        let input_row = render::el(document, "div", "aria-input-row")?;
        let input = render::text_input(document, "text", "aria-input", &strings.input_placeholder)?;
        let send = render::button(document, "aria-send", &strings.send_button)?;
        input_row.append_child(&input).map_err(js_err)?;
        input_row.append_child(&send).map_err(js_err)?;

        for child in [&header, &transcript, &typing, &intake, &feedback, &input_row] {
            panel.append_child(child).map_err(js_err)?;
        }
        root.append_child(&panel).map_err(js_err)?;
        root.append_child(&toggle).map_err(js_err)?;

        let body = document
            .body()
            .ok_or_else(|| WidgetError::JsInterop("document has no <body>".to_string()))?;
        body.append_child(&root).map_err(js_err)?;

        Ok(Self {
            document: document.clone(),
            root,
            panel,
            toggle,
            transcript,
            typing,
            intake,
            intake_name,
            intake_email,
            intake_phone,
            intake_message,
            intake_submit,
            intake_error,
            feedback,
            feedback_label,
            feedback_yes,
            feedback_no,
            input,
            send,
        })
    }

    /// Pre-fill the intake form for returning visitors
    pub fn prefill(&self, session: &SessionData) {
        if let Some(name) = &session.name {
            self.intake_name.set_value(name);
        }
        if let Some(email) = &session.email {
            self.intake_email.set_value(email);
        }
        if let Some(phone) = &session.phone {
            self.intake_phone.set_value(phone);
        }
    }

    pub fn intake_values(&self) -> (String, String, String, String) {
        (
            self.intake_name.value(),
            self.intake_email.value(),
            self.intake_phone.value(),
            self.intake_message.value(),
        )
    }

    /// Read and clear the message input
    pub fn take_input(&self) -> String {
        let text = self.input.value();
        self.input.set_value("");
        text
    }

    pub fn hide_feedback(&self) {
        self.feedback.set_hidden(true);
    }

    pub fn apply(&self, event: &WidgetEvent) {
        match event {
            WidgetEvent::OpenPanel => {
                self.panel.set_hidden(false);
                let _ = self.root.class_list().add_1("aria-open");
            }
            WidgetEvent::ClosePanel => {
                self.panel.set_hidden(true);
                let _ = self.root.class_list().remove_1("aria-open");
            }
            WidgetEvent::ShowIntakeForm => self.intake.set_hidden(false),
            WidgetEvent::HideIntakeForm => {
                self.intake.set_hidden(true);
                self.intake_error.set_hidden(true);
            }
            WidgetEvent::ShowIntakeError { message } => {
                self.intake_error.set_text_content(Some(message));
                self.intake_error.set_hidden(false);
            }
            WidgetEvent::AppendUserMessage { text } => render::append_text_message(
                &self.document,
                &self.transcript,
                "aria-message aria-from-user",
                text,
            ),
            WidgetEvent::AppendAssistantHtml { html } => render::append_html_message(
                &self.document,
                &self.transcript,
                "aria-message aria-from-aria",
                html,
            ),
            WidgetEvent::AppendSystemMessage { text } => render::append_text_message(
                &self.document,
                &self.transcript,
                "aria-message aria-system",
                text,
            ),
            WidgetEvent::ClearTranscript => self.transcript.set_inner_html(""),
            WidgetEvent::ShowTyping => self.typing.set_hidden(false),
            WidgetEvent::HideTyping => self.typing.set_hidden(true),
            WidgetEvent::SetInputEnabled { enabled } => {
                self.input.set_disabled(!enabled);
                self.send.set_disabled(!enabled);
            }
            WidgetEvent::SetTheme { theme } => self.set_theme(*theme),
            WidgetEvent::ShowProducts { payload } => {
                render::append_cards(&self.document, &self.transcript, payload, "products")
            }
            WidgetEvent::ShowArticles { payload } => {
                render::append_cards(&self.document, &self.transcript, payload, "articles")
            }
            WidgetEvent::ShowFeedbackPrompt { prompt } => {
                self.feedback_label.set_text_content(Some(prompt));
                self.feedback.set_hidden(false);
            }
            // The replay timer is scheduled by the composition root
            WidgetEvent::ScheduleReplay { .. } => {}
            // Embed-only views
            WidgetEvent::ShowChatView | WidgetEvent::ShowFormView => {}
        }
    }

    fn set_theme(&self, theme: Theme) {
        let classes = self.root.class_list();
        let _ = classes.remove_2(Theme::Light.css_class(), Theme::Dark.css_class());
        let _ = classes.add_1(theme.css_class());
    }
}
