//! Inline embed wiring.
//!
//! Unlike the floating widget, embeds do not generate markup: the page
//! ships the intake form and chat view inside each
//! `[data-aria-embed="true"]` container, and this adapter looks up the
//! expected class names and wires behavior to them. A container missing
//! a required element is skipped with a warning, never a crash.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

use aria_types::event::WidgetEvent;
use aria_types::session::SessionData;
use aria_types::{Result, WidgetError};

use super::{js_err, render};

pub const EMBED_SELECTOR: &str = r#"[data-aria-embed="true"]"#;

pub struct EmbedDom {
    document: Document,
    form_view: HtmlElement,
    chat_view: HtmlElement,
    pub intake_name: HtmlInputElement,
    pub intake_email: HtmlInputElement,
    pub intake_phone: HtmlInputElement,
    pub intake_message: HtmlInputElement,
    pub intake_submit: HtmlButtonElement,
    intake_error: HtmlElement,
    transcript: HtmlElement,
    typing: HtmlElement,
    pub input: HtmlInputElement,
    pub send: HtmlButtonElement,
    pub back: HtmlButtonElement,
}

fn query<T: JsCast>(container: &Element, selector: &str) -> Result<T> {
    container
        .query_selector(selector)
        .map_err(js_err)?
        .ok_or_else(|| WidgetError::Config(format!("embed container missing {}", selector)))?
        .dyn_into::<T>()
        .map_err(|_| WidgetError::Config(format!("{} has the wrong element type", selector)))
}

impl EmbedDom {
    /// Wire up every embed container on the page. Pages without embeds
    /// get an empty vec; malformed containers are skipped.
    pub fn attach_all(document: &Document) -> Result<Vec<EmbedDom>> {
        let nodes = document
            .query_selector_all(EMBED_SELECTOR)
            .map_err(js_err)?;
        let mut embeds = Vec::new();
        for i in 0..nodes.length() {
            let Some(node) = nodes.item(i) else { continue };
            let Ok(container) = node.dyn_into::<Element>() else {
                continue;
            };
            match Self::attach(document, &container) {
                Ok(embed) => embeds.push(embed),
                Err(e) => log::warn!("skipping embed container: {}", e),
            }
        }
        Ok(embeds)
    }

    fn attach(document: &Document, container: &Element) -> Result<Self> {
        let _ = container.class_list().add_1("aria-embed");

        let dom = Self {
            document: document.clone(),
            form_view: query(container, ".aria-embed-intake-form")?,
            chat_view: query(container, ".aria-embed-chat-view")?,
            intake_name: query(container, ".aria-embed-name")?,
            intake_email: query(container, ".aria-embed-email")?,
            intake_phone: query(container, ".aria-embed-phone")?,
            intake_message: query(container, ".aria-embed-message")?,
            intake_submit: query(container, ".aria-embed-start")?,
            intake_error: query(container, ".aria-embed-error")?,
            transcript: query(container, ".aria-embed-transcript")?,
            typing: query(container, ".aria-embed-typing")?,
            input: query(container, ".aria-embed-input")?,
            send: query(container, ".aria-embed-send")?,
            back: query(container, ".aria-embed-back")?,
        };

        // Normalize initial visibility regardless of how the page shipped
        dom.form_view.set_hidden(false);
        dom.chat_view.set_hidden(true);
        dom.typing.set_hidden(true);
        dom.intake_error.set_hidden(true);

        Ok(dom)
    }

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

    pub fn take_input(&self) -> String {
        let text = self.input.value();
        self.input.set_value("");
        text
    }

    pub fn apply(&self, event: &WidgetEvent) {
        match event {
            WidgetEvent::ShowChatView => {
                self.form_view.set_hidden(true);
                self.chat_view.set_hidden(false);
            }
            WidgetEvent::ShowFormView => {
                self.chat_view.set_hidden(true);
                self.form_view.set_hidden(false);
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
            WidgetEvent::ShowProducts { payload } => {
                render::append_cards(&self.document, &self.transcript, payload, "products")
            }
            WidgetEvent::ShowArticles { payload } => {
                render::append_cards(&self.document, &self.transcript, payload, "articles")
            }
            // Embeds have no feedback bar; surface the prompt inline
            WidgetEvent::ShowFeedbackPrompt { prompt } => render::append_text_message(
                &self.document,
                &self.transcript,
                "aria-message aria-system",
                prompt,
            ),
            // Panel and theme events belong to the floating widget
            WidgetEvent::OpenPanel
            | WidgetEvent::ClosePanel
            | WidgetEvent::ShowIntakeForm
            | WidgetEvent::HideIntakeForm
            | WidgetEvent::SetTheme { .. }
            | WidgetEvent::ScheduleReplay { .. } => {}
        }
    }
}
