//! Shared element builders and transcript rendering helpers.
//!
//! Render failures are logged and swallowed; a missed append must never
//! take down the page. Assistant HTML arrives pre-escaped from the
//! formatting pipeline, everything else is inserted as text content.

use serde_json::Value;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlInputElement};

use aria_types::{Result, WidgetError};

use super::js_err;

pub(crate) fn el(document: &Document, tag: &str, class: &str) -> Result<HtmlElement> {
    let element = document.create_element(tag).map_err(js_err)?;
    element.set_class_name(class);
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| WidgetError::JsInterop(format!("<{}> is not an HtmlElement", tag)))
}

pub(crate) fn button(document: &Document, class: &str, label: &str) -> Result<HtmlButtonElement> {
    let element = document.create_element("button").map_err(js_err)?;
    element.set_class_name(class);
    element.set_text_content(Some(label));
    let button = element
        .dyn_into::<HtmlButtonElement>()
        .map_err(|_| WidgetError::JsInterop("<button> cast failed".to_string()))?;
    // Never a submit button; the page may wrap the widget in a form
    button.set_type("button");
    Ok(button)
}

pub(crate) fn text_input(
    document: &Document,
    input_type: &str,
    class: &str,
    placeholder: &str,
) -> Result<HtmlInputElement> {
    let element = document.create_element("input").map_err(js_err)?;
    element.set_class_name(class);
    let input = element
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| WidgetError::JsInterop("<input> cast failed".to_string()))?;
    input.set_type(input_type);
    input.set_placeholder(placeholder);
    Ok(input)
}

/// Append a plain-text message bubble
pub(crate) fn append_text_message(
    document: &Document,
    transcript: &HtmlElement,
    class: &str,
    text: &str,
) {
    match el(document, "div", class) {
        Ok(bubble) => {
            bubble.set_text_content(Some(text));
            if transcript.append_child(&bubble).is_err() {
                log::warn!("could not append message bubble");
            }
            scroll_to_bottom(transcript);
        }
        Err(e) => log::warn!("could not build message bubble: {}", e),
    }
}

/// Append an assistant bubble whose body is trusted, pre-escaped HTML
pub(crate) fn append_html_message(
    document: &Document,
    transcript: &HtmlElement,
    class: &str,
    html: &str,
) {
    match el(document, "div", class) {
        Ok(bubble) => {
            bubble.set_inner_html(html);
            if transcript.append_child(&bubble).is_err() {
                log::warn!("could not append message bubble");
            }
            scroll_to_bottom(transcript);
        }
        Err(e) => log::warn!("could not build message bubble: {}", e),
    }
}

pub(crate) fn scroll_to_bottom(transcript: &HtmlElement) {
    transcript.set_scroll_top(transcript.scroll_height());
}

/// Render a server-supplied card list (products, articles) into the
/// transcript. Items missing a title or URL are skipped. Titles go in as
/// text content, so no escaping is needed here.
pub(crate) fn append_cards(
    document: &Document,
    transcript: &HtmlElement,
    payload: &Value,
    key: &str,
) {
    let Some(items) = payload
        .get(key)
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
    else {
        log::debug!("no {} array in directive payload", key);
        return;
    };

    let Ok(container) = el(document, "div", "aria-cards") else {
        return;
    };
    for item in items {
        let title = item
            .get("title")
            .or_else(|| item.get("name"))
            .and_then(Value::as_str);
        let url = item
            .get("url")
            .or_else(|| item.get("link"))
            .and_then(Value::as_str);
        let (Some(title), Some(url)) = (title, url) else {
            continue;
        };

        let Ok(card) = el(document, "a", "aria-card") else {
            continue;
        };
        card.set_text_content(Some(title));
        let _ = card.set_attribute("href", url);
        let _ = card.set_attribute("target", "_blank");
        let _ = card.set_attribute("rel", "noopener");
        if let Some(price) = item.get("price").and_then(Value::as_str) {
            if let Ok(tag) = el(document, "span", "aria-card-price") {
                tag.set_text_content(Some(price));
                let _ = card.append_child(&tag);
            }
        }
        let _ = container.append_child(&card);
    }

    if transcript.append_child(&container).is_err() {
        log::warn!("could not append {} cards", key);
    }
    scroll_to_bottom(transcript);
}
