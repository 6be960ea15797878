//! Stylesheet injection.
//!
//! One `<style>` element per page, id-guarded so a widget and several
//! embeds share it. Colors and dimensions come from the host config via
//! CSS custom properties; the dark theme overrides the neutral ones.

use web_sys::Document;

use aria_types::config::WidgetConfig;
use aria_types::{Result, WidgetError};

use super::js_err;

pub const STYLE_ID: &str = "aria-chat-style";

pub fn inject(document: &Document, config: &WidgetConfig) -> Result<()> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = document.create_element("style").map_err(js_err)?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(&render_css(config)));

    let head = document
        .head()
        .ok_or_else(|| WidgetError::JsInterop("document has no <head>".to_string()))?;
    head.append_child(&style).map_err(js_err)?;
    Ok(())
}

fn render_css(config: &WidgetConfig) -> String {
    format!(
        r#"
.aria-widget {{
  --aria-primary: {primary};
  --aria-bg: {bg};
  --aria-text: {text};
  --aria-surface: #f3f4f6;
  position: fixed;
  bottom: 20px;
  z-index: 99999;
  font-family: system-ui, -apple-system, sans-serif;
}}
.aria-position-right {{ right: 20px; }}
.aria-position-left {{ left: 20px; }}
.aria-widget.aria-theme-dark,
.aria-embed.aria-theme-dark {{
  --aria-bg: #1f2937;
  --aria-text: #f9fafb;
  --aria-surface: #374151;
}}
.aria-toggle {{
  width: 56px; height: 56px; border-radius: 50%;
  border: none; cursor: pointer; font-size: 24px;
  background: var(--aria-primary); color: #fff;
  box-shadow: 0 4px 12px rgba(0,0,0,0.25);
}}
.aria-panel {{
  position: absolute; bottom: 72px;
  width: {width}px; height: {height}px;
  max-height: calc(100vh - 110px);
  display: flex; flex-direction: column;
  background: var(--aria-bg); color: var(--aria-text);
  border-radius: 12px; overflow: hidden;
  box-shadow: 0 8px 32px rgba(0,0,0,0.25);
}}
.aria-position-right .aria-panel {{ right: 0; }}
.aria-position-left .aria-panel {{ left: 0; }}
.aria-header {{
  padding: 14px 16px; font-weight: 600;
  background: var(--aria-primary); color: #fff;
}}
.aria-transcript, .aria-embed-transcript {{
  flex: 1; overflow-y: auto; padding: 12px;
  display: flex; flex-direction: column; gap: 8px;
}}
.aria-message {{
  max-width: 85%; padding: 8px 12px; border-radius: 10px;
  line-height: 1.4; font-size: 14px; overflow-wrap: break-word;
}}
.aria-from-user {{
  align-self: flex-end; background: var(--aria-primary); color: #fff;
}}
.aria-from-aria {{ align-self: flex-start; background: var(--aria-surface); }}
.aria-system {{
  align-self: center; background: transparent;
  color: #9ca3af; font-size: 12px; font-style: italic;
}}
.aria-message-links {{ margin-top: 8px; display: flex; flex-wrap: wrap; gap: 6px; }}
.aria-link-button {{
  display: inline-block; padding: 5px 10px; border-radius: 6px;
  background: var(--aria-primary); color: #fff;
  font-size: 13px; text-decoration: none;
}}
.aria-phone-link {{ color: var(--aria-primary); }}
.aria-cards {{ align-self: stretch; display: flex; flex-direction: column; gap: 6px; }}
.aria-card {{
  padding: 8px 12px; border-radius: 8px;
  background: var(--aria-surface); color: var(--aria-text);
  text-decoration: none; font-size: 14px;
  display: flex; justify-content: space-between;
}}
.aria-card-price {{ color: var(--aria-primary); font-weight: 600; }}
.aria-typing, .aria-embed-typing {{
  padding: 4px 12px; color: #9ca3af; font-size: 13px; font-style: italic;
}}
.aria-intake, .aria-embed-intake-form {{
  padding: 16px; display: flex; flex-direction: column; gap: 8px;
}}
.aria-intake-title {{ font-weight: 600; }}
.aria-intake input, .aria-embed-intake-form input {{
  padding: 8px 10px; border: 1px solid #d1d5db; border-radius: 6px;
  background: var(--aria-bg); color: var(--aria-text); font-size: 14px;
}}
.aria-intake-error, .aria-embed-error {{ color: #dc2626; font-size: 13px; }}
.aria-feedback {{
  padding: 8px 12px; display: flex; align-items: center; gap: 8px;
  font-size: 13px; border-top: 1px solid var(--aria-surface);
}}
.aria-input-row {{
  display: flex; gap: 8px; padding: 10px;
  border-top: 1px solid var(--aria-surface);
}}
.aria-input, .aria-embed-input {{
  flex: 1; padding: 8px 10px; border: 1px solid #d1d5db;
  border-radius: 6px; background: var(--aria-bg);
  color: var(--aria-text); font-size: 14px;
}}
.aria-send, .aria-start, .aria-feedback-btn, .aria-embed-send, .aria-embed-start {{
  padding: 8px 14px; border: none; border-radius: 6px; cursor: pointer;
  background: var(--aria-primary); color: #fff; font-size: 14px;
}}
.aria-send:disabled, .aria-embed-send:disabled {{ opacity: 0.5; cursor: default; }}
.aria-embed {{
  display: flex; flex-direction: column;
  background: var(--aria-bg, #fff); color: var(--aria-text, #1f2937);
  --aria-primary: {primary};
  --aria-bg: {bg};
  --aria-text: {text};
  --aria-surface: #f3f4f6;
  border: 1px solid #e5e7eb; border-radius: 12px;
  min-height: 420px; font-family: system-ui, -apple-system, sans-serif;
}}
.aria-embed-chat-view {{ display: flex; flex-direction: column; flex: 1; }}
.aria-embed-transcript {{ min-height: 240px; }}
.aria-embed-back {{
  align-self: flex-start; margin: 8px;
  background: transparent; border: none; cursor: pointer;
  color: var(--aria-primary); font-size: 13px;
}}
"#,
        primary = config.primary_color,
        bg = config.background_color,
        text = config.text_color,
        width = config.width,
        height = config.height,
    )
}
