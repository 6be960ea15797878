//! Assistant-text formatting pipeline.
//!
//! Raw response text goes through an ordered list of pure string
//! transforms. The order is load-bearing: link removal happens before
//! whitespace collapse, escaping happens before markdown substitution
//! (so injected tags survive), and phone anchors are inserted only into
//! already-escaped text. Reordering silently breaks escaping safety.

use once_cell::sync::Lazy;
use regex::Regex;

use aria_types::message::ExtractedLink;

use crate::links;

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>()\[\]]+").unwrap());

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,!?])").unwrap());

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());

static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

// North-American numbers: optional +1, optional area code, then
// exchange-number. International formats are out of scope.
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)\s?|\d{3}[-.\s])?\d{3}[-.\s]\d{4}\b").unwrap()
});

/// Result of running the extraction half of the pipeline
#[derive(Debug, Clone)]
pub struct FormattedMessage {
    /// HTML-safe body, links removed
    pub body_html: String,
    /// Links pulled out of the body, in order of appearance
    pub links: Vec<ExtractedLink>,
}

/// Format a raw assistant response into HTML safe for direct insertion.
/// `last_user_message` provides intent context for link labels.
pub fn format_response(raw: &str, last_user_message: &str) -> String {
    let formatted = format_message(raw, last_user_message);
    let mut out = formatted.body_html;
    out.push_str(&render_link_buttons(&formatted.links));
    out
}

/// The full pipeline, with links kept separate for callers that render
/// the button bar themselves.
pub fn format_message(raw: &str, last_user_message: &str) -> FormattedMessage {
    if raw.trim().is_empty() {
        return FormattedMessage {
            body_html: String::new(),
            links: Vec::new(),
        };
    }

    let (text, links) = extract_links(raw, last_user_message);
    let text = tidy_whitespace(&text);
    let text = escape_html(&text);
    let text = apply_markdown(&text);
    let text = linkify_phones(&text);
    let body_html = text.replace('\n', "<br>");

    FormattedMessage { body_html, links }
}

/// Steps 1-3: extract markdown links and bare URLs, then strip every
/// matched substring from the working text. A bare URL sitting inside a
/// markdown match is not extracted twice; every standalone occurrence
/// is its own link, repeats included.
pub fn extract_links(raw: &str, last_user_message: &str) -> (String, Vec<ExtractedLink>) {
    let mut links = Vec::new();
    let mut markdown_spans: Vec<(usize, usize)> = Vec::new();

    for cap in MARKDOWN_LINK.captures_iter(raw) {
        let text = cap.get(1).map_or("", |m| m.as_str());
        let url = cap.get(2).map_or("", |m| m.as_str());
        if let Some(whole) = cap.get(0) {
            markdown_spans.push((whole.start(), whole.end()));
        }
        links.push(ExtractedLink {
            label: text.to_string(),
            url: normalize_url(url),
            full_match: cap.get(0).map_or("", |m| m.as_str()).to_string(),
        });
    }

    for m in BARE_URL.find_iter(raw) {
        let matched = trim_trailing_punct(m.as_str());
        if matched.is_empty() {
            continue;
        }
        // Positional check: substring equality would also drop a later
        // standalone URL that happens to be a prefix of an earlier one
        if markdown_spans
            .iter()
            .any(|&(start, end)| m.start() >= start && m.start() < end)
        {
            continue;
        }
        let url = normalize_url(matched);
        let label = links::label_for(&url, last_user_message, raw);
        links.push(ExtractedLink {
            label,
            url,
            full_match: matched.to_string(),
        });
    }

    let mut text = raw.to_string();
    for link in &links {
        text = text.replacen(&link.full_match, "", 1);
    }

    (text, links)
}

/// Step 4: collapse runs of spaces/tabs, strip whitespace before closing
/// punctuation, and trim. Newlines survive for the `<br>` pass.
pub fn tidy_whitespace(text: &str) -> String {
    let text = SPACE_RUNS.replace_all(text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Step 5: escape the five HTML-special characters. Everything after this
/// point inserts only trusted markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Step 6: markdown bold then italic, strictly after escaping
pub fn apply_markdown(text: &str) -> String {
    let text = BOLD.replace_all(text, "<strong>$1</strong>");
    ITALIC.replace_all(&text, "<em>$1</em>").into_owned()
}

/// Step 7: wrap phone numbers in `tel:` anchors. The href keeps digits
/// only, plus a leading `+` when the source had one.
pub fn linkify_phones(text: &str) -> String {
    PHONE
        .replace_all(text, |caps: &regex::Captures| {
            let display = &caps[0];
            let digits: String = display.chars().filter(|c| c.is_ascii_digit()).collect();
            let href = if display.trim_start().starts_with('+') {
                format!("+{}", digits)
            } else {
                digits
            };
            format!(r#"<a href="tel:{}" class="aria-phone-link">{}</a>"#, href, display)
        })
        .into_owned()
}

/// Step 9: the contextual button bar, rendered after the body.
/// No links, no container.
pub fn render_link_buttons(links: &[ExtractedLink]) -> String {
    if links.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<div class="aria-message-links">"#);
    for link in links {
        out.push_str(&format!(
            r#"<a href="{}" target="_blank" rel="noopener" class="aria-link-button">{}</a>"#,
            escape_html(&link.url),
            escape_html(&link.label)
        ));
    }
    out.push_str("</div>");
    out
}

/// Bare `www.` URLs get a scheme so they parse and link absolutely
fn normalize_url(url: &str) -> String {
    if url.to_ascii_lowercase().starts_with("www.") {
        format!("https://{}", url)
    } else {
        url.to_string()
    }
}

/// Sentence punctuation glued to a URL is not part of it
fn trim_trailing_punct(url: &str) -> &str {
    url.trim_end_matches(['.', ',', '!', '?', ';', ':'])
}
