//! Contextual link labeling.
//!
//! Given a URL and the surrounding conversation, pick a human-friendly
//! button label. Pure and deterministic. The check order defines
//! precedence and must not be rearranged: what the user asked for
//! overrides the URL path, which overrides the response wording.

use url::Url;

/// Label used when the URL cannot be parsed at all
pub const FALLBACK_LABEL: &str = "Visit Link";

/// Intent keywords matched against the visitor's last message
const USER_INTENT_RULES: &[(&[&str], &str)] = &[
    (&["reservation", "book", "table"], "Make a Reservation"),
    (&["hour", "open", "close"], "View Hours"),
    (&["menu", "food", "dish"], "View Menu"),
    (&["direction", "location", "where"], "Get Directions"),
    (&["contact", "phone", "email"], "Contact Us"),
    (&["work", "job", "career", "hiring"], "Join Our Team"),
];

/// Keywords matched against the URL's path
const PATH_RULES: &[(&[&str], &str)] = &[
    (&["careers", "jobs", "employment"], "Join Our Team"),
    (&["menu"], "View Menu"),
    (&["reservation", "booking"], "Make a Reservation"),
    (&["apply", "application"], "Apply Now"),
    (&["contact"], "Contact Us"),
    (&["location", "directions"], "Get Directions"),
    (&["hour"], "View Hours"),
    (&["about"], "Learn More"),
];

/// Reduced set matched against the full response text
const RESPONSE_RULES: &[(&[&str], &str)] = &[
    (&["reservation", "book"], "Make a Reservation"),
    (&["hour", "open", "close"], "View Hours"),
    (&["menu"], "View Menu"),
];

/// Choose a display label for `url`.
///
/// Priority, first match wins:
/// 1. intent keywords in the last user message,
/// 2. keywords in the URL path,
/// 3. a reduced keyword set in the response text,
/// 4. `Visit <hostname>` with any leading `www.` stripped.
///
/// A malformed URL short-circuits to a generic label — never an error.
pub fn label_for(url: &str, last_user_message: &str, response_text: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return FALLBACK_LABEL.to_string(),
    };

    let user = last_user_message.to_lowercase();
    if let Some(label) = match_rules(USER_INTENT_RULES, &user) {
        return label;
    }

    let path = parsed.path().to_lowercase();
    if let Some(label) = match_rules(PATH_RULES, &path) {
        return label;
    }

    let response = response_text.to_lowercase();
    if let Some(label) = match_rules(RESPONSE_RULES, &response) {
        return label;
    }

    let host = parsed.host_str().unwrap_or("");
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        format!("Visit {}", host)
    }
}

fn match_rules(rules: &[(&[&str], &str)], haystack: &str) -> Option<String> {
    for (keywords, label) in rules {
        if keywords.iter().any(|k| haystack.contains(k)) {
            return Some((*label).to_string());
        }
    }
    None
}
