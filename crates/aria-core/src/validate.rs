//! Local input validation. Failures here never reach the network.

use once_cell::sync::Lazy;
use regex::Regex;

// Intentionally loose: one @, something before and after, a dot in the
// domain, no whitespace. Tightening this would reject addresses the
// original accepted.
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}
