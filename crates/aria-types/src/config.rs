use serde::{Deserialize, Serialize};

use crate::strings::UiStrings;

/// Snapshot of the host page global (`window.ariaChat`), injected into the
/// composition root instead of being read ambiently. Absence of `enabled`
/// short-circuits all initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub ajax_url: String,
    /// Per-page-load CSRF token. Missing nonce is a fatal precondition for
    /// any outbound request.
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub plugin_url: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub strings: UiStrings,
    #[serde(default)]
    pub config: WidgetConfig,
}

/// Widget appearance and behavior, merged from defaults and server-supplied
/// values. Immutable after construction; the live theme is tracked
/// separately as controller state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub position: Position,
    pub theme: ThemePreference,
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub width: u32,
    pub height: u32,
    /// 0 disables auto-open
    pub auto_open_delay_ms: u32,
    pub require_email: bool,
    /// Delay before an intercepted message is replayed after email capture
    pub replay_delay_ms: u32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            position: Position::BottomRight,
            theme: ThemePreference::Auto,
            primary_color: "#6366f1".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#1f2937".to_string(),
            width: 380,
            height: 600,
            auto_open_delay_ms: 0,
            require_email: false,
            replay_delay_ms: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    BottomRight,
    BottomLeft,
}

impl Position {
    pub fn css_class(&self) -> &'static str {
        match self {
            Position::BottomRight => "aria-position-right",
            Position::BottomLeft => "aria-position-left",
        }
    }
}

/// Configured theme: an explicit choice or follow the system setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Auto,
    Light,
    Dark,
}

/// Resolved theme applied to the DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn css_class(&self) -> &'static str {
        match self {
            Theme::Light => "aria-theme-light",
            Theme::Dark => "aria-theme-dark",
        }
    }
}

impl ThemePreference {
    /// Resolve against the system preference (`prefers-color-scheme`).
    pub fn resolve(&self, system_prefers_dark: bool) -> Theme {
        match self {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::Auto => {
                if system_prefers_dark {
                    Theme::Dark
                } else {
                    Theme::Light
                }
            }
        }
    }

    /// Auto themes track live system changes; explicit ones do not.
    pub fn follows_system(&self) -> bool {
        matches!(self, ThemePreference::Auto)
    }
}
