//! System color-scheme detection and change tracking.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MediaQueryListEvent, Window};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

pub fn system_prefers_dark(window: &Window) -> bool {
    window
        .match_media(DARK_QUERY)
        .ok()
        .flatten()
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

/// Invoke `on_change` with the new preference whenever the system scheme
/// flips. The listener lives for the rest of the page.
pub fn watch_system_theme(window: &Window, mut on_change: impl FnMut(bool) + 'static) {
    let Ok(Some(mql)) = window.match_media(DARK_QUERY) else {
        return;
    };
    let closure = Closure::<dyn FnMut(MediaQueryListEvent)>::new(move |e: MediaQueryListEvent| {
        on_change(e.matches());
    });
    if mql
        .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}
