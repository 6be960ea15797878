//! Aria chat — WASM entry point.
//!
//! This crate is the composition root. It reads the host page's
//! `window.ariaChat` config, assembles the platform adapters, and hands
//! them to the controllers in `aria-core`.

mod app;

use wasm_bindgen::prelude::*;

/// Called automatically when the module loads on a WordPress page
#[wasm_bindgen(start)]
pub fn main() {
    let Some(window) = web_sys::window() else {
        return;
    };
    // Pages without the config object get no widget and no log noise
    let Some(host) = app::read_host_config(&window) else {
        return;
    };

    let level = if host.debug {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    wasm_logger::init(wasm_logger::Config::new(level));

    if !host.enabled {
        log::debug!("aria chat disabled by configuration");
        return;
    }

    if let Err(e) = app::boot(&window, host) {
        log::error!("aria chat failed to initialize: {}", e);
    }
}
