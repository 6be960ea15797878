//! DOM layer: markup construction and event application.
//!
//! Controllers never see these types. The composition root mounts the
//! markup, wires listeners, and forwards drained `WidgetEvent`s to
//! `WidgetDom::apply` / `EmbedDom::apply`.

use aria_types::WidgetError;
use wasm_bindgen::JsValue;

pub mod embed;
pub mod render;
pub mod style;
pub mod theme;
pub mod widget;

pub use embed::EmbedDom;
pub use widget::WidgetDom;

pub(crate) fn js_err(e: JsValue) -> WidgetError {
    WidgetError::JsInterop(format!("{:?}", e))
}
