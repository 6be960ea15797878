//! Controllers own the widget and embed state machines. They translate
//! inputs (already lifted out of DOM events by the platform layer) into
//! state transitions and render instructions on the event bus.

pub mod widget;
pub mod embed;

pub use widget::{OpenPhase, WidgetController, WidgetInput, WidgetState};
pub use embed::{EmbedController, EmbedInput, EmbedState};
