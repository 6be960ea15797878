//! Browser platform adapters.
//!
//! Implements the `aria-core` port traits (storage, clock, transport) on
//! top of web-sys/gloo, and owns the DOM layer: mounting the widget and
//! embed markup, injecting styles, and applying render instructions
//! drained from the event bus. No business logic lives here.

pub mod clock;
pub mod dom;
pub mod storage;
pub mod transport;
