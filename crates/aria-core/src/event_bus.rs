//! Render-instruction queue between controllers and the DOM layer.
//!
//! Controllers run with no DOM access; everything they want shown is
//! pushed here as a `WidgetEvent`. The composition root drains the
//! queue after each handled input and applies the batch in order.
//! Single-threaded by construction, so a RefCell suffices.

use std::cell::RefCell;
use std::rc::Rc;

use aria_types::event::WidgetEvent;

/// Handle to a shared render queue. Cloning hands out another handle to
/// the same queue, which is how a controller and the renderer end up on
/// opposite sides of it.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Rc<RefCell<Vec<WidgetEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: WidgetEvent) {
        self.queue.borrow_mut().push(event);
    }

    /// Take the whole pending batch, oldest first. Emission order is
    /// exactly what the DOM applies, so controllers sequence their own
    /// events and the renderer never reorders.
    pub fn drain(&self) -> Vec<WidgetEvent> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}
