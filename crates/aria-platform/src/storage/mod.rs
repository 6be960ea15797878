//! Storage backends. Web Storage when the browser allows it, an
//! in-memory map when it does not (private browsing, sandboxed frames).

use std::rc::Rc;

use aria_core::ports::StoragePort;

pub mod memory;
pub mod web;

pub use memory::MemoryStorage;
pub use web::WebStorage;

/// localStorage, or an in-memory fallback when it is unusable.
/// The widget degrades to per-page-view sessions rather than failing.
pub fn local_or_memory() -> Rc<dyn StoragePort> {
    match WebStorage::local() {
        Some(s) => Rc::new(s),
        None => {
            log::warn!("localStorage unavailable, using in-memory storage");
            Rc::new(MemoryStorage::new())
        }
    }
}

/// sessionStorage, or an in-memory fallback.
pub fn session_or_memory() -> Rc<dyn StoragePort> {
    match WebStorage::session() {
        Some(s) => Rc::new(s),
        None => {
            log::warn!("sessionStorage unavailable, using in-memory storage");
            Rc::new(MemoryStorage::new())
        }
    }
}
