//! Web Storage backend (localStorage / sessionStorage).
//!
//! The constructors probe with a write-then-delete because some browsers
//! expose the storage object but reject every write (Safari private mode
//! historically, quota-zero sandboxes today). A backend that cannot write
//! is reported as absent so the caller can fall back to memory.

use aria_core::ports::StoragePort;
use aria_types::{Result, WidgetError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

const PROBE_KEY: &str = "aria_storage_probe";

pub struct WebStorage {
    inner: Storage,
    name: &'static str,
}

impl WebStorage {
    pub fn local() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok().flatten()?;
        writable(&storage).then_some(Self {
            inner: storage,
            name: "localStorage",
        })
    }

    pub fn session() -> Option<Self> {
        let storage = web_sys::window()?.session_storage().ok().flatten()?;
        writable(&storage).then_some(Self {
            inner: storage,
            name: "sessionStorage",
        })
    }
}

fn writable(storage: &Storage) -> bool {
    if storage.set_item(PROBE_KEY, "1").is_err() {
        return false;
    }
    let _ = storage.remove_item(PROBE_KEY);
    true
}

fn js_err(context: &str, e: JsValue) -> WidgetError {
    WidgetError::Storage(format!("{}: {:?}", context, e))
}

impl StoragePort for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .set_item(key, value)
            .map_err(|e| js_err(self.name, e))
    }

    fn remove(&self, key: &str) {
        let _ = self.inner.remove_item(key);
    }

    fn backend_name(&self) -> &str {
        self.name
    }
}
