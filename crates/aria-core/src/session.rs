//! Session persistence: conversation identity and transcript history,
//! keyed by a generated session id in browser storage.
//!
//! The floating widget keeps transcripts in localStorage (survives tabs);
//! the embed keeps them in sessionStorage (tab-scoped). Both hold their
//! session id in sessionStorage. The two namespaces never overlap.

use std::rc::Rc;

use aria_types::session::SessionData;

use crate::ports::{ClockPort, StoragePort};

/// Storage key names shared with the host page
pub mod keys {
    pub const WIDGET_SESSION_ID: &str = "aria_session_id";
    pub const WIDGET_SESSION_PREFIX: &str = "aria_session_";
    pub const EMBED_SESSION_ID: &str = "aria_embed_session_id";
    pub const EMBED_SESSION_PREFIX: &str = "aria_embed_session_";
    pub const RETURNING_VISITOR: &str = "aria_returning_visitor";
    pub const INTERACTED: &str = "aria_interacted";
}

/// Messages older than this are not replayed into a fresh widget
pub const SESSION_MAX_AGE_MS: u64 = 3_600_000;

pub struct SessionStore {
    /// Holds the session id (always sessionStorage in the browser)
    id_storage: Rc<dyn StoragePort>,
    /// Holds the transcript payloads
    data_storage: Rc<dyn StoragePort>,
    clock: Rc<dyn ClockPort>,
    id_key: &'static str,
    data_prefix: &'static str,
}

impl SessionStore {
    /// Namespace for the floating widget: id in `id_storage`, transcripts
    /// under `aria_session_<id>` in `data_storage` (localStorage).
    pub fn widget(
        id_storage: Rc<dyn StoragePort>,
        data_storage: Rc<dyn StoragePort>,
        clock: Rc<dyn ClockPort>,
    ) -> Self {
        Self {
            id_storage,
            data_storage,
            clock,
            id_key: keys::WIDGET_SESSION_ID,
            data_prefix: keys::WIDGET_SESSION_PREFIX,
        }
    }

    /// Namespace for inline embeds: everything tab-scoped.
    pub fn embed(storage: Rc<dyn StoragePort>, clock: Rc<dyn ClockPort>) -> Self {
        Self {
            id_storage: storage.clone(),
            data_storage: storage,
            clock,
            id_key: keys::EMBED_SESSION_ID,
            data_prefix: keys::EMBED_SESSION_PREFIX,
        }
    }

    /// Read the stored session id, generating and persisting one if absent.
    /// Idempotent for the lifetime of the backing storage.
    pub fn get_or_create_session_id(&self) -> String {
        if let Some(id) = self.id_storage.get(self.id_key) {
            if !id.is_empty() {
                return id;
            }
        }
        let id = format!(
            "{}{}_{}",
            self.data_prefix,
            self.clock.now_ms(),
            base36_suffix(self.clock.random())
        );
        if let Err(e) = self.id_storage.set(self.id_key, &id) {
            // The id still works for this page view; it just won't persist.
            log::warn!("could not persist session id: {}", e);
        }
        id
    }

    /// Load the session for `session_id`. Storage or parse failures
    /// degrade to `None` — a fresh session, never an error.
    pub fn load(&self, session_id: &str) -> Option<SessionData> {
        let raw = self.data_storage.get(&self.data_key(session_id))?;
        match serde_json::from_str(&raw) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("discarding corrupt session data: {}", e);
                None
            }
        }
    }

    /// Serialize and write, stamping a fresh timestamp. Write failures are
    /// logged and swallowed — persistence is best-effort.
    pub fn save(&self, session_id: &str, data: &mut SessionData) {
        data.timestamp = self.clock.now_ms();
        match serde_json::to_string(data) {
            Ok(json) => {
                if let Err(e) = self.data_storage.set(&self.data_key(session_id), &json) {
                    log::warn!("could not save session: {}", e);
                }
            }
            Err(e) => log::warn!("could not serialize session: {}", e),
        }
    }

    /// Messages replay only while the session is fresh. Stale data is
    /// ignored but left in storage.
    pub fn is_recent(&self, data: &SessionData) -> bool {
        self.clock.now_ms().saturating_sub(data.timestamp) < SESSION_MAX_AGE_MS
    }

    /// Load, keeping the transcript only if fresh. Contact details are
    /// kept either way so returning visitors skip the intake form.
    pub fn load_for_init(&self, session_id: &str) -> SessionData {
        match self.load(session_id) {
            Some(mut data) => {
                if !self.is_recent(&data) {
                    data.messages.clear();
                    data.conversation_id = None;
                }
                data
            }
            None => SessionData::new(),
        }
    }

    pub fn flag_get(&self, key: &str) -> bool {
        self.data_storage.get(key).is_some()
    }

    pub fn flag_set(&self, key: &str) {
        let _ = self.data_storage.set(key, "1");
    }

    pub fn id_flag_get(&self, key: &str) -> bool {
        self.id_storage.get(key).is_some()
    }

    pub fn id_flag_set(&self, key: &str) {
        let _ = self.id_storage.set(key, "1");
    }

    fn data_key(&self, session_id: &str) -> String {
        // Generated ids already start with the prefix; externally supplied
        // ones (tests, migrations) get it added.
        if session_id.starts_with(self.data_prefix) {
            session_id.to_string()
        } else {
            format!("{}{}", self.data_prefix, session_id)
        }
    }
}

/// Nine base-36 digits from the fractional part of a uniform random value,
/// matching the shape of `Math.random().toString(36).substr(2, 9)`.
pub(crate) fn base36_suffix(mut r: f64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = String::with_capacity(9);
    r = r.fract().abs();
    for _ in 0..9 {
        r *= 36.0;
        let d = (r as usize).min(35);
        out.push(DIGITS[d] as char);
        r -= d as f64;
    }
    out
}
