//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `aria-core` (pure Rust).
//! Implementations live in `aria-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use aria_types::Result;

// ─── Storage Port ────────────────────────────────────────────

/// Key/value string storage. Synchronous because the Web Storage API
/// (localStorage/sessionStorage) is synchronous, unlike IndexedDB.
pub trait StoragePort {
    /// Get a value by key. Unreadable storage reports as absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Set a value. Quota or availability failures surface as errors;
    /// callers decide whether they are fatal (they never are here).
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is a no-op.
    fn remove(&self, key: &str);

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Clock Port ──────────────────────────────────────────────

/// Wall-clock time and entropy, injected so session-id generation and
/// staleness checks are deterministic under test.
pub trait ClockPort {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;

    /// Uniform random value in `[0, 1)`
    fn random(&self) -> f64;
}

// ─── Transport Port ──────────────────────────────────────────

/// Outbound HTTP. One method is enough: every widget operation is a POST
/// of a URL-encoded form to the host's AJAX endpoint.
#[async_trait(?Send)]
pub trait TransportPort {
    /// POST `body` as `application/x-www-form-urlencoded`.
    /// Returns the HTTP status and the raw response text.
    async fn post_form(&self, url: &str, body: &str) -> Result<(u16, String)>;
}
