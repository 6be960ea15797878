//! WASM-target tests for aria-platform (Node.js runtime).
//!
//! Tests MemoryStorage, BrowserClock, and the SessionStore built on them
//! under wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! WebStorage and the DOM layer require a browser environment and are
//! exercised manually against a WordPress test page.

use wasm_bindgen_test::*;

use std::rc::Rc;

use aria_core::ports::{ClockPort, StoragePort};
use aria_core::session::SessionStore;
use aria_platform::clock::BrowserClock;
use aria_platform::storage::MemoryStorage;
use aria_types::message::Sender;
use aria_types::session::SessionData;

// ─── MemoryStorage Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn memory_storage_backend_name() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
fn memory_storage_get_missing() {
    let storage = MemoryStorage::new();
    assert!(storage.get("nonexistent").is_none());
}

#[wasm_bindgen_test]
fn memory_storage_set_and_get() {
    let storage = MemoryStorage::new();
    storage.set("key1", "value1").unwrap();
    assert_eq!(storage.get("key1").as_deref(), Some("value1"));
}

#[wasm_bindgen_test]
fn memory_storage_overwrite() {
    let storage = MemoryStorage::new();
    storage.set("key", "v1").unwrap();
    storage.set("key", "v2").unwrap();
    assert_eq!(storage.get("key").as_deref(), Some("v2"));
}

#[wasm_bindgen_test]
fn memory_storage_remove() {
    let storage = MemoryStorage::new();
    storage.set("key", "val").unwrap();
    storage.remove("key");
    assert!(storage.get("key").is_none());
}

#[wasm_bindgen_test]
fn memory_storage_remove_nonexistent() {
    let storage = MemoryStorage::new();
    storage.remove("nonexistent");
}

#[wasm_bindgen_test]
fn memory_storage_empty_value() {
    let storage = MemoryStorage::new();
    storage.set("empty", "").unwrap();
    assert_eq!(storage.get("empty").as_deref(), Some(""));
}

#[wasm_bindgen_test]
fn memory_storage_unicode_value() {
    let storage = MemoryStorage::new();
    let text = "你好世界 🌍 こんにちは";
    storage.set("unicode", text).unwrap();
    assert_eq!(storage.get("unicode").as_deref(), Some(text));
}

// ─── BrowserClock Tests ──────────────────────────────────

#[wasm_bindgen_test]
fn browser_clock_now_is_current_era() {
    let clock = BrowserClock;
    // After 2020-01-01, before 2100-01-01
    let now = clock.now_ms();
    assert!(now > 1_577_836_800_000);
    assert!(now < 4_102_444_800_000);
}

#[wasm_bindgen_test]
fn browser_clock_random_in_unit_interval() {
    let clock = BrowserClock;
    for _ in 0..100 {
        let r = clock.random();
        assert!((0.0..1.0).contains(&r));
    }
}

// ─── SessionStore on platform adapters ───────────────────

fn make_store() -> SessionStore {
    let storage = Rc::new(MemoryStorage::new());
    SessionStore::widget(storage.clone(), storage, Rc::new(BrowserClock))
}

#[wasm_bindgen_test]
fn session_id_stable_across_reads() {
    let store = make_store();
    let id = store.get_or_create_session_id();
    assert!(id.starts_with("aria_session_"));
    assert_eq!(store.get_or_create_session_id(), id);
}

#[wasm_bindgen_test]
fn session_roundtrip_with_real_clock() {
    let store = make_store();
    let id = store.get_or_create_session_id();

    let mut data = SessionData::new();
    data.push_message(Sender::User, "hello from wasm");
    store.save(&id, &mut data);

    let restored = store.load_for_init(&id);
    assert_eq!(restored.messages.len(), 1);
    assert!(store.is_recent(&restored));
}
