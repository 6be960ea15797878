//! Adapter assembly and DOM wiring.
//!
//! Each controller runs inside a single spawned task that owns it
//! outright; DOM listeners push inputs over an unbounded channel. That
//! serializes all input handling without RefCell borrows held across
//! await points. Render instructions drained from the bus after each
//! input are applied to the DOM, except the replay timer request, which
//! is turned into a real timer here.

use std::rc::Rc;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, EventTarget, HtmlInputElement, KeyboardEvent, Window};

use aria_core::controller::{EmbedController, EmbedInput, WidgetController, WidgetInput};
use aria_core::event_bus::EventBus;
use aria_core::gateway::RequestGateway;
use aria_core::ports::{ClockPort, TransportPort};
use aria_core::session::SessionStore;
use aria_platform::clock::BrowserClock;
use aria_platform::dom::{style, theme, EmbedDom, WidgetDom};
use aria_platform::storage;
use aria_platform::transport::FetchTransport;
use aria_types::config::HostConfig;
use aria_types::event::WidgetEvent;
use aria_types::{Result, WidgetError};

/// Read and parse `window.ariaChat`. Absent config means the plugin did
/// not enqueue us on this page; a malformed one is reported and treated
/// the same way.
pub(crate) fn read_host_config(window: &Window) -> Option<HostConfig> {
    let raw = js_sys::Reflect::get(window, &JsValue::from_str("ariaChat")).ok()?;
    if raw.is_undefined() || raw.is_null() {
        return None;
    }
    let json: String = js_sys::JSON::stringify(&raw).ok()?.into();
    match serde_json::from_str(&json) {
        Ok(host) => Some(host),
        Err(e) => {
            // Logger is not initialized yet (debug flag lives in the config)
            web_sys::console::warn_1(&format!("aria chat: invalid config: {}", e).into());
            None
        }
    }
}

pub(crate) fn boot(window: &Window, host: HostConfig) -> Result<()> {
    let document = window
        .document()
        .ok_or_else(|| WidgetError::JsInterop("no document".to_string()))?;

    style::inject(&document, &host.config)?;

    let clock: Rc<dyn ClockPort> = Rc::new(BrowserClock);
    let transport: Rc<dyn TransportPort> = Rc::new(FetchTransport);
    let gateway = Rc::new(RequestGateway::new(&host, transport));

    mount_widget(window, &document, &host, clock.clone(), gateway.clone())?;
    mount_embeds(&document, &host, clock, gateway)?;
    Ok(())
}

// ─── Floating widget ─────────────────────────────────────────

fn mount_widget(
    window: &Window,
    document: &Document,
    host: &HostConfig,
    clock: Rc<dyn ClockPort>,
    gateway: Rc<RequestGateway>,
) -> Result<()> {
    // Session id is tab-scoped; the transcript survives across tabs
    let store = SessionStore::widget(
        storage::session_or_memory(),
        storage::local_or_memory(),
        clock,
    );
    let bus = EventBus::new();
    let prefers_dark = theme::system_prefers_dark(window);
    let controller = WidgetController::new(host, store, gateway, bus.clone(), prefers_dark);

    let dom = Rc::new(WidgetDom::mount(document, host)?);
    dom.prefill(controller.session());
    // Events emitted during construction (initial theme)
    for event in bus.drain() {
        dom.apply(&event);
    }

    let auto_open_delay = controller
        .wants_auto_open()
        .then(|| controller.auto_open_delay_ms());

    let (tx, rx) = mpsc::unbounded();
    spawn_widget_loop(controller, bus, dom.clone(), rx, tx.clone());
    wire_widget(&dom, &tx);

    theme::watch_system_theme(window, {
        let tx = tx.clone();
        move |prefers_dark| {
            let _ = tx.unbounded_send(WidgetInput::SystemThemeChanged { prefers_dark });
        }
    });

    if let Some(delay) = auto_open_delay {
        let tx = tx.clone();
        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            let _ = tx.unbounded_send(WidgetInput::AutoOpenElapsed);
        });
    }

    Ok(())
}

fn spawn_widget_loop(
    mut controller: WidgetController,
    bus: EventBus,
    dom: Rc<WidgetDom>,
    mut rx: UnboundedReceiver<WidgetInput>,
    tx: UnboundedSender<WidgetInput>,
) {
    spawn_local(async move {
        while let Some(input) = rx.next().await {
            controller.handle(input).await;
            for event in bus.drain() {
                if let WidgetEvent::ScheduleReplay { delay_ms } = event {
                    let tx = tx.clone();
                    spawn_local(async move {
                        TimeoutFuture::new(delay_ms).await;
                        let _ = tx.unbounded_send(WidgetInput::ReplayElapsed);
                    });
                } else {
                    dom.apply(&event);
                }
            }
        }
    });
}

fn wire_widget(dom: &Rc<WidgetDom>, tx: &UnboundedSender<WidgetInput>) {
    on_click(dom.toggle.as_ref(), {
        let tx = tx.clone();
        move || {
            let _ = tx.unbounded_send(WidgetInput::ToggleClicked);
        }
    });

    on_click(dom.send.as_ref(), {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            let _ = tx.unbounded_send(WidgetInput::MessageSubmitted(dom.take_input()));
        }
    });
    on_enter(&dom.input, {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            let _ = tx.unbounded_send(WidgetInput::MessageSubmitted(dom.take_input()));
        }
    });

    on_click(dom.intake_submit.as_ref(), {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            let (name, email, phone, message) = dom.intake_values();
            let _ = tx.unbounded_send(WidgetInput::IntakeSubmitted {
                name,
                email,
                phone,
                message,
            });
        }
    });

    on_click(dom.feedback_yes.as_ref(), {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            dom.hide_feedback();
            let _ = tx.unbounded_send(WidgetInput::FeedbackGiven { helpful: true });
        }
    });
    on_click(dom.feedback_no.as_ref(), {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            dom.hide_feedback();
            let _ = tx.unbounded_send(WidgetInput::FeedbackGiven { helpful: false });
        }
    });
}

// ─── Inline embeds ───────────────────────────────────────────

fn mount_embeds(
    document: &Document,
    host: &HostConfig,
    clock: Rc<dyn ClockPort>,
    gateway: Rc<RequestGateway>,
) -> Result<()> {
    for dom in EmbedDom::attach_all(document)? {
        let dom = Rc::new(dom);
        let store = SessionStore::embed(storage::session_or_memory(), clock.clone());
        let bus = EventBus::new();
        let controller = EmbedController::new(host, store, gateway.clone(), bus.clone());
        dom.prefill(controller.session());
        for event in bus.drain() {
            dom.apply(&event);
        }

        let (tx, rx) = mpsc::unbounded();
        spawn_embed_loop(controller, bus, dom.clone(), rx);
        wire_embed(&dom, &tx);
    }
    Ok(())
}

fn spawn_embed_loop(
    mut controller: EmbedController,
    bus: EventBus,
    dom: Rc<EmbedDom>,
    mut rx: UnboundedReceiver<EmbedInput>,
) {
    spawn_local(async move {
        while let Some(input) = rx.next().await {
            controller.handle(input).await;
            for event in bus.drain() {
                dom.apply(&event);
            }
        }
    });
}

fn wire_embed(dom: &Rc<EmbedDom>, tx: &UnboundedSender<EmbedInput>) {
    on_click(dom.intake_submit.as_ref(), {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            let (name, email, phone, message) = dom.intake_values();
            let _ = tx.unbounded_send(EmbedInput::IntakeSubmitted {
                name,
                email,
                phone,
                message,
            });
        }
    });

    on_click(dom.send.as_ref(), {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            let _ = tx.unbounded_send(EmbedInput::MessageSubmitted(dom.take_input()));
        }
    });
    on_enter(&dom.input, {
        let dom = dom.clone();
        let tx = tx.clone();
        move || {
            let _ = tx.unbounded_send(EmbedInput::MessageSubmitted(dom.take_input()));
        }
    });

    on_click(dom.back.as_ref(), {
        let tx = tx.clone();
        move || {
            let _ = tx.unbounded_send(EmbedInput::CloseClicked);
        }
    });
}

// ─── Listener helpers ────────────────────────────────────────

// Leaked closures are intentional: every listener lives for the page.

fn on_click(target: &EventTarget, mut f: impl FnMut() + 'static) {
    let closure = Closure::<dyn FnMut()>::new(move || f());
    if target
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}

fn on_enter(input: &HtmlInputElement, mut f: impl FnMut() + 'static) {
    let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
        if e.key() == "Enter" && !e.shift_key() {
            e.prevent_default();
            f();
        }
    });
    if input
        .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}
