#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use async_trait::async_trait;

    use aria_types::config::{HostConfig, Theme, ThemePreference};
    use aria_types::event::WidgetEvent;
    use aria_types::message::Sender;
    use aria_types::session::SessionData;
    use aria_types::Result;

    use crate::controller::{
        EmbedController, EmbedInput, EmbedState, OpenPhase, WidgetController, WidgetInput,
        WidgetState,
    };
    use crate::event_bus::EventBus;
    use crate::format;
    use crate::gateway::{encode_form, RequestGateway};
    use crate::links;
    use crate::ports::{ClockPort, StoragePort, TransportPort};
    use crate::session::{keys, SessionStore, SESSION_MAX_AGE_MS};
    use crate::validate;

    // ─── Test doubles ────────────────────────────────────────

    struct MockStorage {
        data: RefCell<HashMap<String, String>>,
    }

    impl MockStorage {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                data: RefCell::new(HashMap::new()),
            })
        }
    }

    impl StoragePort for MockStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.data.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.data
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) {
            self.data.borrow_mut().remove(key);
        }

        fn backend_name(&self) -> &str {
            "mock"
        }
    }

    struct FixedClock {
        now: RefCell<u64>,
        rand: f64,
    }

    impl FixedClock {
        fn new(now: u64) -> Rc<Self> {
            Rc::new(Self {
                now: RefCell::new(now),
                rand: 0.5,
            })
        }

        fn advance(&self, ms: u64) {
            *self.now.borrow_mut() += ms;
        }
    }

    impl ClockPort for FixedClock {
        fn now_ms(&self) -> u64 {
            *self.now.borrow()
        }

        fn random(&self) -> f64 {
            self.rand
        }
    }

    /// Transport spy: records every body, answers per AJAX action
    struct SpyTransport {
        calls: RefCell<Vec<String>>,
        responses: RefCell<HashMap<String, (u16, String)>>,
    }

    impl SpyTransport {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                calls: RefCell::new(Vec::new()),
                responses: RefCell::new(HashMap::new()),
            })
        }

        fn respond(&self, action: &str, status: u16, body: &str) {
            self.responses
                .borrow_mut()
                .insert(action.to_string(), (status, body.to_string()));
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn bodies_for(&self, action: &str) -> Vec<String> {
            let needle = format!("action={}", action);
            self.calls
                .borrow()
                .iter()
                .filter(|b| b.contains(&needle))
                .cloned()
                .collect()
        }
    }

    #[async_trait(?Send)]
    impl TransportPort for SpyTransport {
        async fn post_form(&self, _url: &str, body: &str) -> Result<(u16, String)> {
            self.calls.borrow_mut().push(body.to_string());
            for (action, resp) in self.responses.borrow().iter() {
                if body.contains(&format!("action={}", action)) {
                    return Ok(resp.clone());
                }
            }
            Ok((200, r#"{"success":true,"data":{}}"#.to_string()))
        }
    }

    struct FailingTransport;

    #[async_trait(?Send)]
    impl TransportPort for FailingTransport {
        async fn post_form(&self, _url: &str, _body: &str) -> Result<(u16, String)> {
            Err(aria_types::WidgetError::Network("offline".to_string()))
        }
    }

    fn host_config(nonce: Option<&str>) -> HostConfig {
        let mut host: HostConfig =
            serde_json::from_str(r#"{"enabled":true,"ajaxUrl":"/wp-admin/admin-ajax.php"}"#)
                .unwrap();
        host.nonce = nonce.map(String::from);
        host
    }

    fn widget_store(clock: Rc<FixedClock>) -> (SessionStore, Rc<MockStorage>, Rc<MockStorage>) {
        let id_storage = MockStorage::new();
        let data_storage = MockStorage::new();
        let store = SessionStore::widget(id_storage.clone(), data_storage.clone(), clock);
        (store, id_storage, data_storage)
    }

    // Single-threaded executor for async controller tests (not WASM here)
    fn block_on<F: std::future::Future<Output = T>, T>(f: F) -> T {
        use std::sync::Arc;
        use std::task::{Context, Poll, Wake, Waker};

        struct NoopWaker;
        impl Wake for NoopWaker {
            fn wake(self: Arc<Self>) {}
        }

        let waker = Waker::from(Arc::new(NoopWaker));
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(val) => return val,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    // ─── EventBus Tests ──────────────────────────────────────

    #[test]
    fn test_event_bus_emit_and_drain() {
        let bus = EventBus::new();
        bus.emit(WidgetEvent::OpenPanel);
        bus.emit(WidgetEvent::ShowTyping);

        assert!(bus.has_pending());
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(!bus.has_pending());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();
        bus1.emit(WidgetEvent::ShowTyping);
        assert!(bus2.has_pending());
        assert_eq!(bus2.drain().len(), 1);
        assert!(!bus1.has_pending());
    }

    // ─── Formatter Tests ─────────────────────────────────────

    #[test]
    fn test_extraction_markdown_and_bare_complete() {
        let raw = "See [our menu](https://cafe.test/menu) and https://cafe.test/hours or www.cafe.test/contact today";
        let (text, links) = format::extract_links(raw, "");
        assert_eq!(links.len(), 3);
        for link in &links {
            assert!(
                !text.contains(&link.full_match),
                "cleaned text still contains {:?}",
                link.full_match
            );
        }
        assert_eq!(links[0].label, "our menu");
        assert_eq!(links[0].url, "https://cafe.test/menu");
        assert_eq!(links[2].url, "https://www.cafe.test/contact");
    }

    #[test]
    fn test_url_inside_markdown_not_double_extracted() {
        let raw = "Book at [this page](https://cafe.test/reserve)";
        let (_, links) = format::extract_links(raw, "");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].full_match, "[this page](https://cafe.test/reserve)");
    }

    #[test]
    fn test_repeated_bare_url_extracted_per_occurrence() {
        let raw = "Go to https://a.test now or https://a.test later";
        let (text, links) = format::extract_links(raw, "");
        assert_eq!(links.len(), 2);
        assert!(!text.contains("https://a.test"), "leftover url in {:?}", text);
    }

    #[test]
    fn test_bare_url_prefix_of_earlier_url_still_extracted() {
        let raw = "See https://a.test/menu and also https://a.test today";
        let (text, links) = format::extract_links(raw, "");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://a.test/menu");
        assert_eq!(links[1].url, "https://a.test");
        assert!(!text.contains("https://a.test"), "leftover url in {:?}", text);
    }

    #[test]
    fn test_no_links_no_container() {
        let html = format::format_response("Just plain text here.", "");
        assert!(!html.contains("aria-message-links"));
        assert_eq!(html, "Just plain text here.");
    }

    #[test]
    fn test_empty_input_empty_output() {
        assert_eq!(format::format_response("", ""), "");
        assert_eq!(format::format_response("   \n ", ""), "");
    }

    #[test]
    fn test_tidy_whitespace() {
        assert_eq!(format::tidy_whitespace("Visit  for our menu"), "Visit for our menu");
        assert_eq!(format::tidy_whitespace("Hello , world !"), "Hello, world!");
        assert_eq!(format::tidy_whitespace("  padded  "), "padded");
        // Newlines survive for the <br> pass
        assert_eq!(format::tidy_whitespace("a\nb"), "a\nb");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            format::escape_html(r#"<b>&"'</b>"#),
            "&lt;b&gt;&amp;&quot;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_markdown_applied_after_escaping() {
        let html = format::format_response("**bold** and *italic* and <script>", "");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_phone_linkification() {
        let html = format::format_response("Call 555-123-4567 now", "");
        assert!(
            html.contains(r#"<a href="tel:5551234567""#),
            "missing tel anchor: {}",
            html
        );
        assert!(html.contains(">555-123-4567</a>"));
    }

    #[test]
    fn test_phone_plus_one_preserved() {
        let html = format::format_response("Call +1 555-123-4567", "");
        assert!(html.contains(r#"href="tel:+15551234567""#), "{}", html);
    }

    #[test]
    fn test_phone_with_area_code_parens() {
        let html = format::format_response("Dial (206) 555-0100 today", "");
        assert!(html.contains(r#"href="tel:2065550100""#), "{}", html);
    }

    #[test]
    fn test_newlines_become_br() {
        let html = format::format_response("line one\nline two", "");
        assert_eq!(html, "line one<br>line two");
    }

    #[test]
    fn test_link_buttons_after_body_never_interleaved() {
        let html = format::format_response(
            "Start https://cafe.test/a middle https://cafe.test/b end",
            "",
        );
        let container = html.find("aria-message-links").unwrap();
        assert!(html[..container].contains("end"));
    }

    #[test]
    fn test_end_to_end_menu_example() {
        let html = format::format_response(
            "Visit https://example.com/menu for our menu",
            "what's on the menu",
        );
        assert!(html.starts_with("Visit for our menu"));
        assert!(html.contains(r#"href="https://example.com/menu""#));
        assert!(html.contains(">View Menu</a>"));
    }

    // ─── LinkContextualizer Tests ────────────────────────────

    #[test]
    fn test_label_user_message_beats_path() {
        let label = links::label_for(
            "https://cafe.test/menu",
            "I want to make a reservation",
            "Here is the page",
        );
        assert_eq!(label, "Make a Reservation");
    }

    #[test]
    fn test_label_path_match() {
        assert_eq!(
            links::label_for("https://cafe.test/careers/openings", "hello", ""),
            "Join Our Team"
        );
        assert_eq!(
            links::label_for("https://cafe.test/about", "hello", ""),
            "Learn More"
        );
    }

    #[test]
    fn test_label_response_text_match() {
        let label = links::label_for(
            "https://cafe.test/info",
            "tell me more",
            "You can book a table here",
        );
        assert_eq!(label, "Make a Reservation");
    }

    #[test]
    fn test_label_hostname_fallback() {
        assert_eq!(
            links::label_for("https://www.example.com/xyz", "hi", "sure"),
            "Visit example.com"
        );
    }

    #[test]
    fn test_label_invalid_url() {
        assert_eq!(links::label_for("not a url at all", "menu", ""), "Visit Link");
    }

    #[test]
    fn test_label_is_deterministic() {
        let a = links::label_for("https://x.test/menu", "food please", "resp");
        let b = links::label_for("https://x.test/menu", "food please", "resp");
        assert_eq!(a, b);
    }

    // ─── SessionStore Tests ──────────────────────────────────

    #[test]
    fn test_session_id_generated_once() {
        let clock = FixedClock::new(1_700_000_000_000);
        let (store, id_storage, _) = widget_store(clock);

        let id1 = store.get_or_create_session_id();
        let id2 = store.get_or_create_session_id();
        assert_eq!(id1, id2);
        assert!(id1.starts_with("aria_session_1700000000000_"));
        assert_eq!(id_storage.get(keys::WIDGET_SESSION_ID), Some(id1));
    }

    #[test]
    fn test_base36_suffix_shape() {
        let suffix = crate::session::base36_suffix(0.123456789);
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        // Deterministic for a fixed input
        assert_eq!(suffix, crate::session::base36_suffix(0.123456789));
    }

    #[test]
    fn test_session_roundtrip_preserves_messages() {
        let clock = FixedClock::new(1_000);
        let (store, _, _) = widget_store(clock);
        let id = store.get_or_create_session_id();

        let mut data = SessionData::new();
        data.conversation_id = Some("c-1".to_string());
        data.push_message(Sender::User, "hello");
        data.push_message(Sender::Aria, "hi there");
        store.save(&id, &mut data);

        let loaded = store.load(&id).expect("session should load");
        assert_eq!(loaded.messages, data.messages);
        assert_eq!(loaded.conversation_id.as_deref(), Some("c-1"));
    }

    #[test]
    fn test_save_stamps_fresh_timestamp() {
        let clock = FixedClock::new(5_000);
        let (store, _, _) = widget_store(clock.clone());
        let id = store.get_or_create_session_id();

        let mut data = SessionData::new();
        store.save(&id, &mut data);
        assert_eq!(data.timestamp, 5_000);

        clock.advance(42);
        store.save(&id, &mut data);
        assert_eq!(data.timestamp, 5_042);
    }

    #[test]
    fn test_staleness_cutoff() {
        let clock = FixedClock::new(10_000_000);
        let (store, _, _) = widget_store(clock.clone());
        let id = store.get_or_create_session_id();

        let mut data = SessionData::new();
        data.push_message(Sender::User, "remember me");
        store.save(&id, &mut data);

        // One second later: replayed in full
        clock.advance(1_000);
        let fresh = store.load_for_init(&id);
        assert_eq!(fresh.messages.len(), 1);
        assert!(store.is_recent(&fresh));

        // Just past one hour: dropped but not deleted
        clock.advance(SESSION_MAX_AGE_MS);
        let stale = store.load_for_init(&id);
        assert!(stale.messages.is_empty());
        assert!(store.load(&id).is_some());
    }

    #[test]
    fn test_stale_session_keeps_contact_info() {
        let clock = FixedClock::new(0);
        let (store, _, _) = widget_store(clock.clone());
        let id = store.get_or_create_session_id();

        let mut data = SessionData::new();
        data.name = Some("Ada".to_string());
        data.email = Some("ada@example.com".to_string());
        data.push_message(Sender::User, "old message");
        store.save(&id, &mut data);

        clock.advance(SESSION_MAX_AGE_MS + 1);
        let restored = store.load_for_init(&id);
        assert!(restored.messages.is_empty());
        assert!(restored.has_contact_info());
    }

    #[test]
    fn test_corrupt_session_degrades_to_fresh() {
        let clock = FixedClock::new(0);
        let (store, _, data_storage) = widget_store(clock);
        let id = store.get_or_create_session_id();
        data_storage.set(&id, "{definitely not json").unwrap();

        assert!(store.load(&id).is_none());
        assert!(store.load_for_init(&id).messages.is_empty());
    }

    // ─── RequestGateway Tests ────────────────────────────────

    #[test]
    fn test_missing_nonce_short_circuits() {
        let transport = SpyTransport::new();
        let gateway = RequestGateway::new(&host_config(None), transport.clone());

        let resp = block_on(gateway.send("aria_send_message", &[("message", "hi")]));
        assert!(!resp.success);
        assert!(resp.message().is_some());
        assert_eq!(transport.call_count(), 0, "transport must never be invoked");
    }

    #[test]
    fn test_nonce_and_action_attached() {
        let transport = SpyTransport::new();
        let gateway = RequestGateway::new(&host_config(Some("tok123")), transport.clone());

        let resp = block_on(gateway.send("aria_track_event", &[("event", "widget opened")]));
        assert!(resp.success);
        let body = transport.calls.borrow()[0].clone();
        assert!(body.contains("action=aria_track_event"));
        assert!(body.contains("nonce=tok123"));
        // Values are URL-encoded
        assert!(body.contains("event=widget%20opened"));
    }

    #[test]
    fn test_http_error_normalized() {
        let transport = SpyTransport::new();
        transport.respond("aria_send_message", 500, "Internal Server Error");
        let gateway = RequestGateway::new(&host_config(Some("t")), transport);

        let resp = block_on(gateway.send("aria_send_message", &[]));
        assert!(!resp.success);
    }

    #[test]
    fn test_parse_error_normalized() {
        let transport = SpyTransport::new();
        transport.respond("aria_send_message", 200, "<html>not json</html>");
        let gateway = RequestGateway::new(&host_config(Some("t")), transport);

        let resp = block_on(gateway.send("aria_send_message", &[]));
        assert!(!resp.success);
    }

    #[test]
    fn test_transport_failure_normalized() {
        let gateway = RequestGateway::new(&host_config(Some("t")), Rc::new(FailingTransport));
        let resp = block_on(gateway.send("aria_send_message", &[]));
        assert!(!resp.success);
    }

    #[test]
    fn test_encode_form() {
        let body = encode_form(&[("a", "1 2"), ("b", "x&y")]);
        assert_eq!(body, "a=1%202&b=x%26y");
    }

    // ─── Validation Tests ────────────────────────────────────

    #[test]
    fn test_email_validation_loose() {
        assert!(validate::is_valid_email("a@b.co"));
        assert!(validate::is_valid_email("  padded@example.com "));
        // Deliberately permissive, matching the original check
        assert!(validate::is_valid_email("weird+tag@sub.domain.io"));

        assert!(!validate::is_valid_email("no-at-sign"));
        assert!(!validate::is_valid_email("no@dot"));
        assert!(!validate::is_valid_email("sp ace@x.co"));
        assert!(!validate::is_valid_email(""));
    }

    // ─── WidgetController Tests ──────────────────────────────

    fn build_widget(
        nonce: Option<&str>,
        transport: Rc<SpyTransport>,
        clock: Rc<FixedClock>,
    ) -> (WidgetController, EventBus) {
        let host = host_config(nonce);
        let (store, _, _) = widget_store(clock);
        let gateway = Rc::new(RequestGateway::new(&host, transport));
        let bus = EventBus::new();
        let ctrl = WidgetController::new(&host, store, gateway, bus.clone(), false);
        (ctrl, bus)
    }

    fn build_widget_with_host(
        host: &HostConfig,
        transport: Rc<SpyTransport>,
        clock: Rc<FixedClock>,
    ) -> (WidgetController, EventBus) {
        let (store, _, _) = widget_store(clock);
        let gateway = Rc::new(RequestGateway::new(host, transport));
        let bus = EventBus::new();
        let ctrl = WidgetController::new(host, store, gateway, bus.clone(), false);
        (ctrl, bus)
    }

    fn send_message_response(body: serde_json::Value) -> String {
        serde_json::json!({ "success": true, "data": body }).to_string()
    }

    #[test]
    fn test_widget_starts_closed_with_resolved_theme() {
        let (ctrl, bus) = build_widget(Some("t"), SpyTransport::new(), FixedClock::new(0));
        assert_eq!(*ctrl.state(), WidgetState::Closed);
        assert_eq!(ctrl.theme(), Theme::Light);
        let events = bus.drain();
        assert!(events.contains(&WidgetEvent::SetTheme { theme: Theme::Light }));
    }

    #[test]
    fn test_open_shows_intake_without_contact_info() {
        let (mut ctrl, bus) = build_widget(Some("t"), SpyTransport::new(), FixedClock::new(0));
        block_on(ctrl.handle(WidgetInput::ToggleClicked));

        assert_eq!(
            *ctrl.state(),
            WidgetState::Open(OpenPhase::AwaitingUserInfo)
        );
        let events = bus.drain();
        assert!(events.contains(&WidgetEvent::OpenPanel));
        assert!(events.contains(&WidgetEvent::ShowIntakeForm));
    }

    #[test]
    fn test_toggle_closes_again() {
        let (mut ctrl, bus) = build_widget(Some("t"), SpyTransport::new(), FixedClock::new(0));
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        bus.drain();
        block_on(ctrl.handle(WidgetInput::ToggleClicked));

        assert_eq!(*ctrl.state(), WidgetState::Closed);
        assert!(bus.drain().contains(&WidgetEvent::ClosePanel));
    }

    #[test]
    fn test_intake_submit_transitions_to_ready() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_start_conversation",
            200,
            &serde_json::json!({
                "success": true,
                "data": { "conversation_id": "c-77", "greeting": "Welcome, Ada!" }
            })
            .to_string(),
        );
        let (mut ctrl, bus) = build_widget(Some("t"), transport.clone(), FixedClock::new(0));
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        bus.drain();

        block_on(ctrl.handle(WidgetInput::IntakeSubmitted {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: String::new(),
        }));

        assert_eq!(*ctrl.state(), WidgetState::Open(OpenPhase::Ready));
        assert_eq!(ctrl.session().conversation_id.as_deref(), Some("c-77"));
        let events = bus.drain();
        assert!(events.contains(&WidgetEvent::HideIntakeForm));
        assert!(events
            .iter()
            .any(|e| matches!(e, WidgetEvent::AppendAssistantHtml { html } if html.contains("Welcome, Ada!"))));
        assert_eq!(transport.bodies_for("aria_start_conversation").len(), 1);
    }

    #[test]
    fn test_intake_invalid_email_rejected_locally() {
        let transport = SpyTransport::new();
        let (mut ctrl, bus) = build_widget(Some("t"), transport.clone(), FixedClock::new(0));
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        let before = transport.call_count();
        bus.drain();

        block_on(ctrl.handle(WidgetInput::IntakeSubmitted {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            phone: String::new(),
            message: String::new(),
        }));

        assert_eq!(
            *ctrl.state(),
            WidgetState::Open(OpenPhase::AwaitingUserInfo)
        );
        assert!(bus
            .drain()
            .iter()
            .any(|e| matches!(e, WidgetEvent::ShowIntakeError { .. })));
        // Nothing went over the wire for the rejected submit
        assert_eq!(transport.call_count(), before);
    }

    fn open_ready_widget(
        transport: Rc<SpyTransport>,
    ) -> (WidgetController, EventBus) {
        transport.respond(
            "aria_start_conversation",
            200,
            &serde_json::json!({
                "success": true,
                "data": { "conversation_id": "c-1" }
            })
            .to_string(),
        );
        let (mut ctrl, bus) = build_widget(Some("t"), transport, FixedClock::new(0));
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        block_on(ctrl.handle(WidgetInput::IntakeSubmitted {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: String::new(),
        }));
        bus.drain();
        (ctrl, bus)
    }

    #[test]
    fn test_send_message_success_flow() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_send_message",
            200,
            &send_message_response(serde_json::json!({
                "response": "We open at **9am**",
                "conversation_id": "c-2"
            })),
        );
        let (mut ctrl, bus) = open_ready_widget(transport.clone());

        block_on(ctrl.handle(WidgetInput::MessageSubmitted("when do you open?".to_string())));

        let events = bus.drain();
        let typing_shown = events.iter().filter(|e| **e == WidgetEvent::ShowTyping).count();
        let typing_hidden = events.iter().filter(|e| **e == WidgetEvent::HideTyping).count();
        assert_eq!(typing_shown, 1);
        assert_eq!(typing_hidden, 1);
        assert!(events.contains(&WidgetEvent::AppendUserMessage {
            text: "when do you open?".to_string()
        }));
        assert!(events.iter().any(
            |e| matches!(e, WidgetEvent::AppendAssistantHtml { html } if html.contains("<strong>9am</strong>"))
        ));
        // Conversation id replaced atomically from the response
        assert_eq!(ctrl.session().conversation_id.as_deref(), Some("c-2"));
        // Transcript persisted with sender+text only
        let last = ctrl.session().messages.last().unwrap();
        assert_eq!(last.sender, Sender::Aria);
        assert_eq!(last.text, "We open at **9am**");
    }

    #[test]
    fn test_send_failure_appends_error_and_reenables() {
        let transport = SpyTransport::new();
        transport.respond("aria_send_message", 500, "boom");
        let (mut ctrl, bus) = open_ready_widget(transport);

        block_on(ctrl.handle(WidgetInput::MessageSubmitted("hello?".to_string())));

        let events = bus.drain();
        assert!(events.contains(&WidgetEvent::HideTyping));
        assert!(events.contains(&WidgetEvent::SetInputEnabled { enabled: true }));
        assert!(events
            .iter()
            .any(|e| matches!(e, WidgetEvent::AppendSystemMessage { .. })));
    }

    #[test]
    fn test_message_dropped_while_send_in_flight() {
        let transport = SpyTransport::new();
        let (mut ctrl, bus) = open_ready_widget(transport.clone());
        let before = transport.call_count();

        ctrl.force_in_flight();
        block_on(ctrl.handle(WidgetInput::MessageSubmitted("second".to_string())));

        assert_eq!(transport.call_count(), before);
        assert_eq!(transport.bodies_for("aria_send_message").len(), 0);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_empty_message_ignored() {
        let transport = SpyTransport::new();
        let (mut ctrl, bus) = open_ready_widget(transport.clone());
        let before = transport.call_count();

        block_on(ctrl.handle(WidgetInput::MessageSubmitted("   ".to_string())));

        assert!(bus.drain().is_empty());
        assert_eq!(transport.call_count(), before);
    }

    #[test]
    fn test_require_email_intercepts_and_replays() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_start_conversation",
            200,
            &serde_json::json!({"success": true, "data": {}}).to_string(),
        );
        transport.respond(
            "aria_send_message",
            200,
            &send_message_response(serde_json::json!({ "response": "Got it!" })),
        );

        let mut host = host_config(Some("t"));
        host.config.require_email = true;
        let (mut ctrl, bus) =
            build_widget_with_host(&host, transport.clone(), FixedClock::new(0));

        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        block_on(ctrl.handle(WidgetInput::IntakeSubmitted {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: String::new(),
        }));
        bus.drain();

        // Email on file: message goes straight out
        block_on(ctrl.handle(WidgetInput::MessageSubmitted("book me".to_string())));
        assert_eq!(transport.bodies_for("aria_send_message").len(), 1);
    }

    #[test]
    fn test_require_email_capture_state_machine() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_send_message",
            200,
            &send_message_response(serde_json::json!({ "response": "Done" })),
        );
        let mut host = host_config(Some("t"));
        host.config.require_email = true;

        // Seed contact info so the widget opens straight into Ready
        let clock = FixedClock::new(0);
        let (store, _, _) = widget_store(clock.clone());
        let id = store.get_or_create_session_id();
        let mut seeded = SessionData::new();
        seeded.name = Some("Ada".to_string());
        seeded.email = Some("ada@example.com".to_string());
        store.save(&id, &mut seeded);

        let gateway = Rc::new(RequestGateway::new(&host, transport.clone()));
        let bus = EventBus::new();
        let mut ctrl = WidgetController::new(&host, store, gateway, bus.clone(), false);
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        bus.drain();

        // Force the email-capture phase as the collect_email directive does
        ctrl.force_awaiting_email("show me the menu".to_string());

        // Invalid email: reprompted, still capturing
        block_on(ctrl.handle(WidgetInput::MessageSubmitted("nope".to_string())));
        assert!(matches!(
            ctrl.state(),
            WidgetState::Open(OpenPhase::AwaitingEmail { .. })
        ));
        assert_eq!(transport.bodies_for("aria_send_message").len(), 0);
        bus.drain();

        // Valid email: stored, replay scheduled
        block_on(ctrl.handle(WidgetInput::MessageSubmitted("new@example.com".to_string())));
        assert_eq!(*ctrl.state(), WidgetState::Open(OpenPhase::Ready));
        assert_eq!(ctrl.session().email.as_deref(), Some("new@example.com"));
        assert!(bus
            .drain()
            .iter()
            .any(|e| matches!(e, WidgetEvent::ScheduleReplay { .. })));

        // Replay timer fires: the pending message is sent without a second
        // user-message append
        block_on(ctrl.handle(WidgetInput::ReplayElapsed));
        let bodies = transport.bodies_for("aria_send_message");
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("show%20me%20the%20menu"));
        let events = bus.drain();
        assert!(!events
            .iter()
            .any(|e| matches!(e, WidgetEvent::AppendUserMessage { .. })));
    }

    #[test]
    fn test_collect_email_directive_enters_capture() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_send_message",
            200,
            &send_message_response(serde_json::json!({
                "response": "Sure, one second.",
                "action": "collect_email"
            })),
        );
        let (mut ctrl, bus) = open_ready_widget(transport);
        // No email on file for the directive to matter
        ctrl.clear_email();

        block_on(ctrl.handle(WidgetInput::MessageSubmitted("help me".to_string())));

        assert!(matches!(
            ctrl.state(),
            WidgetState::Open(OpenPhase::AwaitingEmail { .. })
        ));
        bus.drain();
    }

    #[test]
    fn test_end_conversation_directive_clears_id() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_send_message",
            200,
            &send_message_response(serde_json::json!({
                "response": "Goodbye!",
                "action": "end_conversation"
            })),
        );
        let (mut ctrl, bus) = open_ready_widget(transport);
        assert!(ctrl.session().conversation_id.is_some());

        block_on(ctrl.handle(WidgetInput::MessageSubmitted("bye".to_string())));

        assert!(ctrl.session().conversation_id.is_none());
        bus.drain();
    }

    #[test]
    fn test_feedback_directive_and_submission() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_send_message",
            200,
            &send_message_response(serde_json::json!({
                "response": "Anything else?",
                "action": "collect_feedback",
                "data": { "prompt": "Rate this chat" }
            })),
        );
        let (mut ctrl, bus) = open_ready_widget(transport.clone());

        block_on(ctrl.handle(WidgetInput::MessageSubmitted("thanks".to_string())));
        assert!(bus.drain().contains(&WidgetEvent::ShowFeedbackPrompt {
            prompt: "Rate this chat".to_string()
        }));

        block_on(ctrl.handle(WidgetInput::FeedbackGiven { helpful: true }));
        let bodies = transport.bodies_for("aria_submit_feedback");
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("rating=helpful"));
    }

    #[test]
    fn test_theme_follows_system_only_when_auto() {
        let (mut ctrl, bus) = build_widget(Some("t"), SpyTransport::new(), FixedClock::new(0));
        bus.drain();

        block_on(ctrl.handle(WidgetInput::SystemThemeChanged { prefers_dark: true }));
        assert_eq!(ctrl.theme(), Theme::Dark);
        assert!(bus.drain().contains(&WidgetEvent::SetTheme { theme: Theme::Dark }));

        // Explicit theme ignores system flips
        let mut host = host_config(Some("t"));
        host.config.theme = ThemePreference::Light;
        let (mut ctrl, bus) =
            build_widget_with_host(&host, SpyTransport::new(), FixedClock::new(0));
        bus.drain();
        block_on(ctrl.handle(WidgetInput::SystemThemeChanged { prefers_dark: true }));
        assert_eq!(ctrl.theme(), Theme::Light);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_auto_open_skipped_after_interaction() {
        let (mut ctrl, bus) = build_widget(Some("t"), SpyTransport::new(), FixedClock::new(0));
        // User toggles open and closed: interacted flag is set
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        bus.drain();

        block_on(ctrl.handle(WidgetInput::AutoOpenElapsed));
        assert_eq!(*ctrl.state(), WidgetState::Closed);
        assert!(!bus.drain().contains(&WidgetEvent::OpenPanel));
    }

    #[test]
    fn test_auto_open_opens_untouched_widget() {
        let (mut ctrl, bus) = build_widget(Some("t"), SpyTransport::new(), FixedClock::new(0));
        bus.drain();
        block_on(ctrl.handle(WidgetInput::AutoOpenElapsed));
        assert!(ctrl.is_open());
        assert!(bus.drain().contains(&WidgetEvent::OpenPanel));
    }

    #[test]
    fn test_recent_session_replayed_on_open() {
        let clock = FixedClock::new(50_000);
        let (store, _, _) = widget_store(clock.clone());
        let id = store.get_or_create_session_id();
        let mut seeded = SessionData::new();
        seeded.name = Some("Ada".to_string());
        seeded.email = Some("ada@example.com".to_string());
        seeded.push_message(Sender::User, "earlier question");
        seeded.push_message(Sender::Aria, "earlier answer");
        store.save(&id, &mut seeded);
        clock.advance(1_000);

        let host = host_config(Some("t"));
        let gateway = Rc::new(RequestGateway::new(&host, SpyTransport::new()));
        let bus = EventBus::new();
        let mut ctrl = WidgetController::new(&host, store, gateway, bus.clone(), false);
        block_on(ctrl.handle(WidgetInput::ToggleClicked));

        let events = bus.drain();
        assert!(events.contains(&WidgetEvent::AppendUserMessage {
            text: "earlier question".to_string()
        }));
        assert!(events.iter().any(
            |e| matches!(e, WidgetEvent::AppendAssistantHtml { html } if html.contains("earlier answer"))
        ));
        // Contact info on file: no intake form
        assert!(!events.contains(&WidgetEvent::ShowIntakeForm));
    }

    #[test]
    fn test_missing_nonce_send_fails_gracefully() {
        let transport = SpyTransport::new();
        let (mut ctrl, bus) = build_widget(None, transport.clone(), FixedClock::new(0));
        block_on(ctrl.handle(WidgetInput::ToggleClicked));
        bus.drain();

        block_on(ctrl.handle(WidgetInput::IntakeSubmitted {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: String::new(),
        }));

        // Synthetic failure surfaced inline; nothing on the wire
        assert_eq!(transport.call_count(), 0);
        assert!(bus
            .drain()
            .iter()
            .any(|e| matches!(e, WidgetEvent::ShowIntakeError { .. })));
    }

    // ─── EmbedController Tests ───────────────────────────────

    fn build_embed(transport: Rc<SpyTransport>) -> (EmbedController, EventBus) {
        let host = host_config(Some("t"));
        let storage = MockStorage::new();
        let clock = FixedClock::new(0);
        let store = SessionStore::embed(storage, clock);
        let gateway = Rc::new(RequestGateway::new(&host, transport));
        let bus = EventBus::new();
        let ctrl = EmbedController::new(&host, store, gateway, bus.clone());
        (ctrl, bus)
    }

    #[test]
    fn test_embed_intake_transitions_to_chat() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_start_conversation",
            200,
            &serde_json::json!({
                "success": true,
                "data": { "conversation_id": "c-e1" }
            })
            .to_string(),
        );
        transport.respond(
            "aria_send_message",
            200,
            &send_message_response(serde_json::json!({ "response": "On it" })),
        );
        let (mut ctrl, bus) = build_embed(transport.clone());

        block_on(ctrl.handle(EmbedInput::IntakeSubmitted {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: "I need help".to_string(),
        }));

        assert_eq!(ctrl.state(), EmbedState::ChatView);
        assert_eq!(ctrl.session().conversation_id.as_deref(), Some("c-e1"));
        let events = bus.drain();
        assert!(events.contains(&WidgetEvent::ShowChatView));
        // The intake message was dispatched after the transition
        assert_eq!(transport.bodies_for("aria_send_message").len(), 1);
    }

    #[test]
    fn test_embed_invalid_intake_stays_in_form() {
        let transport = SpyTransport::new();
        let (mut ctrl, bus) = build_embed(transport.clone());

        block_on(ctrl.handle(EmbedInput::IntakeSubmitted {
            name: String::new(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: String::new(),
        }));

        assert_eq!(ctrl.state(), EmbedState::FormView);
        assert_eq!(transport.call_count(), 0);
        assert!(bus
            .drain()
            .iter()
            .any(|e| matches!(e, WidgetEvent::ShowIntakeError { .. })));
    }

    #[test]
    fn test_embed_messages_ignored_in_form_view() {
        let transport = SpyTransport::new();
        let (mut ctrl, _) = build_embed(transport.clone());
        block_on(ctrl.handle(EmbedInput::MessageSubmitted("hello".to_string())));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_embed_close_is_hard_reset() {
        let transport = SpyTransport::new();
        transport.respond(
            "aria_start_conversation",
            200,
            &serde_json::json!({
                "success": true,
                "data": { "conversation_id": "c-e2" }
            })
            .to_string(),
        );
        let (mut ctrl, bus) = build_embed(transport);

        block_on(ctrl.handle(EmbedInput::IntakeSubmitted {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: String::new(),
        }));
        bus.drain();

        block_on(ctrl.handle(EmbedInput::CloseClicked));

        assert_eq!(ctrl.state(), EmbedState::FormView);
        assert!(ctrl.session().conversation_id.is_none());
        assert!(ctrl.session().messages.is_empty());
        let events = bus.drain();
        assert!(events.contains(&WidgetEvent::ClearTranscript));
        assert!(events.contains(&WidgetEvent::ShowFormView));
        // Contact details survive for pre-fill
        assert!(ctrl.session().has_contact_info());
    }
}
