//! Cross-backend contract tests, driven against a mock backend across
//! real threads: a spawned UI thread owns the backend and services the
//! dispatcher, the test thread plays the role of arbitrary application
//! threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use glaze_core::events::{DomReady, TitleChanged, UrlChanged};
use glaze_core::scripts::{BRIDGE_SCRIPT, READY_SCRIPT};
use glaze_core::{
    Backend, Color, DispatchError, Dispatcher, InjectTime, InjectedScript, SchemeOutcome,
    SchemeRequest, SchemeResponse, WebEvent, WebFrame, WebView, WebViewError, WindowEdge,
};

// =============================================================================
// MOCK BACKEND
// =============================================================================

/// Records every native call so tests can assert what reached the
/// "engine" and in which order.
struct MockBackend {
    log: Arc<Mutex<Vec<String>>>,
    url: Option<String>,
    title: Option<String>,
    dev_tools: bool,
    context_menu: bool,
    force_dark: bool,
    background: Color,
}

impl MockBackend {
    fn new(log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            log,
            url: None,
            title: None,
            dev_tools: false,
            context_menu: true,
            force_dark: false,
            background: Color::WHITE,
        }
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl Backend for MockBackend {
    fn navigate(&mut self, url: &str) {
        self.record(format!("navigate:{url}"));
        self.url = Some(url.to_string());
        self.title = Some(format!("title of {url}"));
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    fn page_title(&self) -> Option<String> {
        self.title.clone()
    }

    fn run_script(&mut self, code: &str) {
        self.record(format!("run:{code}"));
    }

    fn install_script(&mut self, script: &InjectedScript) -> bool {
        // The mock engine can only install the bootstrap scripts natively,
        // like an engine whose init-script API is build-time only.
        script.code == BRIDGE_SCRIPT || script.code == READY_SCRIPT
    }

    fn dev_tools(&self) -> bool {
        self.dev_tools
    }

    fn set_dev_tools(&mut self, enabled: bool) {
        self.dev_tools = enabled;
    }

    fn context_menu(&self) -> bool {
        self.context_menu
    }

    fn set_context_menu(&mut self, enabled: bool) {
        self.context_menu = enabled;
    }

    fn force_dark_mode(&self) -> bool {
        self.force_dark
    }

    fn set_force_dark_mode(&mut self, enabled: bool) {
        self.force_dark = enabled;
    }

    fn background(&self) -> Color {
        self.background
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn start_drag(&mut self) {
        self.record("drag".into());
    }

    fn start_resize(&mut self, edge: WindowEdge) {
        self.record(format!("resize:{edge:?}"));
    }

    fn register_scheme(&mut self, name: &str, _state: Arc<glaze_core::SchemeState>) {
        self.record(format!("scheme:{name}"));
    }

    fn attach_listener(&mut self, kind: WebEvent) {
        self.record(format!("attach:{kind:?}"));
    }

    fn detach_listener(&mut self, kind: WebEvent) {
        self.record(format!("detach:{kind:?}"));
    }
}

// =============================================================================
// HARNESS
// =============================================================================

struct Harness {
    webview: WebView,
    dispatcher: Dispatcher,
    log: Arc<Mutex<Vec<String>>>,
    stop_flag: Arc<AtomicBool>,
    ui_thread: Option<thread::JoinHandle<()>>,
}

impl Harness {
    fn start() -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let backend_log = Arc::clone(&log);
        let (ready_tx, ready_rx) = mpsc::channel();

        let ui_thread = thread::spawn(move || {
            let (wake_tx, wake_rx) = mpsc::channel::<()>();
            let (dispatcher, pump) = Dispatcher::new(move || {
                let _ = wake_tx.send(());
            });
            let webview =
                WebView::attach(&dispatcher, Box::new(MockBackend::new(backend_log)))
                    .expect("attach on ui thread");
            let stop_flag = Arc::new(AtomicBool::new(false));
            ready_tx
                .send((webview, dispatcher, Arc::clone(&stop_flag)))
                .expect("handshake");
            loop {
                match wake_rx.recv_timeout(Duration::from_secs(5)) {
                    Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                pump.drain();
                if stop_flag.load(Ordering::Acquire) {
                    break;
                }
            }
        });

        let (webview, dispatcher, stop_flag) = ready_rx.recv().expect("ui thread startup");
        Self {
            webview,
            dispatcher,
            log,
            stop_flag,
            ui_thread: Some(ui_thread),
        }
    }

    fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    fn stop(mut self) {
        let stop_flag = Arc::clone(&self.stop_flag);
        let _ = self
            .dispatcher
            .invoke(move || stop_flag.store(true, Ordering::Release));
        if let Some(handle) = self.ui_thread.take() {
            handle.join().expect("ui thread join");
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Some(handle) = self.ui_thread.take() {
            let stop_flag = Arc::clone(&self.stop_flag);
            let _ = self
                .dispatcher
                .invoke(move || stop_flag.store(true, Ordering::Release));
            let _ = handle.join();
        }
    }
}

// =============================================================================
// THREAD AFFINITY
// =============================================================================

#[test]
fn mutator_from_worker_thread_matches_ui_thread_view() {
    let harness = Harness::start();
    assert!(!harness.dispatcher.is_ui_thread());

    harness.webview.set_url("https://example.com").unwrap();

    // The caller observed synchronous completion; the UI-thread view
    // agrees with the value read from this thread.
    assert_eq!(harness.webview.url().unwrap(), "https://example.com");
    assert_eq!(
        harness.take_log(),
        vec!["navigate:https://example.com".to_string()]
    );

    harness.webview.set_background(Color::rgba(1, 2, 3, 4)).unwrap();
    assert_eq!(harness.webview.background().unwrap(), Color::rgba(1, 2, 3, 4));
}

#[test]
fn concurrent_callers_each_get_their_own_result() {
    let harness = Harness::start();
    let mut workers = Vec::new();
    for i in 0..4 {
        let webview = harness.webview.clone();
        workers.push(thread::spawn(move || {
            webview.set_dev_tools(i % 2 == 0).unwrap();
            webview.dev_tools().unwrap()
        }));
    }
    for worker in workers {
        // Every call completed without deadlock; values are whatever the
        // interleaving produced, but each read is a real UI-thread read.
        worker.join().unwrap();
    }
}

#[test]
fn operations_after_shutdown_fail_fast() {
    let harness = Harness::start();
    let webview = harness.webview.clone();
    harness.stop();

    let err = webview.set_url("https://late.example").unwrap_err();
    assert!(matches!(
        err,
        WebViewError::Dispatch(DispatchError::Closed)
    ));
}

#[test]
fn operations_after_destroy_report_destroyed() {
    let harness = Harness::start();
    harness.webview.destroy().unwrap();

    let err = harness.webview.url().unwrap_err();
    assert!(matches!(
        err,
        WebViewError::Dispatch(DispatchError::Destroyed)
    ));
}

// =============================================================================
// DEFERRED EXECUTION
// =============================================================================

#[test]
fn scripts_queue_until_dom_ready_then_flush_in_order() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    harness.webview.execute("first()").unwrap();
    harness.webview.execute("second()").unwrap();
    assert!(harness.take_log().is_empty(), "nothing runs before ready");

    assert!(driver.on_message("dom_loaded"));
    assert_eq!(
        harness.take_log(),
        vec!["run:first()".to_string(), "run:second()".to_string()]
    );

    // After the transition, execution is immediate and nothing replays.
    harness.webview.execute("third()").unwrap();
    assert_eq!(harness.take_log(), vec!["run:third()".to_string()]);
}

#[test]
fn dom_ready_event_fires_after_the_flush() {
    let harness = Harness::start();
    let driver = harness.webview.driver();
    let order = Arc::new(Mutex::new(Vec::new()));

    {
        let order = Arc::clone(&order);
        harness
            .webview
            .on::<DomReady>(move |_| order.lock().unwrap().push("event"))
            .unwrap();
    }
    harness.webview.execute("queued()").unwrap();

    driver.on_message("dom_loaded");

    // The queued script reached the engine before the event fired.
    let log = harness.take_log();
    assert!(log.contains(&"run:queued()".to_string()));
    assert_eq!(*order.lock().unwrap(), vec!["event"]);
}

#[test]
fn navigation_resets_readiness() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    driver.on_message("dom_loaded");
    harness.webview.execute("immediate()").unwrap();
    assert_eq!(harness.take_log(), vec!["run:immediate()".to_string()]);

    driver.on_navigation_started();
    harness.webview.execute("deferred()").unwrap();
    assert!(
        harness.take_log().is_empty(),
        "stale readiness must not leak into the next document"
    );

    driver.on_message("dom_loaded");
    assert_eq!(harness.take_log(), vec!["run:deferred()".to_string()]);
}

// =============================================================================
// INJECTION
// =============================================================================

#[test]
fn injected_scripts_replay_on_every_navigation() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    harness
        .webview
        .inject("early()", InjectTime::Creation, WebFrame::Top)
        .unwrap();
    harness
        .webview
        .inject("late()", InjectTime::Ready, WebFrame::All)
        .unwrap();

    for _ in 0..2 {
        driver.on_navigation_started();
        assert_eq!(harness.take_log(), vec!["run:early()".to_string()]);
        driver.on_message("dom_loaded");
        assert_eq!(harness.take_log(), vec!["run:late()".to_string()]);
    }
}

#[test]
fn clear_scripts_keeps_only_the_bootstrap_entries() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    harness
        .webview
        .inject("user()", InjectTime::Creation, WebFrame::Top)
        .unwrap();
    driver.on_navigation_started();
    assert_eq!(harness.take_log(), vec!["run:user()".to_string()]);

    harness.webview.clear_scripts().unwrap();

    // The bootstrap scripts are native in the mock engine, so a clean
    // navigation replays nothing: only user scripts were removed.
    driver.on_navigation_started();
    driver.on_message("dom_loaded");
    assert!(harness.take_log().is_empty());
}

// =============================================================================
// EVENT BUS
// =============================================================================

#[test]
fn native_listener_attaches_lazily_and_detaches_on_clear() {
    let harness = Harness::start();

    let first = harness.webview.on::<TitleChanged>(|_| {}).unwrap();
    let _second = harness.webview.on::<TitleChanged>(|_| {}).unwrap();
    assert_eq!(
        harness.take_log(),
        vec!["attach:TitleChanged".to_string()],
        "attach happens once, on the first subscriber"
    );

    harness.webview.remove(WebEvent::TitleChanged, first).unwrap();
    assert!(harness.take_log().is_empty(), "remove never detaches");

    harness.webview.clear(WebEvent::TitleChanged).unwrap();
    assert_eq!(harness.take_log(), vec!["detach:TitleChanged".to_string()]);

    harness.webview.once::<TitleChanged>(|_| {}).unwrap();
    assert_eq!(
        harness.take_log(),
        vec!["attach:TitleChanged".to_string()],
        "next subscription re-attaches"
    );
}

#[test]
fn fire_reaches_subscribers_in_order_and_once_auto_removes() {
    let harness = Harness::start();
    let driver = harness.webview.driver();
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let seen = Arc::clone(&seen);
        harness
            .webview
            .on::<TitleChanged>(move |title| seen.lock().unwrap().push(format!("a:{title}")))
            .unwrap();
    }
    {
        let seen = Arc::clone(&seen);
        harness
            .webview
            .once::<TitleChanged>(move |title| seen.lock().unwrap().push(format!("b:{title}")))
            .unwrap();
    }

    driver.on_title_changed("one");
    driver.on_title_changed("two");

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["a:one".to_string(), "b:one".to_string(), "a:two".to_string()]
    );
}

#[test]
fn clear_then_fire_invokes_nobody_and_resubscription_works() {
    let harness = Harness::start();
    let driver = harness.webview.driver();
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let seen = Arc::clone(&seen);
        harness
            .webview
            .on::<UrlChanged>(move |url| seen.lock().unwrap().push(url.clone()))
            .unwrap();
    }
    harness.webview.clear(WebEvent::UrlChanged).unwrap();
    driver.on_url_changed("https://a.example");
    assert!(seen.lock().unwrap().is_empty());

    {
        let seen = Arc::clone(&seen);
        harness
            .webview
            .on::<UrlChanged>(move |url| seen.lock().unwrap().push(url.clone()))
            .unwrap();
    }
    driver.on_url_changed("https://b.example");
    assert_eq!(*seen.lock().unwrap(), vec!["https://b.example".to_string()]);
}

#[test]
fn callback_may_reenter_the_webview() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    {
        let webview = harness.webview.clone();
        harness
            .webview
            .on::<DomReady>(move |_| {
                // Runs on the UI thread mid-fire; must not deadlock or
                // panic, and the document is ready, so this runs now.
                webview.execute("from_callback()").unwrap();
            })
            .unwrap();
    }

    driver.on_message("dom_loaded");
    assert!(harness
        .take_log()
        .contains(&"run:from_callback()".to_string()));
}

// =============================================================================
// MESSAGE ROUTING
// =============================================================================

#[test]
fn request_messages_drive_the_window() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    assert!(driver.on_message(r#"{"glaze":"resize","edge":"top-left"}"#));
    assert!(driver.on_message(r#"{"glaze":"drag"}"#));

    assert_eq!(
        harness.take_log(),
        vec!["resize:TopLeft".to_string(), "drag".to_string()]
    );
}

#[test]
fn unrecognized_messages_reach_the_application_handler() {
    let harness = Harness::start();
    let driver = harness.webview.driver();
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let seen = Arc::clone(&seen);
        harness
            .webview
            .set_message_handler(move |raw| seen.lock().unwrap().push(raw.to_string()))
            .unwrap();
    }

    // Consumed by the protocol layers: never reaches the handler.
    driver.on_message("dom_loaded");
    driver.on_message(r#"{"glaze":"drag"}"#);

    // Everything else is an application message.
    assert!(driver.on_message(r#"{"kind":"chat","payload":"hi"}"#));
    assert!(driver.on_message("plain text"));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![r#"{"kind":"chat","payload":"hi"}"#.to_string(), "plain text".to_string()]
    );
}

#[test]
fn message_without_handler_is_unconsumed() {
    let harness = Harness::start();
    let driver = harness.webview.driver();
    assert!(!driver.on_message("nobody listening"));
}

// =============================================================================
// SCHEME INTERCEPTION
// =============================================================================

#[test]
fn registered_scheme_serves_requests() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    harness
        .webview
        .handle_scheme("app", |request| {
            SchemeOutcome::Handled(SchemeResponse::ok(
                "text/plain",
                request.url.as_bytes().to_vec(),
            ))
        })
        .unwrap();
    assert_eq!(harness.take_log(), vec!["scheme:app".to_string()]);

    match driver.scheme_request("app", SchemeRequest::get("app:/index.html")) {
        SchemeOutcome::Handled(response) => {
            assert_eq!(response.status, 200);
            assert_eq!(response.body, b"app:/index.html");
        }
        SchemeOutcome::Unhandled => panic!("registered scheme must handle"),
    }
}

#[test]
fn duplicate_scheme_registration_is_a_noop() {
    let harness = Harness::start();
    let driver = harness.webview.driver();

    harness
        .webview
        .handle_scheme("app", |_| {
            SchemeOutcome::Handled(SchemeResponse::ok("text/plain", b"first".to_vec()))
        })
        .unwrap();
    harness
        .webview
        .handle_scheme("app", |_| {
            SchemeOutcome::Handled(SchemeResponse::ok("text/plain", b"second".to_vec()))
        })
        .unwrap();

    // Only one native registration, and the first handler wins.
    assert_eq!(harness.take_log(), vec!["scheme:app".to_string()]);
    match driver.scheme_request("app", SchemeRequest::get("app:/x")) {
        SchemeOutcome::Handled(response) => assert_eq!(response.body, b"first"),
        SchemeOutcome::Unhandled => panic!("must be handled"),
    }
}

#[test]
fn removed_scheme_reports_unhandled_without_reaching_the_old_handler() {
    let harness = Harness::start();
    let driver = harness.webview.driver();
    let hits = Arc::new(Mutex::new(0usize));

    {
        let hits = Arc::clone(&hits);
        harness
            .webview
            .handle_scheme("app", move |_| {
                *hits.lock().unwrap() += 1;
                SchemeOutcome::Handled(SchemeResponse::ok("text/plain", Vec::new()))
            })
            .unwrap();
    }
    harness.webview.remove_scheme("app").unwrap();

    let outcome = driver.scheme_request("app", SchemeRequest::get("app:/x"));
    assert!(!outcome.is_handled());
    assert_eq!(*hits.lock().unwrap(), 0);
}

#[test]
fn unknown_scheme_is_unhandled() {
    let harness = Harness::start();
    let driver = harness.webview.driver();
    let outcome = driver.scheme_request("ghost", SchemeRequest::get("ghost:/x"));
    assert!(!outcome.is_handled());
}

// =============================================================================
// DEFAULT VALUES
// =============================================================================

#[test]
fn absent_native_state_surfaces_as_defaults() {
    let harness = Harness::start();
    assert_eq!(harness.webview.url().unwrap(), "");
    assert_eq!(harness.webview.page_title().unwrap(), "");
    assert!(harness.webview.favicon().unwrap().is_empty());
}
