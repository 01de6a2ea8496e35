//! The public webview surface.
//!
//! [`WebView`] is a cheap, clonable, thread-agnostic handle. Every
//! operation funnels through the dispatcher: invoked on the UI thread it
//! runs immediately, invoked anywhere else it marshals itself onto the UI
//! thread and blocks for the result, so call semantics are synchronous
//! from every thread. Per-instance state ([`Inner`]) is UI-thread
//! confined and reached through the thread-local registry.

mod driver;
pub(crate) mod registry;

pub use driver::Driver;

use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glaze_common::{Color, DispatchError, Result, WebViewId};
use tracing::debug;

use crate::backend::Backend;
use crate::dispatch::Dispatcher;
use crate::events::{SubscriptionId, WebEvent, WebEventKind, WebViewEvents};
use crate::handle::Icon;
use crate::scheme::{SchemeOutcome, SchemeRegistry, SchemeRequest};
use crate::scripts::{
    InjectTime, InjectedScript, ScriptStore, WebFrame, BRIDGE_SCRIPT, READY_SCRIPT,
};

pub type MessageHandler = Box<dyn FnMut(&str) + Send>;

/// UI-thread-confined state of one webview instance.
pub(crate) struct Inner {
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) events: WebViewEvents,
    pub(crate) scripts: ScriptStore,
    pub(crate) schemes: SchemeRegistry,
    /// Receives bridge messages that are neither the DOM-ready sentinel
    /// nor a window-manipulation request. `None` while checked out
    /// during delivery.
    pub(crate) message_handler: Option<MessageHandler>,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to one webview instance. Clone freely; all clones address the
/// same instance.
#[derive(Clone)]
pub struct WebView {
    id: WebViewId,
    dispatcher: Dispatcher,
}

impl WebView {
    /// Wire a backend up as a webview instance. UI thread only: the
    /// backend is created there and never leaves it.
    ///
    /// Injects the two bootstrap scripts (message bridge and DOM-ready
    /// notifier) as the reserved head of the script list.
    pub fn attach(dispatcher: &Dispatcher, backend: Box<dyn Backend>) -> Result<WebView> {
        Self::attach_with(dispatcher, |_| Ok(backend))
    }

    /// Like [`WebView::attach`], but hands the factory this instance's
    /// [`Driver`] first, so engine callbacks created during backend
    /// construction can re-enter the core. Callbacks arriving before the
    /// factory returns are dropped.
    pub fn attach_with<F>(dispatcher: &Dispatcher, factory: F) -> Result<WebView>
    where
        F: FnOnce(&Driver) -> Result<Box<dyn Backend>>,
    {
        if !dispatcher.is_ui_thread() {
            return Err(DispatchError::NotUiThread.into());
        }

        let id = WebViewId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        let webview = WebView {
            id,
            dispatcher: dispatcher.clone(),
        };
        let backend = factory(&webview.driver())?;

        let mut inner = Inner {
            backend,
            events: WebViewEvents::new(),
            scripts: ScriptStore::new(),
            schemes: SchemeRegistry::new(),
            message_handler: None,
        };

        for (code, frame) in [(BRIDGE_SCRIPT, WebFrame::All), (READY_SCRIPT, WebFrame::Top)] {
            let mut script = InjectedScript {
                code: code.to_string(),
                time: InjectTime::Creation,
                frame,
                native: false,
            };
            script.native = inner.backend.install_script(&script);
            inner.scripts.inject(script);
        }

        registry::insert(id, Rc::new(std::cell::RefCell::new(inner)));
        debug!(%id, "webview attached");

        Ok(webview)
    }

    pub fn id(&self) -> WebViewId {
        self.id
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Re-entry point for native callbacks; see [`Driver`].
    pub fn driver(&self) -> Driver {
        Driver::new(self.id, self.dispatcher.clone())
    }

    /// The dispatch guard every operation is built on: marshal onto the
    /// UI thread if needed, then run against the instance state.
    fn run<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Inner) -> R + Send + 'static,
    {
        let id = self.id;
        Ok(self.dispatcher.invoke(move || registry::with(id, f))??)
    }

    // -- Navigation / document state --

    pub fn set_url(&self, url: &str) -> Result<()> {
        let url = url.to_string();
        self.run(move |inner| inner.backend.navigate(&url))
    }

    /// Load a local file with a `file://` URL.
    pub fn set_file(&self, file: &Path) -> Result<()> {
        let path = std::fs::canonicalize(file)?;
        self.set_url(&format!("file://{}", path.display()))
    }

    /// Navigate to `path` under an intercepted scheme.
    pub fn serve(&self, scheme: &str, path: &str) -> Result<()> {
        self.set_url(&format!("{scheme}:/{path}"))
    }

    /// Current URL; empty until the first navigation commits.
    pub fn url(&self) -> Result<String> {
        self.run(|inner| inner.backend.url().unwrap_or_default())
    }

    /// Current document title; empty when none.
    pub fn page_title(&self) -> Result<String> {
        self.run(|inner| inner.backend.page_title().unwrap_or_default())
    }

    /// Current favicon; empty when the page has none (yet).
    pub fn favicon(&self) -> Result<Icon> {
        self.run(|inner| inner.backend.favicon())
    }

    // -- Settings --

    pub fn dev_tools(&self) -> Result<bool> {
        self.run(|inner| inner.backend.dev_tools())
    }

    pub fn set_dev_tools(&self, enabled: bool) -> Result<()> {
        self.run(move |inner| inner.backend.set_dev_tools(enabled))
    }

    pub fn context_menu(&self) -> Result<bool> {
        self.run(|inner| inner.backend.context_menu())
    }

    pub fn set_context_menu(&self, enabled: bool) -> Result<()> {
        self.run(move |inner| inner.backend.set_context_menu(enabled))
    }

    pub fn force_dark_mode(&self) -> Result<bool> {
        self.run(|inner| inner.backend.force_dark_mode())
    }

    pub fn set_force_dark_mode(&self, enabled: bool) -> Result<()> {
        self.run(move |inner| inner.backend.set_force_dark_mode(enabled))
    }

    pub fn background(&self) -> Result<Color> {
        self.run(|inner| inner.backend.background())
    }

    pub fn set_background(&self, color: Color) -> Result<()> {
        self.run(move |inner| inner.backend.set_background(color))
    }

    // -- Script execution and injection --

    /// Run `code` once: immediately when the document is ready, otherwise
    /// as soon as it becomes ready.
    pub fn execute(&self, code: &str) -> Result<()> {
        let code = code.to_string();
        self.run(move |inner| {
            if inner.scripts.is_ready() {
                inner.backend.run_script(&code);
            } else {
                inner.scripts.push_pending(code);
            }
        })
    }

    /// Register `code` to auto-run at `time` on every future navigation.
    pub fn inject(&self, code: &str, time: InjectTime, frame: WebFrame) -> Result<()> {
        let code = code.to_string();
        self.run(move |inner| {
            let mut script = InjectedScript {
                code,
                time,
                frame,
                native: false,
            };
            script.native = inner.backend.install_script(&script);
            inner.scripts.inject(script);
        })
    }

    /// Remove every user-injected script; the bootstrap scripts stay.
    pub fn clear_scripts(&self) -> Result<()> {
        self.run(|inner| {
            let removed = inner.scripts.clear_user_scripts();
            let native: Vec<_> = removed.into_iter().filter(|s| s.native).collect();
            if !native.is_empty() {
                inner.backend.uninstall_scripts(&native);
            }
        })
    }

    // -- Events --

    /// Subscribe to an event kind; fires until removed.
    pub fn on<E: WebEventKind>(
        &self,
        callback: impl FnMut(&E::Payload) + Send + 'static,
    ) -> Result<SubscriptionId> {
        self.run(move |inner| {
            Self::ensure_attached::<E>(inner);
            inner.events.channel::<E>().add(Box::new(callback))
        })
    }

    /// Subscribe for exactly one fire.
    pub fn once<E: WebEventKind>(
        &self,
        callback: impl FnMut(&E::Payload) + Send + 'static,
    ) -> Result<SubscriptionId> {
        self.run(move |inner| {
            Self::ensure_attached::<E>(inner);
            inner.events.channel::<E>().once(Box::new(callback))
        })
    }

    fn ensure_attached<E: WebEventKind>(inner: &mut Inner) {
        if inner.events.channel::<E>().mark_attached() {
            inner.backend.attach_listener(E::KIND);
        }
    }

    /// Remove one subscription; no-op if absent.
    pub fn remove(&self, kind: WebEvent, id: SubscriptionId) -> Result<()> {
        self.run(move |inner| inner.events.by_kind(kind).remove(id))
    }

    /// Drop every subscriber of `kind` and detach the native listener
    /// feeding it; a later `on`/`once` re-attaches lazily.
    pub fn clear(&self, kind: WebEvent) -> Result<()> {
        self.run(move |inner| {
            let was_attached = inner.events.by_kind(kind).mark_detached();
            inner.events.by_kind(kind).clear();
            if was_attached {
                inner.backend.detach_listener(kind);
            }
        })
    }

    // -- Application messages --

    /// Receive bridge messages not consumed by the sentinel or request
    /// protocol. Replaces any previous handler.
    pub fn set_message_handler(
        &self,
        handler: impl FnMut(&str) + Send + 'static,
    ) -> Result<()> {
        self.run(move |inner| inner.message_handler = Some(Box::new(handler)))
    }

    // -- Scheme interception --

    /// Route requests for `name:` URLs to `handler`. A second
    /// registration for the same name is a no-op.
    pub fn handle_scheme(
        &self,
        name: &str,
        handler: impl Fn(&SchemeRequest) -> SchemeOutcome + Send + Sync + 'static,
    ) -> Result<()> {
        let name = name.to_string();
        self.run(move |inner| {
            if let Some(state) = inner.schemes.register(&name, Box::new(handler)) {
                inner.backend.register_scheme(&name, state);
            }
        })
    }

    /// Pre-boxed variant of [`WebView::handle_scheme`], e.g. for
    /// `ContentProvider::into_scheme_handler`.
    pub fn handle_scheme_boxed(
        &self,
        name: &str,
        handler: crate::scheme::SchemeHandler,
    ) -> Result<()> {
        let name = name.to_string();
        self.run(move |inner| {
            if let Some(state) = inner.schemes.register(&name, handler) {
                inner.backend.register_scheme(&name, state);
            }
        })
    }

    /// Stop serving `name:`; the native registration survives as a
    /// tombstone and reports requests as unhandled.
    pub fn remove_scheme(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.run(move |inner| {
            inner.schemes.tombstone(&name);
        })
    }

    // -- Lifecycle --

    /// Tear the instance down. Runs on the UI thread; the backend drops
    /// there. Operations on surviving handles fail with `Destroyed`.
    pub fn destroy(&self) -> Result<()> {
        let id = self.id;
        self.dispatcher.invoke(move || {
            if registry::remove(id) {
                debug!(%id, "webview destroyed");
            }
        })?;
        Ok(())
    }
}
