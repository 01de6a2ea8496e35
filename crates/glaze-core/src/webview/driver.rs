//! Re-entry point for native callbacks.
//!
//! Backend glue holds a [`Driver`] and forwards engine callbacks (bridge
//! messages, load phases, title changes, scheme requests) into the core.
//! Driver methods are safe from any thread — they route through the
//! dispatcher like the public surface — and never hold the instance
//! state borrowed while a user callback runs, so callbacks may freely
//! call back into the same webview.

use glaze_common::WebViewId;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::events::{self, WebEventKind};
use crate::handle::Icon;
use crate::requests::{self, Request};
use crate::scheme::{SchemeOutcome, SchemeRequest};
use crate::scripts::{InjectTime, DOM_READY_SENTINEL};

use super::registry;

#[derive(Clone)]
pub struct Driver {
    id: WebViewId,
    dispatcher: Dispatcher,
}

impl Driver {
    pub(super) fn new(id: WebViewId, dispatcher: Dispatcher) -> Self {
        Self { id, dispatcher }
    }

    pub fn id(&self) -> WebViewId {
        self.id
    }

    /// Route a raw bridge message. Returns whether the core consumed it
    /// (sentinel, request, or delivered to the application handler).
    pub fn on_message(&self, raw: impl Into<String>) -> bool {
        let id = self.id;
        let raw = raw.into();
        self.dispatcher
            .invoke(move || handle_message(id, &raw))
            .unwrap_or(false)
    }

    /// A navigation started: the old document is gone, late-queued
    /// scripts must wait for the new one.
    pub fn on_navigation_started(&self) {
        let id = self.id;
        let _ = self.dispatcher.invoke(move || navigation_started(id));
    }

    /// The engine committed a new URL.
    pub fn on_url_changed(&self, url: impl Into<String>) {
        let id = self.id;
        let url = url.into();
        let _ = self
            .dispatcher
            .invoke(move || fire::<events::UrlChanged>(id, &url));
    }

    /// The page finished loading.
    pub fn on_load_finished(&self) {
        let id = self.id;
        let _ = self
            .dispatcher
            .invoke(move || fire::<events::LoadFinished>(id, &()));
    }

    pub fn on_title_changed(&self, title: impl Into<String>) {
        let id = self.id;
        let title = title.into();
        let _ = self
            .dispatcher
            .invoke(move || fire::<events::TitleChanged>(id, &title));
    }

    pub fn on_icon_changed(&self, icon: Icon) {
        let id = self.id;
        let _ = self
            .dispatcher
            .invoke(move || fire::<events::IconChanged>(id, &icon));
    }

    /// Serve one intercepted scheme request through the registered
    /// handler. Unknown names, tombstoned registrations and destroyed
    /// instances all report unhandled.
    pub fn scheme_request(&self, scheme: &str, request: SchemeRequest) -> SchemeOutcome {
        let id = self.id;
        let scheme = scheme.to_string();
        self.dispatcher
            .invoke(move || {
                // Clone the state out, then run the handler with the
                // instance released so it can call back into the webview.
                let state = registry::with(id, |inner| inner.schemes.state(&scheme))
                    .ok()
                    .flatten();
                match state {
                    Some(state) => state.handle(&request),
                    None => SchemeOutcome::Unhandled,
                }
            })
            .unwrap_or(SchemeOutcome::Unhandled)
    }
}

/// Fire one event kind: snapshot the subscribers, then run each callback
/// with the instance state released between checkouts.
pub(crate) fn fire<E: WebEventKind>(id: WebViewId, payload: &E::Payload) {
    let Ok(ids) = registry::with(id, |inner| inner.events.channel::<E>().snapshot()) else {
        return;
    };
    for sub in ids {
        let taken = registry::with(id, |inner| inner.events.channel::<E>().checkout(sub))
            .ok()
            .flatten();
        if let Some((mut callback, once)) = taken {
            callback(payload);
            let _ = registry::with(id, |inner| {
                inner.events.channel::<E>().restore(sub, callback, once)
            });
        }
    }
}

fn handle_message(id: WebViewId, raw: &str) -> bool {
    if raw == DOM_READY_SENTINEL {
        dom_ready(id);
        return true;
    }

    match requests::parse(raw) {
        Some(Request::Resize { edge }) => {
            debug!(%id, ?edge, "resize request");
            let _ = registry::with(id, |inner| inner.backend.start_resize(edge));
            true
        }
        Some(Request::Drag) => {
            debug!(%id, "drag request");
            let _ = registry::with(id, |inner| inner.backend.start_drag());
            true
        }
        None => deliver_application_message(id, raw),
    }
}

fn dom_ready(id: WebViewId) {
    // Ready-phase injected scripts the backend could not install natively
    // run first (they are part of the page), then the deferred batch.
    let batch = registry::with(id, |inner| {
        let mut batch = inner.scripts.emulated_scripts(InjectTime::Ready);
        batch.extend(inner.scripts.mark_ready());
        batch
    });
    let Ok(batch) = batch else { return };
    for code in batch {
        let _ = registry::with(id, |inner| inner.backend.run_script(&code));
    }
    fire::<events::DomReady>(id, &());
}

fn navigation_started(id: WebViewId) {
    let batch = registry::with(id, |inner| {
        inner.scripts.begin_navigation();
        inner.scripts.emulated_scripts(InjectTime::Creation)
    });
    let Ok(batch) = batch else { return };
    for code in batch {
        let _ = registry::with(id, |inner| inner.backend.run_script(&code));
    }
    fire::<events::LoadStarted>(id, &());
}

fn deliver_application_message(id: WebViewId, raw: &str) -> bool {
    // Check the handler out so the instance is not borrowed while user
    // code runs; put it back unless the handler replaced itself.
    let handler = registry::with(id, |inner| inner.message_handler.take())
        .ok()
        .flatten();
    match handler {
        Some(mut handler) => {
            handler(raw);
            let _ = registry::with(id, |inner| {
                if inner.message_handler.is_none() {
                    inner.message_handler = Some(handler);
                }
            });
            true
        }
        None => false,
    }
}
