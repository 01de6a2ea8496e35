//! Custom URL scheme interception.
//!
//! `handle_scheme` maps a scheme name to a user handler; the native layer
//! calls back through the shared [`SchemeState`] whenever the engine
//! requests a resource under that scheme. Removal tombstones the state
//! instead of deleting it: several native engines cannot unregister a URI
//! scheme once claimed, so the state object stays alive with an empty
//! handler slot and politely reports requests as unhandled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Request descriptor handed to scheme handlers.
#[derive(Debug, Clone)]
pub struct SchemeRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
}

impl SchemeRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".into(),
            headers: Vec::new(),
        }
    }
}

/// Response produced by a scheme handler.
#[derive(Debug, Clone)]
pub struct SchemeResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl SchemeResponse {
    pub fn ok(mime: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), mime.into())],
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            headers: Vec::new(),
            body: b"Not Found".to_vec(),
        }
    }
}

/// Outcome of routing one request through a scheme handler.
#[derive(Debug, Clone)]
pub enum SchemeOutcome {
    Handled(SchemeResponse),
    /// No handler, or the handler declined; the native layer turns this
    /// into a generic failure response.
    Unhandled,
}

impl SchemeOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, SchemeOutcome::Handled(_))
    }
}

pub type SchemeHandler = Box<dyn Fn(&SchemeRequest) -> SchemeOutcome + Send + Sync>;

/// Bridges the native callback ABI to the user handler.
///
/// The native registration holds an `Arc` to this state for the lifetime
/// of the engine; tombstoning only clears the handler slot.
pub struct SchemeState {
    handler: Mutex<Option<SchemeHandler>>,
}

impl SchemeState {
    fn new(handler: SchemeHandler) -> Self {
        Self {
            handler: Mutex::new(Some(handler)),
        }
    }

    fn clear_handler(&self) {
        let mut slot = self
            .handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    /// Entry point for the native scheme callback.
    pub fn handle(&self, request: &SchemeRequest) -> SchemeOutcome {
        let slot = self
            .handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.as_ref() {
            Some(handler) => handler(request),
            None => SchemeOutcome::Unhandled,
        }
    }

    pub fn is_tombstoned(&self) -> bool {
        self.handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }
}

/// Scheme name → handler-state table for one webview instance.
#[derive(Default)]
pub struct SchemeRegistry {
    states: HashMap<String, Arc<SchemeState>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `name`. Returns the new state for native
    /// registration, or `None` when the name is already registered
    /// (first registration wins, including tombstoned ones).
    pub fn register(&mut self, name: &str, handler: SchemeHandler) -> Option<Arc<SchemeState>> {
        if self.states.contains_key(name) {
            debug!(scheme = %name, "scheme already registered, ignoring");
            return None;
        }
        let state = Arc::new(SchemeState::new(handler));
        self.states.insert(name.to_string(), Arc::clone(&state));
        Some(state)
    }

    /// Clear the handler but keep the native registration alive.
    pub fn tombstone(&mut self, name: &str) -> bool {
        match self.states.get(name) {
            Some(state) => {
                state.clear_handler();
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state(&self, name: &str) -> Option<Arc<SchemeState>> {
        self.states.get(name).cloned()
    }

    /// Route a request for `name` to its handler, if any.
    pub fn dispatch(&self, name: &str, request: &SchemeRequest) -> SchemeOutcome {
        match self.states.get(name) {
            Some(state) => state.handle(request),
            None => SchemeOutcome::Unhandled,
        }
    }
}
