//! Script injection and the deferred-execution queue.
//!
//! Two distinct mechanisms share this module:
//!
//! - **Injection** registers code that auto-runs at a chosen load phase on
//!   every future navigation. The first two entries are the internally
//!   injected bootstrap scripts (message bridge + DOM-ready notifier) and
//!   survive [`ScriptStore::clear_user_scripts`].
//! - **Execution** runs code once. While the document is not ready the
//!   code is queued; the ready transition drains the queue in FIFO order,
//!   each entry exactly once.

use serde::{Deserialize, Serialize};

/// Load phase an injected script runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectTime {
    /// As soon as the document object exists, before any page script.
    Creation,
    /// After the DOM finished parsing.
    Ready,
}

/// Frames an injected script targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebFrame {
    Top,
    All,
}

#[derive(Debug, Clone)]
pub struct InjectedScript {
    pub code: String,
    pub time: InjectTime,
    pub frame: WebFrame,
    /// Whether the backend installed this script natively; if not, the
    /// core re-applies it at the matching load phase.
    pub native: bool,
}

/// Number of leading bootstrap entries `clear_user_scripts` preserves.
pub const BOOTSTRAP_SCRIPTS: usize = 2;

/// Message bridge injected into every document at creation time. Exposes
/// `window.glaze` with the string channel the native side listens on and
/// helpers emitting the window-manipulation request protocol.
pub const BRIDGE_SCRIPT: &str = r#"
(function () {
    if (window.glaze) {
        return;
    }
    window.glaze = {
        postMessage: function (message) {
            window.ipc.postMessage(message);
        },
        internal: {
            send: function (payload) {
                window.glaze.postMessage(JSON.stringify(payload));
            },
            startDrag: function () {
                window.glaze.internal.send({ glaze: "drag" });
            },
            startResize: function (edge) {
                window.glaze.internal.send({ glaze: "resize", edge: edge });
            }
        }
    };
})();
"#;

/// Ready notifier injected at creation time; posts the DOM-ready sentinel
/// exactly once per page load.
pub const READY_SCRIPT: &str = r#"
(function () {
    var notify = function () {
        window.glaze.postMessage("dom_loaded");
    };
    if (document.readyState === "interactive" || document.readyState === "complete") {
        notify();
    } else {
        document.addEventListener("DOMContentLoaded", notify, { once: true });
    }
})();
"#;

/// The literal message the ready notifier posts.
pub const DOM_READY_SENTINEL: &str = "dom_loaded";

/// Per-webview script state: the persistent injection list plus the
/// deferred-execution queue and document readiness flag.
pub struct ScriptStore {
    ready: bool,
    pending: Vec<String>,
    injected: Vec<InjectedScript>,
}

impl ScriptStore {
    pub fn new() -> Self {
        Self {
            ready: false,
            pending: Vec::new(),
            injected: Vec::new(),
        }
    }

    /// Whether the current document reached the ready state.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Queue code for execution at the next ready transition.
    pub fn push_pending(&mut self, code: String) {
        self.pending.push(code);
    }

    /// Navigation started: the next document starts out not-ready, so
    /// stale content cannot receive late-queued scripts.
    pub fn begin_navigation(&mut self) {
        self.ready = false;
    }

    /// Enter the ready state and drain the pending queue.
    ///
    /// The returned scripts must each be executed exactly once, in order.
    /// Draining and clearing happen in one step so an execute racing the
    /// transition either lands in the returned batch or runs immediately
    /// after it, never both.
    pub fn mark_ready(&mut self) -> Vec<String> {
        self.ready = true;
        std::mem::take(&mut self.pending)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Append to the persistent injection list.
    pub fn inject(&mut self, script: InjectedScript) {
        self.injected.push(script);
    }

    /// Remove every user-injected script, returning the removed entries so
    /// the backend can uninstall any it installed natively. The two
    /// bootstrap entries stay.
    pub fn clear_user_scripts(&mut self) -> Vec<InjectedScript> {
        if self.injected.len() <= BOOTSTRAP_SCRIPTS {
            return Vec::new();
        }
        self.injected.split_off(BOOTSTRAP_SCRIPTS)
    }

    pub fn injected(&self) -> &[InjectedScript] {
        &self.injected
    }

    /// Scripts the core must apply itself at the given load phase, in
    /// injection order: everything the backend did not install natively.
    pub fn emulated_scripts(&self, time: InjectTime) -> Vec<String> {
        self.injected
            .iter()
            .filter(|s| !s.native && s.time == time)
            .map(|s| s.code.clone())
            .collect()
    }
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::new()
    }
}
