//! The seam between the portable core and one native engine.
//!
//! A `Backend` lives on the UI thread for its whole life; it is reached
//! exclusively through the dispatcher, so implementations need no
//! internal synchronization. Capability gaps (no favicon support, no
//! native per-phase script install) surface as default values — the core
//! compensates where behavior must stay uniform across backends.

use std::sync::Arc;

use glaze_common::{Color, WindowEdge};

use crate::events::WebEvent;
use crate::handle::Icon;
use crate::scheme::SchemeState;
use crate::scripts::InjectedScript;

pub trait Backend: 'static {
    // -- Navigation / document state --

    fn navigate(&mut self, url: &str);
    fn url(&self) -> Option<String>;
    fn page_title(&self) -> Option<String>;

    /// Current favicon; empty when none is available (yet).
    fn favicon(&self) -> Icon {
        Icon::none()
    }

    // -- Scripts --

    /// Evaluate code in the current document.
    fn run_script(&mut self, code: &str);

    /// Install an injected script natively so the engine runs it at the
    /// right phase on every navigation. Return `false` when the engine
    /// cannot (the core will re-apply the script itself).
    fn install_script(&mut self, script: &InjectedScript) -> bool {
        let _ = script;
        false
    }

    /// Undo native installs from [`Backend::install_script`].
    fn uninstall_scripts(&mut self, scripts: &[InjectedScript]) {
        let _ = scripts;
    }

    // -- Settings --

    fn dev_tools(&self) -> bool;
    fn set_dev_tools(&mut self, enabled: bool);

    fn context_menu(&self) -> bool;
    fn set_context_menu(&mut self, enabled: bool);

    fn force_dark_mode(&self) -> bool;
    fn set_force_dark_mode(&mut self, enabled: bool);

    fn background(&self) -> Color;
    fn set_background(&mut self, color: Color);

    // -- Window manipulation (driven by the request protocol) --

    fn start_drag(&mut self) {}

    fn start_resize(&mut self, edge: WindowEdge) {
        let _ = edge;
    }

    // -- Scheme interception --

    /// Register `name` with the native engine and keep `state` alive for
    /// its callback; also mark the scheme secure and CORS-enabled so
    /// content served from it behaves like same-origin content. Engines
    /// requiring pre-declaration (see `WebViewConfig::schemes`) treat
    /// this as a no-op.
    fn register_scheme(&mut self, name: &str, state: Arc<SchemeState>) {
        let _ = (name, state);
    }

    // -- Event listeners (lazily attached per kind) --

    /// Connect the native signal feeding `kind`. Called on the first
    /// `on`/`once` for the kind, and again after a `clear` once a new
    /// subscriber appears.
    fn attach_listener(&mut self, kind: WebEvent) {
        let _ = kind;
    }

    /// Disconnect the native signal feeding `kind`; called by `clear`.
    fn detach_listener(&mut self, kind: WebEvent) {
        let _ = kind;
    }
}
