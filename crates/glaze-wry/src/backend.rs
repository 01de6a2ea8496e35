use std::sync::{Arc, Mutex, MutexGuard};

use glaze_common::{Color, WindowEdge};
use glaze_core::{Backend, Icon, InjectedScript, SchemeState, WebEvent};
use tracing::{trace, warn};

/// Host-window operations the request protocol drives.
///
/// wry itself has no window surface; the embedder adapts its windowing
/// library (e.g. winit) behind this trait.
pub trait WindowControl: 'static {
    fn start_drag(&self) {}

    fn start_resize(&self, edge: WindowEdge) {
        let _ = edge;
    }
}

/// Document state mirrored out of the engine handlers.
///
/// wry reports URL and title through callbacks rather than getters, so
/// the backend tracks them best-effort, the way a load handler would.
#[derive(Default)]
pub(crate) struct PageState {
    pub url: Option<String>,
    pub title: Option<String>,
}

pub(crate) fn lock(state: &Mutex<PageState>) -> MutexGuard<'_, PageState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct WryBackend {
    pub(crate) webview: wry::WebView,
    /// Keeps the engine profile (cookie store) alive with the webview.
    pub(crate) _web_context: Option<wry::WebContext>,
    pub(crate) page: Arc<Mutex<PageState>>,
    pub(crate) window: Option<Box<dyn WindowControl>>,
    /// Scheme names declared with the engine at build time; wry cannot
    /// add more afterwards.
    pub(crate) declared_schemes: Vec<String>,
    /// Scripts baked into the engine at build time.
    pub(crate) init_scripts: Vec<String>,
    pub(crate) context_menu: bool,
    pub(crate) force_dark: bool,
    pub(crate) background: Color,
}

impl WryBackend {
    fn eval(&self, code: &str) {
        if let Err(error) = self.webview.evaluate_script(code) {
            warn!(%error, "script evaluation failed");
        }
    }
}

impl Backend for WryBackend {
    fn navigate(&mut self, url: &str) {
        lock(&self.page).url = Some(url.to_string());
        if let Err(error) = self.webview.load_url(url) {
            warn!(%error, url = %url, "navigation failed");
        }
    }

    fn url(&self) -> Option<String> {
        lock(&self.page).url.clone()
    }

    fn page_title(&self) -> Option<String> {
        lock(&self.page).title.clone()
    }

    fn favicon(&self) -> Icon {
        // No favicon API in wry.
        Icon::none()
    }

    fn run_script(&mut self, code: &str) {
        self.eval(code);
    }

    fn install_script(&mut self, script: &InjectedScript) -> bool {
        // Init scripts are build-time only; anything injected later is
        // re-applied by the core at the right load phase.
        self.init_scripts.iter().any(|code| code == &script.code)
    }

    fn dev_tools(&self) -> bool {
        self.webview.is_devtools_open()
    }

    fn set_dev_tools(&mut self, enabled: bool) {
        if enabled {
            self.webview.open_devtools();
        } else {
            self.webview.close_devtools();
        }
    }

    fn context_menu(&self) -> bool {
        self.context_menu
    }

    fn set_context_menu(&mut self, enabled: bool) {
        self.context_menu = enabled;
        // The bootstrap blocker script consults this flag per event.
        self.eval(&format!("window.__glazeContextMenu = {enabled};"));
    }

    fn force_dark_mode(&self) -> bool {
        self.force_dark
    }

    fn set_force_dark_mode(&mut self, enabled: bool) {
        self.force_dark = enabled;
        let scheme = if enabled { "dark" } else { "normal" };
        self.eval(&format!(
            "document.documentElement.style.colorScheme = '{scheme}';"
        ));
    }

    fn background(&self) -> Color {
        self.background
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
        if let Err(error) = self.webview.set_background_color(color.into()) {
            warn!(%error, "failed to set background color");
        }
    }

    fn start_drag(&mut self) {
        match &self.window {
            Some(window) => window.start_drag(),
            None => trace!("drag request without window control"),
        }
    }

    fn start_resize(&mut self, edge: WindowEdge) {
        match &self.window {
            Some(window) => window.start_resize(edge),
            None => trace!(?edge, "resize request without window control"),
        }
    }

    fn register_scheme(&mut self, name: &str, _state: Arc<SchemeState>) {
        // Requests route through the driver closures installed at build;
        // the engine itself cannot learn schemes after that.
        if !self.declared_schemes.iter().any(|s| s == name) {
            warn!(
                scheme = %name,
                "scheme was not pre-declared in WebViewConfig::schemes; requests will not be intercepted"
            );
        }
    }

    fn attach_listener(&mut self, kind: WebEvent) {
        // All engine handlers are installed at build time; the bus simply
        // starts consuming what was already flowing.
        trace!(?kind, "listener attach");
    }

    fn detach_listener(&mut self, kind: WebEvent) {
        trace!(?kind, "listener detach");
    }
}
