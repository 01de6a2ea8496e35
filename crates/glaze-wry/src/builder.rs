use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use glaze_common::{Rect, Result, WebViewError};
use glaze_core::scripts::{BRIDGE_SCRIPT, READY_SCRIPT};
use glaze_core::{
    Backend, Dispatcher, Driver, SchemeOutcome, SchemeRequest, SchemeResponse, WebView,
    WebViewConfig,
};
use tracing::debug;
use wry::raw_window_handle::HasWindowHandle;
use wry::{PageLoadEvent, WebContext, WebViewBuilder};

use crate::backend::{lock, PageState, WindowControl, WryBackend};

/// Context-menu gate; `set_context_menu` flips the flag at runtime.
const CONTEXT_MENU_ENABLED_SCRIPT: &str = r#"
(function () {
    window.__glazeContextMenu = true;
    window.addEventListener("contextmenu", function (event) {
        if (!window.__glazeContextMenu) {
            event.preventDefault();
        }
    }, true);
})();
"#;

const CONTEXT_MENU_DISABLED_SCRIPT: &str = r#"
(function () {
    window.__glazeContextMenu = false;
    window.addEventListener("contextmenu", function (event) {
        if (!window.__glazeContextMenu) {
            event.preventDefault();
        }
    }, true);
})();
"#;

/// Build a wry-backed webview as a child of `window` and attach it to
/// the core. Must run on the UI thread.
pub fn create<W: HasWindowHandle>(
    dispatcher: &Dispatcher,
    window: &W,
    bounds: Rect,
    config: &WebViewConfig,
    window_control: Option<Box<dyn WindowControl>>,
) -> Result<WebView> {
    WebView::attach_with(dispatcher, |driver| {
        build_backend(driver, window, bounds, config, window_control)
    })
}

fn build_backend<W: HasWindowHandle>(
    driver: &Driver,
    window: &W,
    bounds: Rect,
    config: &WebViewConfig,
    window_control: Option<Box<dyn WindowControl>>,
) -> Result<Box<dyn Backend>> {
    let page = Arc::new(Mutex::new(PageState::default()));

    let context_menu_script = if config.context_menu {
        CONTEXT_MENU_ENABLED_SCRIPT
    } else {
        CONTEXT_MENU_DISABLED_SCRIPT
    };

    let mut builder = WebViewBuilder::new()
        .with_bounds(to_wry_rect(bounds))
        .with_transparent(config.transparent)
        .with_devtools(config.dev_tools)
        .with_focused(false)
        .with_background_color(config.background.into())
        .with_initialization_script(BRIDGE_SCRIPT)
        .with_initialization_script(READY_SCRIPT)
        .with_initialization_script(context_menu_script);

    if let Some(ua) = &config.user_agent {
        builder = builder.with_user_agent(ua);
    }

    // Bridge messages: sentinel, requests, and application messages all
    // arrive on this one channel.
    let ipc_driver = driver.clone();
    builder = builder.with_ipc_handler(move |request| {
        let body = request.body().to_string();
        ipc_driver.on_message(body);
    });

    // Load phases feed navigation reset, url-changed and load-finished.
    let load_driver = driver.clone();
    let load_page = Arc::clone(&page);
    builder = builder.with_on_page_load_handler(move |event, url| match event {
        PageLoadEvent::Started => {
            lock(&load_page).url = Some(url.clone());
            load_driver.on_navigation_started();
            load_driver.on_url_changed(url);
        }
        PageLoadEvent::Finished => {
            lock(&load_page).url = Some(url);
            load_driver.on_load_finished();
        }
    });

    let title_driver = driver.clone();
    let title_page = Arc::clone(&page);
    builder = builder.with_document_title_changed_handler(move |title| {
        lock(&title_page).title = Some(title.clone());
        title_driver.on_title_changed(title);
    });

    // Custom protocols are build-time only in wry, so every scheme the
    // application will ever intercept is declared here; the handler
    // lookup happens per request through the core registry, which is
    // where late registration and tombstoning live.
    for scheme in &config.schemes {
        let name = scheme.clone();
        let proto_driver = driver.clone();
        builder = builder.with_custom_protocol(scheme.clone(), move |_webview_id, request| {
            let descriptor = scheme_request_from_http(&request);
            match proto_driver.scheme_request(&name, descriptor) {
                SchemeOutcome::Handled(response) => http_response(response),
                SchemeOutcome::Unhandled => failure_response(),
            }
        });
    }

    if let Some(url) = &config.url {
        lock(&page).url = Some(url.clone());
        builder = builder.with_url(url);
    } else if let Some(html) = &config.html {
        builder = builder.with_html(html);
    } else {
        builder = builder.with_html("<html><body></body></html>");
    }

    let mut web_context = config
        .persistent_cookies
        .then(|| WebContext::new(Some(config.storage_dir())));
    if let Some(context) = web_context.as_mut() {
        builder = builder.with_web_context(context);
    }

    let webview = builder
        .build_as_child(window)
        .map_err(|error| WebViewError::Backend(error.to_string()))?;

    if config.force_dark_mode {
        if let Err(error) =
            webview.evaluate_script("document.documentElement.style.colorScheme = 'dark';")
        {
            debug!(%error, "failed to apply dark mode at creation");
        }
    }

    debug!(
        url = config.url.as_deref().unwrap_or("about:blank"),
        schemes = config.schemes.len(),
        "wry webview created"
    );

    Ok(Box::new(WryBackend {
        webview,
        _web_context: web_context,
        page,
        window: window_control,
        declared_schemes: config.schemes.clone(),
        init_scripts: vec![
            BRIDGE_SCRIPT.to_string(),
            READY_SCRIPT.to_string(),
            context_menu_script.to_string(),
        ],
        context_menu: config.context_menu,
        force_dark: config.force_dark_mode,
        background: config.background,
    }))
}

fn to_wry_rect(rect: Rect) -> wry::Rect {
    wry::Rect {
        position: wry::dpi::Position::Logical(wry::dpi::LogicalPosition::new(rect.x, rect.y)),
        size: wry::dpi::Size::Logical(wry::dpi::LogicalSize::new(rect.width, rect.height)),
    }
}

fn scheme_request_from_http(request: &wry::http::Request<Vec<u8>>) -> SchemeRequest {
    SchemeRequest {
        url: request.uri().to_string(),
        method: request.method().to_string(),
        headers: request
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
    }
}

fn http_response(response: SchemeResponse) -> wry::http::Response<Cow<'static, [u8]>> {
    let mut builder = wry::http::Response::builder().status(response.status);
    let mut has_cors = false;
    for (name, value) in &response.headers {
        if name.eq_ignore_ascii_case("access-control-allow-origin") {
            has_cors = true;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    // Intercepted schemes behave like same-origin content.
    if !has_cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }
    builder
        .body(Cow::from(response.body))
        .unwrap_or_else(|_| failure_response())
}

/// Generic failure for unhandled or tombstoned schemes.
fn failure_response() -> wry::http::Response<Cow<'static, [u8]>> {
    wry::http::Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(Cow::from(&b"request not handled"[..]))
        .unwrap_or_else(|_| wry::http::Response::new(Cow::from(&b""[..])))
}
