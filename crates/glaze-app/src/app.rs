//! `ApplicationHandler` implementation for the winit event loop.
//!
//! The dispatcher's waker posts a user event through the event-loop
//! proxy; `user_event` drains the pump, which is how calls marshaled
//! from other threads reach the UI thread.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use glaze_common::{Rect, WindowEdge};
use glaze_core::events::{DomReady, TitleChanged, UrlChanged};
use glaze_core::{ContentProvider, Dispatcher, Pump, WebView, WebViewConfig};
use glaze_wry::WindowControl;

use crate::cli::Args;

/// Posted by the dispatcher waker whenever work is queued.
#[derive(Debug)]
pub struct WakeUp;

const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>glaze demo</title>
  <style>
    body { font-family: sans-serif; margin: 0; }
    header { padding: 0.75rem 1rem; background: #24283b; color: #c0caf5; cursor: grab; }
    main { padding: 1rem; }
  </style>
</head>
<body>
  <header onmousedown="window.glaze.internal.startDrag()">glaze demo — drag me</header>
  <main>
    <button onclick="window.glaze.postMessage('hello from the page')">send message</button>
    <button onclick="document.title = 'retitled at ' + Date.now()">change title</button>
  </main>
</body>
</html>
"#;

struct Runtime {
    // Window outlives the webview that is its child.
    window: Arc<Window>,
    dispatcher: Dispatcher,
    pump: Pump,
    webview: WebView,
}

pub struct App {
    args: Args,
    proxy: EventLoopProxy<WakeUp>,
    runtime: Option<Runtime>,
}

/// Adapts the winit window to the request protocol's window operations.
struct WinitControl(Arc<Window>);

impl WindowControl for WinitControl {
    fn start_drag(&self) {
        if let Err(error) = self.0.drag_window() {
            tracing::warn!(%error, "window drag failed");
        }
    }

    fn start_resize(&self, edge: WindowEdge) {
        use winit::window::ResizeDirection;
        let direction = match edge {
            WindowEdge::Top => ResizeDirection::North,
            WindowEdge::Bottom => ResizeDirection::South,
            WindowEdge::Left => ResizeDirection::West,
            WindowEdge::Right => ResizeDirection::East,
            WindowEdge::TopLeft => ResizeDirection::NorthWest,
            WindowEdge::TopRight => ResizeDirection::NorthEast,
            WindowEdge::BottomLeft => ResizeDirection::SouthWest,
            WindowEdge::BottomRight => ResizeDirection::SouthEast,
            WindowEdge::None => return,
        };
        if let Err(error) = self.0.drag_resize_window(direction) {
            tracing::warn!(%error, "window resize failed");
        }
    }
}

impl App {
    pub fn new(args: Args, proxy: EventLoopProxy<WakeUp>) -> Self {
        Self {
            args,
            proxy,
            runtime: None,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let attrs = Window::default_attributes()
            .with_title("glaze demo")
            .with_inner_size(winit::dpi::LogicalSize::new(1024.0, 768.0));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                tracing::error!(%error, "failed to create window");
                return false;
            }
        };

        // The waker must be Sync; the proxy only guarantees Send.
        let proxy = std::sync::Mutex::new(self.proxy.clone());
        let (dispatcher, pump) = Dispatcher::new(move || {
            if let Ok(proxy) = proxy.lock() {
                let _ = proxy.send_event(WakeUp);
            }
        });

        let mut provider = match &self.args.serve_dir {
            Some(dir) => ContentProvider::new(dir.clone()),
            None => ContentProvider::new(std::env::temp_dir()),
        };
        if self.args.serve_dir.is_none() {
            provider.add_override("index.html", "text/html", DEMO_PAGE.as_bytes().to_vec());
        }

        let config = WebViewConfig {
            url: Some(
                self.args
                    .url
                    .clone()
                    .unwrap_or_else(|| "app:/index.html".to_string()),
            ),
            schemes: vec!["app".to_string()],
            ..Default::default()
        };

        let bounds = Rect::new(0.0, 0.0, 1024.0, 768.0);
        let control = Box::new(WinitControl(Arc::clone(&window)));
        let webview = match glaze_wry::create(
            &dispatcher,
            window.as_ref(),
            bounds,
            &config,
            Some(control),
        ) {
            Ok(webview) => webview,
            Err(error) => {
                tracing::error!(%error, "failed to create webview");
                return false;
            }
        };

        if let Err(error) = webview.handle_scheme_boxed("app", provider.into_scheme_handler("app"))
        {
            tracing::error!(%error, "failed to register app scheme");
            return false;
        }

        // Mirror the page title onto the window and log the lifecycle.
        {
            let window = Arc::clone(&window);
            let _ = webview.on::<TitleChanged>(move |title| {
                window.set_title(title);
            });
        }
        let _ = webview.on::<UrlChanged>(|url| tracing::info!(%url, "url changed"));
        let _ = webview.once::<DomReady>(|_| tracing::info!("document ready"));
        let _ = webview.set_message_handler(|raw| tracing::info!(message = %raw, "page message"));

        self.runtime = Some(Runtime {
            window,
            dispatcher,
            pump,
            webview,
        });
        true
    }
}

impl ApplicationHandler<WakeUp> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.runtime.is_some() {
            return;
        }
        if !self.initialize(event_loop) {
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: WakeUp) {
        if let Some(runtime) = &self.runtime {
            runtime.pump.drain();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window close requested");
                if let Some(runtime) = self.runtime.take() {
                    let _ = runtime.webview.destroy();
                    runtime.pump.close();
                    drop(runtime.dispatcher);
                    drop(runtime.window);
                }
                event_loop.exit();
            }
            _ => {}
        }
    }
}
