//! wry backend for the glaze webview core.
//!
//! Builds a `wry::WebView` as a child of the host window and wires its
//! handlers (IPC, page load, title, custom protocols) into the core
//! driver, so the cross-backend contract — dispatch, event bus, deferred
//! execution, scheme interception — behaves exactly as it does on any
//! other backend.
//!
//! Engine-specific constraints this glue absorbs:
//! - init scripts and custom protocols are build-time only, so the two
//!   bootstrap scripts are installed at build and schemes must be
//!   pre-declared in `WebViewConfig::schemes`;
//! - there is no favicon API, so `favicon` stays empty and `IconChanged`
//!   never fires;
//! - window drag/resize goes through a host-supplied [`WindowControl`].

mod backend;
mod builder;

pub use backend::{WindowControl, WryBackend};
pub use builder::create;
