//! Portable webview core.
//!
//! One public window/webview API over multiple native browser-engine
//! backends. The contract every backend shares:
//!
//! - **Thread-affinity dispatch** — native objects are only touched from
//!   the UI thread; calls from other threads marshal themselves there and
//!   block for the result ([`dispatch`]).
//! - **Typed event bus** — per-kind subscriber lists with one-shot and
//!   persistent subscriptions and lazy native listener attachment
//!   ([`events`]).
//! - **Deferred execution** — scripts submitted before the document is
//!   ready queue up and flush, in order, exactly once ([`scripts`]).
//! - **Scheme interception** — custom URL schemes served by user handlers,
//!   with tombstoning for engines that cannot unregister ([`scheme`]).
//!
//! Backends implement [`Backend`] and feed engine callbacks through a
//! [`Driver`]; everything else is shared.

pub mod backend;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod events;
pub mod handle;
pub mod requests;
pub mod scheme;
pub mod scripts;
pub mod webview;

pub use backend::Backend;
pub use config::WebViewConfig;
pub use content::ContentProvider;
pub use dispatch::{Dispatcher, Pump, Reply};
pub use events::{SubscriptionId, WebEvent, WebEventKind};
pub use handle::{HandleOps, Icon, RawHandle};
pub use requests::Request;
pub use scheme::{SchemeHandler, SchemeOutcome, SchemeRequest, SchemeResponse, SchemeState};
pub use scripts::{InjectTime, InjectedScript, WebFrame};
pub use webview::{Driver, WebView};

pub use glaze_common::{Color, DispatchError, Rect, Result, WebViewError, WebViewId, WindowEdge};
