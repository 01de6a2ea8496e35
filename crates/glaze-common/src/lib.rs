pub mod errors;
pub mod types;

pub use errors::{DispatchError, WebViewError};
pub use types::{Color, Rect, WebViewId, WindowEdge};

pub type Result<T> = std::result::Result<T, WebViewError>;
