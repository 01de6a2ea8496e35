mod color;
mod core;
mod edge;

pub use color::Color;
pub use core::{Rect, WebViewId};
pub use edge::WindowEdge;
