//! Window-manipulation request protocol.
//!
//! The embedded bridge script shares one string channel with application
//! messages and the DOM-ready sentinel. Requests are small JSON objects
//! tagged with a `glaze` field; anything that does not parse as one is
//! simply not a request — the message dispatch falls through to the
//! application handler instead of erroring.

use glaze_common::WindowEdge;
use serde::Deserialize;

/// A decoded window-manipulation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Begin an interactive resize from the given edge.
    Resize { edge: WindowEdge },
    /// Begin an interactive window drag.
    Drag,
}

#[derive(Deserialize)]
#[serde(tag = "glaze", rename_all = "snake_case")]
enum Wire {
    Resize { edge: WindowEdge },
    Drag {},
}

/// Decode a raw bridge message. Malformed or unrecognized payloads yield
/// `None`, never an error.
pub fn parse(raw: &str) -> Option<Request> {
    match serde_json::from_str::<Wire>(raw).ok()? {
        Wire::Resize { edge } => Some(Request::Resize { edge }),
        Wire::Drag {} => Some(Request::Drag),
    }
}
