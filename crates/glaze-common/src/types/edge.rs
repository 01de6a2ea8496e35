use serde::{Deserialize, Serialize};

/// Window edge or corner an interactive resize starts from.
///
/// Serialized in kebab-case; this is the wire form the embedded bridge
/// script sends in resize requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowEdge {
    None,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl WindowEdge {
    /// Whether this edge actually identifies a resize direction.
    pub fn is_directional(&self) -> bool {
        !matches!(self, WindowEdge::None)
    }
}
