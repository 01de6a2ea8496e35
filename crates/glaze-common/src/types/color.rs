use serde::{Deserialize, Serialize};

/// RGBA color used for webview backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: 255,
            }),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for (u8, u8, u8, u8) {
    fn from(c: Color) -> Self {
        (c.r, c.g, c.b, c.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_six_digits() {
        let c = Color::from_hex("#336699").unwrap();
        assert_eq!(c, Color::rgba(0x33, 0x66, 0x99, 255));
    }

    #[test]
    fn from_hex_eight_digits() {
        let c = Color::from_hex("33669980").unwrap();
        assert_eq!(c, Color::rgba(0x33, 0x66, 0x99, 0x80));
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(Color::from_hex("#xyzxyz").is_none());
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("").is_none());
    }

    #[test]
    fn to_hex_omits_opaque_alpha() {
        assert_eq!(Color::rgba(0x33, 0x66, 0x99, 255).to_hex(), "#336699");
        assert_eq!(Color::rgba(0x33, 0x66, 0x99, 0x80).to_hex(), "#33669980");
    }

    #[test]
    fn tuple_conversion_roundtrips() {
        let c = Color::rgba(1, 2, 3, 4);
        let t: (u8, u8, u8, u8) = c.into();
        assert_eq!(Color::from(t), c);
    }
}
