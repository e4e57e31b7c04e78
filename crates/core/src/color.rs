//! sRGB colors for particle sprites and the frame background.
//!
//! Colors are configured as hex strings and drawn as 8-bit RGBA.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parses `"#ff00aa"` or `"ff00aa"` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, label: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {label} component: {e}")))
        };
        Ok(Srgb::from_rgb8([
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ]))
    }

    pub fn from_rgb8([r, g, b]: [u8; 3]) -> Srgb {
        Srgb {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Opaque 8-bit RGBA, components rounded and clamped.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), 255]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_with_and_without_hash() {
        let a = Srgb::from_hex("#AFD2E9").unwrap();
        let b = Srgb::from_hex("afd2e9").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_rgba8(), [0xaf, 0xd2, 0xe9, 0xff]);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Srgb::from_hex("#fff").is_err());
        assert!(Srgb::from_hex("#gg0000").is_err());
        assert!(Srgb::from_hex("#ff00ééé").is_err());
    }

    #[test]
    fn hex_round_trip() {
        for hex in ["#000000", "#ffffff", "#7c5869", "#9a7197"] {
            assert_eq!(Srgb::from_hex(hex).unwrap().to_hex(), hex);
        }
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c = Srgb::from_hex("#886176").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#886176\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
