//! Color types for the gradient field.
//!
//! Blob colors come in two shapes: procedurally synthesized HSL colors
//! (hue-range mode) and fixed sRGB colors taken verbatim from a palette.
//! Drawing code turns either into straight-alpha [`Rgba`] color stops.
//! Uses `f64` throughout.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. The hex round-trip has 8-bit
/// quantization, which is acceptable since hex colors are inherently 8-bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// HSL color: hue in degrees, saturation and lightness in percent (0–100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Straight (non-premultiplied) RGBA color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// The current color of a blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlobColor {
    /// Synthesized in hue-range mode. Gradient stops carry the blob's opacity.
    Hsl(Hsl),
    /// Taken from the palette. Drawn as an opaque color fading to transparent.
    Solid(Srgb),
}

impl Srgb {
    pub const BLACK: Srgb = Srgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Srgb = Srgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Parses `"#rrggbb"`, `"rrggbb"` or the short form `"#rgb"` (case insensitive).
    ///
    /// Returns `EngineError::InvalidColor` for anything else.
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.is_ascii() {
            return Err(EngineError::InvalidColor(format!("non-ascii color: {hex}")));
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_owned(),
            n => {
                return Err(EngineError::InvalidColor(format!(
                    "expected 3 or 6 hex digits, got {n}"
                )))
            }
        };
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&expanded[range], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8-bit channels with rounding.
    pub fn to_u8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Attaches an alpha channel.
    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: a.clamp(0.0, 1.0),
        }
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

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Converts to sRGB. Hue wraps; saturation and lightness clamp to [0, 100].
    pub fn to_srgb(self) -> Srgb {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        if s == 0.0 {
            return Srgb { r: l, g: l, b: l };
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Srgb {
            r: hue_to_channel(p, q, h + 1.0 / 3.0),
            g: hue_to_channel(p, q, h),
            b: hue_to_channel(p, q, h - 1.0 / 3.0),
        }
    }

    /// CSS form, e.g. `hsl(210, 80%, 35%)`.
    pub fn to_css(self) -> String {
        format!("hsl({}, {}%, {}%)", self.h, self.s, self.l)
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Drops the alpha channel.
    pub fn rgb(self) -> Srgb {
        Srgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// CSS form, e.g. `rgba(255, 0, 128, 0.5)`.
    pub fn to_css(self) -> String {
        let [r, g, b] = self.rgb().to_u8();
        format!("rgba({r}, {g}, {b}, {})", self.a)
    }
}

impl BlobColor {
    /// The color as sRGB, ignoring opacity.
    pub fn to_srgb(self) -> Srgb {
        match self {
            BlobColor::Hsl(hsl) => hsl.to_srgb(),
            BlobColor::Solid(srgb) => srgb,
        }
    }

    /// CSS form: `hsl(...)` for synthesized colors, `#rrggbb` for palette colors.
    pub fn to_css(self) -> String {
        match self {
            BlobColor::Hsl(hsl) => hsl.to_css(),
            BlobColor::Solid(srgb) => srgb.to_hex(),
        }
    }
}
