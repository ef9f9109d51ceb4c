//! Glitch Colors
//!
//! 8-bit RGB colors as used by the palette and the cells, plus the RGBA
//! variant carried by gradient stops.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation between two colors, component-wise.
    ///
    /// `t` is clamped to [0, 1] and each channel is rounded half-up, so
    /// black to white at 0.5 yields (128, 128, 128).
    pub fn lerp(self, target: Rgb, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let channel = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            (v + 0.5).floor().clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            channel(self.r, target.r),
            channel(self.g, target.g),
            channel(self.b, target.b),
        )
    }

    /// Format as `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rgb, #rrggbb or rgb(r, g, b)")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseColorError(s.to_string());

        if let Some(inner) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(err());
            }
            let mut channels = [0u8; 3];
            for (slot, part) in channels.iter_mut().zip(&parts) {
                *slot = part.parse().map_err(|_| err())?;
            }
            return Ok(Rgb::new(channels[0], channels[1], channels[2]));
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        match hex.len() {
            3 => {
                // #abc expands to #aabbcc
                let mut it = hex.chars().filter_map(|c| c.to_digit(16)).map(|d| (d * 17) as u8);
                match (it.next(), it.next(), it.next()) {
                    (Some(r), Some(g), Some(b)) => Ok(Rgb::new(r, g, b)),
                    _ => Err(err()),
                }
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
                Ok(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

/// RGB color with a floating-point alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Interpolate color and alpha together
    pub fn lerp(self, target: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let rgb = self.rgb().lerp(target.rgb(), t);
        Rgba::new(rgb.r, rgb.g, rgb.b, self.a + (target.a - self.a) * t)
    }

    /// Composite this color over an opaque backdrop (source-over)
    pub fn over(self, backdrop: Rgb) -> Rgb {
        backdrop.lerp(self.rgb(), self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#61dca3".parse::<Rgb>().unwrap(), Rgb::new(0x61, 0xdc, 0xa3));
        assert_eq!("61DCA3".parse::<Rgb>().unwrap(), Rgb::new(0x61, 0xdc, 0xa3));
        assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("#0a0".parse::<Rgb>().unwrap(), Rgb::new(0, 0xaa, 0));
    }

    #[test]
    fn test_parse_rgb_function() {
        assert_eq!("rgb(1, 2, 3)".parse::<Rgb>().unwrap(), Rgb::new(1, 2, 3));
        assert!("rgb(1, 2)".parse::<Rgb>().is_err());
        assert!("rgb(1, 2, 300)".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
        assert!("teal".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_hex_display() {
        assert_eq!(Rgb::new(0x2b, 0x45, 0x39).to_string(), "#2b4539");
    }

    #[test]
    fn test_lerp_midpoint_rounds_half_up() {
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn test_over_alpha() {
        let black = Rgba::new(0, 0, 0, 1.0);
        assert_eq!(black.over(Rgb::WHITE), Rgb::BLACK);
        assert_eq!(Rgba::TRANSPARENT.over(Rgb::WHITE), Rgb::WHITE);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(0x61, 0xb3, 0xdc)).unwrap();
        assert_eq!(json, "\"#61b3dc\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(0x61, 0xb3, 0xdc));
    }
}
