//! Configuration for the glitch renderer
//!
//! Two shapes of the same settings live here:
//! - [`GlitchOptions`]: the partial, JSON-facing form. Every field is
//!   optional and keys are camelCase, matching the options object the
//!   site passes in.
//! - [`GlitchConfig`]: the validated form the renderer runs on.
//!
//! Bad options never fail the load. Unknown keys and out-of-range values
//! are reported as [`ConfigWarning`]s and leave the base value in place.
//! The one hard error is a palette with no usable colors.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Rgb, MIN_CELL_SIZE};

/// Uppercase letters, a fixed symbol set, then digits
pub const DEFAULT_GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ!@#$&*()-_+=/[]{};:<>,0123456789";

pub const DEFAULT_PALETTE: [Rgb; 3] = [
    Rgb::new(0x2b, 0x45, 0x39),
    Rgb::new(0x61, 0xdc, 0xa3),
    Rgb::new(0x61, 0xb3, 0xdc),
];

/// Validated renderer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GlitchConfig {
    /// Glyph alphabet (nonempty)
    pub glyphs: Vec<char>,
    /// Color palette (nonempty)
    pub palette: Vec<Rgb>,
    /// Minimum time between mutation passes
    pub cadence: Duration,
    /// Fraction of cells retargeted per pass, in [0, 1]
    pub mutation_fraction: f32,
    /// Animate color changes instead of snapping
    pub smooth: bool,
    /// Darken the edges
    pub outer_vignette: bool,
    /// Darken the center
    pub center_vignette: bool,
    /// Cell width in logical pixels
    pub char_width: f32,
    /// Cell height in logical pixels
    pub char_height: f32,
    /// Font size in logical pixels
    pub font_size: f32,
    /// Backing-store scale of the surface
    pub device_pixel_ratio: f32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            glyphs: DEFAULT_GLYPHS.chars().collect(),
            palette: DEFAULT_PALETTE.to_vec(),
            cadence: Duration::from_millis(50),
            mutation_fraction: 0.05,
            smooth: true,
            outer_vignette: true,
            center_vignette: false,
            char_width: 10.0,
            char_height: 20.0,
            font_size: 16.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl GlitchConfig {
    /// Build a config from options on top of the defaults
    pub fn from_options(options: &GlitchOptions) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let mut config = Self::default();
        let warnings = config.apply(options)?;
        Ok((config, warnings))
    }

    /// Merge `options` into this config.
    ///
    /// Either every valid field is applied or, on error, nothing is.
    pub fn apply(&mut self, options: &GlitchOptions) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut next = self.clone();
        let mut warnings: Vec<ConfigWarning> = options
            .unknown
            .keys()
            .map(|key| ConfigWarning::UnknownOption(key.clone()))
            .collect();

        if let Some(glyphs) = &options.glyphs {
            let mut accepted = Vec::with_capacity(glyphs.len());
            for entry in glyphs {
                let mut chars = entry.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() && !c.is_whitespace() => accepted.push(c),
                    _ => warnings.push(ConfigWarning::InvalidGlyph(entry.clone())),
                }
            }
            if accepted.is_empty() {
                warnings.push(ConfigWarning::EmptyGlyphs);
            } else {
                next.glyphs = accepted;
            }
        }

        if let Some(colors) = &options.glitch_colors {
            let mut accepted = Vec::with_capacity(colors.len());
            for entry in colors {
                match entry.parse::<Rgb>() {
                    Ok(color) => accepted.push(color),
                    Err(e) => warnings.push(ConfigWarning::InvalidColor(e.0)),
                }
            }
            if accepted.is_empty() {
                return Err(ConfigError::EmptyPalette);
            }
            next.palette = accepted;
        }

        if let Some(ms) = options.glitch_speed {
            if ms.is_finite() && ms >= 0.0 {
                next.cadence = Duration::from_micros((ms * 1000.0).round() as u64);
            } else {
                warnings.push(ConfigWarning::out_of_range("glitchSpeed", ms));
            }
        }

        if let Some(fraction) = options.mutation_fraction {
            if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
                next.mutation_fraction = fraction as f32;
            } else {
                warnings.push(ConfigWarning::out_of_range("mutationFraction", fraction));
            }
        }

        if let Some(smooth) = options.smooth {
            next.smooth = smooth;
        }
        if let Some(outer) = options.outer_vignette {
            next.outer_vignette = outer;
        }
        if let Some(center) = options.center_vignette {
            next.center_vignette = center;
        }

        // Positive, at least `min`, and representable as f32
        let bounded = |name: &'static str,
                       value: Option<f64>,
                       min: f32,
                       slot: &mut f32,
                       warnings: &mut Vec<ConfigWarning>| {
            if let Some(v) = value {
                if v.is_finite() && v > 0.0 && v >= f64::from(min) && (v as f32).is_finite() {
                    *slot = v as f32;
                } else {
                    warnings.push(ConfigWarning::out_of_range(name, v));
                }
            }
        };
        bounded("charWidth", options.char_width, MIN_CELL_SIZE, &mut next.char_width, &mut warnings);
        bounded("charHeight", options.char_height, MIN_CELL_SIZE, &mut next.char_height, &mut warnings);
        bounded("fontSize", options.font_size, 0.0, &mut next.font_size, &mut warnings);
        bounded(
            "devicePixelRatio",
            options.device_pixel_ratio,
            0.0,
            &mut next.device_pixel_ratio,
            &mut warnings,
        );

        *self = next;
        Ok(warnings)
    }

    /// Repair a config that was built by hand rather than from options.
    ///
    /// Out-of-range fields and an empty alphabet fall back to defaults with
    /// a warning; an empty palette is an error.
    pub fn sanitize(&mut self) -> Result<Vec<ConfigWarning>, ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let defaults = Self::default();
        let mut warnings = Vec::new();
        if self.glyphs.is_empty() {
            self.glyphs = defaults.glyphs;
            warnings.push(ConfigWarning::EmptyGlyphs);
        }
        if !(self.mutation_fraction.is_finite() && (0.0..=1.0).contains(&self.mutation_fraction)) {
            warnings.push(ConfigWarning::out_of_range(
                "mutationFraction",
                self.mutation_fraction as f64,
            ));
            self.mutation_fraction = defaults.mutation_fraction;
        }
        let fields: [(&'static str, &mut f32, f32, f32); 4] = [
            ("charWidth", &mut self.char_width, MIN_CELL_SIZE, defaults.char_width),
            ("charHeight", &mut self.char_height, MIN_CELL_SIZE, defaults.char_height),
            ("fontSize", &mut self.font_size, 0.0, defaults.font_size),
            ("devicePixelRatio", &mut self.device_pixel_ratio, 0.0, defaults.device_pixel_ratio),
        ];
        for (name, slot, min, fallback) in fields {
            if !(slot.is_finite() && *slot > 0.0 && *slot >= min) {
                warnings.push(ConfigWarning::out_of_range(name, *slot as f64));
                *slot = fallback;
            }
        }
        Ok(warnings)
    }

    /// Number of cells a mutation pass retargets for a grid of `cells`
    pub fn mutations_per_pass(&self, cells: usize) -> usize {
        ((cells as f64 * self.mutation_fraction as f64).floor() as usize).max(1)
    }

    /// The full option set that reproduces this config
    pub fn to_options(&self) -> GlitchOptions {
        GlitchOptions {
            glyphs: Some(self.glyphs.iter().map(|c| c.to_string()).collect()),
            glitch_colors: Some(self.palette.iter().map(|c| c.to_hex()).collect()),
            glitch_speed: Some(self.cadence.as_secs_f64() * 1000.0),
            mutation_fraction: Some(self.mutation_fraction as f64),
            smooth: Some(self.smooth),
            outer_vignette: Some(self.outer_vignette),
            center_vignette: Some(self.center_vignette),
            char_width: Some(self.char_width as f64),
            char_height: Some(self.char_height as f64),
            font_size: Some(self.font_size as f64),
            device_pixel_ratio: Some(self.device_pixel_ratio as f64),
            unknown: BTreeMap::new(),
        }
    }
}

/// Partial renderer options, as read from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlitchOptions {
    /// One entry per glyph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<Vec<String>>,
    /// Palette as color strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glitch_colors: Option<Vec<String>>,
    /// Cadence in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glitch_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_vignette: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_vignette: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_pixel_ratio: Option<f64>,
    /// Keys this version does not recognise
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl GlitchOptions {
    /// Load options from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let options: GlitchOptions = serde_json::from_str(&content)?;
        Ok(options)
    }

    /// Save options to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn with_palette<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glitch_colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_glyphs(mut self, glyphs: &str) -> Self {
        self.glyphs = Some(glyphs.chars().map(|c| c.to_string()).collect());
        self
    }
}

/// A rejected option; the value it would have replaced stays in effect
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigWarning {
    #[error("unknown option `{0}` ignored")]
    UnknownOption(String),
    #[error("option `{option}` out of range ({value}), keeping previous value")]
    OutOfRange { option: &'static str, value: f64 },
    #[error("glyph {0:?} is not a single printable character, skipped")]
    InvalidGlyph(String),
    #[error("glyph alphabet is empty, keeping previous alphabet")]
    EmptyGlyphs,
    #[error("palette entry {0:?} is not a color, skipped")]
    InvalidColor(String),
}

impl ConfigWarning {
    fn out_of_range(option: &'static str, value: f64) -> Self {
        ConfigWarning::OutOfRange { option, value }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("palette has no usable colors")]
    EmptyPalette,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
