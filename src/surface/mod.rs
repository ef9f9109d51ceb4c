//! Drawing Surfaces
//!
//! The renderer paints through the [`Surface`] trait: clear a region, fill a
//! glyph at a position with a color, and fill a rect with a radial gradient.
//! Any backend with those capabilities can stand in for a browser canvas.
//!
//! Backends:
//! - [`RecordingSurface`]: keeps a log of every command (tests, snapshots)
//! - [`AnsiSurface`]: software cell raster that renders truecolor ANSI

mod ansi;
mod gradient;
mod recording;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::Rgb;

pub use ansi::AnsiSurface;
pub use gradient::{ColorStop, RadialGradient};
pub use recording::{DrawCommand, RecordingSurface};

/// Axis-aligned rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rect anchored at the origin
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// Surface error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("2D drawing context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("surface lost")]
    Lost,
    #[error("draw failed: {0}")]
    Draw(String),
}

/// A 2D drawing target the renderer can paint on
pub trait Surface {
    /// Obtain the 2D drawing context. Called once, at renderer construction.
    fn acquire_context(&mut self) -> Result<(), SurfaceError>;

    /// Size the surface to `width` x `height` logical pixels.
    ///
    /// The backing store is `device_pixel_ratio` times larger; drawing
    /// coordinates stay logical.
    fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> Result<(), SurfaceError>;

    /// Font size, in logical pixels, for subsequent glyphs
    fn set_font(&mut self, size: f32);

    fn clear_rect(&mut self, rect: Rect) -> Result<(), SurfaceError>;

    /// Paint `glyph` with its top-left corner at (`x`, `y`)
    fn fill_text(&mut self, glyph: char, x: f32, y: f32, color: Rgb) -> Result<(), SurfaceError>;

    fn fill_rect_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), SurfaceError>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn acquire_context(&mut self) -> Result<(), SurfaceError> {
        (**self).acquire_context()
    }

    fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> Result<(), SurfaceError> {
        (**self).resize(width, height, device_pixel_ratio)
    }

    fn set_font(&mut self, size: f32) {
        (**self).set_font(size)
    }

    fn clear_rect(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        (**self).clear_rect(rect)
    }

    fn fill_text(&mut self, glyph: char, x: f32, y: f32, color: Rgb) -> Result<(), SurfaceError> {
        (**self).fill_text(glyph, x, y, color)
    }

    fn fill_rect_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), SurfaceError> {
        (**self).fill_rect_gradient(rect, gradient)
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn acquire_context(&mut self) -> Result<(), SurfaceError> {
        (**self).acquire_context()
    }

    fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> Result<(), SurfaceError> {
        (**self).resize(width, height, device_pixel_ratio)
    }

    fn set_font(&mut self, size: f32) {
        (**self).set_font(size)
    }

    fn clear_rect(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        (**self).clear_rect(rect)
    }

    fn fill_text(&mut self, glyph: char, x: f32, y: f32, color: Rgb) -> Result<(), SurfaceError> {
        (**self).fill_text(glyph, x, y, color)
    }

    fn fill_rect_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), SurfaceError> {
        (**self).fill_rect_gradient(rect, gradient)
    }
}

/// Resolves surfaces by id, the way a page resolves a canvas element
pub trait SurfaceHost {
    type Surface: Surface;

    fn resolve(&mut self, id: &str) -> Option<Self::Surface>;
}

/// A map-backed [`SurfaceHost`]. Resolving hands out a clone.
#[derive(Debug, Default)]
pub struct SurfaceRegistry<S> {
    surfaces: HashMap<String, S>,
}

impl<S: Surface + Clone> SurfaceRegistry<S> {
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
        }
    }

    pub fn register(&mut self, id: impl Into<String>, surface: S) {
        self.surfaces.insert(id.into(), surface);
    }
}

impl<S: Surface + Clone> SurfaceHost for SurfaceRegistry<S> {
    type Surface = S;

    fn resolve(&mut self, id: &str) -> Option<S> {
        self.surfaces.get(id).cloned()
    }
}
