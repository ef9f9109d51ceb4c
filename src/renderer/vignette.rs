//! Vignette overlays
//!
//! Both overlays are radial gradients centred on the surface and filled
//! over the whole area after the glyphs are painted.

use crate::core::Rgba;
use crate::surface::{RadialGradient, Rect, Surface, SurfaceError};

/// Edge darkening: clear out to 60% of the radius, opaque black at the rim
pub fn outer(width: f32, height: f32) -> RadialGradient {
    RadialGradient::new(width / 2.0, height / 2.0, 0.0, width.max(height) / 2.0)
        .with_stop(0.6, Rgba::new(0, 0, 0, 0.0))
        .with_stop(1.0, Rgba::new(0, 0, 0, 1.0))
}

/// Center darkening: 80% black in the middle, clear from 60% outward
pub fn center(width: f32, height: f32) -> RadialGradient {
    RadialGradient::new(width / 2.0, height / 2.0, 0.0, width.max(height) / 3.0)
        .with_stop(0.0, Rgba::new(0, 0, 0, 0.8))
        .with_stop(0.6, Rgba::new(0, 0, 0, 0.0))
}

/// Fill the enabled overlays, outer first
pub fn composite<S: Surface + ?Sized>(
    surface: &mut S,
    outer_enabled: bool,
    center_enabled: bool,
    width: f32,
    height: f32,
) -> Result<(), SurfaceError> {
    let area = Rect::sized(width, height);
    if outer_enabled {
        surface.fill_rect_gradient(area, &outer(width, height))?;
    }
    if center_enabled {
        surface.fill_rect_gradient(area, &center(width, height))?;
    }
    Ok(())
}
