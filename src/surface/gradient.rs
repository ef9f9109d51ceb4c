//! Radial gradients
//!
//! Mirrors the canvas model: two concentric circles, with stop offsets in
//! [0, 1] measured from the inner circle to the outer one. Outside the
//! first and last stop the end colors extend.

use serde::{Deserialize, Serialize};

use crate::core::Rgba;

/// One color stop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Concentric radial gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    stops: Vec<ColorStop>,
}

impl RadialGradient {
    pub fn new(cx: f32, cy: f32, inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            cx,
            cy,
            inner_radius,
            outer_radius,
            stops: Vec::new(),
        }
    }

    /// Add a stop. Offsets are clamped to [0, 1]; stops at equal offsets
    /// keep insertion order.
    pub fn add_color_stop(&mut self, offset: f32, color: Rgba) {
        let offset = if offset.is_nan() { 0.0 } else { offset.clamp(0.0, 1.0) };
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
    }

    pub fn with_stop(mut self, offset: f32, color: Rgba) -> Self {
        self.add_color_stop(offset, color);
        self
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at gradient offset `t`
    pub fn color_at(&self, t: f32) -> Rgba {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Rgba::TRANSPARENT,
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.offset && t <= b.offset {
                let span = b.offset - a.offset;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.offset) / span);
            }
        }
        last.color
    }

    /// Gradient offset of the point (`x`, `y`)
    pub fn offset_at(&self, x: f32, y: f32) -> f32 {
        let distance = ((x - self.cx).powi(2) + (y - self.cy).powi(2)).sqrt();
        let span = self.outer_radius - self.inner_radius;
        if span <= 0.0 {
            return if distance >= self.outer_radius { 1.0 } else { 0.0 };
        }
        (distance - self.inner_radius) / span
    }

    /// Color of the gradient at the point (`x`, `y`)
    pub fn sample(&self, x: f32, y: f32) -> Rgba {
        self.color_at(self.offset_at(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vignette() -> RadialGradient {
        RadialGradient::new(50.0, 50.0, 0.0, 50.0)
            .with_stop(0.6, Rgba::new(0, 0, 0, 0.0))
            .with_stop(1.0, Rgba::new(0, 0, 0, 1.0))
    }

    #[test]
    fn test_empty_gradient_is_transparent() {
        let g = RadialGradient::new(0.0, 0.0, 0.0, 10.0);
        assert_eq!(g.color_at(0.5), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_clamps_outside_stops() {
        let g = vignette();
        assert_eq!(g.color_at(0.0).a, 0.0);
        assert_eq!(g.color_at(0.6).a, 0.0);
        assert_eq!(g.color_at(1.0).a, 1.0);
        assert_eq!(g.color_at(3.0).a, 1.0);
    }

    #[test]
    fn test_interpolates_between_stops() {
        let g = vignette();
        let mid = g.color_at(0.8);
        assert!((mid.a - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_stops_sorted() {
        let g = RadialGradient::new(0.0, 0.0, 0.0, 1.0)
            .with_stop(1.0, Rgba::new(0, 0, 0, 1.0))
            .with_stop(0.0, Rgba::new(0, 0, 0, 0.8));
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 1.0]);
    }

    #[test]
    fn test_sample_by_distance() {
        let g = vignette();
        assert_eq!(g.sample(50.0, 50.0).a, 0.0);
        assert_eq!(g.sample(100.0, 50.0).a, 1.0);
        assert_eq!(g.sample(0.0, 0.0).a, 1.0);
    }
}
