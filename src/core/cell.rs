//! Glitch Cell
//!
//! A single character slot in the glitch grid: the glyph it shows plus the
//! color state of an in-flight transition.

use serde::{Deserialize, Serialize};

use super::color::Rgb;

/// Amount a transition advances per tick. A transition takes 20 ticks.
pub const TRANSITION_STEP: f32 = 0.05;

/// A single cell in the glitch grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Displayed glyph
    pub glyph: char,
    /// Color currently painted
    pub color: Rgb,
    /// Start point of the running transition
    pub from: Rgb,
    /// Color the cell is heading toward
    pub target: Rgb,
    /// Transition progress in [0, 1]; 1 means `color == target`
    pub progress: f32,
}

impl Cell {
    /// Create a settled cell (no pending transition)
    pub fn new(glyph: char, color: Rgb) -> Self {
        Self {
            glyph,
            color,
            from: color,
            target: color,
            progress: 1.0,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.progress < 1.0
    }

    /// Assign a new glyph and target color.
    ///
    /// With `smooth` the current color becomes the start point and the
    /// transition restarts at 0; otherwise the target is applied at once.
    pub fn retarget(&mut self, glyph: char, target: Rgb, smooth: bool) {
        self.glyph = glyph;
        self.target = target;
        if smooth {
            self.from = self.color;
            self.progress = 0.0;
        } else {
            self.settle();
        }
    }

    /// Advance the transition by one step.
    ///
    /// Returns true when the displayed color was recomputed.
    pub fn advance(&mut self, step: f32) -> bool {
        if !self.is_transitioning() {
            return false;
        }
        self.progress += step;
        // Accumulated f32 steps can land a hair below 1.0
        if self.progress >= 1.0 - 1e-4 {
            self.settle();
        } else {
            self.color = self.from.lerp(self.target, self.progress);
        }
        true
    }

    /// Jump to the target color
    pub fn settle(&mut self) {
        self.color = self.target;
        self.from = self.target;
        self.progress = 1.0;
    }
}
