//! Glitch Core Module
//!
//! Platform-independent grid state. This module contains:
//! - RGB/RGBA colors and their parsing and interpolation
//! - Cell representation with transition state
//! - The row-major glitch grid and its mutation pass
//!
//! Nothing here draws or keeps time; the renderer drives it.

mod cell;
mod color;
mod grid;

pub use cell::{Cell, TRANSITION_STEP};
pub use color::{ParseColorError, Rgb, Rgba};
pub use grid::{Grid, GridSize, MAX_CELLS, MIN_CELL_SIZE};
