//! Glitchgrid Library
//!
//! An animated "letter glitch" backdrop: a grid of random glyphs whose
//! characters and colors mutate on a timer, painted onto an abstract
//! drawing surface with optional vignette overlays. A small feedback
//! service ships alongside it.
//!
//! - `core`: cells, colors and the glitch grid
//! - `app`: configuration and logging setup
//! - `surface`: the drawing abstraction plus recording and ANSI surfaces
//! - `renderer`: the animation driver, frame scheduling and resize handling
//! - `feedback`: feedback storage, validation and the HTTP service

pub mod app;
pub mod core;
pub mod feedback;
pub mod renderer;
pub mod surface;

pub use app::{GlitchConfig, GlitchOptions};
pub use renderer::{FrameLoop, FrameQueue, GlitchRenderer};
pub use surface::{AnsiSurface, RecordingSurface, Surface};
