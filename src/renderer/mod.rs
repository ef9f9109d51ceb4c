//! Glitch Renderer Module
//!
//! Drives the grid animation on a [`Surface`](crate::surface::Surface):
//! frame scheduling, resize handling, vignettes and the renderer itself.

mod frame_loop;
mod glitch;
mod resize;
mod schedule;
pub mod vignette;

pub use frame_loop::{FrameLoop, DEFAULT_FRAME_INTERVAL};
pub use glitch::{GlitchRenderer, InitError, RenderStats};
pub use resize::{
    resize_channel, ResizeDebouncer, ResizeNotifier, ResizeSubscription, SurfaceSize, DEFAULT_RESIZE_QUIET,
};
pub use schedule::{FrameId, FrameQueue, FrameScheduler};
