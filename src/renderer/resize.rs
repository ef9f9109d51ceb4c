//! Resize notifications
//!
//! The host pushes surface sizes into a [`ResizeNotifier`]; the renderer
//! holds the matching [`ResizeSubscription`] and applies only the latest
//! size when it pumps events. Dropping the subscription releases it:
//! further notifications report `false`.
//!
//! Debouncing is the host's job. [`ResizeDebouncer`] releases the last size
//! of a burst once no event has arrived for the quiet period.

use std::sync::mpsc;
use std::time::Duration;

/// Quiet period before a burst of resize events is released
pub const DEFAULT_RESIZE_QUIET: Duration = Duration::from_millis(100);

/// Surface size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Create a connected notifier/subscription pair
pub fn resize_channel() -> (ResizeNotifier, ResizeSubscription) {
    let (tx, rx) = mpsc::channel();
    (ResizeNotifier { tx }, ResizeSubscription { rx })
}

/// Host side of a resize subscription
#[derive(Debug, Clone)]
pub struct ResizeNotifier {
    tx: mpsc::Sender<SurfaceSize>,
}

impl ResizeNotifier {
    /// Deliver a size. Returns false once the subscriber is gone.
    pub fn notify(&self, size: SurfaceSize) -> bool {
        self.tx.send(size).is_ok()
    }
}

/// Renderer side of a resize subscription
#[derive(Debug)]
pub struct ResizeSubscription {
    rx: mpsc::Receiver<SurfaceSize>,
}

impl ResizeSubscription {
    /// Drain pending notifications and return the most recent one
    pub fn latest(&self) -> Option<SurfaceSize> {
        self.rx.try_iter().last()
    }
}

/// Collapses bursts of resize events into one
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet: Duration,
    pending: Option<(SurfaceSize, Duration)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_QUIET)
    }
}

impl ResizeDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    /// Record a raw event at `now`, restarting the quiet period
    pub fn push(&mut self, size: SurfaceSize, now: Duration) {
        self.pending = Some((size, now));
    }

    /// Release the pending size if the quiet period has elapsed
    pub fn poll(&mut self, now: Duration) -> Option<SurfaceSize> {
        match self.pending {
            Some((size, at)) if now.saturating_sub(at) >= self.quiet => {
                self.pending = None;
                Some(size)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
