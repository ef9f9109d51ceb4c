//! Host frame loop
//!
//! Drives a [`GlitchRenderer`] that was built on a [`FrameQueue`]: fires
//! the queued frame at a fixed interval and feeds debounced resize events
//! to the renderer's subscription.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use super::glitch::GlitchRenderer;
use super::resize::{ResizeDebouncer, ResizeNotifier, SurfaceSize};
use super::schedule::FrameQueue;
use crate::surface::Surface;

/// Default frame interval (about 60 Hz)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Fixed-interval frame loop
#[derive(Debug)]
pub struct FrameLoop {
    queue: FrameQueue,
    interval: Duration,
    notifier: Option<ResizeNotifier>,
    debouncer: ResizeDebouncer,
    elapsed: Duration,
}

impl FrameLoop {
    /// Loop over `queue`, the same queue the renderer requests frames from
    pub fn new(queue: FrameQueue) -> Self {
        Self {
            queue,
            interval: DEFAULT_FRAME_INTERVAL,
            notifier: None,
            debouncer: ResizeDebouncer::default(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Route resize events to the renderer through `notifier`
    pub fn with_resize(mut self, notifier: ResizeNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_debouncer(mut self, debouncer: ResizeDebouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Virtual time consumed by `run_virtual`
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Report a raw surface size change at `now`
    pub fn surface_resized(&mut self, size: SurfaceSize, now: Duration) {
        self.debouncer.push(size, now);
    }

    /// One loop iteration at time `now`.
    ///
    /// Forwards a settled resize, lets the renderer apply it, then fires the
    /// pending frame. Returns true if the renderer honoured a frame.
    pub fn step<S, R>(&mut self, renderer: &mut GlitchRenderer<S, FrameQueue, R>, now: Duration) -> bool
    where
        S: Surface,
        R: Rng,
    {
        if let Some(size) = self.debouncer.poll(now) {
            let delivered = self
                .notifier
                .as_ref()
                .map_or(false, |notifier| notifier.notify(size));
            if !delivered {
                debug!(width = size.width, height = size.height, "resize dropped, no subscriber");
            }
        }
        renderer.pump_resize_events(now);

        match self.queue.next_due() {
            Some(id) => renderer.on_frame(id, now),
            None => false,
        }
    }

    /// Run `frames` iterations on a virtual clock without sleeping.
    ///
    /// The clock continues from the previous call. Returns the number of
    /// frames the renderer honoured.
    pub fn run_virtual<S, R>(&mut self, renderer: &mut GlitchRenderer<S, FrameQueue, R>, frames: usize) -> usize
    where
        S: Surface,
        R: Rng,
    {
        let mut honoured = 0;
        for _ in 0..frames {
            self.elapsed += self.interval;
            if self.step(renderer, self.elapsed) {
                honoured += 1;
            }
        }
        honoured
    }

    /// Run against the wall clock until `on_frame` returns false or the
    /// renderer stops requesting frames.
    ///
    /// `on_frame` is called after every honoured frame.
    pub fn run_realtime<S, R, C>(&mut self, renderer: &mut GlitchRenderer<S, FrameQueue, R>, mut on_frame: C)
    where
        S: Surface,
        R: Rng,
        C: FnMut(&GlitchRenderer<S, FrameQueue, R>) -> bool,
    {
        let origin = Instant::now();
        let mut deadline = origin;
        loop {
            deadline += self.interval;
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }

            if self.step(renderer, origin.elapsed()) && !on_frame(&*renderer) {
                break;
            }
            if self.queue.pending().is_none() && !self.debouncer.is_pending() {
                break;
            }
        }
    }
}
