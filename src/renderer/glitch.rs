//! Glitch renderer
//!
//! Owns the grid and the configuration, borrows (or owns) a surface, and
//! advances the animation one frame callback at a time.
//!
//! Lifecycle: the renderer starts stopped. `start` requests a frame from
//! the scheduler; every honoured frame runs `tick`, draws if anything
//! changed, and requests the next frame. `stop` cancels the pending frame,
//! and any callback that still arrives with an old [`FrameId`] is ignored.
//! `destroy` consumes the renderer, so nothing can be called on it
//! afterwards.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use super::resize::{resize_channel, ResizeNotifier, ResizeSubscription};
use super::schedule::{FrameId, FrameScheduler};
use super::vignette;
use crate::app::{ConfigError, ConfigWarning, GlitchConfig, GlitchOptions};
use crate::core::{Grid, GridSize, MAX_CELLS, TRANSITION_STEP};
use crate::surface::{Rect, Surface, SurfaceError, SurfaceHost};

/// Renderer construction error
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("surface `{0}` not found")]
    SurfaceNotFound(String),
    #[error(transparent)]
    Context(#[from] SurfaceError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frame callbacks honoured
    pub frames: u64,
    /// Successful redraws
    pub draws: u64,
    /// Redraws abandoned because the surface failed
    pub skipped: u64,
    /// Mutation passes run
    pub mutation_passes: u64,
}

/// The letter-glitch renderer
pub struct GlitchRenderer<S: Surface, F: FrameScheduler, R: Rng = StdRng> {
    surface: S,
    scheduler: F,
    rng: R,
    config: GlitchConfig,
    grid: Grid,
    width: f32,
    height: f32,
    last_mutation: Duration,
    running: bool,
    frame: Option<FrameId>,
    resize_events: Option<ResizeSubscription>,
    stats: RenderStats,
}

impl<S: Surface, F: FrameScheduler> GlitchRenderer<S, F, StdRng> {
    /// Create a renderer on `surface` seeded from the OS
    pub fn new(surface: S, scheduler: F, config: GlitchConfig) -> Result<Self, InitError> {
        Self::with_rng(surface, scheduler, config, StdRng::from_os_rng())
    }

    /// Resolve surface `id` through `host` and create a renderer on it
    pub fn attach<H>(host: &mut H, id: &str, scheduler: F, config: GlitchConfig) -> Result<Self, InitError>
    where
        H: SurfaceHost<Surface = S>,
    {
        let surface = host
            .resolve(id)
            .ok_or_else(|| InitError::SurfaceNotFound(id.to_string()))?;
        Self::new(surface, scheduler, config)
    }
}

impl<S: Surface, F: FrameScheduler, R: Rng> GlitchRenderer<S, F, R> {
    /// Create a renderer with an explicit random source
    pub fn with_rng(mut surface: S, scheduler: F, mut config: GlitchConfig, rng: R) -> Result<Self, InitError> {
        for warning in config.sanitize()? {
            warn!(%warning, "glitch config");
        }
        surface.acquire_context()?;
        surface.set_font(config.font_size);

        Ok(Self {
            surface,
            scheduler,
            rng,
            config,
            grid: Grid::new(),
            width: 0.0,
            height: 0.0,
            last_mutation: Duration::ZERO,
            running: false,
            frame: None,
            resize_events: None,
            stats: RenderStats::default(),
        })
    }

    /// Open a resize subscription and hand back the host's end.
    ///
    /// Replaces any earlier subscription.
    pub fn subscribe_resize(&mut self) -> ResizeNotifier {
        let (notifier, subscription) = resize_channel();
        self.resize_events = Some(subscription);
        notifier
    }

    pub fn config(&self) -> &GlitchConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Logical surface size from the last resize
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Frame the renderer is waiting on
    pub fn pending_frame(&self) -> Option<FrameId> {
        self.frame
    }

    /// Resize the surface and regenerate the grid.
    ///
    /// Every cell gets a fresh random glyph and color with no transition
    /// pending. Redraws immediately only while running.
    pub fn resize(&mut self, width: f32, height: f32) {
        let extent = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        self.width = extent(width);
        self.height = extent(height);

        if let Err(e) = self
            .surface
            .resize(self.width, self.height, self.config.device_pixel_ratio)
        {
            warn!(error = %e, "surface resize failed");
        }
        // A backing-store resize resets canvas state, font included
        self.surface.set_font(self.config.font_size);

        let (size, clamped) = GridSize::covering_checked(
            self.width,
            self.height,
            self.config.char_width,
            self.config.char_height,
        );
        if clamped {
            warn!(
                width = self.width,
                height = self.height,
                max_cells = MAX_CELLS,
                "surface too large, glitch grid clamped"
            );
        }
        self.grid
            .regenerate(size, &self.config.glyphs, &self.config.palette, &mut self.rng);
        debug!(
            width = self.width,
            height = self.height,
            columns = size.columns,
            rows = size.rows,
            "glitch grid resized"
        );

        if self.running {
            self.redraw();
        }
    }

    /// Advance the animation to `now`. Returns true when a redraw is due.
    pub fn tick(&mut self, now: Duration) -> bool {
        let mut redraw = false;

        if now.saturating_sub(self.last_mutation) >= self.config.cadence {
            if !self.grid.is_empty() {
                let count = self.config.mutations_per_pass(self.grid.len());
                self.grid.mutate(
                    count,
                    &self.config.glyphs,
                    &self.config.palette,
                    self.config.smooth,
                    &mut self.rng,
                );
                self.stats.mutation_passes += 1;
                redraw = true;
            }
            self.last_mutation = now;
        }

        if self.config.smooth && self.grid.advance_transitions(TRANSITION_STEP) {
            redraw = true;
        }

        redraw
    }

    /// Paint the whole frame: clear, glyphs, then vignettes
    pub fn draw(&mut self) -> Result<(), SurfaceError> {
        self.surface.clear_rect(Rect::sized(self.width, self.height))?;

        let (cw, ch) = (self.config.char_width, self.config.char_height);
        for (col, row, cell) in self.grid.iter_positioned() {
            self.surface
                .fill_text(cell.glyph, col as f32 * cw, row as f32 * ch, cell.color)?;
        }

        vignette::composite(
            &mut self.surface,
            self.config.outer_vignette,
            self.config.center_vignette,
            self.width,
            self.height,
        )
    }

    /// Begin requesting frames. No-op while running.
    pub fn start(&mut self, now: Duration) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_mutation = now;
        self.frame = Some(self.scheduler.request_frame());
        debug!("glitch animation started");
    }

    /// Cancel the pending frame. No-op while stopped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(id) = self.frame.take() {
            self.scheduler.cancel_frame(id);
        }
        debug!("glitch animation stopped");
    }

    /// Frame callback from the scheduler.
    ///
    /// Returns false, touching nothing, when stopped or when `id` is not
    /// the frame this renderer requested last.
    pub fn on_frame(&mut self, id: FrameId, now: Duration) -> bool {
        if !self.running || self.frame != Some(id) {
            trace!(frame = id.value(), "ignoring stale frame");
            return false;
        }
        self.frame = None;
        self.stats.frames += 1;

        if self.tick(now) {
            self.redraw();
        }

        self.frame = Some(self.scheduler.request_frame());
        true
    }

    /// Apply the latest size from the resize subscription, if any.
    ///
    /// A running animation is stopped, resized and restarted so the old
    /// frame request is cancelled rather than left behind.
    pub fn pump_resize_events(&mut self, now: Duration) -> bool {
        let size = match self.resize_events.as_ref().and_then(|s| s.latest()) {
            Some(size) => size,
            None => return false,
        };
        if self.running {
            self.stop();
            self.resize(size.width, size.height);
            self.start(now);
        } else {
            self.resize(size.width, size.height);
        }
        true
    }

    /// Merge partial options into the live config.
    ///
    /// Geometry is left alone until the next `resize`; a new font size is
    /// pushed to the surface straight away.
    pub fn update_config(&mut self, options: &GlitchOptions) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut next = self.config.clone();
        let warnings = next.apply(options)?;
        for warning in &warnings {
            warn!(%warning, "glitch config update");
        }
        self.install(next);
        Ok(warnings)
    }

    /// Replace the whole config
    pub fn set_config(&mut self, mut config: GlitchConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
        let warnings = config.sanitize()?;
        for warning in &warnings {
            warn!(%warning, "glitch config");
        }
        self.install(config);
        Ok(warnings)
    }

    /// Tear down: stop, drop the resize subscription, clear the surface.
    pub fn destroy(mut self) {
        self.stop();
        self.resize_events = None;
        if let Err(e) = self.surface.clear_rect(Rect::sized(self.width, self.height)) {
            warn!(error = %e, "clearing surface on destroy failed");
        }
        self.grid.clear();
        debug!("glitch renderer destroyed");
    }

    fn install(&mut self, config: GlitchConfig) {
        let font_changed = config.font_size != self.config.font_size;
        let smoothing_off = self.config.smooth && !config.smooth;
        self.config = config;

        if font_changed {
            self.surface.set_font(self.config.font_size);
        }
        // Nothing advances transitions once smoothing is off
        if smoothing_off {
            self.grid.settle_all();
        }
    }

    fn redraw(&mut self) {
        match self.draw() {
            Ok(()) => self.stats.draws += 1,
            Err(e) => {
                self.stats.skipped += 1;
                warn!(error = %e, "glitch frame skipped");
            }
        }
    }
}

impl<S: Surface, F: FrameScheduler, R: Rng> Drop for GlitchRenderer<S, F, R> {
    fn drop(&mut self) {
        if let Some(id) = self.frame.take() {
            self.scheduler.cancel_frame(id);
        }
    }
}

impl<S: Surface, F: FrameScheduler, R: Rng> std::fmt::Debug for GlitchRenderer<S, F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlitchRenderer")
            .field("size", &(self.width, self.height))
            .field("grid", &self.grid.size())
            .field("running", &self.running)
            .field("frame", &self.frame)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgb;
    use crate::renderer::FrameQueue;
    use crate::surface::{DrawCommand, RecordingSurface};

    type TestRenderer = GlitchRenderer<RecordingSurface, FrameQueue, StdRng>;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn renderer(config: GlitchConfig) -> (TestRenderer, RecordingSurface, FrameQueue) {
        let surface = RecordingSurface::new();
        let queue = FrameQueue::new();
        let r = GlitchRenderer::with_rng(surface.clone(), queue.clone(), config, StdRng::seed_from_u64(42))
            .unwrap();
        (r, surface, queue)
    }

    #[test]
    fn test_construction_sets_font() {
        let (_r, surface, _q) = renderer(GlitchConfig::default());
        assert_eq!(surface.commands(), vec![DrawCommand::SetFont { size: 16.0 }]);
    }

    #[test]
    fn test_construction_fails_without_context() {
        let result = GlitchRenderer::new(
            RecordingSurface::without_context(),
            FrameQueue::new(),
            GlitchConfig::default(),
        );
        assert!(matches!(result, Err(InitError::Context(_))));
    }

    #[test]
    fn test_construction_rejects_empty_palette() {
        let config = GlitchConfig {
            palette: Vec::new(),
            ..GlitchConfig::default()
        };
        let result = GlitchRenderer::new(RecordingSurface::new(), FrameQueue::new(), config);
        assert!(matches!(result, Err(InitError::Config(ConfigError::EmptyPalette))));
    }

    #[test]
    fn test_resize_while_stopped_does_not_draw() {
        let (mut r, surface, _q) = renderer(GlitchConfig::default());
        r.resize(100.0, 100.0);
        assert_eq!(r.grid().len(), 50);
        assert_eq!(surface.clears(), 0);
        assert!(surface.texts().is_empty());
    }

    #[test]
    fn test_resize_while_running_draws() {
        let (mut r, surface, _q) = renderer(GlitchConfig::default());
        r.start(ms(0));
        r.resize(20.0, 20.0);
        assert_eq!(surface.clears(), 1);
        assert_eq!(surface.texts().len(), 2);
    }

    #[test]
    fn test_tick_respects_cadence() {
        let (mut r, _s, _q) = renderer(GlitchConfig {
            smooth: false,
            ..GlitchConfig::default()
        });
        r.resize(100.0, 100.0);
        r.start(ms(1000));
        assert!(!r.tick(ms(1020)));
        assert!(r.tick(ms(1050)));
        assert!(!r.tick(ms(1060)));
        assert!(r.tick(ms(1100)));
        assert_eq!(r.stats().mutation_passes, 2);
    }

    #[test]
    fn test_tick_on_empty_grid_is_idle() {
        let (mut r, _s, _q) = renderer(GlitchConfig::default());
        assert!(!r.tick(ms(500)));
        assert_eq!(r.stats().mutation_passes, 0);
    }

    #[test]
    fn test_smooth_tick_keeps_redrawing_until_settled() {
        let (mut r, _s, _q) = renderer(GlitchConfig {
            cadence: Duration::from_secs(3600),
            ..GlitchConfig::default()
        });
        r.resize(100.0, 100.0);
        assert!(r.tick(Duration::from_secs(3600)));
        assert!(r.grid().transitioning() > 0);
        let mut ticks = 1;
        while r.tick(Duration::from_secs(3600)) {
            ticks += 1;
        }
        assert_eq!(ticks, 20);
        assert_eq!(r.grid().transitioning(), 0);
    }

    #[test]
    fn test_draw_order() {
        let (mut r, surface, _q) = renderer(GlitchConfig {
            center_vignette: true,
            ..GlitchConfig::default()
        });
        r.resize(20.0, 20.0);
        surface.clear_log();
        r.draw().unwrap();
        let commands = surface.commands();
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[0], DrawCommand::Clear { .. }));
        assert!(matches!(commands[1], DrawCommand::Text { x, y, .. } if x == 0.0 && y == 0.0));
        assert!(matches!(commands[2], DrawCommand::Text { x, y, .. } if x == 10.0 && y == 0.0));
        match (&commands[3], &commands[4]) {
            (DrawCommand::Gradient { gradient: outer, .. }, DrawCommand::Gradient { gradient: center, .. }) => {
                assert_eq!(outer.outer_radius, 10.0);
                assert!((center.outer_radius - 20.0 / 3.0).abs() < 1e-5);
            }
            other => panic!("expected two gradients, got {other:?}"),
        }
    }

    #[test]
    fn test_draw_without_vignettes() {
        let (mut r, surface, _q) = renderer(GlitchConfig {
            outer_vignette: false,
            ..GlitchConfig::default()
        });
        r.resize(10.0, 20.0);
        surface.clear_log();
        r.draw().unwrap();
        assert!(!surface
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Gradient { .. })));
    }

    #[test]
    fn test_start_stop_idempotent() {
        let (mut r, _s, queue) = renderer(GlitchConfig::default());
        r.start(ms(0));
        r.start(ms(5));
        assert_eq!(queue.requested(), 1);
        r.stop();
        r.stop();
        assert_eq!(queue.cancelled(), 1);
        assert_eq!(queue.pending(), None);
    }

    #[test]
    fn test_on_frame_requests_next() {
        let (mut r, _s, queue) = renderer(GlitchConfig::default());
        r.resize(50.0, 50.0);
        r.start(ms(0));
        let id = queue.next_due().unwrap();
        assert!(r.on_frame(id, ms(60)));
        assert_eq!(r.stats().frames, 1);
        assert_eq!(r.stats().draws, 1);
        assert!(queue.pending().is_some());
        assert!(!r.on_frame(id, ms(120)));
    }

    #[test]
    fn test_draw_failure_skips_frame() {
        let (mut r, surface, queue) = renderer(GlitchConfig::default());
        r.resize(50.0, 50.0);
        r.start(ms(0));
        surface.set_fail_draws(true);
        let id = queue.next_due().unwrap();
        assert!(r.on_frame(id, ms(60)));
        assert_eq!(r.stats().skipped, 1);
        assert!(r.is_running());
        assert!(queue.pending().is_some());
    }

    #[test]
    fn test_update_config_font_only() {
        let (mut r, surface, _q) = renderer(GlitchConfig::default());
        r.resize(100.0, 100.0);
        surface.clear_log();
        let opts = GlitchOptions {
            font_size: Some(24.0),
            char_width: Some(5.0),
            ..GlitchOptions::default()
        };
        let warnings = r.update_config(&opts).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(surface.commands(), vec![DrawCommand::SetFont { size: 24.0 }]);
        assert_eq!(r.grid().columns(), 10);
    }

    #[test]
    fn test_update_config_rejects_empty_palette() {
        let (mut r, _s, _q) = renderer(GlitchConfig::default());
        let opts = GlitchOptions::default().with_palette(Vec::<String>::new());
        assert!(r.update_config(&opts).is_err());
        assert_eq!(r.config().palette.len(), 3);
    }

    #[test]
    fn test_disabling_smoothing_settles_cells() {
        let (mut r, _s, _q) = renderer(GlitchConfig::default());
        r.resize(100.0, 100.0);
        r.tick(ms(100));
        assert!(r.grid().transitioning() > 0);
        r.update_config(&GlitchOptions {
            smooth: Some(false),
            ..GlitchOptions::default()
        })
        .unwrap();
        assert_eq!(r.grid().transitioning(), 0);
    }

    #[test]
    fn test_set_config_replaces_palette() {
        let (mut r, _s, _q) = renderer(GlitchConfig::default());
        let teal = Rgb::new(0x61, 0xdc, 0xa3);
        r.set_config(GlitchConfig {
            palette: vec![teal],
            smooth: false,
            ..GlitchConfig::default()
        })
        .unwrap();
        r.resize(40.0, 40.0);
        assert!(r.grid().cells().iter().all(|c| c.color == teal));
    }

    #[test]
    fn test_drop_cancels_pending_frame() {
        let (mut r, _s, queue) = renderer(GlitchConfig::default());
        r.start(ms(0));
        drop(r);
        assert_eq!(queue.pending(), None);
    }
}
