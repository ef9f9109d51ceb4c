//! Glitch grid benchmarks

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glitchgrid::app::GlitchConfig;
use glitchgrid::core::{Grid, GridSize, TRANSITION_STEP};
use glitchgrid::renderer::{FrameQueue, GlitchRenderer};
use glitchgrid::surface::AnsiSurface;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_grid_regenerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    let config = GlitchConfig::default();
    let size = GridSize::covering(1920.0, 1080.0, config.char_width, config.char_height);
    group.throughput(Throughput::Elements(size.cell_count() as u64));

    // Full-HD surface at the default cell size
    group.bench_function("regenerate_1080p", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::new();
        b.iter(|| {
            grid.regenerate(size, &config.glyphs, &config.palette, &mut rng);
            black_box(grid.len())
        })
    });

    group.finish();
}

fn bench_grid_mutate(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    let config = GlitchConfig::default();
    let size = GridSize::covering(1920.0, 1080.0, config.char_width, config.char_height);
    let mut rng = StdRng::seed_from_u64(2);
    let mut grid = Grid::random(size, &config.glyphs, &config.palette, &mut rng);
    let count = config.mutations_per_pass(grid.len());

    group.bench_function("mutate_and_advance", |b| {
        b.iter(|| {
            grid.mutate(count, &config.glyphs, &config.palette, true, &mut rng);
            black_box(grid.advance_transitions(TRANSITION_STEP))
        })
    });

    group.finish();
}

fn bench_ansi_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderer");
    let config = GlitchConfig {
        center_vignette: true,
        ..GlitchConfig::default()
    };
    let surface = AnsiSurface::new(config.char_width, config.char_height);
    let mut renderer = match GlitchRenderer::with_rng(surface, FrameQueue::new(), config, StdRng::seed_from_u64(3)) {
        Ok(renderer) => renderer,
        Err(e) => panic!("renderer: {e}"),
    };
    renderer.resize(800.0, 400.0);

    // One tick plus a full redraw onto the ANSI raster
    group.bench_function("tick_and_draw_800x400", |b| {
        let mut now = Duration::ZERO;
        b.iter(|| {
            now += Duration::from_millis(50);
            renderer.tick(now);
            black_box(renderer.draw().is_ok())
        })
    });

    group.bench_function("render_ansi_800x400", |b| {
        b.iter(|| black_box(renderer.surface().render_ansi().len()))
    });

    group.finish();
}

criterion_group!(benches, bench_grid_regenerate, bench_grid_mutate, bench_ansi_frame);
criterion_main!(benches);
