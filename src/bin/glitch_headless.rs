//! Glitch Headless Runner
//!
//! Runs the glitch animation against an in-memory ANSI surface and prints
//! the final frame, or streams frames to the terminal with `--live`.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use glitchgrid::app::{init_logging, GlitchConfig, GlitchOptions};
use glitchgrid::renderer::{FrameLoop, FrameQueue, GlitchRenderer, SurfaceSize};
use glitchgrid::surface::AnsiSurface;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::{error, info, warn};

type AnsiRenderer = GlitchRenderer<AnsiSurface, FrameQueue, StdRng>;

fn main() -> ExitCode {
    init_logging("warn");

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut width = 800.0f32;
    let mut height = 400.0f32;
    let mut frames = 60usize;
    let mut config_file: Option<PathBuf> = None;
    let mut save_config: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut resizes: Vec<(usize, SurfaceSize)> = Vec::new();
    let mut output_format = OutputFormat::Ansi;
    let mut live = false;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-W" | "--width" => {
                i += 1;
                if i < args.len() {
                    width = args[i].parse().unwrap_or(800.0);
                }
            },
            "-H" | "--height" => {
                i += 1;
                if i < args.len() {
                    height = args[i].parse().unwrap_or(400.0);
                }
            },
            "-n" | "--frames" => {
                i += 1;
                if i < args.len() {
                    frames = args[i].parse().unwrap_or(60);
                }
            },
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(PathBuf::from(&args[i]));
                }
            },
            "--save-config" => {
                i += 1;
                if i < args.len() {
                    save_config = Some(PathBuf::from(&args[i]));
                }
            },
            "-s" | "--seed" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            },
            "-r" | "--resize" => {
                i += 1;
                if i < args.len() {
                    match parse_resize(&args[i]) {
                        Some(resize) => resizes.push(resize),
                        None => {
                            eprintln!("Invalid resize '{}', expected WxH@FRAME", args[i]);
                            return ExitCode::FAILURE;
                        },
                    }
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "-a" | "--ansi" => {
                output_format = OutputFormat::Ansi;
            },
            "-l" | "--live" => {
                live = true;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            other => {
                eprintln!("Unknown argument '{}'", other);
                print_help();
                return ExitCode::FAILURE;
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    // Load configuration
    let options = match &config_file {
        Some(path) => match GlitchOptions::load(path) {
            Ok(options) => options,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load config");
                return ExitCode::FAILURE;
            },
        },
        None => GlitchOptions::default(),
    };
    let config = match GlitchConfig::from_options(&options) {
        Ok((config, warnings)) => {
            for warning in warnings {
                eprintln!("Warning: {}", warning);
            }
            config
        },
        Err(e) => {
            error!(error = %e, "invalid config");
            return ExitCode::FAILURE;
        },
    };

    if let Some(path) = &save_config {
        if let Err(e) = config.to_options().save(path) {
            error!(path = %path.display(), error = %e, "failed to save config");
            return ExitCode::FAILURE;
        }
        info!(path = %path.display(), "config saved");
    }

    // Create renderer
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let surface = AnsiSurface::new(config.char_width, config.char_height);
    let queue = FrameQueue::new();
    let mut renderer = match GlitchRenderer::with_rng(surface, queue.clone(), config, rng) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!(error = %e, "failed to create renderer");
            return ExitCode::FAILURE;
        },
    };
    let notifier = renderer.subscribe_resize();
    let mut frame_loop = FrameLoop::new(queue).with_resize(notifier);

    renderer.resize(width, height);
    renderer.start(Duration::ZERO);

    if live {
        if !resizes.is_empty() {
            warn!("--resize is ignored in live mode");
        }
        run_live(&mut renderer, &mut frame_loop, frames);
        renderer.destroy();
        return ExitCode::SUCCESS;
    }

    // Run on a virtual clock, injecting resizes at their frame
    for frame in 0..frames {
        for (_, size) in resizes.iter().filter(|(at, _)| *at == frame) {
            frame_loop.surface_resized(*size, frame_loop.elapsed());
        }
        frame_loop.run_virtual(&mut renderer, 1);
    }

    // Output result
    let surface = renderer.surface();
    match output_format {
        OutputFormat::Ansi => print!("{}", surface.render_ansi()),
        OutputFormat::Text => print!("{}", surface.to_text()),
        OutputFormat::Json => {
            let stats = renderer.stats();
            let snapshot = json!({
                "width": renderer.size().0,
                "height": renderer.size().1,
                "columns": renderer.grid().columns(),
                "rows": renderer.grid().rows(),
                "frames": stats.frames,
                "draws": stats.draws,
                "skipped": stats.skipped,
                "mutationPasses": stats.mutation_passes,
                "lines": renderer.grid().to_lines(),
            });
            match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing snapshot: {}", e);
                    return ExitCode::FAILURE;
                },
            }
        },
    }

    renderer.destroy();
    ExitCode::SUCCESS
}

/// Stream frames to stdout in real time. `frames == 0` runs until killed.
fn run_live(renderer: &mut AnsiRenderer, frame_loop: &mut FrameLoop, frames: usize) {
    let mut stdout = io::stdout();
    // Clear screen, hide cursor
    let _ = write!(stdout, "\x1b[2J\x1b[?25l");

    let mut shown = 0usize;
    frame_loop.run_realtime(renderer, |r| {
        shown += 1;
        let _ = write!(stdout, "\x1b[H{}", r.surface().render_ansi());
        let _ = stdout.flush();
        frames == 0 || shown < frames
    });

    let _ = writeln!(stdout, "\x1b[0m\x1b[?25h");
    let _ = stdout.flush();
}

fn parse_resize(arg: &str) -> Option<(usize, SurfaceSize)> {
    let (size, frame) = arg.split_once('@')?;
    let (w, h) = size.split_once('x')?;
    Some((frame.parse().ok()?, SurfaceSize::new(w.parse().ok()?, h.parse().ok()?)))
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Ansi,
    Text,
    Json,
}

fn print_help() {
    println!("Glitch Headless Runner");
    println!();
    println!("Usage: glitch-headless [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -W, --width <PX>          Surface width (default: 800)");
    println!("  -H, --height <PX>         Surface height (default: 400)");
    println!("  -n, --frames <N>          Frames to run, 0 = forever in live mode (default: 60)");
    println!("  -c, --config <PATH>       Load options from a JSON file");
    println!("      --save-config <PATH>  Write the effective options to a JSON file");
    println!("  -s, --seed <N>            Seed the random source");
    println!("  -r, --resize <WxH@FRAME>  Resize the surface at a frame (repeatable)");
    println!("  -a, --ansi                Print the final frame as truecolor ANSI (default)");
    println!("  -t, --text                Print the final frame as plain glyphs");
    println!("  -j, --json                Print a JSON summary");
    println!("  -l, --live                Stream frames to the terminal");
    println!("  -h, --help                Show this help message");
    println!();
    println!("Environment:");
    println!("  RUST_LOG                  Log filter (default: warn)");
}
