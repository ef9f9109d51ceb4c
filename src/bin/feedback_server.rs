//! Feedback Server
//!
//! Serves the feedback endpoints over HTTP, storing submissions in a JSON
//! file.

use std::path::PathBuf;
use std::process::ExitCode;

use glitchgrid::app::init_logging;
use glitchgrid::feedback::{FeedbackService, FeedbackStore, DEFAULT_PORT, DEFAULT_STORE_FILE};

use tracing::{error, info};

fn main() -> ExitCode {
    init_logging("info");

    let args: Vec<String> = std::env::args().collect();

    // Environment first, flags override
    let mut port = std::env::var("FEEDBACK_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let mut file = std::env::var("FEEDBACK_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_FILE));
    let mut host = String::from("0.0.0.0");
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-p" | "--port" => {
                i += 1;
                if i < args.len() {
                    port = args[i].parse().unwrap_or(DEFAULT_PORT);
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    file = PathBuf::from(&args[i]);
                }
            },
            "--host" => {
                i += 1;
                if i < args.len() {
                    host = args[i].clone();
                }
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

    let store = match FeedbackStore::open(&file) {
        Ok(store) => store,
        Err(e) => {
            error!(path = %file.display(), error = %e, "failed to open feedback store");
            return ExitCode::FAILURE;
        },
    };
    info!(path = %file.display(), "feedback store ready");

    let addr = format!("{}:{}", host, port);
    match FeedbackService::new(store).serve(&addr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%addr, error = %e, "feedback server failed");
            ExitCode::FAILURE
        },
    }
}

fn print_help() {
    println!("Feedback Server");
    println!();
    println!("Usage: feedback-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -p, --port <PORT>  Listen port (default: 3000)");
    println!("  -f, --file <PATH>  Feedback store file (default: feedback.json)");
    println!("      --host <ADDR>  Listen address (default: 0.0.0.0)");
    println!("  -h, --help         Show this help message");
    println!();
    println!("Environment:");
    println!("  FEEDBACK_PORT      Listen port");
    println!("  FEEDBACK_FILE      Feedback store file");
    println!("  RUST_LOG           Log filter (default: info)");
}
