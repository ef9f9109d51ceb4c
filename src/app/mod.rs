//! Application glue module
//!
//! Configuration, logging, and application-level utilities.

mod config;
mod logging;

pub use config::{
    ConfigError, ConfigWarning, GlitchConfig, GlitchOptions, DEFAULT_GLYPHS, DEFAULT_PALETTE,
};
pub use logging::init_logging;
