//! Recording surface
//!
//! Stores every command it receives instead of painting. Clones share one
//! log, so a test can hold a handle while the renderer owns the surface.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{RadialGradient, Rect, Surface, SurfaceError};
use crate::core::Rgb;

/// A single recorded command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Resize {
        width: f32,
        height: f32,
        backing_width: u32,
        backing_height: u32,
    },
    SetFont {
        size: f32,
    },
    Clear {
        rect: Rect,
    },
    Text {
        glyph: char,
        x: f32,
        y: f32,
        color: Rgb,
    },
    Gradient {
        rect: Rect,
        gradient: RadialGradient,
    },
}

#[derive(Debug, Default)]
struct Log {
    commands: Vec<DrawCommand>,
    refuse_context: bool,
    fail_draws: bool,
}

/// Surface that records commands
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Rc<RefCell<Log>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose context can never be acquired
    pub fn without_context() -> Self {
        let surface = Self::new();
        surface.log.borrow_mut().refuse_context = true;
        surface
    }

    /// Make every subsequent draw call fail
    pub fn set_fail_draws(&self, fail: bool) {
        self.log.borrow_mut().fail_draws = fail;
    }

    /// Copy of the command log
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.log.borrow().commands.clone()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().commands.is_empty()
    }

    /// Forget everything recorded so far
    pub fn clear_log(&self) {
        self.log.borrow_mut().commands.clear();
    }

    /// Glyph paints only
    pub fn texts(&self) -> Vec<(char, f32, f32, Rgb)> {
        self.log
            .borrow()
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { glyph, x, y, color } => Some((*glyph, *x, *y, *color)),
                _ => None,
            })
            .collect()
    }

    /// Number of clear commands recorded
    pub fn clears(&self) -> usize {
        self.log
            .borrow()
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Clear { .. }))
            .count()
    }

    /// Serialize the log as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.log.borrow().commands)
    }

    fn record(&self, command: DrawCommand) -> Result<(), SurfaceError> {
        let mut log = self.log.borrow_mut();
        if log.fail_draws {
            return Err(SurfaceError::Draw("recording surface set to fail".to_string()));
        }
        log.commands.push(command);
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn acquire_context(&mut self) -> Result<(), SurfaceError> {
        if self.log.borrow().refuse_context {
            return Err(SurfaceError::ContextUnavailable("context refused".to_string()));
        }
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> Result<(), SurfaceError> {
        self.record(DrawCommand::Resize {
            width,
            height,
            backing_width: (width * device_pixel_ratio).round() as u32,
            backing_height: (height * device_pixel_ratio).round() as u32,
        })
    }

    fn set_font(&mut self, size: f32) {
        // Font changes are not draws; record them even when draws fail
        self.log.borrow_mut().commands.push(DrawCommand::SetFont { size });
    }

    fn clear_rect(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        self.record(DrawCommand::Clear { rect })
    }

    fn fill_text(&mut self, glyph: char, x: f32, y: f32, color: Rgb) -> Result<(), SurfaceError> {
        self.record(DrawCommand::Text { glyph, x, y, color })
    }

    fn fill_rect_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), SurfaceError> {
        self.record(DrawCommand::Gradient {
            rect,
            gradient: gradient.clone(),
        })
    }
}
