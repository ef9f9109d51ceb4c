//! ANSI cell raster
//!
//! A software surface with one slot per character cell. Glyph paints land
//! in the slot under their anchor point; gradient fills composite
//! source-over onto every slot whose centre lies in the filled rect,
//! sampling the gradient at that centre. The result renders as truecolor
//! SGR text for a terminal.

use std::fmt::Write as _;

use tracing::warn;

use super::{RadialGradient, Rect, Surface, SurfaceError};
use crate::core::{GridSize, Rgb, MIN_CELL_SIZE};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    glyph: char,
    fg: Rgb,
    bg: Rgb,
}

impl Slot {
    const BLANK: Slot = Slot {
        glyph: ' ',
        fg: Rgb::BLACK,
        bg: Rgb::BLACK,
    };
}

/// Character-cell software surface
#[derive(Debug, Clone)]
pub struct AnsiSurface {
    cell_width: f32,
    cell_height: f32,
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
    font_size: f32,
    columns: usize,
    rows: usize,
    slots: Vec<Slot>,
}

impl AnsiSurface {
    /// Surface whose raster slots are `cell_width` x `cell_height` logical
    /// pixels. Sizes below one pixel fall back to 1 pixel.
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        let sane = |v: f32| if v.is_finite() && v >= MIN_CELL_SIZE { v } else { MIN_CELL_SIZE };
        Self {
            cell_width: sane(cell_width),
            cell_height: sane(cell_height),
            width: 0.0,
            height: 0.0,
            device_pixel_ratio: 1.0,
            font_size: 16.0,
            columns: 0,
            rows: 0,
            slots: Vec::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Backing-store size in device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).round() as u32,
            (self.height * self.device_pixel_ratio).round() as u32,
        )
    }

    /// Glyph and foreground color at a slot
    pub fn slot(&self, col: usize, row: usize) -> Option<(char, Rgb)> {
        self.index(col, row).map(|i| (self.slots[i].glyph, self.slots[i].fg))
    }

    /// Background color at a slot
    pub fn background(&self, col: usize, row: usize) -> Option<Rgb> {
        self.index(col, row).map(|i| self.slots[i].bg)
    }

    /// Plain glyph dump, one line per row
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.slots.len() + self.rows);
        for row in self.slots.chunks(self.columns.max(1)) {
            out.extend(row.iter().map(|s| s.glyph));
            out.push('\n');
        }
        out
    }

    /// Truecolor ANSI frame. Each row ends with a reset.
    pub fn render_ansi(&self) -> String {
        let mut out = String::with_capacity(self.slots.len() * 8);
        for row in self.slots.chunks(self.columns.max(1)) {
            let mut pen: Option<(Rgb, Rgb)> = None;
            for slot in row {
                if pen != Some((slot.fg, slot.bg)) {
                    let (fg, bg) = (slot.fg, slot.bg);
                    let _ = write!(
                        out,
                        "\x1b[38;2;{};{};{};48;2;{};{};{}m",
                        fg.r, fg.g, fg.b, bg.r, bg.g, bg.b
                    );
                    pen = Some((fg, bg));
                }
                out.push(slot.glyph);
            }
            out.push_str("\x1b[0m\n");
        }
        out
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.columns && row < self.rows).then(|| row * self.columns + col)
    }

    fn slot_at(&self, x: f32, y: f32) -> Option<usize> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        self.index(
            (x / self.cell_width).floor() as usize,
            (y / self.cell_height).floor() as usize,
        )
    }

    fn slot_centre(&self, index: usize) -> (f32, f32) {
        let col = index % self.columns;
        let row = index / self.columns;
        (
            (col as f32 + 0.5) * self.cell_width,
            (row as f32 + 0.5) * self.cell_height,
        )
    }
}

impl Surface for AnsiSurface {
    fn acquire_context(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> Result<(), SurfaceError> {
        let extent = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        self.width = extent(width);
        self.height = extent(height);
        self.device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let (size, clamped) = GridSize::covering_checked(self.width, self.height, self.cell_width, self.cell_height);
        if clamped {
            warn!(width, height, columns = size.columns, rows = size.rows, "raster clamped");
        }
        self.columns = size.columns;
        self.rows = size.rows;
        self.slots = vec![Slot::BLANK; size.cell_count()];
        Ok(())
    }

    fn set_font(&mut self, size: f32) {
        self.font_size = size;
    }

    fn clear_rect(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        for i in 0..self.slots.len() {
            let (x, y) = self.slot_centre(i);
            if rect.contains(x, y) {
                self.slots[i] = Slot::BLANK;
            }
        }
        Ok(())
    }

    fn fill_text(&mut self, glyph: char, x: f32, y: f32, color: Rgb) -> Result<(), SurfaceError> {
        // Paints outside the raster are clipped, as on a canvas
        if let Some(i) = self.slot_at(x, y) {
            self.slots[i].glyph = glyph;
            self.slots[i].fg = color;
        }
        Ok(())
    }

    fn fill_rect_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), SurfaceError> {
        for i in 0..self.slots.len() {
            let (x, y) = self.slot_centre(i);
            if !rect.contains(x, y) {
                continue;
            }
            let paint = gradient.sample(x, y);
            let slot = &mut self.slots[i];
            slot.fg = paint.over(slot.fg);
            slot.bg = paint.over(slot.bg);
        }
        Ok(())
    }
}
