//! Glitch Grid
//!
//! A row-major array of cells sized to the drawing surface. The grid holds
//! no geometry in pixels; callers derive positions from the cell size.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::color::Rgb;

/// Upper bound on the cells a grid will hold
pub const MAX_CELLS: usize = 1 << 20;

/// Smallest accepted cell width or height, in pixels
pub const MIN_CELL_SIZE: f32 = 1.0;

/// Grid dimensions in cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub columns: usize,
    pub rows: usize,
}

impl GridSize {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Number of cells needed to cover a `width` x `height` surface.
    ///
    /// Partial cells at the right and bottom edges count as whole cells.
    /// Non-finite or negative surface sizes produce an empty grid, and the
    /// result never holds more than [`MAX_CELLS`].
    pub fn covering(width: f32, height: f32, char_width: f32, char_height: f32) -> Self {
        Self::covering_checked(width, height, char_width, char_height).0
    }

    /// Like [`GridSize::covering`], also reporting whether the size was
    /// clamped to [`MAX_CELLS`].
    pub fn covering_checked(width: f32, height: f32, char_width: f32, char_height: f32) -> (Self, bool) {
        let span = |extent: f32, cell: f32| -> usize {
            if !extent.is_finite() || extent <= 0.0 || !cell.is_finite() || cell <= 0.0 {
                return 0;
            }
            let cells = (f64::from(extent) / f64::from(cell)).ceil();
            if cells > MAX_CELLS as f64 {
                MAX_CELLS + 1
            } else {
                cells as usize
            }
        };
        Self::new(span(width, char_width), span(height, char_height)).capped()
    }

    /// Shrink to at most [`MAX_CELLS`] cells, rows first.
    ///
    /// Returns the bounded size and whether anything was cut.
    pub fn capped(self) -> (Self, bool) {
        let columns = self.columns.min(MAX_CELLS);
        let mut rows = self.rows.min(MAX_CELLS);
        if columns.checked_mul(rows).map_or(true, |n| n > MAX_CELLS) {
            rows = MAX_CELLS / columns;
        }
        let size = Self::new(columns, rows);
        (size, size != self)
    }

    pub fn cell_count(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

/// Pick a uniformly random element. The slice must be nonempty.
pub(crate) fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    items[rng.random_range(0..items.len())]
}

/// The glitch grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Cell>,
    size: GridSize,
}

impl Grid {
    /// Empty grid (0 x 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid filled with random settled cells
    pub fn random<R: Rng + ?Sized>(
        size: GridSize,
        glyphs: &[char],
        palette: &[Rgb],
        rng: &mut R,
    ) -> Self {
        let mut grid = Self::new();
        grid.regenerate(size, glyphs, palette, rng);
        grid
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn columns(&self) -> usize {
        self.size.columns
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get a reference to a cell
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.size.columns {
            return None;
        }
        self.cells.get(row * self.size.columns + col)
    }

    /// Get a mutable reference to a cell
    pub fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut Cell> {
        if col >= self.size.columns {
            return None;
        }
        self.cells.get_mut(row * self.size.columns + col)
    }

    /// Column and row of a flat index
    pub fn position(&self, index: usize) -> (usize, usize) {
        match self.size.columns {
            0 => (0, 0),
            cols => (index % cols, index / cols),
        }
    }

    /// Iterate cells with their (column, row)
    pub fn iter_positioned(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let (col, row) = self.position(i);
            (col, row, cell)
        })
    }

    /// Discard every cell and refill at `size` with random settled cells.
    ///
    /// `glyphs` and `palette` must be nonempty unless `size` is empty.
    /// Sizes above [`MAX_CELLS`] are capped.
    pub fn regenerate<R: Rng + ?Sized>(
        &mut self,
        size: GridSize,
        glyphs: &[char],
        palette: &[Rgb],
        rng: &mut R,
    ) {
        let (size, _) = size.capped();
        let count = size.cell_count();
        self.cells.clear();
        self.cells.reserve_exact(count);
        for _ in 0..count {
            self.cells.push(Cell::new(pick(rng, glyphs), pick(rng, palette)));
        }
        self.size = size;
    }

    /// Retarget `count` randomly selected cells.
    ///
    /// Indices are drawn with replacement, so a cell can be hit more than
    /// once in a pass. Returns the number of selections made.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        glyphs: &[char],
        palette: &[Rgb],
        smooth: bool,
        rng: &mut R,
    ) -> usize {
        if self.cells.is_empty() {
            return 0;
        }
        let len = self.cells.len();
        for _ in 0..count {
            let index = rng.random_range(0..len);
            let glyph = pick(rng, glyphs);
            let target = pick(rng, palette);
            self.cells[index].retarget(glyph, target, smooth);
        }
        count
    }

    /// Advance every in-flight transition by `step`.
    ///
    /// Returns true if any cell's displayed color was recomputed.
    pub fn advance_transitions(&mut self, step: f32) -> bool {
        let mut changed = false;
        for cell in &mut self.cells {
            changed |= cell.advance(step);
        }
        changed
    }

    /// Finish every in-flight transition at once
    pub fn settle_all(&mut self) {
        for cell in &mut self.cells {
            cell.settle();
        }
    }

    /// Number of cells with a pending transition
    pub fn transitioning(&self) -> usize {
        self.cells.iter().filter(|c| c.is_transitioning()).count()
    }

    /// Drop all cells
    pub fn clear(&mut self) {
        self.cells = Vec::new();
        self.size = GridSize::default();
    }

    /// Rows of glyphs, for text dumps
    pub fn to_lines(&self) -> Vec<String> {
        if self.size.columns == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.size.columns)
            .map(|row| row.iter().map(|c| c.glyph).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const GLYPHS: &[char] = &['A', 'B', 'C'];
    const PALETTE: &[Rgb] = &[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)];

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_covering_rounds_up() {
        assert_eq!(GridSize::covering(100.0, 100.0, 10.0, 20.0), GridSize::new(10, 5));
        assert_eq!(GridSize::covering(101.0, 81.0, 10.0, 20.0), GridSize::new(11, 5));
        assert_eq!(GridSize::covering(0.0, 50.0, 10.0, 20.0), GridSize::new(0, 3));
        assert_eq!(GridSize::covering(f32::NAN, -3.0, 10.0, 20.0), GridSize::new(0, 0));
    }

    #[test]
    fn test_covering_caps_huge_surfaces() {
        let (size, clamped) = GridSize::covering_checked(1e30, 1e30, 10.0, 20.0);
        assert!(clamped);
        assert!(size.cell_count() <= MAX_CELLS);
        assert_eq!(size.columns, MAX_CELLS);
        assert_eq!(size.rows, 1);

        let (size, clamped) = GridSize::covering_checked(800.0, 20.0, 1e-30, 20.0);
        assert!(clamped);
        assert_eq!(size, GridSize::new(MAX_CELLS, 1));

        let (size, clamped) = GridSize::covering_checked(4000.0, 4000.0, 1.0, 1.0);
        assert!(clamped);
        assert_eq!(size, GridSize::new(4000, MAX_CELLS / 4000));

        assert_eq!(GridSize::covering_checked(800.0, 400.0, 10.0, 20.0), (GridSize::new(80, 20), false));
    }

    #[test]
    fn test_cell_count_saturates() {
        assert_eq!(GridSize::new(usize::MAX, 2).cell_count(), usize::MAX);
        let (size, clamped) = GridSize::new(usize::MAX, usize::MAX).capped();
        assert!(clamped);
        assert_eq!(size, GridSize::new(MAX_CELLS, 1));
    }

    #[test]
    fn test_regenerate_caps_oversized_grid() {
        let grid = Grid::random(GridSize::new(MAX_CELLS, 3), GLYPHS, PALETTE, &mut rng());
        assert_eq!(grid.len(), MAX_CELLS);
        assert_eq!(grid.size(), GridSize::new(MAX_CELLS, 1));
    }

    #[test]
    fn test_regenerate_fills_settled_cells() {
        let grid = Grid::random(GridSize::new(8, 3), GLYPHS, PALETTE, &mut rng());
        assert_eq!(grid.len(), 24);
        assert_eq!(grid.columns(), 8);
        assert_eq!(grid.rows(), 3);
        for cell in grid.cells() {
            assert!(GLYPHS.contains(&cell.glyph));
            assert!(PALETTE.contains(&cell.color));
            assert_eq!(cell.color, cell.target);
            assert_eq!(cell.progress, 1.0);
        }
    }

    #[test]
    fn test_regenerate_discards_old_content() {
        let mut r = rng();
        let mut grid = Grid::random(GridSize::new(4, 4), GLYPHS, PALETTE, &mut r);
        grid.cell_mut(0, 0).unwrap().glyph = 'Z';
        grid.regenerate(GridSize::new(4, 4), GLYPHS, PALETTE, &mut r);
        assert_ne!(grid.cell(0, 0).unwrap().glyph, 'Z');
    }

    #[test]
    fn test_cell_access() {
        let grid = Grid::random(GridSize::new(5, 2), GLYPHS, PALETTE, &mut rng());
        assert!(grid.cell(4, 1).is_some());
        assert!(grid.cell(5, 0).is_none());
        assert!(grid.cell(0, 2).is_none());
        assert_eq!(grid.position(7), (2, 1));
    }

    #[test]
    fn test_mutate_empty_grid() {
        let mut grid = Grid::new();
        assert_eq!(grid.mutate(3, GLYPHS, PALETTE, true, &mut rng()), 0);
    }

    #[test]
    fn test_mutate_hard_sets_color() {
        let mut grid = Grid::random(GridSize::new(4, 4), GLYPHS, PALETTE, &mut rng());
        grid.mutate(50, GLYPHS, PALETTE, false, &mut rng());
        assert_eq!(grid.transitioning(), 0);
        assert!(grid.cells().iter().all(|c| c.color == c.target));
    }

    #[test]
    fn test_mutate_smooth_starts_transitions() {
        let mut grid = Grid::random(GridSize::new(4, 4), GLYPHS, PALETTE, &mut rng());
        grid.mutate(4, GLYPHS, PALETTE, true, &mut rng());
        let pending = grid.transitioning();
        assert!(pending >= 1 && pending <= 4);
        assert!(grid.advance_transitions(0.05));
    }

    #[test]
    fn test_advance_without_pending_reports_no_change() {
        let mut grid = Grid::random(GridSize::new(4, 4), GLYPHS, PALETTE, &mut rng());
        assert!(!grid.advance_transitions(0.05));
    }

    #[test]
    fn test_settle_all() {
        let mut grid = Grid::random(GridSize::new(4, 4), GLYPHS, PALETTE, &mut rng());
        grid.mutate(8, GLYPHS, PALETTE, true, &mut rng());
        grid.settle_all();
        assert_eq!(grid.transitioning(), 0);
        assert!(grid.cells().iter().all(|c| c.color == c.target));
    }

    #[test]
    fn test_to_lines() {
        let grid = Grid::random(GridSize::new(3, 2), &['X'], PALETTE, &mut rng());
        assert_eq!(grid.to_lines(), vec!["XXX".to_string(), "XXX".to_string()]);
    }
}
