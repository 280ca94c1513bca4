use crate::colors::{CellStyle, ColorContext, Palette, SchemeName, PALETTE_SIZE};
use crate::terminal::Canvas;
use crate::text::{ContentBounds, TextBlock};
use super::ModeKind;

/// The block being animated and everything derived from it.
#[derive(Clone, Debug)]
pub struct Stage {
    block: TextBlock,
    bounds: ContentBounds,
    rows: u16,
    cols: u16,
    scheme: SchemeName,
    palette: Palette,
}

impl Stage {
    pub fn new(block: TextBlock, rows: u16, cols: u16, scheme: SchemeName) -> Self {
        let bounds = ContentBounds::compute(&block, rows, cols);
        Self { block, bounds, rows, cols, scheme, palette: Palette::default() }
    }

    pub fn block(&self) -> &TextBlock {
        &self.block
    }

    pub fn bounds(&self) -> &ContentBounds {
        &self.bounds
    }

    pub fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    pub fn scheme(&self) -> SchemeName {
        self.scheme
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replace the block being shown.
    pub fn set_block(&mut self, block: TextBlock) {
        self.block = block;
        self.bounds = ContentBounds::compute(&self.block, self.rows, self.cols);
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.rows = rows;
        self.cols = cols;
        self.bounds = ContentBounds::compute(&self.block, rows, cols);
    }

    pub fn set_scheme(&mut self, scheme: SchemeName) {
        self.scheme = scheme;
    }

    /// Rebuild the palette for the current scheme.
    pub fn regenerate_palette(&mut self, colors: &mut ColorContext) {
        self.palette = colors.palette(self.scheme, PALETTE_SIZE);
    }

    /// The visible characters of the block, whitespace excluded.
    pub fn glyphs(&self) -> impl Iterator<Item = Glyph> + '_ {
        let (rows, cols) = (self.rows as i32, self.cols as i32);
        let (offset_row, offset_col) = (self.bounds.offset_row, self.bounds.offset_col);
        self.block.lines().iter().enumerate().flat_map(move |(line, text)| {
            let row = offset_row + line as i32;
            let line_length = text.chars().count();
            text.chars().enumerate().filter_map(move |(column, ch)| {
                let col = offset_col + column as i32;
                let visible = (0..rows).contains(&row) && col < cols;
                (visible && !ch.is_whitespace()).then_some(Glyph { line, column, line_length, row, col, ch })
            })
        })
    }
}

/// A character to draw and where it goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    /// Index of the line within the block.
    pub line: usize,
    /// Index of the character within its line.
    pub column: usize,
    pub line_length: usize,
    pub row: i32,
    pub col: i32,
    pub ch: char,
}

impl Glyph {
    pub fn draw(&self, canvas: &mut dyn Canvas, style: CellStyle) {
        canvas.write_cell(self.row, self.col, self.ch, style);
    }
}

/// A way of coloring a block over time.
pub trait AnimationMode {
    fn kind(&self) -> ModeKind;

    /// Reset the animation state for a freshly set up stage.
    fn init_state(&mut self, stage: &Stage, colors: &mut ColorContext);

    /// Advance the animation by `dt` seconds.
    fn update_state(&mut self, stage: &Stage, speed: f64, dt: f64);

    fn draw(&self, stage: &Stage, canvas: &mut dyn Canvas);

    /// Called after the terminal changed size.
    fn on_resize(&mut self, _stage: &Stage) {}

    /// Called after the displayed block changed.
    fn on_text_change(&mut self, _stage: &Stage) {}

    /// Called after the scheme changed.
    fn on_scheme_change(&mut self, stage: &mut Stage, colors: &mut ColorContext) {
        stage.regenerate_palette(colors);
    }
}

/// Advance a phase and wrap it into `[0, period)`.
pub(crate) fn advance_phase(phase: f64, step: f64, period: f64) -> f64 {
    (phase + step).rem_euclid(period)
}
