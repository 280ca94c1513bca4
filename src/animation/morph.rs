use super::common::{AnimationMode, Stage};
use super::wave_field::WaveField;
use super::ModeKind;
use crate::colors::{CellStyle, ColorContext, Palette};
use crate::terminal::Canvas;
use std::time::Instant;

/// Number of color tiers in the morph gradient.
pub(crate) const GRADIENT_LENGTH: usize = 50;

/// Morph animation - colors follow a field of overlapping waves
#[derive(Debug)]
pub(crate) struct Morph {
    field: WaveField,
    gradient: Palette,
    started: Instant,
}

impl Morph {
    fn reset_field(&mut self, stage: &Stage) {
        let rows = stage.block().lines().len();
        self.field = WaveField::new(rows, stage.bounds().width, GRADIENT_LENGTH - 1);
    }

    /// Move the field to `time`, which is already scaled by the speed.
    fn propagate(&mut self, stage: &Stage, time: f64) {
        let bounds = stage.bounds();
        if bounds.is_empty() {
            return;
        }
        let lengths: Vec<_> = stage.block().lines().iter().map(|line| line.chars().count()).collect();
        self.field.propagate(time, bounds.first_line..bounds.last_line + 1, &lengths);
    }
}

impl Default for Morph {
    fn default() -> Self {
        Self { field: WaveField::new(0, 0, GRADIENT_LENGTH - 1), gradient: Palette::default(), started: Instant::now() }
    }
}

impl AnimationMode for Morph {
    fn kind(&self) -> ModeKind {
        ModeKind::Morph
    }

    fn init_state(&mut self, stage: &Stage, colors: &mut ColorContext) {
        self.gradient = colors.palette(stage.scheme(), GRADIENT_LENGTH);
        self.started = Instant::now();
        self.reset_field(stage);
    }

    fn update_state(&mut self, stage: &Stage, speed: f64, _dt: f64) {
        // measured from init_state rather than the epoch, which only shifts the phase
        let time = self.started.elapsed().as_secs_f64() * speed;
        self.propagate(stage, time);
    }

    fn draw(&self, stage: &Stage, canvas: &mut dyn Canvas) {
        let (_, width) = self.field.size();
        for glyph in stage.glyphs() {
            let style = if glyph.column < width {
                self.gradient.clamped(self.field.tier(glyph.line, glyph.column))
            } else {
                CellStyle::default()
            };
            glyph.draw(canvas, style);
        }
    }

    fn on_resize(&mut self, stage: &Stage) {
        self.reset_field(stage);
    }

    fn on_text_change(&mut self, stage: &Stage) {
        self.reset_field(stage);
    }

    fn on_scheme_change(&mut self, stage: &mut Stage, colors: &mut ColorContext) {
        stage.regenerate_palette(colors);
        self.gradient = colors.palette(stage.scheme(), GRADIENT_LENGTH);
    }
}
