use super::common::{advance_phase, AnimationMode, Stage};
use super::ModeKind;
use crate::colors::ColorContext;
use crate::terminal::Canvas;

/// Pulse animation - rings of color ripple outwards from the center of the block
#[derive(Debug, Default)]
pub(crate) struct Pulse {
    offset: f64,
    center: (i32, i32),
}

impl Pulse {
    fn position(&self, stage: &Stage, row: i32, col: i32) -> f64 {
        let (center_row, center_col) = self.center;
        let distance = ((row - center_row) as f64).hypot((col - center_col) as f64);
        let bounds = stage.bounds();
        let max_distance = (bounds.width as f64).hypot(bounds.height as f64) / 2.0;
        let normalized = if max_distance > 0.0 { distance / max_distance } else { 0.0 };
        (normalized - self.offset).rem_euclid(1.0)
    }
}

impl AnimationMode for Pulse {
    fn kind(&self) -> ModeKind {
        ModeKind::Pulse
    }

    fn init_state(&mut self, stage: &Stage, _colors: &mut ColorContext) {
        self.offset = 0.0;
        self.center = stage.bounds().center();
    }

    fn update_state(&mut self, _stage: &Stage, speed: f64, dt: f64) {
        self.offset = advance_phase(self.offset, speed * dt * 2.0, 1.0);
    }

    fn draw(&self, stage: &Stage, canvas: &mut dyn Canvas) {
        for glyph in stage.glyphs() {
            glyph.draw(canvas, stage.palette().at(self.position(stage, glyph.row, glyph.col)));
        }
    }

    fn on_resize(&mut self, stage: &Stage) {
        self.center = stage.bounds().center();
    }

    fn on_text_change(&mut self, stage: &Stage) {
        self.center = stage.bounds().center();
    }
}
