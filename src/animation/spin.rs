use super::common::{advance_phase, AnimationMode, Stage};
use super::ModeKind;
use crate::colors::ColorContext;
use crate::terminal::Canvas;
use std::f64::consts::{PI, TAU};

/// Spin animation - colors rotate around the center of the block
#[derive(Debug, Default)]
pub(crate) struct Spin {
    angle: f64,
    center: (i32, i32),
}

impl Spin {
    fn position(&self, row: i32, col: i32) -> f64 {
        let (center_row, center_col) = self.center;
        let angle = ((row - center_row) as f64).atan2((col - center_col) as f64);
        ((angle + self.angle) / TAU).rem_euclid(1.0)
    }
}

impl AnimationMode for Spin {
    fn kind(&self) -> ModeKind {
        ModeKind::Spin
    }

    fn init_state(&mut self, stage: &Stage, _colors: &mut ColorContext) {
        self.angle = 0.0;
        self.center = stage.bounds().center();
    }

    fn update_state(&mut self, _stage: &Stage, speed: f64, dt: f64) {
        self.angle = advance_phase(self.angle, speed * dt * PI, TAU);
    }

    fn draw(&self, stage: &Stage, canvas: &mut dyn Canvas) {
        for glyph in stage.glyphs() {
            glyph.draw(canvas, stage.palette().at(self.position(glyph.row, glyph.col)));
        }
    }

    fn on_resize(&mut self, stage: &Stage) {
        self.center = stage.bounds().center();
    }

    fn on_text_change(&mut self, stage: &Stage) {
        self.center = stage.bounds().center();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::{colors, stage};
    use rstest::rstest;

    #[rstest]
    #[case(5, 9, 0.0)]
    #[case(9, 5, 0.25)]
    #[case(5, 1, 0.5)]
    #[case(1, 5, 0.75)]
    fn position_around_center(#[case] row: i32, #[case] col: i32, #[case] expected: f64) {
        let spin = Spin { angle: 0.0, center: (5, 5) };
        assert!((spin.position(row, col) - expected).abs() < 1e-12);
    }

    #[test]
    fn rotation_shifts_positions() {
        let spin = Spin { angle: PI / 2.0, center: (5, 5) };
        assert!((spin.position(5, 9) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn center_follows_block() {
        let mut stage = stage("abcde\nabcde\nabcde", 10, 10);
        let mut spin = Spin::default();
        spin.init_state(&stage, &mut colors());
        assert_eq!(spin.center, (4, 4));

        stage.resize(20, 30);
        spin.on_resize(&stage);
        assert_eq!(spin.center, (9, 14));
    }

    #[test]
    fn angle_wraps() {
        let stage = stage("x", 3, 3);
        let mut spin = Spin::default();
        for _ in 0..25 {
            spin.update_state(&stage, 1.0, 0.1);
        }
        assert!((0.0..TAU).contains(&spin.angle));
        assert!((spin.angle - 0.5 * PI).abs() < 1e-9);
    }
}
