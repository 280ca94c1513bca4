use super::common::{advance_phase, AnimationMode, Stage};
use super::ModeKind;
use crate::colors::ColorContext;
use crate::terminal::Canvas;

/// Wave animation - colors flow horizontally, each line slightly ahead of the previous one
#[derive(Debug, Default)]
pub(crate) struct Wave {
    offset: f64,
}

impl Wave {
    fn position(&self, column: usize, line_length: usize, line: usize) -> f64 {
        (column as f64 / line_length as f64 + self.offset + line as f64 * 0.1).rem_euclid(1.0)
    }
}

impl AnimationMode for Wave {
    fn kind(&self) -> ModeKind {
        ModeKind::Wave
    }

    fn init_state(&mut self, _stage: &Stage, _colors: &mut ColorContext) {
        self.offset = 0.0;
    }

    fn update_state(&mut self, _stage: &Stage, speed: f64, dt: f64) {
        self.offset = advance_phase(self.offset, speed * dt * 0.5, 1.0);
    }

    fn draw(&self, stage: &Stage, canvas: &mut dyn Canvas) {
        for glyph in stage.glyphs() {
            let position = self.position(glyph.column, glyph.line_length, glyph.line);
            glyph.draw(canvas, stage.palette().at(position));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::{colors, stage};
    use crate::terminal::{MemoryTerminal, Terminal};

    #[test]
    fn first_update() {
        let mut colors = colors();
        let mut stage = stage("abcde\nabcde\nabcde", 10, 10);
        stage.regenerate_palette(&mut colors);
        let mut wave = Wave::default();
        wave.init_state(&stage, &mut colors);
        wave.update_state(&stage, 1.0, 0.1);
        assert_eq!(wave.offset, 0.05);

        let mut terminal = MemoryTerminal::new(10, 10);
        wave.draw(&stage, &mut terminal);
        terminal.commit_frame().expect("commit failed");

        let (row, col) = (stage.bounds().offset_row as u16, stage.bounds().offset_col as u16);
        assert_eq!(stage.palette().index_of(0.05), 18);
        assert_eq!(terminal.cell(row, col), Some(('a', stage.palette().clamped(18))));
    }

    #[test]
    fn lines_are_shifted() {
        let wave = Wave { offset: 0.25 };
        assert_eq!(wave.position(0, 4, 0), 0.25);
        assert!((wave.position(2, 4, 3) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn offset_wraps() {
        let stage = stage("x", 3, 3);
        let mut wave = Wave { offset: 0.9 };
        wave.update_state(&stage, 2.0, 0.2);
        assert!((wave.offset - 0.1).abs() < 1e-12);
    }
}
