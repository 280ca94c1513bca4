use super::common::{advance_phase, AnimationMode, Stage};
use super::ModeKind;
use crate::colors::ColorContext;
use crate::terminal::Canvas;

/// Flux animation - the whole block cycles through the colors at once
#[derive(Debug, Default)]
pub(crate) struct Flux {
    offset: f64,
}

impl AnimationMode for Flux {
    fn kind(&self) -> ModeKind {
        ModeKind::Flux
    }

    fn init_state(&mut self, _stage: &Stage, _colors: &mut ColorContext) {
        self.offset = 0.0;
    }

    fn update_state(&mut self, _stage: &Stage, speed: f64, dt: f64) {
        self.offset = advance_phase(self.offset, speed * dt * 0.7, 1.0);
    }

    fn draw(&self, stage: &Stage, canvas: &mut dyn Canvas) {
        let style = stage.palette().at(self.offset).dimmed();
        for glyph in stage.glyphs() {
            glyph.draw(canvas, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::{colors, stage};
    use crate::terminal::{MemoryTerminal, Terminal};

    #[test]
    fn every_character_shares_a_dim_color() {
        let mut colors = colors();
        let mut stage = stage("ab\n c", 6, 6);
        stage.regenerate_palette(&mut colors);
        let mut flux = Flux::default();
        flux.init_state(&stage, &mut colors);
        flux.update_state(&stage, 1.0, 0.5);

        let mut terminal = MemoryTerminal::new(6, 6);
        flux.draw(&stage, &mut terminal);
        terminal.commit_frame().expect("commit failed");

        let expected = stage.palette().at(0.35).dimmed();
        let styles: Vec<_> = stage.glyphs().filter_map(|glyph| terminal.cell(glyph.row as u16, glyph.col as u16)).collect();
        assert_eq!(styles.len(), 3);
        assert!(styles.iter().all(|(_, style)| *style == expected));
        assert!(expected.dim && expected.bold);
    }
}
