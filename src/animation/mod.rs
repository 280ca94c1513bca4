mod common;
pub mod lifecycle;
pub mod wave_field;

// Individual animation modes
mod flux;
mod morph;
mod pulse;
mod spin;
mod wave;

pub use common::{AnimationMode, Glyph, Stage};
pub use lifecycle::{AnimationError, Controller, LoopState, ModeSwitch, RunSettings, TickOutcome};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The available animation modes, in the order they're cycled through.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, clap::ValueEnum, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Colors flow horizontally across the text.
    #[default]
    Wave,
    /// Colors rotate around the center of the text.
    Spin,
    /// Colors ripple outwards from the center of the text.
    Pulse,
    /// The whole text cycles through the colors at once.
    Flux,
    /// Colors follow a field of overlapping waves.
    Morph,
}

impl ModeKind {
    pub const ALL: [ModeKind; 5] = [Self::Wave, Self::Spin, Self::Pulse, Self::Flux, Self::Morph];

    /// The mode after this one, wrapping around.
    pub fn next(self) -> Self {
        let position = Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0);
        Self::ALL[(position + 1) % Self::ALL.len()]
    }

    /// Create a fresh instance of this mode.
    pub fn create(self) -> Box<dyn AnimationMode> {
        match self {
            Self::Wave => Box::new(wave::Wave::default()),
            Self::Spin => Box::new(spin::Spin::default()),
            Self::Pulse => Box::new(pulse::Pulse::default()),
            Self::Flux => Box::new(flux::Flux::default()),
            Self::Morph => Box::new(morph::Morph::default()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(ModeKind::Wave, ModeKind::Spin)]
    #[case(ModeKind::Flux, ModeKind::Morph)]
    #[case(ModeKind::Morph, ModeKind::Wave)]
    fn mode_cycle(#[case] current: ModeKind, #[case] expected: ModeKind) {
        assert_eq!(current.next(), expected);
    }

    #[test]
    fn created_modes_report_their_kind() {
        for kind in ModeKind::ALL {
            assert_eq!(kind.create().kind(), kind);
        }
    }

    #[test]
    fn names() {
        assert_eq!(ModeKind::Spin.to_string(), "spin");
        assert_eq!(ModeKind::from_str("PULSE"), Ok(ModeKind::Pulse));
    }
}
