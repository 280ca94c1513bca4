pub(crate) mod adapter;
pub(crate) mod animator;
pub(crate) mod cache;
pub(crate) mod generator;
pub(crate) mod scheme;
pub(crate) mod sequence;

pub use adapter::{BasicColor, CellStyle, ColorAdapter, ColorDepth, TermColor};
pub use animator::{AnimatorStats, ColorAnimator, FrameCache, FrameKey};
pub use cache::CacheStats;
pub use generator::Rgb;
pub use scheme::{
    parse_custom_colors, ColorScheme, ColorSpec, CustomColors, PrismColors, SchemeBook, SchemeError, SchemeName,
};
pub use sequence::SequenceCache;

/// Number of entries in a palette.
pub const PALETTE_SIZE: usize = 360;

/// Precomputed styles sampled evenly around a scheme.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    styles: Vec<CellStyle>,
}

impl Palette {
    pub fn new(styles: Vec<CellStyle>) -> Self {
        Self { styles }
    }

    /// The style for a spectrum position in 0.0-1.0, using the nearest entry.
    pub fn at(&self, position: f64) -> CellStyle {
        self.styles.get(self.index_of(position)).copied().unwrap_or_default()
    }

    /// The entry a spectrum position maps to.
    pub fn index_of(&self, position: f64) -> usize {
        let size = self.styles.len();
        if size == 0 {
            return 0;
        }
        let index = (position * (size - 1) as f64).round() as i64;
        index.rem_euclid(size as i64) as usize
    }

    /// The style at an exact index, clamped to the palette's range.
    pub fn clamped(&self, index: usize) -> CellStyle {
        match self.styles.len() {
            0 => CellStyle::default(),
            size => self.styles[index.min(size - 1)],
        }
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Everything animations need to turn schemes into cell styles.
#[derive(Debug)]
pub struct ColorContext {
    pub adapter: ColorAdapter,
    pub sequences: SequenceCache,
    pub schemes: SchemeBook,
}

impl ColorContext {
    pub fn new(adapter: ColorAdapter, sequences: SequenceCache, schemes: SchemeBook) -> Self {
        Self { adapter, sequences, schemes }
    }

    /// Build a bold palette of `size` entries for the given scheme.
    pub fn palette(&mut self, name: SchemeName, size: usize) -> Palette {
        let scheme = self.schemes.resolve(name);
        let styles = self.sequences.generate(&mut self.adapter, scheme.as_ref(), size, 0.0, true);
        tracing::debug!("built {size} entry palette for {}", scheme.id());
        Palette::new(styles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn context(depth: ColorDepth) -> ColorContext {
        ColorContext::new(ColorAdapter::new(depth, 500), SequenceCache::default(), SchemeBook::default())
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(0.05, 18)]
    #[case(0.5, 180)]
    #[case(1.0, 359)]
    #[case(1.05, 17)]
    #[case(-0.05, 342)]
    fn nearest_index(#[case] position: f64, #[case] expected: usize) {
        let palette = context(ColorDepth::Extended).palette(SchemeName::Rainbow, PALETTE_SIZE);
        assert_eq!(palette.index_of(position), expected);
    }

    #[test]
    fn palette_is_bold() {
        let palette = context(ColorDepth::Basic).palette(SchemeName::Blue, PALETTE_SIZE);
        assert_eq!(palette.len(), PALETTE_SIZE);
        assert!(palette.at(0.3).bold);
        assert!(palette.at(0.3).color.is_some());
    }

    #[test]
    fn colorless_palette_still_built() {
        let palette = context(ColorDepth::None).palette(SchemeName::Rainbow, PALETTE_SIZE);
        assert_eq!(palette.len(), PALETTE_SIZE);
        assert_eq!(palette.at(0.7), CellStyle::bold());
    }

    #[test]
    fn empty_palette() {
        let palette = Palette::default();
        assert_eq!(palette.at(0.4), CellStyle::default());
        assert_eq!(palette.clamped(10), CellStyle::default());
    }

    #[test]
    fn clamped_lookup() {
        let palette = context(ColorDepth::Extended).palette(SchemeName::Green, 50);
        assert_eq!(palette.clamped(80), palette.clamped(49));
    }
}
