use super::adapter::{CellStyle, ColorAdapter};
use super::cache::{BoundedCache, CacheStats};
use super::scheme::ColorScheme;

/// Default number of attribute sequences kept around.
pub const DEFAULT_SEQUENCE_CACHE_SIZE: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SequenceKey {
    length: usize,
    /// The offset in thousandths.
    offset: i64,
    bold: bool,
    scheme: String,
}

impl SequenceKey {
    fn new(length: usize, offset: f64, bold: bool, scheme: &dyn ColorScheme) -> Self {
        Self { length, offset: (offset * 1000.0).round() as i64, bold, scheme: scheme.id() }
    }
}

/// Memoizes the cell styles generated for a scheme.
#[derive(Debug)]
pub struct SequenceCache {
    cache: BoundedCache<SequenceKey, Vec<CellStyle>>,
}

impl SequenceCache {
    pub fn new(capacity: usize) -> Self {
        Self { cache: BoundedCache::new(capacity) }
    }

    /// Generate `length` styles for the given scheme, reusing a previous result when the same
    /// sequence was asked for before.
    pub fn generate(
        &mut self,
        adapter: &mut ColorAdapter,
        scheme: &dyn ColorScheme,
        length: usize,
        offset: f64,
        bold: bool,
    ) -> Vec<CellStyle> {
        let key = SequenceKey::new(length, offset, bold, scheme);
        let styles = self.cache.get_or_insert_with(key, || {
            scheme.get_colors(length, offset).into_iter().map(|rgb| adapter.get_attribute(rgb, bold)).collect()
        });
        styles.clone()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for SequenceCache {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{
        adapter::ColorDepth,
        scheme::{MonochromeColors, PrismColors, SchemeName},
    };

    #[test]
    fn offsets_are_rounded() {
        let mut adapter = ColorAdapter::new(ColorDepth::Extended, 500);
        let mut cache = SequenceCache::default();
        let scheme = PrismColors::default();
        let first = cache.generate(&mut adapter, &scheme, 20, 0.1, true);
        let second = cache.generate(&mut adapter, &scheme, 20, 0.1001, true);

        assert_eq!(first, second);
        assert_eq!(first.len(), 20);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[test]
    fn schemes_do_not_share_entries() {
        let mut adapter = ColorAdapter::new(ColorDepth::Extended, 500);
        let mut cache = SequenceCache::default();
        let rainbow = cache.generate(&mut adapter, &PrismColors::default(), 10, 0.0, true);
        let red = cache.generate(&mut adapter, &MonochromeColors::new(SchemeName::Red), 10, 0.0, true);

        assert_ne!(rainbow, red);
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn bold_is_part_of_key() {
        let mut adapter = ColorAdapter::new(ColorDepth::Basic, 500);
        let mut cache = SequenceCache::default();
        let scheme = PrismColors::default();
        let bold = cache.generate(&mut adapter, &scheme, 4, 0.0, true);
        let plain = cache.generate(&mut adapter, &scheme, 4, 0.0, false);

        assert!(bold.iter().all(|style| style.bold));
        assert!(plain.iter().all(|style| !style.bold));
    }
}
