use super::cache::{BoundedCache, CacheStats};
use super::generator::Rgb;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Default number of RGB triples remembered by the adapter.
pub const DEFAULT_RGB_CACHE_SIZE: usize = 500;

/// How many colors the terminal can display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ColorDepth {
    /// No color support at all.
    None,
    /// The 8 standard colors.
    #[default]
    Basic,
    /// The 256 color palette.
    Extended,
}

impl ColorDepth {
    /// Detect the color depth from the environment.
    ///
    /// `NO_COLOR` and dumb terminals get no color, `COLORTERM` or a `TERM` that mentions
    /// 256 colors gets the extended palette.
    pub fn detect() -> Self {
        let var = |name| std::env::var(name).unwrap_or_default();
        Self::from_env(std::env::var_os("NO_COLOR").is_some(), &var("TERM"), &var("COLORTERM"))
    }

    pub fn from_env(no_color: bool, term: &str, colorterm: &str) -> Self {
        if no_color || term == "dumb" {
            return Self::None;
        }
        let true_color = colorterm.contains("truecolor") || colorterm.contains("24bit");
        if true_color || term.contains("256") {
            Self::Extended
        } else {
            Self::Basic
        }
    }

    /// The number of usable color slots.
    pub fn slots(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Basic => 8,
            Self::Extended => 256,
        }
    }
}

/// One of the standard terminal colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasicColor {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
    White,
    Gray,
}

/// Standard colors in the order ties are resolved in.
const BASIC_COLORS: [(BasicColor, Rgb); 8] = [
    (BasicColor::Red, Rgb::new(255, 0, 0)),
    (BasicColor::Yellow, Rgb::new(255, 255, 0)),
    (BasicColor::Green, Rgb::new(0, 255, 0)),
    (BasicColor::Cyan, Rgb::new(0, 255, 255)),
    (BasicColor::Blue, Rgb::new(0, 0, 255)),
    (BasicColor::Magenta, Rgb::new(255, 0, 255)),
    (BasicColor::White, Rgb::new(255, 255, 255)),
    (BasicColor::Gray, Rgb::new(128, 128, 128)),
];

/// A color the terminal can actually display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermColor {
    /// An index into the 256 color palette.
    Indexed(u8),
    Basic(BasicColor),
}

/// The attribute a cell is drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    pub color: Option<TermColor>,
    pub bold: bool,
    pub dim: bool,
}

impl CellStyle {
    pub fn bold() -> Self {
        Self { color: None, bold: true, dim: false }
    }

    pub fn dimmed(self) -> Self {
        Self { dim: true, ..self }
    }
}

/// Index in the 6x6x6 color cube of the 256 color palette.
pub fn rgb_to_index(rgb: Rgb) -> u8 {
    let level = |channel: u8| (channel as u16 * 6 / 256).min(5) as u8;
    16 + 36 * level(rgb.r) + 6 * level(rgb.g) + level(rgb.b)
}

/// The closest standard color. Ties go to the first color in table order.
pub fn nearest_basic(rgb: Rgb) -> BasicColor {
    let mut best = BASIC_COLORS[0];
    let mut best_distance = f64::INFINITY;
    for candidate in BASIC_COLORS {
        let distance = rgb.distance(candidate.1);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best.0
}

/// Maps RGB colors onto whatever the terminal supports.
#[derive(Debug)]
pub struct ColorAdapter {
    depth: ColorDepth,
    cache: BoundedCache<Rgb, TermColor>,
}

impl ColorAdapter {
    pub fn new(depth: ColorDepth, cache_size: usize) -> Self {
        Self { depth, cache: BoundedCache::new(cache_size) }
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    pub fn has_colors(&self) -> bool {
        self.depth != ColorDepth::None
    }

    /// Map a color to the closest one the terminal can display.
    pub fn rgb_to_color(&mut self, rgb: Rgb) -> Option<TermColor> {
        let depth = self.depth;
        let compute = move || match depth {
            ColorDepth::Extended => {
                let index = (rgb_to_index(rgb) as usize).min(depth.slots() - 1);
                TermColor::Indexed(index as u8)
            }
            _ => TermColor::Basic(nearest_basic(rgb)),
        };
        match self.depth {
            ColorDepth::None => None,
            _ => Some(*self.cache.get_or_insert_with(rgb, compute)),
        }
    }

    /// The attribute to draw a cell of the given color with.
    pub fn get_attribute(&mut self, rgb: Rgb, bold: bool) -> CellStyle {
        let color = self.rgb_to_color(rgb);
        CellStyle { color, bold, dim: false }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
