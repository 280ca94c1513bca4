use itertools::Itertools;
use std::fmt;

/// An 8 bit per channel RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format this color as a `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }

    /// Euclidean distance between two colors in RGB space.
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Convert HSV to RGB.
/// H, S and V are all in 0.0-1.0 and are clamped to that range.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb {
    let h = hue.clamp(0.0, 1.0);
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    if s == 0.0 {
        return channels(v, v, v);
    }

    // hue 1.0 wraps back to red
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    channels(r, g, b)
}

fn channels(r: f64, g: f64, b: f64) -> Rgb {
    Rgb::new((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Rainbow color at a position in the spectrum. Positions wrap around 1.0.
pub fn rainbow_color(position: f64, saturation: f64, value: f64) -> Rgb {
    hsv_to_rgb(position.rem_euclid(1.0), saturation, value)
}

/// Linear interpolation between two colors, `factor` is clamped to 0.0-1.0.
pub fn interpolate(from: Rgb, to: Rgb, factor: f64) -> Rgb {
    let t = factor.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
    Rgb::new(lerp(from.r, to.r), lerp(from.g, to.g), lerp(from.b, to.b))
}

/// `steps` evenly spaced colors going from `from` to `to`, both ends included.
pub fn gradient(from: Rgb, to: Rgb, steps: usize) -> Vec<Rgb> {
    if steps < 2 {
        return vec![from, to];
    }
    (0..steps).map(|i| interpolate(from, to, i as f64 / (steps - 1) as f64)).collect()
}

/// Generate `length` rainbow colors evenly distributed across the spectrum.
pub fn rainbow_sequence(length: usize, saturation: f64, value: f64, offset: f64) -> Vec<Rgb> {
    let offset = offset.rem_euclid(1.0);
    (0..length)
        .map(|i| {
            let position = (i as f64 / length as f64 + offset).rem_euclid(1.0);
            rainbow_color(position, saturation, value)
        })
        .collect()
}

/// Dark to light anchors for each monochromatic scheme.
const MONOCHROME_ANCHORS: &[(&str, &[(u8, u8, u8)])] = &[
    ("red", &[(150, 20, 20), (200, 30, 30), (255, 0, 0), (255, 50, 50), (255, 80, 80)]),
    ("blue", &[(30, 30, 150), (0, 50, 200), (0, 0, 255), (50, 100, 255), (100, 150, 255)]),
    ("green", &[(0, 80, 0), (0, 255, 0), (128, 255, 128)]),
    ("yellow", &[(128, 128, 0), (255, 255, 0), (255, 255, 128)]),
    ("purple", &[(80, 0, 80), (128, 0, 128), (200, 128, 200)]),
    ("cyan", &[(0, 80, 80), (0, 255, 255), (128, 255, 255)]),
    ("gray", &[(64, 64, 64), (128, 128, 128), (192, 192, 192)]),
    ("pink", &[(180, 100, 140), (220, 130, 170), (255, 160, 190), (255, 192, 203), (255, 200, 210)]),
    ("orange", &[(180, 60, 0), (215, 110, 0), (255, 140, 0), (255, 180, 40), (255, 195, 80)]),
];

/// Anchors for a named monochromatic scheme, if there is one.
pub fn monochrome_anchors(name: &str) -> Option<Vec<Rgb>> {
    MONOCHROME_ANCHORS
        .iter()
        .find(|(anchor_name, _)| *anchor_name == name)
        .map(|(_, anchors)| anchors.iter().copied().map(Rgb::from).collect())
}

/// Generate a dark to light gradient of the named color.
///
/// Unknown names fall back to a fully saturated rainbow.
pub fn monochromatic_gradient(name: &str, length: usize, offset: f64) -> Vec<Rgb> {
    if length == 0 {
        return Vec::new();
    }
    let Some(anchors) = monochrome_anchors(name) else {
        return rainbow_sequence(length, 1.0, 1.0, offset);
    };

    let extended = extend_anchors(&anchors, (length / 2).max(10));
    sample_cyclic(&extended, length, offset)
}

fn extend_anchors(anchors: &[Rgb], steps_per_segment: usize) -> Vec<Rgb> {
    let mut extended = Vec::new();
    for (index, (from, to)) in anchors.iter().tuple_windows().enumerate() {
        let segment = gradient(*from, *to, steps_per_segment);
        // neighbouring segments share their boundary sample
        let skip = if index > 0 { 1 } else { 0 };
        extended.extend(segment.into_iter().skip(skip));
    }
    extended
}

/// Pick `length` colors out of `source`, starting at `offset` and wrapping around.
pub(crate) fn sample_cyclic(source: &[Rgb], length: usize, offset: f64) -> Vec<Rgb> {
    if source.is_empty() {
        return Vec::new();
    }
    let total = source.len();
    let offset = offset.rem_euclid(1.0);
    (0..length)
        .map(|i| {
            let position = (i as f64 / length as f64 + offset) * total as f64;
            let index = (position.floor() as i64).rem_euclid(total as i64) as usize;
            source[index]
        })
        .collect()
}
