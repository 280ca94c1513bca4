use super::generator::{gradient, monochromatic_gradient, rainbow_sequence, sample_cyclic, Rgb};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString, IntoStaticStr};

/// Number of interpolation steps between two adjacent custom colors.
const CUSTOM_SEGMENT_STEPS: usize = 10;

/// Saturation used by the rainbow scheme unless configured otherwise.
pub const DEFAULT_SATURATION: f64 = 0.75;

/// Value used by the rainbow scheme unless configured otherwise.
pub const DEFAULT_VALUE: f64 = 0.9;

/// A source of colors for a run of character slots.
pub trait ColorScheme: fmt::Debug {
    /// Generate `length` colors, shifted by `offset` (0.0-1.0) around the scheme.
    fn get_colors(&self, length: usize, offset: f64) -> Vec<Rgb>;

    /// Identity used to key caches built from this scheme.
    fn id(&self) -> String;
}

/// Errors that can occur when building a color scheme
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SchemeError {
    #[error("custom color scheme requires at least 2 colors, got {0}")]
    TooFewColors(usize),

    #[error("invalid hex color '{0}'")]
    InvalidHex(String),

    #[error("invalid rgb color '{0}'")]
    InvalidRgb(String),

    #[error("{name} must be within 0.0-1.0, got {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

/// The named schemes that can be cycled through at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SchemeName {
    #[default]
    Rainbow,
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Cyan,
    Gray,
    Pink,
    Orange,
    /// The user supplied palette. Not part of the cycle.
    Custom,
}

impl SchemeName {
    /// The order schemes are visited in when cycling.
    pub const CYCLE: [SchemeName; 10] = [
        Self::Rainbow,
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Cyan,
        Self::Gray,
        Self::Pink,
        Self::Orange,
    ];

    /// The scheme after this one in the cycle. A custom scheme is treated as if it
    /// were the rainbow.
    pub fn next(self) -> Self {
        let position = Self::CYCLE.iter().position(|name| *name == self).unwrap_or(0);
        Self::CYCLE[(position + 1) % Self::CYCLE.len()]
    }

    pub fn is_monochrome(self) -> bool {
        !matches!(self, Self::Rainbow | Self::Custom)
    }
}

/// A color as written by a user: either a hex string or an RGB triple.
///
/// Strings are parsed the same way as on the command line, so `"(r, g, b)"` is a triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Triple([u8; 3]),
    Hex(String),
}

impl<'de> Deserialize<'de> for ColorSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawColorSpec {
            Triple([u8; 3]),
            Text(String),
        }

        match RawColorSpec::deserialize(deserializer)? {
            RawColorSpec::Triple(rgb) => Ok(Self::Triple(rgb)),
            RawColorSpec::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

impl ColorSpec {
    /// Resolve this spec into an actual color.
    pub fn to_rgb(&self) -> Result<Rgb, SchemeError> {
        match self {
            Self::Triple([r, g, b]) => Ok(Rgb::new(*r, *g, *b)),
            Self::Hex(input) => parse_hex(input),
        }
    }
}

impl From<Rgb> for ColorSpec {
    fn from(color: Rgb) -> Self {
        Self::Triple([color.r, color.g, color.b])
    }
}

impl FromStr for ColorSpec {
    type Err = SchemeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let Some(inner) = input.strip_prefix('(').and_then(|s| s.strip_suffix(')')) else {
            parse_hex(input)?;
            return Ok(Self::Hex(input.to_string()));
        };
        let parts: Vec<_> = inner.split(',').map(|part| part.trim().parse::<u8>()).collect();
        match parts.as_slice() {
            [Ok(r), Ok(g), Ok(b)] => Ok(Self::Triple([*r, *g, *b])),
            _ => Err(SchemeError::InvalidRgb(input.to_string())),
        }
    }
}

fn parse_hex(input: &str) -> Result<Rgb, SchemeError> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    if digits.len() != 6 {
        return Err(SchemeError::InvalidHex(input.to_string()));
    }
    let mut bytes = [0_u8; 3];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| SchemeError::InvalidHex(input.to_string()))?;
    Ok(Rgb::new(bytes[0], bytes[1], bytes[2]))
}

/// Parse a comma separated list of colors, e.g. `#ff0000, 00ff00, (0,0,255)`.
///
/// Commas inside parentheses belong to the RGB triple they're in.
pub fn parse_custom_colors(input: &str) -> Result<Vec<ColorSpec>, SchemeError> {
    let mut tokens = Vec::new();
    let mut depth = 0_u32;
    let mut start = 0;
    for (index, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(&input[start..index]);
                start = index + 1;
            }
            _ => (),
        }
    }
    tokens.push(&input[start..]);

    let colors = tokens
        .into_iter()
        .filter(|token| !token.trim().is_empty())
        .map(ColorSpec::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if colors.len() < 2 {
        return Err(SchemeError::TooFewColors(colors.len()));
    }
    Ok(colors)
}

/// Full spectrum rainbow.
#[derive(Clone, Debug, PartialEq)]
pub struct PrismColors {
    saturation: f64,
    value: f64,
}

impl PrismColors {
    pub fn new(saturation: f64, value: f64) -> Result<Self, SchemeError> {
        check_unit("saturation", saturation)?;
        check_unit("value", value)?;
        Ok(Self { saturation, value })
    }

    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// A short run of colors showing the whole spectrum.
    pub fn spectrum_preview(&self, length: usize) -> Vec<Rgb> {
        self.get_colors(length, 0.0)
    }
}

impl Default for PrismColors {
    fn default() -> Self {
        Self { saturation: DEFAULT_SATURATION, value: DEFAULT_VALUE }
    }
}

impl ColorScheme for PrismColors {
    fn get_colors(&self, length: usize, offset: f64) -> Vec<Rgb> {
        rainbow_sequence(length, self.saturation, self.value, offset)
    }

    fn id(&self) -> String {
        SchemeName::Rainbow.to_string()
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), SchemeError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SchemeError::OutOfRange { name, value })
    }
}

/// A user defined palette that loops back from its last color to its first one.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomColors {
    colors: Vec<Rgb>,
    extended: Vec<Rgb>,
}

impl CustomColors {
    pub fn new(specs: &[ColorSpec]) -> Result<Self, SchemeError> {
        if specs.len() < 2 {
            return Err(SchemeError::TooFewColors(specs.len()));
        }
        let colors = specs.iter().map(ColorSpec::to_rgb).collect::<Result<Vec<_>, _>>()?;
        let extended = colors
            .iter()
            .zip(colors.iter().cycle().skip(1))
            .flat_map(|(from, to)| {
                let mut segment = gradient(*from, *to, CUSTOM_SEGMENT_STEPS);
                segment.pop();
                segment
            })
            .collect();
        Ok(Self { colors, extended })
    }

    pub fn from_hex_strings<S: AsRef<str>>(colors: &[S]) -> Result<Self, SchemeError> {
        let specs: Vec<_> = colors.iter().map(|color| ColorSpec::Hex(color.as_ref().to_string())).collect();
        Self::new(&specs)
    }

    pub fn from_rgb(colors: &[Rgb]) -> Result<Self, SchemeError> {
        let specs: Vec<_> = colors.iter().copied().map(ColorSpec::from).collect();
        Self::new(&specs)
    }

    /// The colors this palette was built from.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

impl ColorScheme for CustomColors {
    fn get_colors(&self, length: usize, offset: f64) -> Vec<Rgb> {
        sample_cyclic(&self.extended, length, offset)
    }

    fn id(&self) -> String {
        let colors: Vec<_> = self.colors.iter().map(|color| color.to_hex()).collect();
        format!("custom:{}", colors.join(","))
    }
}

/// Dark to light shades of a single named color.
#[derive(Clone, Debug, PartialEq)]
pub struct MonochromeColors {
    name: SchemeName,
}

impl MonochromeColors {
    pub fn new(name: SchemeName) -> Self {
        Self { name }
    }
}

impl ColorScheme for MonochromeColors {
    fn get_colors(&self, length: usize, offset: f64) -> Vec<Rgb> {
        monochromatic_gradient(self.name.into(), length, offset)
    }

    fn id(&self) -> String {
        self.name.to_string()
    }
}

/// Everything needed to turn a [SchemeName] into a [ColorScheme].
#[derive(Clone, Debug, Default)]
pub struct SchemeBook {
    prism: PrismColors,
    custom: Option<CustomColors>,
}

impl SchemeBook {
    pub fn new(prism: PrismColors, custom: Option<CustomColors>) -> Self {
        Self { prism, custom }
    }

    pub fn has_custom(&self) -> bool {
        self.custom.is_some()
    }

    /// Build the scheme for the given name.
    ///
    /// Asking for the custom scheme when none was configured yields the rainbow.
    pub fn resolve(&self, name: SchemeName) -> Box<dyn ColorScheme> {
        match name {
            SchemeName::Rainbow => Box::new(self.prism.clone()),
            SchemeName::Custom => match &self.custom {
                Some(custom) => Box::new(custom.clone()),
                None => {
                    tracing::warn!("no custom colors configured, using rainbow");
                    Box::new(self.prism.clone())
                }
            },
            name => Box::new(MonochromeColors::new(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn custom_needs_two_colors() {
        let result = CustomColors::from_rgb(&[Rgb::new(255, 0, 0)]);
        assert_eq!(result, Err(SchemeError::TooFewColors(1)));
    }

    #[test]
    fn custom_is_deterministic() {
        let scheme = CustomColors::from_rgb(&[Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]).expect("build failed");
        let first = scheme.get_colors(17, 0.3);
        assert_eq!(first.len(), 17);
        assert_eq!(first, scheme.get_colors(17, 0.3));
    }

    #[test]
    fn custom_gradient_wraps_around() {
        let scheme = CustomColors::from_rgb(&[Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]).expect("build failed");
        // two segments of 10 steps, each without its last sample
        assert_eq!(scheme.extended.len(), 18);
        assert_eq!(scheme.extended[0], Rgb::new(255, 0, 0));
        assert_eq!(scheme.extended[9], Rgb::new(0, 0, 255));
        assert_eq!(scheme.get_colors(1, 0.0), vec![Rgb::new(255, 0, 0)]);
    }

    #[rstest]
    #[case("#ff8000", Rgb::new(255, 128, 0))]
    #[case("ff8000", Rgb::new(255, 128, 0))]
    #[case("#00FFaa", Rgb::new(0, 255, 170))]
    fn valid_hex(#[case] input: &str, #[case] expected: Rgb) {
        assert_eq!(parse_hex(input), Ok(expected));
    }

    #[rstest]
    #[case("#fff")]
    #[case("#fffff")]
    #[case("ff80001")]
    #[case("#gg0000")]
    #[case("")]
    fn invalid_hex(#[case] input: &str) {
        let result = CustomColors::from_hex_strings(&[input, "#000000"]);
        assert_eq!(result, Err(SchemeError::InvalidHex(input.to_string())));
    }

    #[test]
    fn parse_mixed_list() {
        let colors = parse_custom_colors("#ff0000, 00ff00,(0, 0, 255)").expect("parse failed");
        assert_eq!(
            colors,
            vec![ColorSpec::Hex("#ff0000".into()), ColorSpec::Hex("00ff00".into()), ColorSpec::Triple([0, 0, 255])]
        );
    }

    #[rstest]
    #[case("#ff0000")]
    #[case("")]
    fn parse_too_short_list(#[case] input: &str) {
        assert!(matches!(parse_custom_colors(input), Err(SchemeError::TooFewColors(_))));
    }

    #[rstest]
    #[case("(256,0,0), #000000")]
    #[case("(1,2), #000000")]
    fn parse_bad_triples(#[case] input: &str) {
        assert!(matches!(parse_custom_colors(input), Err(SchemeError::InvalidRgb(_))));
    }

    #[rstest]
    #[case(-0.1, 1.0)]
    #[case(0.5, 1.5)]
    fn prism_rejects_out_of_range(#[case] saturation: f64, #[case] value: f64) {
        assert!(matches!(PrismColors::new(saturation, value), Err(SchemeError::OutOfRange { .. })));
    }

    #[test]
    fn scheme_cycle() {
        assert_eq!(SchemeName::Rainbow.next(), SchemeName::Red);
        assert_eq!(SchemeName::Orange.next(), SchemeName::Rainbow);
        assert_eq!(SchemeName::Custom.next(), SchemeName::Red);
    }

    #[test]
    fn monochrome_schemes() {
        let monochrome: Vec<_> = SchemeName::CYCLE.into_iter().filter(|name| name.is_monochrome()).collect();
        assert_eq!(monochrome.len(), 9);
        assert!(!SchemeName::Rainbow.is_monochrome());
        assert!(!SchemeName::Custom.is_monochrome());
    }

    #[test]
    fn prism_preview_starts_at_red() {
        let prism = PrismColors::new(1.0, 1.0).expect("build failed");
        let preview = prism.spectrum_preview(6);
        assert_eq!(preview.len(), 6);
        assert_eq!(preview[0], Rgb::new(255, 0, 0));
        assert_eq!(preview, prism.get_colors(6, 0.0));
    }

    #[rstest]
    #[case("\"#ff8000\"", ColorSpec::Hex("#ff8000".into()))]
    #[case("\"(1, 2, 3)\"", ColorSpec::Triple([1, 2, 3]))]
    #[case("[4, 5, 6]", ColorSpec::Triple([4, 5, 6]))]
    fn color_specs_deserialize(#[case] input: &str, #[case] expected: ColorSpec) {
        let spec: ColorSpec = serde_yaml::from_str(input).expect("parse failed");
        assert_eq!(spec, expected);
    }

    #[test]
    fn malformed_color_specs_are_rejected() {
        assert!(serde_yaml::from_str::<ColorSpec>("\"(1, 2)\"").is_err());
        assert!(serde_yaml::from_str::<ColorSpec>("\"#12345\"").is_err());
    }

    #[test]
    fn scheme_names_parse() {
        assert_eq!("Purple".parse::<SchemeName>(), Ok(SchemeName::Purple));
        assert_eq!(SchemeName::Gray.to_string(), "gray");
    }

    #[test]
    fn book_resolves_identities() {
        let custom = CustomColors::from_hex_strings(&["#000000", "#ffffff"]).expect("build failed");
        let book = SchemeBook::new(PrismColors::default(), Some(custom));
        assert_eq!(book.resolve(SchemeName::Rainbow).id(), "rainbow");
        assert_eq!(book.resolve(SchemeName::Pink).id(), "pink");
        assert_eq!(book.resolve(SchemeName::Custom).id(), "custom:#000000,#ffffff");
        assert_eq!(SchemeBook::default().resolve(SchemeName::Custom).id(), "rainbow");
    }
}
