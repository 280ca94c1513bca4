use crate::animation::ModeKind;
use crate::colors::{
    adapter::DEFAULT_RGB_CACHE_SIZE, sequence::DEFAULT_SEQUENCE_CACHE_SIZE, ColorSpec, CustomColors, PrismColors,
    SchemeBook, SchemeError, SchemeName,
};
use crate::colors::scheme::{DEFAULT_SATURATION, DEFAULT_VALUE};
use crate::text::StartFallback;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The name of the configuration file inside the configuration directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Errors that can occur when loading the configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("parsing {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },

    #[error("unknown custom scheme '{0}'")]
    UnknownCustomScheme(String),

    #[error("{0} must be at least 1")]
    ZeroCapacity(&'static str),

    #[error(transparent)]
    Scheme(#[from] SchemeError),
}

/// The configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub colors: ColorsConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Where to write logs to.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// The default location of the configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "terminal-flow").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the configuration.
    ///
    /// An explicitly given path must exist. When no path is given, the default location is
    /// used if there's a file there and the default configuration otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.into(), source })?;
        let config = Self::parse(&contents).map_err(|source| ConfigError::Parse { path: path.into(), source })?;
        tracing::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        // an empty file is a valid, empty configuration
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

/// Defaults for the command line arguments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    pub mode: Option<ModeKind>,

    pub scheme: Option<SchemeName>,

    pub speed: Option<f64>,

    pub fps: Option<u32>,

    /// Seconds between automatic block changes.
    pub cycle_interval: Option<f64>,

    pub text_dir: Option<PathBuf>,

    #[serde(default)]
    pub start_fallback: StartFallback,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorsConfig {
    /// The saturation of the rainbow.
    #[serde(default = "default_saturation")]
    pub saturation: f64,

    /// The brightness of the rainbow.
    #[serde(default = "default_value")]
    pub value: f64,

    /// The colors used by the custom scheme.
    #[serde(default)]
    pub custom: Option<Vec<ColorSpec>>,

    /// Named custom schemes that can be picked from the command line.
    #[serde(default)]
    pub custom_schemes: BTreeMap<String, Vec<ColorSpec>>,
}

impl ColorsConfig {
    /// Build the schemes, picking the custom colors from the first of `colors`, the named
    /// custom scheme and the configured custom colors that is present.
    pub fn scheme_book(&self, colors: Option<&[ColorSpec]>, named: Option<&str>) -> Result<SchemeBook, ConfigError> {
        let prism = PrismColors::new(self.saturation, self.value)?;
        let specs = match (colors, named) {
            (Some(colors), _) => Some(colors),
            (None, Some(name)) => {
                let colors = self.custom_schemes.get(name).ok_or_else(|| ConfigError::UnknownCustomScheme(name.into()))?;
                Some(colors.as_slice())
            }
            (None, None) => self.custom.as_deref(),
        };
        let custom = specs.map(CustomColors::new).transpose()?;
        Ok(SchemeBook::new(prism, custom))
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            saturation: default_saturation(),
            value: default_value(),
            custom: None,
            custom_schemes: BTreeMap::new(),
        }
    }
}

fn default_saturation() -> f64 {
    DEFAULT_SATURATION
}

fn default_value() -> f64 {
    DEFAULT_VALUE
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// How many RGB to terminal color mappings to remember.
    #[serde(default = "default_rgb_capacity")]
    pub rgb_capacity: usize,

    /// How many generated color sequences to remember.
    #[serde(default = "default_sequence_capacity")]
    pub sequence_capacity: usize,
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rgb_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("rgb_capacity"));
        }
        if self.sequence_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("sequence_capacity"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { rgb_capacity: default_rgb_capacity(), sequence_capacity: default_sequence_capacity() }
    }
}

fn default_rgb_capacity() -> usize {
    DEFAULT_RGB_CACHE_SIZE
}

fn default_sequence_capacity() -> usize {
    DEFAULT_SEQUENCE_CACHE_SIZE
}
