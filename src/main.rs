use anyhow::{anyhow, Context};
use clap::{ArgGroup, Parser};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use terminal_flow::{
    animation::{Controller, ModeKind, RunSettings},
    colors::{parse_custom_colors, ColorAdapter, ColorContext, ColorDepth, SchemeName, SequenceCache},
    config::Config,
    terminal::{restore_terminal, CrosstermTerminal},
    text::{starting_block, DirectorySource, TextSource},
};
use tracing_subscriber::EnvFilter;

const DEFAULT_TEXT_DIR: &str = "text";
const DEFAULT_SPEED: f64 = 1.0;
const DEFAULT_FPS: u32 = 10;
const LOG_FILTER_ENV: &str = "TERMINAL_FLOW_LOG";
const DEFAULT_LOG_FILTER: &str = "terminal_flow=info";

/// Run colorful animations over ASCII art in your terminal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("rate").args(["uld", "ld", "md", "hd", "fps"])))]
struct Cli {
    /// The directory containing the `.txt` files to animate.
    #[clap(long)]
    text_dir: Option<PathBuf>,

    /// The animation mode to start with.
    #[clap(short, long, value_enum)]
    mode: Option<ModeKind>,

    /// The color scheme to start with.
    #[clap(short, long)]
    color: Option<SchemeName>,

    /// Custom colors, e.g. `#ff0000,00ff00,(0,0,255)`.
    #[clap(long, conflicts_with = "custom_scheme")]
    colors: Option<String>,

    /// A custom scheme defined in the configuration file.
    #[clap(long)]
    custom_scheme: Option<String>,

    /// The animation speed multiplier.
    #[clap(short, long)]
    speed: Option<f64>,

    /// The file to start with, with or without the `.txt` extension.
    #[clap(short, long)]
    file: Option<String>,

    /// Cycle through the files, changing every SECONDS.
    #[clap(long, value_name = "SECONDS", num_args = 0..=1, default_missing_value = "30")]
    cycle: Option<f64>,

    /// Ultra low definition: 5 frames per second.
    #[clap(long)]
    uld: bool,

    /// Low definition: 10 frames per second.
    #[clap(long)]
    ld: bool,

    /// Medium definition: 30 frames per second.
    #[clap(long)]
    md: bool,

    /// High definition: 60 frames per second.
    #[clap(long)]
    hd: bool,

    /// The number of frames per second.
    #[clap(long)]
    fps: Option<u32>,

    /// The path to the configuration file.
    #[clap(long, env = "TERMINAL_FLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs to this file.
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn fps_preset(&self) -> Option<u32> {
        if self.uld {
            Some(5)
        } else if self.ld {
            Some(10)
        } else if self.md {
            Some(30)
        } else if self.hd {
            Some(60)
        } else {
            self.fps
        }
    }
}

/// Everything needed to start the animation, after merging the CLI with the configuration.
struct Launch {
    text_dir: PathBuf,
    mode: ModeKind,
    scheme: SchemeName,
    settings: RunSettings,
    colors: ColorContext,
}

impl Launch {
    fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let defaults = config.defaults;
        config.cache.validate()?;

        let custom = cli.colors.as_deref().map(parse_custom_colors).transpose().context("invalid --colors")?;
        let schemes = config.colors.scheme_book(custom.as_deref(), cli.custom_scheme.as_deref())?;
        let custom_requested = custom.is_some() || cli.custom_scheme.is_some();
        let scheme = match (cli.color, defaults.scheme) {
            (Some(scheme), _) => scheme,
            (None, _) if custom_requested => SchemeName::Custom,
            (None, Some(scheme)) => scheme,
            (None, None) => SchemeName::default(),
        };

        let speed = cli.speed.or(defaults.speed).unwrap_or(DEFAULT_SPEED);
        let fps = cli.fps_preset().or(defaults.fps).unwrap_or(DEFAULT_FPS);
        let cycle_interval = cli.cycle.or(defaults.cycle_interval).unwrap_or(0.0);
        let settings = RunSettings::new(speed, fps, cycle_interval)?;

        let depth = ColorDepth::detect();
        let colors = ColorContext::new(
            ColorAdapter::new(depth, config.cache.rgb_capacity),
            SequenceCache::new(config.cache.sequence_capacity),
            schemes,
        );
        if scheme == SchemeName::Custom && !colors.schemes.has_custom() {
            tracing::warn!("custom colors requested but none are configured");
        }
        Ok(Self {
            text_dir: cli.text_dir.clone().or(defaults.text_dir).unwrap_or_else(|| DEFAULT_TEXT_DIR.into()),
            mode: cli.mode.or(defaults.mode).unwrap_or_default(),
            scheme,
            settings,
            colors,
        })
    }
}

fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    // stdout belongs to the animation so logs only ever go to a file
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(cli.log_file.as_deref().or(config.log_file.as_deref()))?;
    let start_fallback = config.defaults.start_fallback;
    let Launch { text_dir, mut mode, mut scheme, settings, mut colors } = Launch::new(&cli, config)?;

    let source = DirectorySource::open(&text_dir).with_context(|| format!("loading text from {}", text_dir.display()))?;
    let mut block_index = starting_block(source.list_blocks(), cli.file.as_deref(), start_fallback);

    if !io::stdout().is_terminal() {
        return Err(anyhow!("terminal-flow needs to run in a terminal"));
    }
    if !colors.adapter.has_colors() {
        tracing::warn!("terminal has no color support, animating without colors");
    }

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        original_hook(info);
    }));

    let mut terminal = CrosstermTerminal::new(io::stdout(), colors.adapter.depth()).context("setting up terminal")?;
    loop {
        let mut controller = Controller::new(&mut terminal, &source, &mut colors, mode.create(), settings)
            .with_start_fallback(start_fallback);
        let Some(switch) = controller.run(scheme, block_index)? else {
            break;
        };
        tracing::info!("switching from {mode} to {}", switch.next_mode);
        mode = switch.next_mode;
        scheme = switch.scheme;
        block_index = switch.block_index;
    }
    drop(terminal);

    let (rgb, sequences) = (colors.adapter.stats(), colors.sequences.stats());
    tracing::debug!(
        "rgb cache: {} hits, {} misses, {}/{} entries",
        rgb.hits,
        rgb.misses,
        rgb.size,
        rgb.capacity
    );
    tracing::debug!(
        "sequence cache: {} hits, {} misses, {}/{} entries",
        sequences.hits,
        sequences.misses,
        sequences.size,
        sequences.capacity
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
