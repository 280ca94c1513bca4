use super::common::{AnimationMode, Stage};
use super::ModeKind;
use crate::colors::{ColorContext, SchemeError, SchemeName};
use crate::terminal::{InputEvent, Key, Terminal};
use crate::text::{StartFallback, TextBlock, TextError, TextSource};
use std::io;
use std::thread;
use std::time::{Duration, Instant};

/// Errors that can occur while running an animation.
#[derive(thiserror::Error, Debug)]
pub enum AnimationError {
    #[error("terminal: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Scheme(#[from] SchemeError),

    #[error("animation is not running: {0:?}")]
    NotRunning(LoopState),

    #[error("{name} must be {requirement}, got {value}")]
    InvalidSetting { name: &'static str, requirement: &'static str, value: String },
}

/// How fast and how often things happen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSettings {
    speed: f64,
    fps: u32,
    cycle_interval: Option<Duration>,
}

impl RunSettings {
    /// A zero `cycle_interval` disables cycling through blocks automatically.
    pub fn new(speed: f64, fps: u32, cycle_interval: f64) -> Result<Self, AnimationError> {
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(AnimationError::InvalidSetting { name: "speed", requirement: "positive", value: speed.to_string() });
        }
        if fps == 0 {
            return Err(AnimationError::InvalidSetting { name: "fps", requirement: "positive", value: fps.to_string() });
        }
        let invalid_cycle = || AnimationError::InvalidSetting {
            name: "cycle interval",
            requirement: "zero or a positive number of seconds that fits a duration",
            value: cycle_interval.to_string(),
        };
        if !(cycle_interval >= 0.0) {
            return Err(invalid_cycle());
        }
        let cycle_interval = match Duration::try_from_secs_f64(cycle_interval) {
            Ok(interval) if interval.is_zero() => None,
            Ok(interval) => Some(interval),
            Err(_) => return Err(invalid_cycle()),
        };
        Ok(Self { speed, fps, cycle_interval })
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Time between two frames.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Time between automatic block changes, if enabled.
    pub fn cycle_interval(&self) -> Option<Duration> {
        self.cycle_interval
    }
}

/// What a mode switch carries over into the next mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeSwitch {
    pub next_mode: ModeKind,
    pub block_index: usize,
    pub scheme: SchemeName,
}

/// The result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    SwitchMode(ModeSwitch),
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    ModeSwitchRequested,
    ExitRequested,
}

/// Drives an animation mode: handles input, paces frames and cycles through text blocks.
pub struct Controller<'a, T: Terminal, S: TextSource + ?Sized> {
    terminal: &'a mut T,
    source: &'a S,
    colors: &'a mut ColorContext,
    mode: Box<dyn AnimationMode>,
    settings: RunSettings,
    start_fallback: StartFallback,
    state: LoopState,
    stage: Option<Stage>,
    block_index: usize,
    last_block_change: Instant,
    last_update: Instant,
}

impl<'a, T: Terminal, S: TextSource + ?Sized> Controller<'a, T, S> {
    pub fn new(
        terminal: &'a mut T,
        source: &'a S,
        colors: &'a mut ColorContext,
        mode: Box<dyn AnimationMode>,
        settings: RunSettings,
    ) -> Self {
        let now = Instant::now();
        Self {
            terminal,
            source,
            colors,
            mode,
            settings,
            start_fallback: StartFallback::default(),
            state: LoopState::Uninitialized,
            stage: None,
            block_index: 0,
            last_block_change: now,
            last_update: now,
        }
    }

    /// How to pick a block when asked to start at one that doesn't exist.
    pub fn with_start_fallback(mut self, fallback: StartFallback) -> Self {
        self.start_fallback = fallback;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn block_index(&self) -> usize {
        self.block_index
    }

    pub fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    /// Set up the first block, starting at `start_index` and skipping blank or unreadable ones.
    ///
    /// An out of range `start_index` is replaced by one picked through the start fallback.
    pub fn enter(&mut self, scheme: SchemeName, start_index: usize) -> Result<(), AnimationError> {
        let count = self.source.len();
        if count == 0 {
            return Err(TextError::NoBlocks("text source".into()).into());
        }
        let start_index = if start_index < count {
            start_index
        } else {
            let index = self.start_fallback.pick(count);
            tracing::warn!("block {start_index} doesn't exist, starting at block {index}");
            index
        };
        let (index, block) = self.find_block(start_index, 1, true)?;
        self.terminal.hide_cursor()?;
        if !self.terminal.supports_color() {
            tracing::debug!("terminal has no colors, drawing plain text");
        }
        let (rows, cols) = self.terminal.size();
        let mut stage = Stage::new(block, rows, cols, scheme);
        stage.regenerate_palette(self.colors);
        self.mode.init_state(&stage, self.colors);

        tracing::debug!("entering {} at block {index} with {scheme} colors", self.mode.kind());
        self.block_index = index;
        self.stage = Some(stage);
        self.state = LoopState::Running;
        let now = Instant::now();
        self.last_block_change = now;
        self.last_update = now;
        Ok(())
    }

    /// Run the animation until the user either quits or switches modes.
    pub fn run(&mut self, scheme: SchemeName, start_index: usize) -> Result<Option<ModeSwitch>, AnimationError> {
        self.enter(scheme, start_index)?;
        loop {
            match self.tick()? {
                TickOutcome::Continue => continue,
                TickOutcome::SwitchMode(switch) => return Ok(Some(switch)),
                TickOutcome::Exit => return Ok(None),
            }
        }
    }

    /// Handle input, then update and draw a single frame.
    pub fn tick(&mut self) -> Result<TickOutcome, AnimationError> {
        if self.state != LoopState::Running {
            return Err(AnimationError::NotRunning(self.state));
        }

        if let Some(event) = self.terminal.poll_event()? {
            let outcome = self.handle_event(event)?;
            if outcome != TickOutcome::Continue {
                return Ok(outcome);
            }
        }
        self.cycle_blocks()?;
        self.pace();

        let Some(stage) = self.stage.as_mut() else {
            return Ok(TickOutcome::Exit);
        };
        self.mode.update_state(stage, self.settings.speed, self.settings.update_interval().as_secs_f64());
        self.terminal.clear();
        self.mode.draw(stage, &mut *self.terminal);
        self.terminal.commit_frame()?;
        Ok(TickOutcome::Continue)
    }

    fn handle_event(&mut self, event: InputEvent) -> Result<TickOutcome, AnimationError> {
        let Some(stage) = self.stage.as_mut() else {
            return Ok(TickOutcome::Exit);
        };
        match event {
            InputEvent::Resize { rows, cols } => {
                stage.resize(rows, cols);
                self.mode.on_resize(stage);
            }
            InputEvent::Key(Key::Char('q' | 'Q') | Key::Escape | Key::Interrupt) => {
                self.state = LoopState::ExitRequested;
                return Ok(TickOutcome::Exit);
            }
            InputEvent::Key(Key::Right) => self.change_block(1)?,
            InputEvent::Key(Key::Left) => self.change_block(-1)?,
            InputEvent::Key(Key::Char('c' | 'C')) => {
                let scheme = stage.scheme().next();
                stage.set_scheme(scheme);
                self.mode.on_scheme_change(stage, self.colors);
                tracing::debug!("switched to {scheme} colors");
            }
            InputEvent::Key(Key::Char('m' | 'M')) => {
                let switch =
                    ModeSwitch { next_mode: self.mode.kind().next(), block_index: self.block_index, scheme: stage.scheme() };
                tracing::debug!("switching to {} mode", switch.next_mode);
                self.state = LoopState::ModeSwitchRequested;
                return Ok(TickOutcome::SwitchMode(switch));
            }
            InputEvent::Key(_) => (),
        }
        Ok(TickOutcome::Continue)
    }

    fn cycle_blocks(&mut self) -> Result<(), AnimationError> {
        let Some(interval) = self.settings.cycle_interval() else {
            return Ok(());
        };
        if self.source.len() > 1 && self.last_block_change.elapsed() >= interval {
            self.change_block(1)?;
        }
        Ok(())
    }

    fn change_block(&mut self, step: isize) -> Result<(), AnimationError> {
        let count = self.source.len() as isize;
        let start = (self.block_index as isize + step).rem_euclid(count) as usize;
        let (index, block) = self.find_block(start, step, false)?;
        if let Some(stage) = self.stage.as_mut() {
            stage.set_block(block);
            self.mode.on_text_change(stage);
        }
        tracing::debug!("showing block {index}");
        self.block_index = index;
        self.last_block_change = Instant::now();
        Ok(())
    }

    /// Find the first loadable block walking from `start` in `step` increments.
    ///
    /// When skipping blank blocks and every block is blank, the first loadable one is used.
    fn find_block(&self, start: usize, step: isize, skip_blank: bool) -> Result<(usize, TextBlock), AnimationError> {
        let count = self.source.len();
        let mut blank = None;
        let mut last_error = None;
        for attempt in 0..count {
            let index = (start as isize + step * attempt as isize).rem_euclid(count as isize) as usize;
            match self.source.load_block(index) {
                Ok(block) if skip_blank && block.is_blank() => {
                    blank.get_or_insert((index, block));
                }
                Ok(block) => return Ok((index, block)),
                Err(e) => {
                    tracing::warn!("skipping block {index}: {e}");
                    last_error = Some(e);
                }
            }
        }
        match (blank, last_error) {
            (Some(found), _) => Ok(found),
            (None, Some(e)) => Err(e.into()),
            (None, None) => Err(TextError::NoBlocks("text source".into()).into()),
        }
    }

    /// Sleep for whatever is left of the current frame.
    fn pace(&mut self) {
        let interval = self.settings.update_interval();
        let elapsed = self.last_update.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
        self.last_update = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::colors;
    use crate::colors::{CellStyle, ColorAdapter, ColorDepth, SchemeBook, SequenceCache};
    use crate::terminal::MemoryTerminal;
    use crate::text::StaticSource;
    use rstest::rstest;

    fn source() -> StaticSource {
        StaticSource::new([("a.txt", "aaa"), ("b.txt", "bbb"), ("c.txt", "ccc"), ("d.txt", "ddd")])
    }

    fn settings() -> RunSettings {
        RunSettings::new(1.0, 1000, 0.0).expect("invalid settings")
    }

    #[test]
    fn mode_switch_carries_state() {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);
        terminal.push_key(Key::Char('m'));

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings());
        let result = controller.run(SchemeName::Red, 2).expect("run failed");
        assert_eq!(result, Some(ModeSwitch { next_mode: ModeKind::Spin, block_index: 2, scheme: SchemeName::Red }));
        assert_eq!(controller.state(), LoopState::ModeSwitchRequested);
    }

    #[rstest]
    #[case(Key::Char('q'))]
    #[case(Key::Char('Q'))]
    #[case(Key::Escape)]
    #[case(Key::Interrupt)]
    fn exit_keys(#[case] key: Key) {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);
        terminal.push_key(key);

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Spin.create(), settings());
        assert_eq!(controller.run(SchemeName::Rainbow, 0).expect("run failed"), None);
        assert_eq!(controller.state(), LoopState::ExitRequested);
    }

    #[test]
    fn navigation_wraps() {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);
        terminal.push_key(Key::Left);

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings());
        controller.enter(SchemeName::Rainbow, 0).expect("enter failed");
        assert_eq!(controller.tick().expect("tick failed"), TickOutcome::Continue);
        assert_eq!(controller.block_index(), 3);
        drop(controller);
        assert_eq!(terminal.row_text(4).trim(), "ddd");
    }

    #[test]
    fn frames_are_drawn() {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(5, 9);
        terminal.push_key(Key::Right);
        terminal.push_key(Key::Char('x'));
        terminal.push_key(Key::Char('q'));

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Flux.create(), settings());
        controller.run(SchemeName::Rainbow, 0).expect("run failed");
        drop(controller);
        assert_eq!(terminal.commits(), 2);
        assert_eq!(terminal.row_text(2), "   bbb");
    }

    #[test]
    fn color_cycling() {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);
        terminal.push_key(Key::Char('c'));
        terminal.push_key(Key::Char('C'));
        terminal.push_key(Key::Char('m'));

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Morph.create(), settings());
        let switch = controller.run(SchemeName::Orange, 1).expect("run failed").expect("no switch");
        assert_eq!(switch.scheme, SchemeName::Red);
        assert_eq!(switch.next_mode, ModeKind::Wave);
    }

    #[test]
    fn resize_recenters() {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);
        terminal.push_event(InputEvent::Resize { rows: 3, cols: 20 });

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Pulse.create(), settings());
        controller.enter(SchemeName::Rainbow, 0).expect("enter failed");
        controller.tick().expect("tick failed");
        let bounds = *controller.stage().expect("no stage").bounds();
        assert_eq!((bounds.offset_row, bounds.offset_col), (1, 8));
    }

    #[test]
    fn blank_blocks_are_skipped_on_entry() {
        let source = StaticSource::new([("a.txt", "  \n"), ("b.txt", ""), ("c.txt", "ccc")]);
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings());
        controller.enter(SchemeName::Rainbow, 0).expect("enter failed");
        assert_eq!(controller.block_index(), 2);
    }

    #[test]
    fn all_blank_keeps_start() {
        let source = StaticSource::new([("a.txt", "  "), ("b.txt", "")]);
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings());
        controller.enter(SchemeName::Rainbow, 1).expect("enter failed");
        assert_eq!(controller.block_index(), 1);
        assert!(controller.stage().expect("no stage").bounds().is_empty());
    }

    #[rstest]
    #[case(StartFallback::First, 0)]
    #[case(StartFallback::Random, 4)]
    fn out_of_range_start_uses_fallback(#[case] fallback: StartFallback, #[case] requested: usize) {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings())
            .with_start_fallback(fallback);
        controller.enter(SchemeName::Rainbow, requested + 7).expect("enter failed");
        assert!(controller.block_index() < source.len());
        if fallback == StartFallback::First {
            assert_eq!(controller.block_index(), 0);
        }
    }

    #[test]
    fn colorless_terminal_draws_plain_text() {
        let source = source();
        let mut colors = ColorContext::new(
            ColorAdapter::new(ColorDepth::None, 10),
            SequenceCache::default(),
            SchemeBook::default(),
        );
        let mut terminal = MemoryTerminal::new(5, 9).with_depth(ColorDepth::None);
        assert!(!terminal.supports_color());

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings());
        controller.enter(SchemeName::Rainbow, 0).expect("enter failed");
        controller.tick().expect("tick failed");
        drop(controller);
        assert!(!colors.adapter.has_colors());
        assert_eq!(terminal.cell(2, 3), Some(('a', CellStyle::bold())));
    }

    #[test]
    fn empty_source() {
        let source = StaticSource::default();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings());
        let result = controller.run(SchemeName::Rainbow, 0);
        assert!(matches!(result, Err(AnimationError::Text(TextError::NoBlocks(_)))));
        assert_eq!(controller.state(), LoopState::Uninitialized);
    }

    #[test]
    fn tick_requires_entry() {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings());
        assert!(matches!(controller.tick(), Err(AnimationError::NotRunning(LoopState::Uninitialized))));
    }

    #[test]
    fn automatic_cycling() {
        let source = source();
        let mut colors = colors();
        let mut terminal = MemoryTerminal::new(10, 10);
        let settings = RunSettings::new(1.0, 1000, 0.001).expect("invalid settings");

        let mut controller = Controller::new(&mut terminal, &source, &mut colors, ModeKind::Wave.create(), settings);
        controller.enter(SchemeName::Rainbow, 0).expect("enter failed");
        thread::sleep(Duration::from_millis(5));
        controller.tick().expect("tick failed");
        assert_eq!(controller.block_index(), 1);
    }

    #[rstest]
    #[case(0.0, 10, 0.0)]
    #[case(-1.0, 10, 0.0)]
    #[case(1.0, 0, 0.0)]
    #[case(1.0, 10, -5.0)]
    #[case(f64::NAN, 10, 0.0)]
    #[case(1.0, 10, f64::INFINITY)]
    #[case(1.0, 10, 1e20)]
    fn invalid_settings(#[case] speed: f64, #[case] fps: u32, #[case] cycle: f64) {
        assert!(matches!(RunSettings::new(speed, fps, cycle), Err(AnimationError::InvalidSetting { .. })));
    }

    #[test]
    fn settings_intervals() {
        let settings = RunSettings::new(2.0, 10, 0.0).expect("invalid settings");
        assert_eq!(settings.update_interval(), Duration::from_millis(100));
        assert_eq!(settings.cycle_interval(), None);
        let settings = RunSettings::new(2.0, 10, 30.0).expect("invalid settings");
        assert_eq!(settings.cycle_interval(), Some(Duration::from_secs(30)));
    }
}
