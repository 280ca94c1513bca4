use super::cache::{BoundedCache, CacheStats};
use super::generator::Rgb;
use super::scheme::ColorScheme;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Default number of frame sets kept around.
pub const DEFAULT_FRAME_CACHE_SIZE: usize = 100;

/// How many seconds of animation are pre-calculated unless told otherwise.
const DEFAULT_DURATION: f64 = 2.0;

/// The colors of every character, for every frame.
pub type Frames = Rc<Vec<Vec<Rgb>>>;

/// Identifies a set of pre-calculated frames.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameKey {
    scheme: String,
    text_length: usize,
    frame_count: usize,
    /// The bit pattern of the speed.
    speed: u64,
    extra: String,
}

impl FrameKey {
    pub fn new(scheme: &dyn ColorScheme, text_length: usize, frame_count: usize, speed: f64) -> Self {
        Self { scheme: scheme.id(), text_length, frame_count, speed: speed.to_bits(), extra: String::new() }
    }

    /// Attach extra parameters to the key. They are sorted so their order doesn't matter.
    pub fn with_params(mut self, params: &[(&str, String)]) -> Self {
        let mut params: Vec<_> = params.iter().map(|(name, value)| format!("{name}={value}")).collect();
        params.sort();
        self.extra = params.join("_");
        self
    }
}

/// A bounded cache of pre-calculated frame sets.
#[derive(Debug)]
pub struct FrameCache {
    cache: BoundedCache<FrameKey, Frames>,
}

impl FrameCache {
    pub fn new(capacity: usize) -> Self {
        Self { cache: BoundedCache::new(capacity) }
    }

    pub fn get(&mut self, key: &FrameKey) -> Option<Frames> {
        self.cache.get(key).cloned()
    }

    pub fn store(&mut self, key: FrameKey, frames: Frames) {
        self.cache.insert(key, frames);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// A snapshot of what an animator is doing.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatorStats {
    pub fps: u32,
    pub frame_duration: Duration,
    pub current_frame: usize,
    pub total_frames: usize,
    pub speed: f64,
    pub cache: Option<CacheStats>,
}

/// Plays back pre-calculated color frames for a run of characters.
#[derive(Debug)]
pub struct ColorAnimator {
    scheme: Box<dyn ColorScheme>,
    fps: u32,
    frame_duration: Duration,
    cache: Option<FrameCache>,
    frames: Option<Frames>,
    frame_index: usize,
    last_frame: Instant,
    speed: f64,
    text_length: usize,
}

impl ColorAnimator {
    /// Create an animator. A zero fps is treated as 1, and `cache_size` set to `None` disables
    /// frame caching.
    pub fn new(scheme: Box<dyn ColorScheme>, fps: u32, cache_size: Option<usize>) -> Self {
        let fps = fps.max(1);
        Self {
            scheme,
            fps,
            frame_duration: Duration::from_secs_f64(1.0 / fps as f64),
            cache: cache_size.map(FrameCache::new),
            frames: None,
            frame_index: 0,
            last_frame: Instant::now(),
            speed: 1.0,
            text_length: 0,
        }
    }

    /// Compute `duration * fps` frames of animation for `text_length` characters.
    pub fn pre_calculate_frames(&mut self, text_length: usize, speed: f64, duration: Option<f64>) -> Frames {
        let duration = duration.unwrap_or(DEFAULT_DURATION);
        let frame_count = (duration * self.fps as f64) as usize;
        let key = FrameKey::new(self.scheme.as_ref(), text_length, frame_count, speed)
            .with_params(&[("fps", self.fps.to_string())]);
        if let Some(frames) = self.cache.as_mut().and_then(|cache| cache.get(&key)) {
            return frames;
        }

        let fps = self.fps as f64;
        let frames: Vec<_> = (0..frame_count)
            .map(|frame| {
                let offset = (frame as f64 / fps * speed * 0.5).rem_euclid(1.0);
                self.scheme.get_colors(text_length, offset)
            })
            .collect();
        let frames = Rc::new(frames);
        tracing::debug!("pre-calculated {frame_count} frames for {text_length} characters");
        if let Some(cache) = &mut self.cache {
            cache.store(key, frames.clone());
        }
        frames
    }

    /// Pre-calculate frames and start playing them from the first one.
    pub fn initialize(&mut self, text_length: usize, speed: f64) {
        self.text_length = text_length;
        self.speed = speed;
        self.frames = Some(self.pre_calculate_frames(text_length, speed, None));
        self.frame_index = 0;
        self.last_frame = Instant::now();
    }

    pub fn current_frame(&self) -> Option<&[Rgb]> {
        let frames = self.frames.as_ref()?;
        frames.get(self.frame_index).map(Vec::as_slice)
    }

    /// The current frame formatted as `#rrggbb` strings.
    pub fn current_frame_hex(&self) -> Option<Vec<String>> {
        self.current_frame().map(|colors| colors.iter().map(|color| color.to_hex()).collect())
    }

    /// Move to the next frame if a frame's worth of time went by since the last one.
    pub fn advance_frame(&mut self, force: bool) -> bool {
        self.advance_frame_at(Instant::now(), force)
    }

    pub fn advance_frame_at(&mut self, now: Instant, force: bool) -> bool {
        let Some(frames) = &self.frames else {
            return false;
        };
        if frames.is_empty() {
            return false;
        }
        if force || now.saturating_duration_since(self.last_frame) >= self.frame_duration {
            self.frame_index = (self.frame_index + 1) % frames.len();
            self.last_frame = now;
            true
        } else {
            false
        }
    }

    /// Change the speed, recalculating frames if the animation was initialized.
    pub fn set_speed(&mut self, speed: f64) {
        if speed != self.speed && self.text_length > 0 {
            self.speed = speed;
            self.frames = Some(self.pre_calculate_frames(self.text_length, speed, None));
            self.frame_index = 0;
        }
    }

    pub fn stats(&self) -> AnimatorStats {
        AnimatorStats {
            fps: self.fps,
            frame_duration: self.frame_duration,
            current_frame: self.frame_index,
            total_frames: self.frames.as_ref().map(|frames| frames.len()).unwrap_or(0),
            speed: self.speed,
            cache: self.cache.as_ref().map(FrameCache::stats),
        }
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
    }
}
