use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The extension text block files carry.
const BLOCK_EXTENSION: &str = "txt";

/// Errors that can occur when loading text blocks.
#[derive(thiserror::Error, Debug)]
pub enum TextError {
    #[error("text directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("no text blocks found in {0}")]
    NoBlocks(String),

    #[error("text block {0} does not exist")]
    NoSuchBlock(usize),

    #[error("reading {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// A piece of ASCII art.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBlock {
    lines: Vec<String>,
}

impl TextBlock {
    /// Split a text into lines, dropping carriage returns.
    pub fn from_text(text: &str) -> Self {
        let lines = text.split('\n').map(|line| line.replace('\r', "")).collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether there's nothing but whitespace in this block.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

/// The part of a block that contains something, and where it lands on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentBounds {
    pub first_line: usize,
    pub last_line: usize,
    pub width: usize,
    pub height: usize,
    /// Screen row of the block's first line. This can be negative when leading blank lines
    /// are pushed off screen.
    pub offset_row: i32,
    pub offset_col: i32,
}

impl ContentBounds {
    /// Compute the bounds of a block centered in a `rows` by `cols` terminal.
    pub fn compute(block: &TextBlock, rows: u16, cols: u16) -> Self {
        let lines = block.lines();
        let is_content = |line: &String| !line.trim().is_empty();
        let (Some(first_line), Some(last_line)) = (lines.iter().position(is_content), lines.iter().rposition(is_content))
        else {
            return Self::default();
        };
        let width = lines[first_line..=last_line].iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let height = last_line - first_line + 1;
        let offset_row = ((rows as i32 - height as i32) / 2).max(0) - first_line as i32;
        let offset_col = ((cols as i32 - width as i32) / 2).max(0);
        Self { first_line, last_line, width, height, offset_row, offset_col }
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// The screen position at the middle of the content, as `(row, col)`.
    pub fn center(&self) -> (i32, i32) {
        let row = self.offset_row + self.height as i32 / 2;
        let col = self.offset_col + self.width as i32 / 2;
        (row, col)
    }
}

/// Where text blocks come from.
pub trait TextSource {
    /// The names of all blocks, in display order.
    fn list_blocks(&self) -> &[String];

    fn load_block(&self, index: usize) -> Result<TextBlock, TextError>;

    fn len(&self) -> usize {
        self.list_blocks().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Text blocks stored as `.txt` files in a directory.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
    names: Vec<String>,
}

impl DirectorySource {
    /// Discover the blocks in a directory, sorted by file name.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, TextError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(TextError::DirectoryNotFound(root));
        }
        let entries = fs::read_dir(&root).map_err(|source| TextError::Read { path: root.clone(), source })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| TextError::Read { path: root.clone(), source })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|extension| extension == BLOCK_EXTENSION) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        if names.is_empty() {
            return Err(TextError::NoBlocks(root.display().to_string()));
        }
        names.sort();
        tracing::info!("found {} text blocks in {}", names.len(), root.display());
        Ok(Self { root, names })
    }
}

impl TextSource for DirectorySource {
    fn list_blocks(&self) -> &[String] {
        &self.names
    }

    fn load_block(&self, index: usize) -> Result<TextBlock, TextError> {
        let name = self.names.get(index).ok_or(TextError::NoSuchBlock(index))?;
        let path = self.root.join(name);
        let text = fs::read_to_string(&path).map_err(|source| TextError::Read { path, source })?;
        Ok(TextBlock::from_text(&text))
    }
}

/// Text blocks held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    names: Vec<String>,
    blocks: Vec<TextBlock>,
}

impl StaticSource {
    pub fn new<I, N, T>(blocks: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: AsRef<str>,
    {
        let (names, blocks) = blocks.into_iter().map(|(name, text)| (name.into(), TextBlock::from_text(text.as_ref()))).unzip();
        Self { names, blocks }
    }
}

impl TextSource for StaticSource {
    fn list_blocks(&self) -> &[String] {
        &self.names
    }

    fn load_block(&self, index: usize) -> Result<TextBlock, TextError> {
        self.blocks.get(index).cloned().ok_or(TextError::NoSuchBlock(index))
    }
}

/// How to pick the first block when the requested one doesn't exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartFallback {
    /// Always start at the first block.
    #[default]
    First,
    /// Start at a random block.
    Random,
}

impl StartFallback {
    pub fn pick(self, count: usize) -> usize {
        match self {
            Self::First => 0,
            Self::Random if count > 0 => fastrand::usize(..count),
            Self::Random => 0,
        }
    }
}

/// Find the index of the block to start with.
///
/// `name` matches a block either by its full name or by its name without the `.txt` extension.
/// When no name is given or nothing matches, the fallback policy decides.
pub fn starting_block(names: &[String], name: Option<&str>, fallback: StartFallback) -> usize {
    let Some(name) = name else {
        return fallback.pick(names.len());
    };
    let target = if name.ends_with(".txt") { name.to_string() } else { format!("{name}.{BLOCK_EXTENSION}") };
    match names.iter().position(|candidate| *candidate == target) {
        Some(index) => index,
        None => {
            tracing::warn!("{target} not found, using {fallback:?} block");
            fallback.pick(names.len())
        }
    }
}
