use crate::colors::{BasicColor, CellStyle, ColorDepth, TermColor};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

/// A key the animations react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Escape,
    Char(char),
    /// Ctrl-C.
    Interrupt,
}

/// Something that happened on the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Resize { rows: u16, cols: u16 },
}

/// A grid of cells that can be drawn on.
pub trait Canvas {
    /// The size as `(rows, columns)`.
    fn size(&self) -> (u16, u16);

    /// Write a character. Positions outside the canvas are ignored.
    fn write_cell(&mut self, row: i32, col: i32, ch: char, style: CellStyle);
}

/// A terminal animations are rendered into.
pub trait Terminal: Canvas {
    /// Get the next pending event, without blocking.
    fn poll_event(&mut self) -> io::Result<Option<InputEvent>>;

    /// Erase everything drawn since the last commit.
    fn clear(&mut self);

    /// Make everything drawn so far visible.
    fn commit_frame(&mut self) -> io::Result<()>;

    fn hide_cursor(&mut self) -> io::Result<()>;

    fn color_depth(&self) -> ColorDepth;

    fn supports_color(&self) -> bool {
        self.color_depth() != ColorDepth::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    ch: char,
    style: CellStyle,
}

impl Cell {
    const BLANK: Self = Self { ch: ' ', style: CellStyle { color: None, bold: false, dim: false } };
}

/// A grid of cells.
#[derive(Clone, Debug)]
struct CellGrid {
    rows: u16,
    cols: u16,
    cells: Vec<Cell>,
}

impl CellGrid {
    fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols, cells: vec![Cell::BLANK; rows as usize * cols as usize] }
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let (row, col) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        if row < self.rows as usize && col < self.cols as usize {
            Some(row * self.cols as usize + col)
        } else {
            None
        }
    }

    fn set(&mut self, row: i32, col: i32, cell: Cell) {
        if let Some(index) = self.index(row, col) {
            self.cells[index] = cell;
        }
    }

    fn get(&self, row: i32, col: i32) -> Option<Cell> {
        self.index(row, col).map(|index| self.cells[index])
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }
}

fn translate_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    let key = match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Esc => Key::Escape,
        _ => return None,
    };
    Some(key)
}

fn to_color(color: TermColor) -> Color {
    match color {
        TermColor::Indexed(index) => Color::AnsiValue(index),
        TermColor::Basic(color) => match color {
            BasicColor::Red => Color::DarkRed,
            BasicColor::Yellow => Color::DarkYellow,
            BasicColor::Green => Color::DarkGreen,
            BasicColor::Cyan => Color::DarkCyan,
            BasicColor::Blue => Color::DarkBlue,
            BasicColor::Magenta => Color::DarkMagenta,
            BasicColor::White => Color::White,
            BasicColor::Gray => Color::Grey,
        },
    }
}

/// A terminal driven through crossterm.
///
/// Frames are double buffered so only the cells that changed since the previous commit are
/// written out.
pub struct CrosstermTerminal<W: Write> {
    out: W,
    depth: ColorDepth,
    previous: CellGrid,
    next: CellGrid,
    full_redraw: bool,
}

impl<W: Write> CrosstermTerminal<W> {
    /// Take over the terminal: switch to the alternate screen and enable raw mode.
    pub fn new(mut out: W, depth: ColorDepth) -> io::Result<Self> {
        execute!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            depth,
            previous: CellGrid::new(rows, cols),
            next: CellGrid::new(rows, cols),
            full_redraw: true,
        })
    }

    fn resize(&mut self, rows: u16, cols: u16) {
        self.previous = CellGrid::new(rows, cols);
        self.next = CellGrid::new(rows, cols);
        self.full_redraw = true;
    }

    fn apply_style(&mut self, style: CellStyle) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        if let Some(color) = style.color {
            queue!(self.out, SetForegroundColor(to_color(color)))?;
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        }
        Ok(())
    }
}

impl<W: Write> Canvas for CrosstermTerminal<W> {
    fn size(&self) -> (u16, u16) {
        (self.next.rows, self.next.cols)
    }

    fn write_cell(&mut self, row: i32, col: i32, ch: char, style: CellStyle) {
        self.next.set(row, col, Cell { ch, style });
    }
}

impl<W: Write> Terminal for CrosstermTerminal<W> {
    fn poll_event(&mut self) -> io::Result<Option<InputEvent>> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(key) = translate_key(key) {
                        return Ok(Some(InputEvent::Key(key)));
                    }
                }
                Event::Resize(cols, rows) => {
                    self.resize(rows, cols);
                    return Ok(Some(InputEvent::Resize { rows, cols }));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn clear(&mut self) {
        self.next.clear();
    }

    fn commit_frame(&mut self) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        if self.full_redraw {
            queue!(self.out, SetAttribute(Attribute::Reset), ResetColor, Clear(ClearType::All))?;
            self.previous.clear();
            self.full_redraw = false;
        }

        let mut last_style = None;
        for row in 0..self.next.rows as i32 {
            for col in 0..self.next.cols as i32 {
                let (Some(before), Some(after)) = (self.previous.get(row, col), self.next.get(row, col)) else {
                    continue;
                };
                if before == after {
                    continue;
                }
                queue!(self.out, cursor::MoveTo(col as u16, row as u16))?;
                if last_style != Some(after.style) {
                    self.apply_style(after.style)?;
                    last_style = Some(after.style);
                }
                queue!(self.out, Print(after.ch))?;
            }
        }
        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;

        std::mem::swap(&mut self.previous, &mut self.next);
        Ok(())
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        execute!(self.out, cursor::Hide)
    }

    fn color_depth(&self) -> ColorDepth {
        self.depth
    }
}

impl<W: Write> Drop for CrosstermTerminal<W> {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.out, SetAttribute(Attribute::Reset), ResetColor, cursor::Show, EnableLineWrap, LeaveAlternateScreen);
    }
}

/// Give the terminal back to the shell. Used when the program panics.
pub fn restore_terminal() {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stdout(), ResetColor, cursor::Show, EnableLineWrap, LeaveAlternateScreen);
}

/// A terminal that lives in memory and replays scripted input.
#[derive(Clone, Debug)]
pub struct MemoryTerminal {
    drawing: CellGrid,
    committed: CellGrid,
    events: VecDeque<InputEvent>,
    depth: ColorDepth,
    commits: usize,
}

impl MemoryTerminal {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            drawing: CellGrid::new(rows, cols),
            committed: CellGrid::new(rows, cols),
            events: VecDeque::new(),
            depth: ColorDepth::Extended,
            commits: 0,
        }
    }

    pub fn with_depth(mut self, depth: ColorDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Queue an event to be returned by a later poll.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn push_key(&mut self, key: Key) {
        self.push_event(InputEvent::Key(key));
    }

    /// The character and style at a position of the last committed frame.
    pub fn cell(&self, row: u16, col: u16) -> Option<(char, CellStyle)> {
        self.committed.get(row as i32, col as i32).map(|cell| (cell.ch, cell.style))
    }

    /// The text of a row of the last committed frame, without trailing blanks.
    pub fn row_text(&self, row: u16) -> String {
        let text: String = (0..self.committed.cols).filter_map(|col| self.cell(row, col)).map(|(ch, _)| ch).collect();
        text.trim_end().to_string()
    }

    /// How many frames were committed.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Canvas for MemoryTerminal {
    fn size(&self) -> (u16, u16) {
        (self.drawing.rows, self.drawing.cols)
    }

    fn write_cell(&mut self, row: i32, col: i32, ch: char, style: CellStyle) {
        self.drawing.set(row, col, Cell { ch, style });
    }
}

impl Terminal for MemoryTerminal {
    fn poll_event(&mut self) -> io::Result<Option<InputEvent>> {
        let event = self.events.pop_front();
        if let Some(InputEvent::Resize { rows, cols }) = event {
            self.drawing = CellGrid::new(rows, cols);
            self.committed = CellGrid::new(rows, cols);
        }
        Ok(event)
    }

    fn clear(&mut self) {
        self.drawing.clear();
    }

    fn commit_frame(&mut self) -> io::Result<()> {
        self.committed = self.drawing.clone();
        self.commits += 1;
        Ok(())
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn color_depth(&self) -> ColorDepth {
        self.depth
    }
}
