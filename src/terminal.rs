// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Pen state last sent to the terminal.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

/// Owns the alternate screen for as long as it lives.
pub struct Terminal {
    stdout: Stdout,
    last: Vec<Cell>,
    last_size: Option<(u16, u16)>,
    rows: Vec<Vec<usize>>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: Vec::new(),
            last_size: None,
            rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn put(&mut self, pen: &mut Pen, x: u16, y: u16, cell: Cell) -> Result<()> {
        if pen.pos != Some((x, y)) {
            self.stdout.queue(cursor::MoveTo(x, y))?;
        }
        if cell.fg != pen.fg {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = cell.fg;
        }
        if cell.bg != pen.bg {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = cell.bg;
        }
        if cell.bold != pen.bold {
            self.stdout.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = cell.bold;
        }
        self.stdout.queue(Print(cell.ch))?;
        pen.pos = Some((x.saturating_add(1), y));
        Ok(())
    }

    /// Flushes the changed cells of `frame` and clears its dirty state.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let len = frame.width as usize * frame.height as usize;
        let mut pen = Pen::default();

        let resized = self.last_size != Some(size);
        let dirty_is_large = len > 0 && frame.dirty_indices().len() >= len / 3;

        if resized || frame.is_dirty_all() || dirty_is_large {
            if resized {
                self.stdout
                    .queue(terminal::Clear(terminal::ClearType::All))?;
                self.last_size = Some(size);
            }
            self.last.clear();
            self.last.reserve(len);
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let cell = frame.cell_at_index(y as usize * frame.width as usize + x as usize);
                    self.put(&mut pen, x, y, cell)?;
                    self.last.push(cell);
                }
            }
        } else {
            // bucket by row so the cursor walks the screen in order
            let width = frame.width as usize;
            self.rows.resize_with(frame.height as usize, Vec::new);
            for &i in frame.dirty_indices() {
                if let Some(row) = self.rows.get_mut(i / width) {
                    row.push(i);
                }
            }

            let mut rows = std::mem::take(&mut self.rows);
            for row in &mut rows {
                row.sort_unstable();
                for &i in row.iter() {
                    let cell = frame.cell_at_index(i);
                    if self.last.get(i) == Some(&cell) {
                        continue;
                    }
                    self.last[i] = cell;
                    self.put(&mut pen, (i % width) as u16, (i / width) as u16, cell)?;
                }
                row.clear();
            }
            self.rows = rows;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
