//! # Live Terminal Renderer
//!
//! [`LiveRenderer`] redraws a block of text in place. It remembers how many
//! lines the last flush produced; the next render erases exactly that many
//! lines before writing the new content. Every operation takes one lock
//! around the whole erase + write + flush sequence, so renders requested by
//! concurrent workers never interleave on the terminal.
//!
//! ## Markers
//!
//! [`LiveRenderer::mark`] remembers the current line count and
//! [`LiveRenderer::reset_to_marker`] erases everything drawn after it. The
//! confirmation prompt uses this to show a help overlay below the status
//! table and remove it again without touching the table.
//!
//! ## Erasing
//!
//! How lines are erased depends on the platform and is hidden behind
//! [`LineEraser`]. [`AnsiEraser`] emits escape sequences; on Windows
//! consoles [`ConsoleEraser`] drives the console API through the `console`
//! crate. [`default_eraser`] picks one once at startup.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

/// Erases lines previously written to a terminal.
pub trait LineEraser: Send {
    /// Erases the `lines` lines above the cursor and leaves the cursor at the
    /// start of the topmost erased line. With `lines == 0` only the current
    /// line is cleared.
    fn erase(&mut self, out: &mut dyn Write, lines: usize) -> io::Result<()>;
}

/// Erases with ANSI cursor-up and clear-line sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiEraser;

impl LineEraser for AnsiEraser {
    fn erase(&mut self, out: &mut dyn Write, lines: usize) -> io::Result<()> {
        if lines == 0 {
            return out.write_all(b"\x1b[2K\r");
        }
        for _ in 0..lines {
            out.write_all(b"\x1b[1A\x1b[2K\r")?;
        }
        Ok(())
    }
}

/// Erases through the terminal handle of the `console` crate, which uses
/// the console API on Windows.
#[derive(Debug)]
pub struct ConsoleEraser {
    term: console::Term,
}

impl ConsoleEraser {
    pub fn new(term: console::Term) -> Self {
        Self { term }
    }
}

impl LineEraser for ConsoleEraser {
    fn erase(&mut self, out: &mut dyn Write, lines: usize) -> io::Result<()> {
        // Pending output must reach the console before the cursor moves
        out.flush()?;
        if lines == 0 {
            self.term.clear_line()
        } else {
            self.term.clear_last_lines(lines)
        }
    }
}

/// Chooses the eraser for standard output on this platform.
pub fn default_eraser() -> Box<dyn LineEraser> {
    let term = console::Term::stdout();
    if cfg!(windows) && term.is_term() {
        Box::new(ConsoleEraser::new(term))
    } else {
        Box::new(AnsiEraser)
    }
}

struct Inner<W> {
    out: W,
    eraser: Box<dyn LineEraser>,
    buffer: String,
    /// Lines currently drawn by this renderer.
    lines: usize,
    /// Line count recorded by the last `mark`.
    marker: usize,
}

impl<W: Write> Inner<W> {
    fn erase(&mut self, lines: usize) -> io::Result<()> {
        self.eraser.erase(&mut self.out, lines)
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        self.lines += self.buffer.matches('\n').count();
        self.out.write_all(self.buffer.as_bytes())?;
        self.buffer.clear();
        self.out.flush()
    }
}

/// In-place writer for a block of terminal output.
pub struct LiveRenderer<W: Write> {
    inner: Mutex<Inner<W>>,
}

impl LiveRenderer<io::Stdout> {
    /// Renderer for standard output with the platform's eraser.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), default_eraser())
    }
}

impl<W: Write> LiveRenderer<W> {
    pub fn new(out: W, eraser: Box<dyn LineEraser>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                out,
                eraser,
                buffer: String::new(),
                lines: 0,
                marker: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        // A panic mid-render leaves nothing worse than a half drawn frame
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces everything drawn so far with the text produced by `compose`.
    ///
    /// `compose` runs while the lock is held, so the content reflects the
    /// state at the moment this render is drawn.
    pub fn render<F>(&self, compose: F) -> io::Result<()>
    where
        F: FnOnce(&mut String),
    {
        let mut inner = self.lock();
        let drawn = inner.lines;
        inner.erase(drawn)?;
        inner.lines = 0;
        inner.marker = 0;

        let mut buffer = std::mem::take(&mut inner.buffer);
        compose(&mut buffer);
        inner.buffer = buffer;
        inner.flush_buffer()
    }

    /// Writes `text` below the current content without erasing anything.
    pub fn print(&self, text: &str) -> io::Result<()> {
        let mut inner = self.lock();
        inner.buffer.push_str(text);
        inner.flush_buffer()
    }

    /// Remembers the current position for [`reset_to_marker`](Self::reset_to_marker).
    pub fn mark(&self) {
        let mut inner = self.lock();
        inner.marker = inner.lines;
    }

    /// Erases every line drawn after the last [`mark`](Self::mark).
    pub fn reset_to_marker(&self) -> io::Result<()> {
        let mut inner = self.lock();
        let extra = inner.lines.saturating_sub(inner.marker);
        if extra > 0 {
            inner.erase(extra)?;
        }
        inner.lines = inner.marker;
        inner.out.flush()
    }

    /// Accounts for lines that reached the terminal without passing through
    /// the renderer, such as the newline echoed when the user presses Enter.
    pub fn add_line_breaks(&self, count: usize) {
        self.lock().lines += count;
    }

    /// Leaves the current content on screen; the next render starts below it.
    pub fn detach(&self) {
        let mut inner = self.lock();
        inner.lines = 0;
        inner.marker = 0;
    }

    /// Number of lines the next render will erase.
    pub fn line_count(&self) -> usize {
        self.lock().lines
    }

    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .out
    }
}
