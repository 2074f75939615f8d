use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use crossterm::{cursor::MoveTo, queue, style::Print};
use ratatui::backend::{Backend, ClearType, CrosstermBackend, WindowSize};
use ratatui::buffer::Cell;
use ratatui::layout::{Position, Size};

/// The single sprite overlay painted after each ratatui draw. The UI only
/// ever shows one sprite at a time (preview panel or detail view), so the
/// slot holds at most one pending sequence.
#[derive(Default, Debug, Clone)]
pub struct SpriteOverlay {
    slot: Option<(u16, u16, String)>,
}

impl SpriteOverlay {
    pub fn set(&mut self, x: u16, y: u16, data: String) {
        self.slot = Some((x, y, data));
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn take_current(&self) -> Option<(u16, u16, String)> {
        self.slot.clone()
    }
}

static OVERLAY: OnceLock<Arc<Mutex<SpriteOverlay>>> = OnceLock::new();

pub fn overlay_handle() -> Arc<Mutex<SpriteOverlay>> {
    OVERLAY
        .get_or_init(|| Arc::new(Mutex::new(SpriteOverlay::default())))
        .clone()
}

pub fn set_overlay(x: u16, y: u16, data: String) {
    let overlay = overlay_handle();
    let mut overlay = overlay.lock().expect("sprite overlay lock");
    overlay.set(x, y, data);
}

pub fn clear_overlay() {
    let overlay = overlay_handle();
    let mut overlay = overlay.lock().expect("sprite overlay lock");
    overlay.clear();
}

/// CrosstermBackend wrapper that re-emits the sprite overlay after every
/// draw, deleting the previous kitty image first so stale sprites never
/// linger over repainted cells.
#[derive(Debug, Clone)]
pub struct SpriteBackend<W: Write> {
    inner: CrosstermBackend<W>,
    overlay: Arc<Mutex<SpriteOverlay>>,
    had_sprite: bool,
}

impl<W: Write> SpriteBackend<W> {
    pub fn new(writer: W, overlay: Arc<Mutex<SpriteOverlay>>) -> Self {
        Self {
            inner: CrosstermBackend::new(writer),
            overlay,
            had_sprite: false,
        }
    }
}

impl<W: Write> Backend for SpriteBackend<W> {
    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        self.inner.draw(content)?;
        let current = {
            let overlay = self.overlay.lock().expect("sprite overlay lock");
            overlay.take_current()
        };
        if self.had_sprite {
            queue!(self.inner, Print("\x1b_Ga=d,d=a\x1b\\"))?;
        }
        let Some((x, y, data)) = current else {
            self.had_sprite = false;
            return Ok(());
        };
        queue!(self.inner, MoveTo(x, y), Print(data))?;
        self.had_sprite = true;
        Ok(())
    }

    fn append_lines(&mut self, n: u16) -> io::Result<()> {
        self.inner.append_lines(n)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        self.inner.get_cursor_position()
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        self.inner.set_cursor_position(position)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.clear()
    }

    fn clear_region(&mut self, clear_type: ClearType) -> io::Result<()> {
        self.inner.clear_region(clear_type)
    }

    fn size(&self) -> io::Result<Size> {
        self.inner.size()
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        self.inner.window_size()
    }

    fn flush(&mut self) -> io::Result<()> {
        Backend::flush(&mut self.inner)
    }
}

impl<W: Write> Write for SpriteBackend<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.inner)
    }
}
