//! TerminalBackend trait + CrosstermBackend implementation.
//!
//! The render pipeline and input handling depend on this trait, not on
//! crossterm directly. This enables mock backends for testing and a headless
//! backend for CI.

use crate::error::Result;
use crate::types::{key, modifier, CellAttrs, CellUpdate, TerminalInputEvent};

// ============================================================================
// TerminalBackend Trait
// ============================================================================

pub trait TerminalBackend {
    fn init(&mut self) -> Result<()>;
    fn shutdown(&mut self) -> Result<()>;
    fn size(&self) -> (u16, u16);
    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn read_events(&mut self, timeout_ms: u32) -> Vec<TerminalInputEvent>;

    /// Downcast support for test code. Returns self as Any for type-safe downcasting.
    #[cfg(test)]
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

// ============================================================================
// CrosstermBackend
// ============================================================================

pub struct CrosstermBackend {
    width: u16,
    height: u16,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        Self {
            width: w,
            height: h,
        }
    }
}

fn modifiers_of(mods: crossterm::event::KeyModifiers) -> u32 {
    use crossterm::event::KeyModifiers;

    let mut out = 0;
    if mods.contains(KeyModifiers::SHIFT) {
        out |= modifier::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        out |= modifier::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        out |= modifier::ALT;
    }
    out
}

impl TerminalBackend for CrosstermBackend {
    fn init(&mut self) -> Result<()> {
        use crossterm::{
            cursor,
            event::EnableMouseCapture,
            terminal::{enable_raw_mode, EnterAlternateScreen},
            ExecutableCommand,
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        // Focus is shown by highlights, never by the terminal cursor.
        stdout.execute(cursor::Hide)?;

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        self.width = w;
        self.height = h;
        tracing::debug!(target: "text_focuser.terminal", width = w, height = h, "terminal init");

        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        use crossterm::{
            cursor,
            event::DisableMouseCapture,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
            ExecutableCommand,
        };

        let mut stdout = std::io::stdout();
        stdout.execute(cursor::Show)?;
        stdout.execute(DisableMouseCapture)?;
        stdout.execute(LeaveAlternateScreen)?;
        disable_raw_mode()?;
        tracing::debug!(target: "text_focuser.terminal", "terminal shutdown");

        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((self.width, self.height))
    }

    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<()> {
        use crossterm::{
            cursor::MoveTo,
            style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
            QueueableCommand,
        };

        let mut stdout = std::io::stdout();

        for update in printable_updates(diff) {
            stdout.queue(MoveTo(update.x, update.y))?;
            stdout.queue(SetForegroundColor(
                update.cell.fg.to_crossterm().unwrap_or(Color::Reset),
            ))?;
            stdout.queue(SetBackgroundColor(
                update.cell.bg.to_crossterm().unwrap_or(Color::Reset),
            ))?;

            let attrs = update.cell.attrs;
            if attrs.contains(CellAttrs::BOLD) {
                stdout.queue(SetAttribute(Attribute::Bold))?;
            }
            if attrs.contains(CellAttrs::ITALIC) {
                stdout.queue(SetAttribute(Attribute::Italic))?;
            }
            if attrs.contains(CellAttrs::UNDERLINE) {
                stdout.queue(SetAttribute(Attribute::Underlined))?;
            }
            if attrs.contains(CellAttrs::STRIKETHROUGH) {
                stdout.queue(SetAttribute(Attribute::CrossedOut))?;
            }

            stdout.queue(Print(update.cell.ch))?;
            stdout.queue(SetAttribute(Attribute::Reset))?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        Ok(())
    }

    fn read_events(&mut self, timeout_ms: u32) -> Vec<TerminalInputEvent> {
        use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};

        let mut events = Vec::new();
        let timeout = std::time::Duration::from_millis(timeout_ms as u64);

        if event::poll(timeout).unwrap_or(false) {
            while event::poll(std::time::Duration::ZERO).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key_event)) => {
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }

                        let (code, ch) = match key_event.code {
                            KeyCode::Char(c) => (c as u32, c),
                            KeyCode::Backspace => (key::BACKSPACE, '\0'),
                            KeyCode::Enter => (key::ENTER, '\0'),
                            KeyCode::Left => (key::LEFT, '\0'),
                            KeyCode::Right => (key::RIGHT, '\0'),
                            KeyCode::Up => (key::UP, '\0'),
                            KeyCode::Down => (key::DOWN, '\0'),
                            KeyCode::Home => (key::HOME, '\0'),
                            KeyCode::End => (key::END, '\0'),
                            KeyCode::Tab => (key::TAB, '\0'),
                            KeyCode::BackTab => (key::BACK_TAB, '\0'),
                            KeyCode::Esc => (key::ESCAPE, '\0'),
                            _ => continue,
                        };

                        events.push(TerminalInputEvent::Key {
                            code,
                            modifiers: modifiers_of(key_event.modifiers),
                            character: ch,
                        });
                    }
                    Ok(Event::Mouse(mouse_event)) => {
                        let button = match mouse_event.kind {
                            MouseEventKind::Down(MouseButton::Left) => 0u8,
                            MouseEventKind::Down(MouseButton::Middle) => 1,
                            MouseEventKind::Down(MouseButton::Right) => 2,
                            _ => continue,
                        };

                        events.push(TerminalInputEvent::Mouse {
                            x: mouse_event.column,
                            y: mouse_event.row,
                            button,
                            modifiers: modifiers_of(mouse_event.modifiers),
                        });
                    }
                    Ok(Event::Resize(w, h)) => {
                        self.width = w;
                        self.height = h;
                        events.push(TerminalInputEvent::Resize {
                            width: w,
                            height: h,
                        });
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(target: "text_focuser.terminal", error = %e, "event read failed");
                        break;
                    }
                }
            }
        }

        events
    }

    #[cfg(test)]
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

// ============================================================================
// HeadlessBackend (for testing and CI environments)
// ============================================================================

pub struct HeadlessBackend {
    pub width: u16,
    pub height: u16,
}

impl HeadlessBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl TerminalBackend for HeadlessBackend {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn write_diff(&mut self, _diff: &[CellUpdate]) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_events(&mut self, _timeout_ms: u32) -> Vec<TerminalInputEvent> {
        Vec::new()
    }

    #[cfg(test)]
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Updates a terminal actually prints: continuation cells are drawn by the
/// wide glyph to their left, and printing a blank there would erase it.
pub(crate) fn printable_updates(diff: &[CellUpdate]) -> impl Iterator<Item = &CellUpdate> {
    diff.iter().filter(|update| !update.cell.is_continuation())
}

// ============================================================================
// MockBackend (for Rust unit tests only)
// ============================================================================

#[cfg(test)]
pub struct MockBackend {
    pub width: u16,
    pub height: u16,
    pub diff_log: Vec<CellUpdate>,
    pub injected_events: Vec<TerminalInputEvent>,
}

#[cfg(test)]
impl MockBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            diff_log: Vec::new(),
            injected_events: Vec::new(),
        }
    }
}

#[cfg(test)]
impl TerminalBackend for MockBackend {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<()> {
        self.diff_log.extend_from_slice(diff);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_events(&mut self, _timeout_ms: u32) -> Vec<TerminalInputEvent> {
        std::mem::take(&mut self.injected_events)
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
