use crate::color::Rgb;
use crate::error::Result;
use crate::graphics::Canvas;
use crate::interaction::PointerEvent;
use crate::widget::Command;
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
    EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};
use log::{debug, warn};
use std::io::{self, Stdout, Write};
use std::time::Duration;

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '\u{2580}';

/// Everything the main loop reacts to
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Pointer(PointerEvent),
    Command(Command),
    /// New canvas size in pixels
    Resize { width: usize, height: usize },
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    top: Rgb,
    bottom: Rgb,
}

/// Owns the terminal for the lifetime of the viewer. Raw mode, the
/// alternate screen and mouse capture are undone on drop.
pub struct Terminal {
    out: Stdout,
    cols: u16,
    rows: u16,
    /// Cells as last written, for diffing
    cells: Vec<Option<Cell>>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let (cols, rows) = terminal_size();
        debug!("terminal is {cols}x{rows} cells");
        terminal::enable_raw_mode()?;
        // From here on, `Drop` puts the terminal back if setup fails.
        let mut term = Terminal {
            out: io::stdout(),
            cols,
            rows,
            cells: vec![None; cols as usize * rows as usize],
        };
        enter_screen(&mut term.out)?;
        Ok(term)
    }

    /// Canvas size covering the terminal, two pixels per cell vertically
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.cols as usize, self.rows as usize * 2)
    }

    /// Writes the cells of `canvas` that changed since the last call
    pub fn present(&mut self, canvas: &Canvas) -> Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        let cols = self.cols as usize;
        for row in 0..self.rows as usize {
            for col in 0..cols {
                let cell = Cell {
                    top: canvas.pixel(col, row * 2).unwrap_or(Rgb::BLACK),
                    bottom: canvas.pixel(col, row * 2 + 1).unwrap_or(Rgb::BLACK),
                };
                let slot = &mut self.cells[row * cols + col];
                if *slot == Some(cell) {
                    continue;
                }
                *slot = Some(cell);
                queue!(
                    self.out,
                    cursor::MoveTo(col as u16, row as u16),
                    SetForegroundColor(to_color(cell.top)),
                    SetBackgroundColor(to_color(cell.bottom)),
                    Print(HALF_BLOCK)
                )?;
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }

    /// Waits up to `timeout` for one input
    pub fn poll(&mut self, timeout: Duration) -> Result<Option<Input>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let input = map_event(event::read()?);
        if let Some(Input::Resize { .. }) = input {
            let (cols, rows) = terminal::size()?;
            self.cols = cols;
            self.rows = rows;
            self.cells = vec![None; cols as usize * rows as usize];
            queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        }
        Ok(input)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let restored = leave_screen(&mut self.out);
        if let Err(e) = restored.and_then(|_| terminal::disable_raw_mode()) {
            warn!("failed to restore terminal: {e}");
        }
    }
}

fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(
        out,
        EnterAlternateScreen,
        DisableLineWrap,
        cursor::Hide,
        EnableMouseCapture,
        EnableFocusChange,
        terminal::Clear(terminal::ClearType::All)
    )
}

fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(
        out,
        DisableFocusChange,
        DisableMouseCapture,
        ResetColor,
        cursor::Show,
        EnableLineWrap,
        LeaveAlternateScreen
    )
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Terminal size in cells, preferring termsize and falling back to crossterm
fn terminal_size() -> (u16, u16) {
    termsize::get()
        .map(|size| (size.cols, size.rows))
        .or_else(|| terminal::size().ok())
        .unwrap_or((80, 24))
}

/// Translates a terminal event. Mouse cells map to the lower pixel of the
/// half block so the pointer sits at the cell's vertical centre.
pub fn map_event(event: Event) -> Option<Input> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse).map(Input::Pointer),
        Event::FocusLost => Some(Input::Pointer(PointerEvent::Leave)),
        Event::Resize(cols, rows) => Some(Input::Resize {
            width: cols as usize,
            height: rows as usize * 2,
        }),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let command = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(Input::Quit),
        KeyCode::Char('c') if ctrl => return Some(Input::Quit),
        KeyCode::Char('a') => Command::ToggleAutorotate,
        KeyCode::Char('l') => Command::ToggleLighting,
        KeyCode::Char('c') => Command::ToggleColorbar,
        KeyCode::Char('h') => Command::ToggleHover,
        KeyCode::Char('d') => Command::ToggleDebug,
        KeyCode::Char('r') => Command::ResetView,
        KeyCode::Left => Command::Rotate(-1.0),
        KeyCode::Right => Command::Rotate(1.0),
        KeyCode::Up => Command::Tilt(1.0),
        KeyCode::Down => Command::Tilt(-1.0),
        KeyCode::Char('+') | KeyCode::Char('=') => Command::Zoom(1.0),
        KeyCode::Char('-') | KeyCode::Char('_') => Command::Zoom(-1.0),
        _ => return None,
    };
    Some(Input::Command(command))
}

fn map_mouse(mouse: MouseEvent) -> Option<PointerEvent> {
    let x = mouse.column as f64;
    let y = mouse.row as f64 * 2.0 + 1.0;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(PointerEvent::Move { x, y })
        }
        MouseEventKind::ScrollUp => Some(PointerEvent::Wheel { delta_y: -1.0 }),
        MouseEventKind::ScrollDown => Some(PointerEvent::Wheel { delta_y: 1.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_leave_screen_undoes_enter_screen() {
        let mut entered = Vec::new();
        enter_screen(&mut entered).unwrap();
        let entered = String::from_utf8(entered).unwrap();
        assert!(entered.contains("\x1b[?1049h"));
        assert!(entered.contains("\x1b[?25l"));

        let mut left = Vec::new();
        leave_screen(&mut left).unwrap();
        let left = String::from_utf8(left).unwrap();
        assert!(left.contains("\x1b[?1049l"));
        assert!(left.contains("\x1b[?25h"));
        assert!(left.contains("\x1b[?1000l"));
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[rstest]
    #[case(KeyCode::Char('q'), Input::Quit)]
    #[case(KeyCode::Esc, Input::Quit)]
    #[case(KeyCode::Char('a'), Input::Command(Command::ToggleAutorotate))]
    #[case(KeyCode::Char('c'), Input::Command(Command::ToggleColorbar))]
    #[case(KeyCode::Left, Input::Command(Command::Rotate(-1.0)))]
    #[case(KeyCode::Char('='), Input::Command(Command::Zoom(1.0)))]
    fn test_key_bindings(#[case] code: KeyCode, #[case] expected: Input) {
        let event = Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(map_event(event), Some(expected));
    }

    #[test]
    fn test_ctrl_c_quits_and_releases_are_ignored() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(ctrl_c), Some(Input::Quit));
        let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_event(Event::Key(release)), None);
    }

    #[test]
    fn test_mouse_maps_to_pixels() {
        let down = mouse(MouseEventKind::Down(MouseButton::Left), 10, 4);
        let expected = PointerEvent::Down { x: 10.0, y: 9.0 };
        assert_eq!(map_event(down), Some(Input::Pointer(expected)));
        let drag = mouse(MouseEventKind::Drag(MouseButton::Left), 12, 4);
        let expected = PointerEvent::Move { x: 12.0, y: 9.0 };
        assert_eq!(map_event(drag), Some(Input::Pointer(expected)));
        let scroll = mouse(MouseEventKind::ScrollUp, 0, 0);
        let expected = PointerEvent::Wheel { delta_y: -1.0 };
        assert_eq!(map_event(scroll), Some(Input::Pointer(expected)));
        let right = mouse(MouseEventKind::Down(MouseButton::Right), 0, 0);
        assert_eq!(map_event(right), None);
    }

    #[test]
    fn test_resize_and_focus() {
        let resized = Input::Resize {
            width: 100,
            height: 60,
        };
        assert_eq!(map_event(Event::Resize(100, 30)), Some(resized));
        let leave = Some(Input::Pointer(PointerEvent::Leave));
        assert_eq!(map_event(Event::FocusLost), leave);
    }
}
