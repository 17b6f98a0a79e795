//! Terminal host: raw-mode alternate screen with mouse capture.
//!
//! Each character cell shows two stacked pixels using an upper half block,
//! so the pixel surface is `cols x rows * 2`.

use crate::controls::{ControlKey, PointerButton, PointerEvent};
use crate::error::Result;
use crate::graphics::FrameBuffer;
use crate::render_loop::{Host, HostEvent, KeyCommand};
use crate::scene::Rgb;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const UPPER_HALF_BLOCK: char = '▀';

/// Result of translating one terminal event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Event(HostEvent),
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    fn blank() -> Self {
        Cell {
            ch: ' ',
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

/// Pixel surface size for a terminal of `cols` x `rows` cells
pub fn surface_for_cells(cols: u16, rows: u16) -> (usize, usize) {
    (cols as usize, rows as usize * 2)
}

/// Current pixel surface size of the controlling terminal
pub fn surface_size() -> Result<(usize, usize)> {
    let (cols, rows) = match termsize::get() {
        Some(size) => (size.cols, size.rows),
        None => terminal::size()?,
    };
    Ok(surface_for_cells(cols, rows))
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

fn translate_key(key: KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let command = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Input::Quit)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(Input::Quit),
        KeyCode::Char('d') | KeyCode::Char('D') => KeyCommand::ToggleHud,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyCommand::ResetView,
        KeyCode::Up => KeyCommand::Control(ControlKey::Up),
        KeyCode::Down => KeyCommand::Control(ControlKey::Down),
        KeyCode::Left => KeyCommand::Control(ControlKey::Left),
        KeyCode::Right => KeyCommand::Control(ControlKey::Right),
        KeyCode::Char('+') | KeyCode::Char('=') => KeyCommand::Control(ControlKey::ZoomIn),
        KeyCode::Char('-') | KeyCode::Char('_') => KeyCommand::Control(ControlKey::ZoomOut),
        _ => return None,
    };
    Some(Input::Event(HostEvent::Key(command)))
}

fn translate_mouse(mouse: MouseEvent) -> Option<Input> {
    // Centre of the cell in pixel space
    let x = mouse.column as f64 + 0.5;
    let y = mouse.row as f64 * 2.0 + 1.0;
    let pointer = match mouse.kind {
        MouseEventKind::Down(button) => PointerEvent::Down {
            button: pointer_button(button),
            x,
            y,
        },
        MouseEventKind::Up(button) => PointerEvent::Up {
            button: pointer_button(button),
        },
        MouseEventKind::Drag(_) | MouseEventKind::Moved => PointerEvent::Move { x, y },
        MouseEventKind::ScrollUp => PointerEvent::Wheel { delta_y: -1.0 },
        MouseEventKind::ScrollDown => PointerEvent::Wheel { delta_y: 1.0 },
        _ => return None,
    };
    Some(Input::Event(HostEvent::Pointer(pointer)))
}

/// Maps a raw terminal event to driver input
pub fn translate(event: Event) -> Option<Input> {
    match event {
        Event::Key(key) => translate_key(key),
        Event::Mouse(mouse) => translate_mouse(mouse),
        Event::Resize(cols, rows) => {
            let (width, height) = surface_for_cells(cols, rows);
            Some(Input::Event(HostEvent::Resize { width, height }))
        }
        _ => None,
    }
}

/// Packs pixel pairs into half-block cells and overlays the HUD text.
/// Returns the cells with the grid width and height.
fn compose(frame: &FrameBuffer, hud: Option<&[String]>) -> (Vec<Cell>, usize, usize) {
    let cols = frame.width();
    let rows = frame.height().div_ceil(2);
    let mut cells = Vec::with_capacity(cols * rows);

    for row in 0..rows {
        for col in 0..cols {
            let top = frame.pixel(col, row * 2);
            let bottom = if row * 2 + 1 < frame.height() {
                frame.pixel(col, row * 2 + 1)
            } else {
                Rgb::BLACK
            };
            cells.push(Cell {
                ch: UPPER_HALF_BLOCK,
                fg: to_color(top),
                bg: to_color(bottom),
            });
        }
    }

    for (row, line) in hud.unwrap_or_default().iter().enumerate().take(rows) {
        for (col, ch) in line.chars().enumerate().take(cols.saturating_sub(1)) {
            cells[row * cols + col + 1] = Cell {
                ch,
                fg: to_color(Rgb::WHITE),
                bg: to_color(Rgb::BLACK),
            };
        }
    }

    (cells, cols, rows)
}

pub struct TerminalHost {
    out: Stdout,
    frame_interval: Duration,
    next_deadline: Instant,
    prev: Vec<Cell>,
    grid: (usize, usize),
}

impl TerminalHost {
    /// Switches the terminal into raw alternate-screen mode; it is restored on drop
    pub fn new(fps: u32) -> Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            EnableMouseCapture
        )?;
        info!(fps, "terminal host started");

        let frame_interval = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        Ok(TerminalHost {
            out,
            frame_interval,
            next_deadline: Instant::now(),
            prev: Vec::new(),
            grid: (0, 0),
        })
    }

    /// Writes only the cells that changed since the last frame
    fn render_diff(&mut self, cur: &[Cell], cols: usize) -> io::Result<()> {
        let mut cur_fg = Color::Reset;
        let mut cur_bg = Color::Reset;

        for (i, cell) in cur.iter().enumerate() {
            if self.prev[i] == *cell {
                continue;
            }
            self.prev[i] = *cell;

            queue!(self.out, cursor::MoveTo((i % cols) as u16, (i / cols) as u16))?;
            if cell.bg != cur_bg {
                cur_bg = cell.bg;
                queue!(self.out, SetBackgroundColor(cur_bg))?;
            }
            if cell.fg != cur_fg {
                cur_fg = cell.fg;
                queue!(self.out, SetForegroundColor(cur_fg))?;
            }
            queue!(self.out, Print(cell.ch))?;
        }
        Ok(())
    }
}

impl Host for TerminalHost {
    fn next_frame(&mut self) -> Result<Option<Vec<HostEvent>>> {
        let mut events = Vec::new();
        loop {
            let now = Instant::now();
            if now >= self.next_deadline {
                break;
            }
            if event::poll(self.next_deadline - now)? {
                match translate(event::read()?) {
                    Some(Input::Event(event)) => events.push(event),
                    Some(Input::Quit) => {
                        info!("quit requested");
                        return Ok(None);
                    }
                    None => {}
                }
            }
        }

        // Skip missed ticks instead of bursting to catch up
        self.next_deadline += self.frame_interval;
        let now = Instant::now();
        if self.next_deadline < now {
            self.next_deadline = now + self.frame_interval;
        }
        Ok(Some(events))
    }

    fn present(&mut self, frame: &FrameBuffer, hud: Option<&[String]>) -> Result<()> {
        let (cells, cols, rows) = compose(frame, hud);
        if (cols, rows) != self.grid {
            debug!(cols, rows, "terminal grid changed, full redraw");
            self.grid = (cols, rows);
            self.prev = vec![Cell::blank(); cols * rows];
            execute!(self.out, terminal::Clear(ClearType::All))?;
        }

        execute!(self.out, BeginSynchronizedUpdate)?;
        self.render_diff(&cells, cols)?;
        execute!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            DisableMouseCapture,
            EndSynchronizedUpdate,
            SetForegroundColor(Color::Reset),
            SetBackgroundColor(Color::Reset),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn quit_keys() {
        assert_eq!(translate(key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(Input::Quit));
        assert_eq!(translate(key(KeyCode::Esc, KeyModifiers::NONE)), Some(Input::Quit));
        assert_eq!(translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Input::Quit));
        assert_eq!(translate(key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn command_keys() {
        assert_eq!(
            translate(key(KeyCode::Char('d'), KeyModifiers::NONE)),
            Some(Input::Event(HostEvent::Key(KeyCommand::ToggleHud)))
        );
        assert_eq!(
            translate(key(KeyCode::Left, KeyModifiers::NONE)),
            Some(Input::Event(HostEvent::Key(KeyCommand::Control(ControlKey::Left))))
        );
        assert_eq!(
            translate(key(KeyCode::Char('='), KeyModifiers::NONE)),
            Some(Input::Event(HostEvent::Key(KeyCommand::Control(ControlKey::ZoomIn))))
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(translate(release), None);
    }

    #[test]
    fn mouse_maps_to_pixel_space() {
        assert_eq!(
            translate(mouse(MouseEventKind::Down(MouseButton::Right), 4, 3)),
            Some(Input::Event(HostEvent::Pointer(PointerEvent::Down {
                button: PointerButton::Secondary,
                x: 4.5,
                y: 7.0,
            })))
        );
        assert_eq!(
            translate(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0)),
            Some(Input::Event(HostEvent::Pointer(PointerEvent::Move { x: 0.5, y: 1.0 })))
        );
        assert_eq!(
            translate(mouse(MouseEventKind::ScrollUp, 0, 0)),
            Some(Input::Event(HostEvent::Pointer(PointerEvent::Wheel { delta_y: -1.0 })))
        );
    }

    #[test]
    fn resize_doubles_rows() {
        assert_eq!(
            translate(Event::Resize(80, 24)),
            Some(Input::Event(HostEvent::Resize { width: 80, height: 48 }))
        );
    }

    #[test]
    fn compose_packs_two_pixels_per_cell() {
        let mut frame = FrameBuffer::new(3, 3);
        frame.plot(1, 0, 0.0, Rgb(10, 0, 0));
        frame.plot(1, 1, 0.0, Rgb(0, 20, 0));
        frame.plot(2, 2, 0.0, Rgb(0, 0, 30));

        let (cells, cols, rows) = compose(&frame, None);
        assert_eq!((cols, rows), (3, 2));
        assert_eq!(cells[1].fg, Color::Rgb { r: 10, g: 0, b: 0 });
        assert_eq!(cells[1].bg, Color::Rgb { r: 0, g: 20, b: 0 });
        assert_eq!(cells[5].fg, Color::Rgb { r: 0, g: 0, b: 30 });
        assert_eq!(cells[5].bg, to_color(Rgb::BLACK));
    }

    #[test]
    fn hud_text_overlays_cells() {
        let frame = FrameBuffer::new(6, 4);
        let hud = vec!["FPS: 60.00".to_string()];
        let (cells, _, _) = compose(&frame, Some(&hud));
        let text: String = cells[1..6].iter().map(|c| c.ch).collect();
        assert_eq!(text, "FPS: ");
        assert_eq!(cells[0].ch, UPPER_HALF_BLOCK);
        assert_eq!(cells[6].ch, UPPER_HALF_BLOCK);
    }
}
