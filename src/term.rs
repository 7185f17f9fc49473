//! Reference terminal frontend.
//!
//! Implements the `Ui` seam with crossterm: a reader thread maps key
//! presses to abstract navigation commands, `present` redraws the current
//! frame. The core never touches raw events or the screen.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tokio::sync::mpsc;

use crate::app::ui::{NavCommand, Ui};
use crate::app::view::{Frame, KeyboardView, MenuView, Screen, TransferView};
use crate::notify::{NotificationView, NotifyKind};

pub struct TermUi {
    stdout: Stdout,
    rx: mpsc::UnboundedReceiver<NavCommand>,
    shutdown: Arc<AtomicBool>,
}

impl TermUi {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let reader_stop = shutdown.clone();
        std::thread::spawn(move || {
            while !reader_stop.load(Ordering::Relaxed) {
                match event::poll(Duration::from_millis(200)) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let Ok(Event::Key(key)) = event::read() else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let cmd = match key.code {
                    KeyCode::Up => NavCommand::MoveUp,
                    KeyCode::Down => NavCommand::MoveDown,
                    KeyCode::Left => NavCommand::MoveLeft,
                    KeyCode::Right => NavCommand::MoveRight,
                    KeyCode::Enter => NavCommand::Confirm,
                    KeyCode::Esc | KeyCode::Backspace => NavCommand::Back,
                    KeyCode::Char('m') => NavCommand::ToggleMultiSelect,
                    KeyCode::Char('d') => NavCommand::StartBatch,
                    KeyCode::Char('q') => NavCommand::Quit,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        NavCommand::Quit
                    }
                    _ => continue,
                };
                if tx.send(cmd).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            stdout: io::stdout(),
            rx,
            shutdown,
        })
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        queue!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;

        match &frame.screen {
            Screen::Menu(menu) => self.draw_menu(menu)?,
            Screen::Keyboard(kb) => self.draw_keyboard(kb)?,
            Screen::Transfer(transfer) => self.draw_transfer(transfer)?,
        }

        if let Some(footer) = &frame.footer {
            let (_, rows) = crossterm::terminal::size().unwrap_or((80, 24));
            queue!(
                self.stdout,
                MoveTo(0, rows.saturating_sub(1)),
                Print(footer)
            )?;
        }

        self.draw_notifications(&frame.notifications)?;
        self.stdout.flush()
    }

    fn draw_menu(&mut self, menu: &MenuView) -> io::Result<()> {
        queue!(self.stdout, Print(&menu.title), MoveTo(0, 2))?;
        let visible = self.visible_rows();
        let end = menu.options.len().min(menu.scroll + visible);
        for (row, idx) in (menu.scroll..end).enumerate() {
            let marker = if idx == menu.selected { "> " } else { "  " };
            queue!(
                self.stdout,
                MoveTo(0, (2 + row) as u16),
                Print(format!("{}{}", marker, menu.options[idx]))
            )?;
        }
        Ok(())
    }

    fn draw_keyboard(&mut self, kb: &KeyboardView) -> io::Result<()> {
        queue!(
            self.stdout,
            Print(&kb.prompt),
            MoveTo(0, 2),
            Print(format!("Input: {}_", kb.buffer))
        )?;
        for (r, row) in kb.rows.iter().enumerate() {
            let mut line = String::new();
            for (c, key) in row.iter().enumerate() {
                if (r, c) == kb.cursor {
                    line.push_str(&format!("[{}] ", key));
                } else {
                    line.push_str(&format!(" {}  ", key));
                }
            }
            queue!(self.stdout, MoveTo(0, (4 + r) as u16), Print(line))?;
        }
        Ok(())
    }

    fn draw_transfer(&mut self, transfer: &TransferView) -> io::Result<()> {
        let p = &transfer.progress;
        let ratio = p.ratio();
        let filled = (40.0 * ratio) as usize;
        let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(40 - filled));
        let eta = p.eta_secs.map(format_eta).unwrap_or_else(|| "--".into());
        queue!(
            self.stdout,
            Print(&transfer.title),
            MoveTo(0, 2),
            Print(bar),
            MoveTo(0, 3),
            Print(format!(
                "{:.1}% | {:.2} MB/s | ETA {}",
                ratio * 100.0,
                p.speed_bps as f64 / (1024.0 * 1024.0),
                eta
            ))
        )?;
        Ok(())
    }

    fn draw_notifications(&mut self, notifications: &[NotificationView]) -> io::Result<()> {
        let (cols, _) = crossterm::terminal::size().unwrap_or((80, 24));
        for (i, n) in notifications.iter().enumerate() {
            let color = match n.kind {
                NotifyKind::Error => Color::Red,
                NotifyKind::Success => Color::Green,
                NotifyKind::Info => Color::Blue,
            };
            let col = cols.saturating_sub(n.message.len().min(50) as u16 + 2);
            queue!(
                self.stdout,
                MoveTo(col, i as u16),
                SetForegroundColor(color),
                Print(&n.message),
                ResetColor
            )?;
        }
        Ok(())
    }
}

#[async_trait]
impl Ui for TermUi {
    async fn next_command(&mut self) -> Option<NavCommand> {
        self.rx.recv().await
    }

    fn present(&mut self, frame: &Frame) {
        let _ = self.draw(frame);
    }

    fn visible_rows(&self) -> usize {
        let (_, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        (rows as usize).saturating_sub(8).max(1)
    }
}

impl Drop for TermUi {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Human-readable remaining time.
pub fn format_eta(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    let (minutes, sec) = (seconds / 60, seconds % 60);
    if minutes < 60 {
        return format!("{}m {}s", minutes, sec);
    }
    let (hours, min) = (minutes / 60, minutes % 60);
    if hours < 24 {
        return format!("{}h {}m", hours, min);
    }
    format!("{}d {}h", hours / 24, hours % 24)
}
