//! Main UI Application
//!
//! Renders the clock card and maps key presses to timepiece actions.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::chime::ChimeState;
use crate::timepiece::Timepiece;

/// Width of the centered clock card.
const CARD_WIDTH: u16 = 48;
/// Height of the centered clock card.
const CARD_HEIGHT: u16 = 13;

/// Main UI application
pub struct App;

impl App {
    pub fn new() -> Self {
        Self
    }

    /// Handle a key press. Returns `Ok(true)` when the app should quit.
    pub fn handle_input(&mut self, key: KeyEvent, timepiece: &mut Timepiece) -> Result<bool> {
        // Any key counts as the interaction that unlocks audio playback.
        timepiece.notice_interaction();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                timepiece.shutdown();
                return Ok(true);
            }
            KeyCode::Char('s') => timepiece.toggle_sound(),
            KeyCode::Char('t') => timepiece.manual_trigger(),
            _ => {}
        }

        Ok(false)
    }

    /// Render the clock card centered in the terminal.
    pub fn render(&self, frame: &mut Frame, timepiece: &Timepiece) {
        let area = centered_rect(CARD_WIDTH, CARD_HEIGHT, frame.area());

        let block = Block::default()
            .title(" ♔ The Count's Timepiece ♔ ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // spacer
                Constraint::Length(1), // time
                Constraint::Length(1), // date
                Constraint::Length(1), // spacer
                Constraint::Length(1), // chime status
                Constraint::Length(1), // spacer
                Constraint::Length(1), // sound state
                Constraint::Length(1), // spacer
                Constraint::Length(1), // key hints
                Constraint::Min(0),
            ])
            .split(inner);

        let instant = timepiece.current_time().instant();

        let time_line = Paragraph::new(Line::from(Span::styled(
            instant.format("%-I:%M:%S %p").to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(time_line, rows[1]);

        let date_line = Paragraph::new(Line::from(Span::styled(
            instant.format("%A, %B %-d, %Y").to_string(),
            Style::default().fg(Color::Gray),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(date_line, rows[2]);

        frame.render_widget(self.status_line(timepiece), rows[4]);

        let (sound_text, sound_color) = if timepiece.sound_enabled() {
            ("♪ Sonorous", Color::Blue)
        } else {
            ("♪ Silenced", Color::Red)
        };
        let sound_line = Paragraph::new(Line::from(Span::styled(
            sound_text,
            Style::default().fg(sound_color),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(sound_line, rows[6]);

        let hints = Paragraph::new(Line::from(vec![
            Span::styled("[s]", Style::default().fg(Color::Yellow)),
            Span::raw(" sound  "),
            Span::styled("[t]", Style::default().fg(Color::Yellow)),
            Span::raw(" test chime  "),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::raw(" quit"),
        ]))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hints, rows[8]);
    }

    fn status_line(&self, timepiece: &Timepiece) -> Paragraph<'static> {
        let (text, style) = if timepiece.chime_state() == ChimeState::Chiming {
            (
                "🔔 The Clock Chimes! 🔔".to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            )
        } else if timepiece.is_chime_minute() {
            (
                "À l'heure précise".to_string(),
                Style::default().fg(Color::Green),
            )
        } else {
            (
                format!("Next chime in {}", timepiece.next_chime_text()),
                Style::default().fg(Color::Gray),
            )
        };

        Paragraph::new(Line::from(Span::styled(text, style))).alignment(Alignment::Center)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Center a `width` x `height` rect inside `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
