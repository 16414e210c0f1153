//! Single-line question prompt.
//!
//! Renders a centered input popup, similar to `gum input`.

use crate::theme::Theme;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Result of the prompt interaction.
#[derive(Debug, PartialEq, Eq)]
pub enum PromptResult {
    /// User submitted a question.
    Question(String),
    /// User cancelled (Escape, Ctrl+C or an empty submit).
    Cancelled,
}

/// Ask for one line of input. Blocks until the user submits or cancels.
pub fn prompt_line(title: &str, initial: Option<String>, theme: &Theme) -> Result<PromptResult> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_input_loop(&mut terminal, title, initial, theme);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_input_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    title: &str,
    initial: Option<String>,
    theme: &Theme,
) -> Result<PromptResult> {
    let mut input = initial.map(Input::new).unwrap_or_default();

    loop {
        terminal.draw(|frame| draw_ui(frame, &input, title, theme))?;

        if let Event::Key(key) = event::read()? {
            if let Some(result) = handle_key(&mut input, key) {
                return Ok(result);
            }
        }
    }
}

/// Apply one key press. Returns a result once the prompt is finished.
fn handle_key(input: &mut Input, key: KeyEvent) -> Option<PromptResult> {
    // Only handle key press events (not release)
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Enter => {
            let question = input.value().trim();
            if question.is_empty() {
                Some(PromptResult::Cancelled)
            } else {
                Some(PromptResult::Question(question.to_string()))
            }
        }
        KeyCode::Esc => Some(PromptResult::Cancelled),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PromptResult::Cancelled)
        }
        _ => {
            input.handle_event(&Event::Key(key));
            None
        }
    }
}

fn draw_ui(frame: &mut Frame, input: &Input, title: &str, theme: &Theme) {
    let size = frame.area();

    let popup_width = size.width.saturating_sub(4).min(80);
    let popup_height = 3;
    let popup_area = centered_rect(popup_width, popup_height, size);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(
            Style::default()
                .fg(tui_color(theme.accent))
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tui_color(theme.muted)));

    let inner_area = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Scroll the input if cursor is beyond visible area
    let input_width = inner_area.width as usize;
    let cursor_pos = input.visual_cursor();
    let scroll = if cursor_pos >= input_width {
        cursor_pos - input_width + 1
    } else {
        0
    };

    let visible_value: String = input.value().chars().skip(scroll).take(input_width).collect();

    let input_paragraph = Paragraph::new(Line::from(vec![Span::styled(
        visible_value,
        Style::default().fg(tui_color(theme.foreground)),
    )]));

    frame.render_widget(input_paragraph, inner_area);

    let cursor_x = inner_area.x + (cursor_pos - scroll) as u16;
    let cursor_y = inner_area.y;
    frame.set_cursor_position((cursor_x, cursor_y));
}

fn tui_color(rgb: crate::theme::Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
