use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::Frame;

use crate::error::Result;
use crate::goals::GoalStatus;
use crate::models::DocKind;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const GOAL_MET_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const GOAL_BELOW_STYLE: Style = Style::new().fg(Color::Red);

pub const ERROR_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub fn goal_style(status: GoalStatus) -> Style {
    match status {
        GoalStatus::Met => GOAL_MET_STYLE,
        GoalStatus::Below => GOAL_BELOW_STYLE,
    }
}

/// Bar color per series: blue orders, green invoices, red returns.
pub fn kind_color(kind: DocKind) -> Color {
    match kind {
        DocKind::Order => Color::Blue,
        DocKind::Invoice => Color::Green,
        DocKind::Return => Color::Red,
    }
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

// ---------------------------------------------------------------------------
// Report view infrastructure
// ---------------------------------------------------------------------------

pub enum ReportViewAction {
    Continue,
    Close,
}

pub trait ReportView {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction;
}

/// Run an interactive ratatui report view. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_report_view(view: &mut dyn ReportView) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match view.handle_key(key.code) {
                    ReportViewAction::Close => break Ok(()),
                    ReportViewAction::Continue => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_style_colors() {
        assert_eq!(goal_style(GoalStatus::Met), GOAL_MET_STYLE);
        assert_eq!(goal_style(GoalStatus::Below), GOAL_BELOW_STYLE);
    }

    #[test]
    fn test_wrap_text_counts_lines() {
        let (wrapped, lines) = wrap_text("erro ao buscar dados do servidor", 10);
        assert!(lines >= 3);
        assert!(wrapped.lines().all(|l| l.chars().count() <= 10));
        assert_eq!(wrap_text("x", 0), ("x".to_string(), 1));
    }
}
