use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::tui::toast::ToastKind;
use crate::util::unicode::truncate_to_width;

/// Render the status row (bottom of screen): the toast if one is showing,
/// key hints for the current mode otherwise
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if let Some(toast) = &app.toast {
        let (icon, color) = match toast.kind {
            ToastKind::Success => ("\u{2713}", app.theme.success),
            ToastKind::Error => ("\u{2717}", app.theme.error),
        };
        let text = truncate_to_width(&format!(" {} {}", icon, toast.message), width);
        Line::from(Span::styled(
            text,
            Style::default().fg(color).bg(bg).add_modifier(Modifier::BOLD),
        ))
    } else {
        let hints = match app.mode {
            Mode::Navigate if app.has_completed() => {
                " a add  space toggle  d delete  / search  tab status  c category  X clear  q quit"
            }
            Mode::Navigate => {
                " a add  space toggle  d delete  / search  tab status  c category  q quit"
            }
            Mode::Search => " enter apply  esc clear",
            Mode::Form => " tab next field  \u{2190}\u{2192} category  enter add  esc cancel",
        };
        Line::from(Span::styled(
            truncate_to_width(hints, width),
            Style::default().fg(app.theme.dim).bg(bg),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}
