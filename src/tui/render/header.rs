use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::filter::Stats;
use crate::tui::app::App;
use crate::util::unicode::display_width;

/// Title with the theme marker on the right, counts underneath
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let stats = Stats::of(app.store.tasks());

    let title = " My Tasks";
    let marker = format!("theme: {}", app.theme.name.as_str());
    let mut top = vec![Span::styled(
        title,
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let used = display_width(title) + display_width(&marker);
    if used < width {
        top.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        top.push(Span::styled(marker, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let counts = Span::styled(
        format!(" {} active, {} completed", stats.active, stats.completed),
        Style::default().fg(app.theme.dim).bg(bg),
    );

    frame.render_widget(
        Paragraph::new(vec![Line::from(top), Line::from(counts)]),
        area,
    );
}
