use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::filter::{CategoryFilter, StatusFilter};
use crate::tui::app::{App, Mode};

/// Status filter buttons, a divider, then the category buttons.
/// The active choice in each group is drawn highlighted.
pub fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let normal = Style::default().fg(app.theme.text).bg(bg);
    let active = Style::default()
        .fg(app.theme.text_bright)
        .bg(app.theme.highlight)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![Span::styled(" ", normal)];
    for (i, status) in StatusFilter::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", normal));
        }
        let style = if *status == app.query.status { active } else { normal };
        spans.push(Span::styled(status.label(), style));
    }

    spans.push(Span::styled("  \u{2502}  ", Style::default().fg(app.theme.dim).bg(bg)));

    for (i, option) in CategoryFilter::options().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", normal));
        }
        let style = if option == app.query.category {
            active
        } else {
            match option {
                CategoryFilter::Only(c) => normal.fg(app.theme.category_color(c)),
                CategoryFilter::All => normal,
            }
        };
        spans.push(Span::styled(option.label(), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// ` / term` while searching or when a term is applied, a hint otherwise
pub fn render_search_line(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let term = &app.query.search;

    let line = match app.mode {
        Mode::Search => Line::from(vec![
            Span::styled(" / ", Style::default().fg(app.theme.highlight).bg(bg)),
            Span::styled(term.clone(), Style::default().fg(app.theme.text_bright).bg(bg)),
            Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
        ]),
        _ if !term.is_empty() => Line::from(vec![
            Span::styled(" / ", Style::default().fg(app.theme.dim).bg(bg)),
            Span::styled(term.clone(), Style::default().fg(app.theme.text).bg(bg)),
        ]),
        _ => Line::from(Span::styled(
            " / to search",
            Style::default().fg(app.theme.dim).bg(bg),
        )),
    };

    frame.render_widget(Paragraph::new(line), area);
}
