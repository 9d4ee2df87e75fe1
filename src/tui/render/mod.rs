pub mod add_form;
pub mod filter_bar;
pub mod header;
pub mod status_row;
pub mod task_list;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::Regex;

use super::app::{App, Mode};

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background).fg(app.theme.text);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | filter bar | search line | list | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);
    filter_bar::render_filter_bar(frame, app, chunks[1]);
    filter_bar::render_search_line(frame, app, chunks[2]);
    task_list::render_task_list(frame, app, chunks[3]);

    if app.mode == Mode::Form {
        add_form::render_add_form(frame, app, area);
    }

    status_row::render_status_row(frame, app, chunks[4]);
}

/// A `width` x `height` rect centered in `area`, clipped to it
pub(super) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let Some(re) = search_re else {
        spans.push(Span::styled(text.to_string(), base_style));
        return;
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[m.start()..m.end()].to_string(),
            highlight_style,
        ));
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}
