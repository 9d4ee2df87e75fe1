use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::format_due_date;
use crate::model::Task;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

use super::push_highlighted_spans;

const MARKER_W: usize = 2;
const CHECK_W: usize = 4;
const GAP_W: usize = 2;
/// `#shopping` / `#personal` plus one space
const TAG_W: usize = 10;
/// `Jan 31, 2025`
const DUE_W: usize = 12;
const OVERDUE: &str = " overdue";

/// Cells left for the task text in a row of `width`
fn text_width(width: usize) -> usize {
    width.saturating_sub(MARKER_W + CHECK_W + GAP_W + TAG_W + DUE_W + OVERDUE.len() + 1)
}

pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let height = area.height as usize;

    let view = app.visible();
    if view.tasks.is_empty() {
        let dim = Style::default().fg(app.theme.dim).bg(bg);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("No tasks found", dim.add_modifier(Modifier::BOLD))),
            Line::from(Span::styled("Add a new task to get started!", dim)),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
        return;
    }

    // Keep the cursor row on screen
    let cursor = app.cursor.min(view.tasks.len() - 1);
    let mut offset = app.scroll_offset.min(view.tasks.len().saturating_sub(1));
    if cursor < offset {
        offset = cursor;
    } else if height > 0 && cursor >= offset + height {
        offset = cursor + 1 - height;
    }

    let search_re = app.active_search_re();
    let lines: Vec<Line> = view
        .tasks
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, task)| task_line(app, task, i == cursor, area.width as usize, search_re.as_ref()))
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
    app.scroll_offset = offset;
}

fn task_line<'a>(
    app: &App,
    task: &Task,
    selected: bool,
    width: usize,
    search_re: Option<&regex::Regex>,
) -> Line<'a> {
    let theme = &app.theme;
    let bg = if selected { theme.selection_bg } else { theme.background };
    let base = Style::default().fg(theme.text).bg(bg);

    let mut spans: Vec<Span> = Vec::new();
    spans.push(Span::styled(
        if selected { "\u{25B8} " } else { "  " },
        base.fg(theme.highlight),
    ));
    spans.push(Span::styled(
        if task.completed { "[x] " } else { "[ ] " },
        if task.completed { base.fg(theme.success) } else { base },
    ));

    // Text, padded so the tag and date columns line up
    let text_w = text_width(width);
    let text = truncate_to_width(&task.text, text_w);
    let text_style = if task.completed {
        base.fg(theme.dim).add_modifier(Modifier::CROSSED_OUT)
    } else {
        base.fg(theme.text_bright)
    };
    let match_style = text_style.fg(theme.background).bg(theme.highlight);
    push_highlighted_spans(&mut spans, &text, text_style, match_style, search_re);
    let pad = text_w.saturating_sub(display_width(&text)) + GAP_W;
    spans.push(Span::styled(" ".repeat(pad), base));

    let tag = format!("#{}", task.category.as_str());
    spans.push(Span::styled(
        format!("{:<width$}", tag, width = TAG_W),
        base.fg(theme.category_color(task.category)),
    ));

    let overdue = task.is_overdue(app.today);
    let due_style = if overdue {
        base.fg(theme.overdue).add_modifier(Modifier::BOLD)
    } else {
        base.fg(theme.dim)
    };
    spans.push(Span::styled(format_due_date(task.due_date), due_style));
    if overdue {
        spans.push(Span::styled(OVERDUE, due_style));
    }

    // Fill the rest of the row so the selection background spans it
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), base));
    }

    Line::from(spans)
}
