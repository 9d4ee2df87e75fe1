use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ops::validate::Field;
use crate::tui::app::{App, FormField};

use super::centered_rect;

const LABEL_W: usize = 11;
const POPUP_W: u16 = 60;
const POPUP_H: u16 = 10;

/// The add-task popup: three fields, each followed by its error line
pub fn render_add_form(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let form = &app.form;
    let popup = centered_rect(POPUP_W, POPUP_H, area);

    let label_style = Style::default().fg(theme.text).bg(bg);
    let focus_style = Style::default()
        .fg(theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(theme.text_bright).bg(bg);
    let placeholder_style = Style::default().fg(theme.dim).bg(bg);
    let error_style = Style::default().fg(theme.error).bg(bg);
    let cursor = Span::styled("\u{258C}", Style::default().fg(theme.highlight).bg(bg));

    let field_line = |field: FormField, label: &str, value: Vec<Span<'static>>| {
        let focused = form.focus == field;
        let mut spans = vec![Span::styled(
            format!("{:<width$}", label, width = LABEL_W),
            if focused { focus_style } else { label_style },
        )];
        spans.extend(value);
        if focused && field != FormField::Category {
            spans.push(cursor.clone());
        }
        Line::from(spans)
    };
    let error_line = |field: Field| match form.errors.get(field) {
        Some(msg) => Line::from(vec![
            Span::styled(" ".repeat(LABEL_W), error_style),
            Span::styled(msg.to_string(), error_style),
        ]),
        None => Line::from(""),
    };

    let text_value = vec![Span::styled(form.text.clone(), value_style)];
    let category_value = match form.category {
        Some(c) => vec![Span::styled(
            format!("< {} >", c.label()),
            value_style.fg(theme.category_color(c)),
        )],
        None => vec![Span::styled("< choose >", placeholder_style)],
    };
    let due_value = if form.due_date.is_empty() && form.focus != FormField::DueDate {
        vec![Span::styled("YYYY-MM-DD", placeholder_style)]
    } else {
        vec![Span::styled(form.due_date.clone(), value_style)]
    };

    let lines = vec![
        field_line(FormField::Text, "Text", text_value),
        error_line(Field::Text),
        field_line(FormField::Category, "Category", category_value),
        error_line(Field::Category),
        field_line(FormField::DueDate, "Due date", due_value),
        error_line(Field::DueDate),
        Line::from(""),
        Line::from(Span::styled(
            "enter add  tab next field  esc cancel",
            placeholder_style,
        )),
    ];

    let block = Block::default()
        .title(" New task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .style(Style::default().bg(bg));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
