use chrono::{NaiveDate, TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::model::{Category, Config, Task, TaskId};
use crate::ops::store;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return it with styles intact.
pub fn render_to_buffer<F>(w: u16, h: u16, f: F) -> Buffer
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();
    terminal.backend().buffer().clone()
}

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let buf = render_to_buffer(w, h, f);
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Date the helpers pin `App::today` to.
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

fn task(id: i64, text: &str, category: Category, due: &str, completed: bool) -> Task {
    Task {
        id: TaskId(id),
        text: text.into(),
        category,
        due_date: due.parse().unwrap(),
        completed,
        created_at: Utc.timestamp_millis_opt(id).unwrap(),
    }
}

/// Newest first, as the store keeps them: one overdue, one upcoming,
/// one completed.
pub fn sample_tasks() -> Vec<Task> {
    vec![
        task(1_736_000_000_003, "Buy milk", Category::Shopping, "2025-01-01", false),
        task(1_736_000_000_002, "Finish report", Category::Work, "2025-01-20", false),
        task(1_736_000_000_001, "Book dentist", Category::Health, "2025-01-05", true),
    ]
}

/// An app over a scratch data dir seeded with `tasks`. Keep the `TempDir`
/// alive for as long as the app is used.
pub fn app_with_tasks(tasks: Vec<Task>) -> (App, TempDir) {
    let tmp = TempDir::new().unwrap();
    if !tasks.is_empty() {
        std::fs::write(
            tmp.path().join("todos.json"),
            serde_json::to_string(&tasks).unwrap(),
        )
        .unwrap();
    }
    let store = store::open_in(tmp.path(), "todos").unwrap();
    let mut app = App::new(store, tmp.path().to_path_buf(), Config::default());
    app.today = test_today();
    (app, tmp)
}
