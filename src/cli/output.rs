use chrono::NaiveDate;
use serde::Serialize;

use crate::model::task::{Category, Task};
use crate::ops::filter::Stats;
use crate::ops::validate::FieldErrors;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: i64,
    pub text: String,
    pub category: Category,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub overdue: bool,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct ListJson {
    pub tasks: Vec<TaskJson>,
    pub stats: Stats,
}

#[derive(Serialize)]
pub struct StatsJson {
    #[serde(flatten)]
    pub stats: Stats,
    pub overdue: usize,
}

#[derive(Serialize)]
pub struct AddRejectedJson<'a> {
    pub errors: &'a FieldErrors,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, today: NaiveDate) -> TaskJson {
    TaskJson {
        id: task.id.0,
        text: task.text.clone(),
        category: task.category,
        due_date: task.due_date,
        completed: task.completed,
        overdue: task.is_overdue(today),
        created_at: task
            .created_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `[x] <id> <text> #<category> due <date>`, with `(overdue)` appended when it applies
pub fn format_task_line(task: &Task, today: NaiveDate) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let overdue = if task.is_overdue(today) {
        " (overdue)"
    } else {
        ""
    };
    format!(
        "[{}] {} {} #{} due {}{}",
        check, task.id, task.text, task.category, task.due_date, overdue
    )
}

/// The header summary: `2 active, 1 completed`
pub fn format_stats_line(stats: &Stats) -> String {
    format!("{} active, {} completed", stats.active, stats.completed)
}

pub fn format_stats_detail(stats: &Stats, overdue: usize) -> String {
    format!(
        "{} total, {} active, {} completed, {} overdue",
        stats.total, stats.active, stats.completed, overdue
    )
}

/// Due date as shown in the task list, e.g. `Jan 5, 2025`
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
