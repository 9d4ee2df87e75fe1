use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task identifier: creation time in Unix milliseconds, kept unique by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

/// The closed set of task categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Other,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Shopping,
        Category::Health,
        Category::Other,
    ];

    /// Lowercase key used in storage, config and the CLI
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Shopping => "shopping",
            Category::Health => "health",
            Category::Other => "other",
        }
    }

    /// Capitalized name for display
    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }

    /// Parse a category key (case-insensitive)
    pub fn parse_category(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single to-do entry.
///
/// Field names follow the persisted layout (`dueDate`, `createdAt`), so the
/// slot content stays a plain JSON array of these records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub category: Category,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A task is overdue when it is still open and its due date is before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date < today
    }
}
