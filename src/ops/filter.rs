use std::fmt;

use serde::Serialize;

use crate::model::task::{Category, Task};

/// Which completion states are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Completed,
    ];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
        }
    }

    pub fn parse_status(s: &str) -> Option<StatusFilter> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "active" => Some(StatusFilter::Active),
            "completed" | "done" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    /// Next filter, wrapping around
    pub fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }
}

/// Either every category or exactly one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// `All` followed by every category, in the order the filter bar shows them
    pub fn options() -> impl Iterator<Item = CategoryFilter> {
        std::iter::once(CategoryFilter::All).chain(Category::ALL.into_iter().map(CategoryFilter::Only))
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => task.category == c,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.label(),
        }
    }

    pub fn parse_filter(s: &str) -> Option<CategoryFilter> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(CategoryFilter::All);
        }
        Category::parse_category(s).map(CategoryFilter::Only)
    }

    pub fn next(self) -> CategoryFilter {
        self.step(1)
    }

    pub fn prev(self) -> CategoryFilter {
        self.step(Category::ALL.len())
    }

    fn step(self, by: usize) -> CategoryFilter {
        let options: Vec<CategoryFilter> = Self::options().collect();
        let idx = options.iter().position(|o| *o == self).unwrap_or(0);
        options[(idx + by) % options.len()]
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => write!(f, "{}", c),
        }
    }
}

/// Everything the view filter depends on besides the tasks themselves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub status: StatusFilter,
    /// Case-insensitive substring; empty matches everything
    pub search: String,
    pub category: CategoryFilter,
}

impl ViewQuery {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task)
            && search_matches(&self.search, &task.text)
            && self.category.matches(task)
    }
}

/// Counts over the whole collection, independent of any filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl Stats {
    pub fn of(tasks: &[Task]) -> Stats {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Stats {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }
}

/// Filtered tasks plus unfiltered counts
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    pub tasks: Vec<&'a Task>,
    pub stats: Stats,
}

/// Apply `query` to `tasks`, keeping their order.
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &ViewQuery) -> FilteredView<'a> {
    FilteredView {
        tasks: tasks.iter().filter(|t| query.matches(t)).collect(),
        stats: Stats::of(tasks),
    }
}

fn search_matches(term: &str, text: &str) -> bool {
    term.is_empty() || text.to_lowercase().contains(&term.to_lowercase())
}
