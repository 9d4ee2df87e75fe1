use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::task::Category;

/// Minimum task text length, counted in characters after trimming
pub const MIN_TEXT_CHARS: usize = 3;

/// Input field a validation message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "dueDate")]
    DueDate,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Text => "text",
            Field::Category => "category",
            Field::DueDate => "dueDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field → message, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Raw task-creation input, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub category: String,
    pub due_date: String,
}

/// Input that passed validation and can go straight to `TaskStore::add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub category: Category,
    pub due_date: NaiveDate,
}

/// Check every field of `draft`, reporting all failures together.
pub fn validate(draft: &TaskDraft) -> Result<NewTask, FieldErrors> {
    let mut errors = FieldErrors::default();

    let text = draft.text.trim();
    if text.chars().count() < MIN_TEXT_CHARS {
        errors.insert(
            Field::Text,
            format!("Task text must be at least {} characters", MIN_TEXT_CHARS),
        );
    }

    let category = match draft.category.trim() {
        "" => {
            errors.insert(Field::Category, "Category is required");
            None
        }
        raw => {
            let parsed = Category::parse_category(raw);
            if parsed.is_none() {
                errors.insert(Field::Category, format!("Unknown category '{}'", raw));
            }
            parsed
        }
    };

    let due_date = match draft.due_date.trim() {
        "" => {
            errors.insert(Field::DueDate, "Due date is required");
            None
        }
        raw => {
            let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.insert(Field::DueDate, "Due date must be a date like 2025-01-31");
            }
            parsed
        }
    };

    match (category, due_date) {
        (Some(category), Some(due_date)) if errors.is_empty() => Ok(NewTask {
            text: text.to_string(),
            category,
            due_date,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str, category: &str, due: &str) -> TaskDraft {
        TaskDraft {
            text: text.into(),
            category: category.into(),
            due_date: due.into(),
        }
    }

    #[test]
    fn valid_draft_is_trimmed_and_typed() {
        let task = validate(&draft("  Buy milk ", "shopping", "2025-01-01")).unwrap();
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.category, Category::Shopping);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn everything_missing_reports_all_fields_in_order() {
        let errors = validate(&TaskDraft::default()).unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec![Field::Text, Field::Category, Field::DueDate]);
        assert_eq!(
            errors.get(Field::Text),
            Some("Task text must be at least 3 characters")
        );
        assert_eq!(errors.get(Field::Category), Some("Category is required"));
        assert_eq!(errors.get(Field::DueDate), Some("Due date is required"));
    }

    #[test]
    fn short_text_after_trimming() {
        let errors = validate(&draft("  ab   ", "work", "2025-01-01")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(Field::Text).is_some());
        // Exactly three characters is fine
        assert!(validate(&draft("abc", "work", "2025-01-01")).is_ok());
    }

    #[test]
    fn text_length_counts_characters_not_bytes() {
        assert!(validate(&draft("日本語", "work", "2025-01-01")).is_ok());
        assert!(validate(&draft("日本", "work", "2025-01-01")).is_err());
    }

    #[test]
    fn unknown_category() {
        let errors = validate(&draft("Gym", "fitness", "2025-01-01")).unwrap_err();
        assert_eq!(errors.get(Field::Category), Some("Unknown category 'fitness'"));
    }

    #[test]
    fn bad_date() {
        let errors = validate(&draft("Gym", "health", "01/02/2025")).unwrap_err();
        assert_eq!(
            errors.get(Field::DueDate),
            Some("Due date must be a date like 2025-01-31")
        );
        assert!(validate(&draft("Gym", "health", "2025-02-30")).is_err());
    }

    #[test]
    fn past_due_dates_are_accepted() {
        assert!(validate(&draft("Overdue thing", "other", "1999-12-31")).is_ok());
    }

    #[test]
    fn display_lists_one_field_per_line() {
        let errors = validate(&draft("", "", "2025-01-01")).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "text: Task text must be at least 3 characters\ncategory: Category is required"
        );
    }

    #[test]
    fn serializes_as_field_map() {
        let errors = validate(&draft("ok!", "", "")).unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["category"], "Category is required");
        assert_eq!(json["dueDate"], "Due date is required");
    }
}
