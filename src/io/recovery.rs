use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::io::slot::atomic_write;
use crate::model::task::Task;

/// Size past which old entries are trimmed on append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Fence around entry bodies. Four backticks so stored JSON or markdown
/// containing a regular fence does not end the block early.
const FENCE: &str = "````";

/// Written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- tasklist recovery log: data that could not be kept anywhere else.
     Discarded task lists, deleted tasks and failed saves end up here.
     View with: tl recovery
     Prune old entries: tl recovery prune
     Safe to delete when you no longer need it. -->

---
";

/// Why an entry was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Slot content that failed to parse and was dropped on load
    Parser,
    /// Tasks removed by delete or clear-completed
    Delete,
    /// A snapshot that could not be persisted
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecoveryCategory::Parser => "parser",
            RecoveryCategory::Delete => "delete",
            RecoveryCategory::Write => "write",
        })
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "delete" => Some(RecoveryCategory::Delete),
            "write" => Some(RecoveryCategory::Write),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Render as a markdown block: header line, `Key: value` fields, fenced body, `---`.
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            out.push('\n');
            out.push_str(FENCE);
            out.push_str("text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(FENCE);
            out.push('\n');
        }
        out.push_str("\n---\n");
        out
    }

    /// JSON form for `tl recovery --json`
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

/// Path of the recovery log inside the data directory
pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

/// Append an entry. Failures are reported on stderr and otherwise ignored.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(data_dir, &entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn append_entry(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = recovery_log_path(data_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
        let content = std::fs::read_to_string(&path)?;
        atomic_write(&path, retain_since(&content, &cutoff).as_bytes())?;
    }

    let is_new = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if is_new {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Record slot content that was dropped because it did not parse. Skipped
/// when the newest parser entry for `key` already holds the same content.
pub fn log_discarded_slot(data_dir: &Path, key: &str, raw: &str, reason: &str) {
    let latest = read_recovery_entries(data_dir, None).into_iter().find(|e| {
        e.category == RecoveryCategory::Parser
            && e.fields.iter().any(|(k, v)| k == "Slot" && v == key)
    });
    if latest.is_some_and(|e| e.body.lines().eq(raw.lines())) {
        return;
    }
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Parser, "unreadable task list discarded")
            .field("Slot", key)
            .field("Error", reason)
            .body(raw),
    );
}

/// Record tasks removed by delete or clear-completed.
pub fn log_removed_tasks(data_dir: &Path, tasks: &[Task]) {
    if tasks.is_empty() {
        return;
    }
    let description = match tasks {
        [task] => format!("task {} deleted", task.id),
        _ => format!("{} completed tasks cleared", tasks.len()),
    };
    let body = serde_json::to_string_pretty(tasks).unwrap_or_default();
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Delete, description)
            .field("Count", tasks.len().to_string())
            .body(body),
    );
}

/// Record a snapshot that could not be written to its slot.
pub fn log_failed_write(data_dir: &Path, key: &str, snapshot: &str, error: &str) {
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Write, "task list not saved")
            .field("Slot", key)
            .field("Error", error)
            .body(snapshot),
    );
}

/// Read entries, most recent first, keeping at most `limit`.
pub fn read_recovery_entries(data_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(data_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    let mut entries = parse_entries(&content);
    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}

/// Remove entries older than `before` (default: 30 days), or all of them.
/// Returns the number of entries removed.
pub fn prune_recovery(
    data_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let before_count = parse_entries(&content).len();

    let kept = if all {
        FILE_HEADER.to_string()
    } else {
        let cutoff =
            before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
        retain_since(&content, &cutoff)
    };
    let after_count = parse_entries(&kept).len();
    atomic_write(&path, kept.as_bytes())?;
    Ok(before_count - after_count)
}

/// Split the log into (header, raw entry blocks). Each block starts at its `## ` line.
fn split_blocks(content: &str) -> (String, Vec<String>) {
    let mut header = String::new();
    let mut blocks: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in content.lines() {
        if line.starts_with(FENCE) {
            in_fence = !in_fence;
        }
        if !in_fence && line.starts_with("## ") {
            blocks.push(String::new());
        }
        let target = blocks.last_mut().unwrap_or(&mut header);
        target.push_str(line);
        target.push('\n');
    }
    (header, blocks)
}

/// Keep the header plus every entry stamped at or after `cutoff`.
fn retain_since(content: &str, cutoff: &DateTime<Utc>) -> String {
    let (header, blocks) = split_blocks(content);
    let mut out = header;
    for block in blocks {
        let keep = block
            .lines()
            .next()
            .and_then(|l| l.strip_prefix("## "))
            .and_then(parse_entry_header)
            .is_some_and(|(ts, _, _)| ts >= *cutoff);
        if keep {
            out.push_str(&block);
        }
    }
    out
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let (_, blocks) = split_blocks(content);
    blocks.iter().filter_map(|b| parse_block(b)).collect()
}

fn parse_block(block: &str) -> Option<RecoveryEntry> {
    let mut lines = block.lines();
    let (timestamp, category, description) =
        parse_entry_header(lines.next()?.strip_prefix("## ")?)?;

    let mut fields = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    for line in lines {
        if in_fence {
            if line == FENCE {
                in_fence = false;
            } else {
                body_lines.push(line);
            }
            continue;
        }
        if line.starts_with(FENCE) {
            in_fence = true;
        } else if line == "---" {
            break;
        } else if let Some((key, value)) = line.split_once(": ") {
            fields.push((key.to_string(), value.to_string()));
        }
    }

    Some(RecoveryEntry {
        timestamp,
        category,
        description,
        fields,
        body: body_lines.join("\n"),
    })
}

/// Parse `<rfc3339> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (ts, rest) = header.split_once(" [")?;
    let (category, description) = rest.split_once("] ")?;
    let timestamp = DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc);
    let category = RecoveryCategory::parse_category(category)?;
    Some((timestamp, category, description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Category, TaskId};
    use chrono::{Datelike, NaiveDate};
    use tempfile::TempDir;

    fn task(id: i64, text: &str) -> Task {
        Task {
            id: TaskId(id),
            text: text.into(),
            category: Category::Work,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            completed: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn entry_markdown_layout() {
        let entry = RecoveryEntry::new(RecoveryCategory::Parser, "dropped")
            .field("Slot", "todos")
            .body("{not json");
        let md = entry.to_markdown();
        assert!(md.starts_with("## "));
        assert!(md.contains("[parser] dropped"));
        assert!(md.contains("Slot: todos\n"));
        assert!(md.contains("````text\n{not json\n````\n"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn empty_body_has_no_fence() {
        let md = RecoveryEntry::new(RecoveryCategory::Write, "x").to_markdown();
        assert!(!md.contains(FENCE));
    }

    #[test]
    fn header_written_once() {
        let tmp = TempDir::new().unwrap();
        log_discarded_slot(tmp.path(), "todos", "a", "bad");
        log_discarded_slot(tmp.path(), "todos", "b", "bad");
        let content = std::fs::read_to_string(recovery_log_path(tmp.path())).unwrap();
        assert!(content.starts_with("<!-- tasklist recovery log"));
        assert_eq!(content.matches("<!-- tasklist").count(), 1);
    }

    #[test]
    fn log_and_read_most_recent_first() {
        let tmp = TempDir::new().unwrap();
        log_discarded_slot(tmp.path(), "todos", "{not json", "expected value");
        log_removed_tasks(tmp.path(), &[task(7, "Old")]);

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, RecoveryCategory::Delete);
        assert_eq!(entries[0].description, "task 7 deleted");
        assert_eq!(entries[1].category, RecoveryCategory::Parser);
        assert_eq!(entries[1].body, "{not json");
        assert_eq!(
            entries[1].fields,
            vec![
                ("Slot".to_string(), "todos".to_string()),
                ("Error".to_string(), "expected value".to_string()),
            ]
        );
    }

    #[test]
    fn removed_tasks_body_is_json() {
        let tmp = TempDir::new().unwrap();
        log_removed_tasks(tmp.path(), &[task(1, "One"), task(2, "Two")]);
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries[0].description, "2 completed tasks cleared");
        let tasks: Vec<Task> = serde_json::from_str(&entries[0].body).unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn nothing_removed_logs_nothing() {
        let tmp = TempDir::new().unwrap();
        log_removed_tasks(tmp.path(), &[]);
        assert!(!recovery_log_path(tmp.path()).exists());
    }

    #[test]
    fn body_with_separator_lines_survives() {
        let tmp = TempDir::new().unwrap();
        let raw = "line one\n---\n## not a header\nline four";
        log_failed_write(tmp.path(), "todos", raw, "disk full");
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, raw);
    }

    #[test]
    fn read_with_limit() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            log_recovery(
                tmp.path(),
                RecoveryEntry::new(RecoveryCategory::Write, format!("entry{}", i)),
            );
        }
        let entries = read_recovery_entries(tmp.path(), Some(2));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "entry4");
        assert_eq!(entries[1].description, "entry3");
    }

    #[test]
    fn read_missing_log_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_recovery_entries(&tmp.path().join("nope"), None).is_empty());
    }

    #[test]
    fn prune_all_keeps_header() {
        let tmp = TempDir::new().unwrap();
        log_discarded_slot(tmp.path(), "todos", "x", "bad");
        assert_eq!(prune_recovery(tmp.path(), None, true).unwrap(), 1);
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
        let content = std::fs::read_to_string(recovery_log_path(tmp.path())).unwrap();
        assert!(content.contains("tasklist recovery log"));
    }

    #[test]
    fn prune_before_cutoff() {
        let tmp = TempDir::new().unwrap();
        let mut old = RecoveryEntry::new(RecoveryCategory::Parser, "old entry");
        old.timestamp = Utc::now() - chrono::Duration::days(60);
        log_recovery(tmp.path(), old);
        log_recovery(tmp.path(), RecoveryEntry::new(RecoveryCategory::Write, "new entry"));

        let removed = prune_recovery(tmp.path(), None, false).unwrap();
        assert_eq!(removed, 1);
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "new entry");
    }

    #[test]
    fn prune_without_log_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(prune_recovery(tmp.path(), None, true).unwrap(), 0);
    }

    #[test]
    fn parse_header_variants() {
        let (ts, cat, desc) =
            parse_entry_header("2026-02-10T14:32:05Z [delete] task 3 deleted").unwrap();
        assert_eq!(ts.year(), 2026);
        assert_eq!(cat, RecoveryCategory::Delete);
        assert_eq!(desc, "task 3 deleted");
        assert!(parse_entry_header("not a header").is_none());
        assert!(parse_entry_header("2026-02-10T14:32:05Z [unknown] x").is_none());
    }

    #[test]
    fn entry_to_json() {
        let json = RecoveryEntry::new(RecoveryCategory::Parser, "dropped")
            .field("Slot", "todos")
            .body("raw")
            .to_json();
        assert_eq!(json["category"], "parser");
        assert_eq!(json["fields"]["Slot"], "todos");
        assert_eq!(json["body"], "raw");
    }
}
