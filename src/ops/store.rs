use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};

use crate::io::recovery;
use crate::io::slot::{DirSlot, Slot, SlotError};
use crate::model::task::{Category, Task, TaskId};

/// How [`TaskStore::load`] arrived at its starting collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored under the key yet
    Missing,
    /// Parsed this many tasks
    Loaded(usize),
    /// Stored content did not parse and was dropped; the raw text is kept
    /// so the caller can preserve it somewhere
    Discarded { raw: String, reason: String },
}

/// The authoritative task list, mirrored to a [`Slot`] after every mutation.
///
/// Tasks are kept most-recent-first. The store does not validate input;
/// see [`crate::ops::validate`] for that.
#[derive(Debug)]
pub struct TaskStore<S: Slot> {
    slot: S,
    key: String,
    tasks: Vec<Task>,
}

impl<S: Slot> TaskStore<S> {
    /// Rehydrate from `slot[key]`. Missing or malformed content yields an
    /// empty list; only a failed read is an error.
    pub fn load(slot: S, key: &str) -> Result<(Self, LoadOutcome), SlotError> {
        let (tasks, outcome) = match slot.read(key)? {
            None => (Vec::new(), LoadOutcome::Missing),
            Some(raw) => match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(tasks) => {
                    let n = tasks.len();
                    (tasks, LoadOutcome::Loaded(n))
                }
                Err(e) => (
                    Vec::new(),
                    LoadOutcome::Discarded {
                        raw,
                        reason: e.to_string(),
                    },
                ),
            },
        };
        let store = TaskStore {
            slot,
            key: key.to_string(),
            tasks,
        };
        Ok((store, outcome))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// The collection exactly as it is written to the slot
    pub fn snapshot(&self) -> Result<String, SlotError> {
        Ok(serde_json::to_string(&self.tasks)?)
    }

    /// Create a task at the front of the list and persist.
    pub fn add(
        &mut self,
        text: &str,
        category: Category,
        due_date: NaiveDate,
    ) -> Result<&Task, SlotError> {
        self.add_at(text, category, due_date, Utc::now())
    }

    /// [`add`](Self::add) with an explicit creation time
    pub fn add_at(
        &mut self,
        text: &str,
        category: Category,
        due_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<&Task, SlotError> {
        let task = Task {
            id: self.next_id(now),
            text: text.trim().to_string(),
            category,
            due_date,
            completed: false,
            created_at: now,
        };
        self.tasks.insert(0, task);
        self.persist()?;
        Ok(&self.tasks[0])
    }

    /// Flip completion on `id` and persist. Returns the new state, or
    /// `None` (and writes nothing) when no such task exists.
    pub fn toggle(&mut self, id: TaskId) -> Result<Option<bool>, SlotError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist()?;
        Ok(Some(completed))
    }

    /// Remove `id` and persist. Returns the removed task, if there was one.
    pub fn remove(&mut self, id: TaskId) -> Result<Option<Task>, SlotError> {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let task = self.tasks.remove(pos);
        self.persist()?;
        Ok(Some(task))
    }

    /// Remove every completed task and persist. Returns what was removed.
    pub fn clear_completed(&mut self) -> Result<Vec<Task>, SlotError> {
        let (done, open): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks)
                .into_iter()
                .partition(|t| t.completed);
        self.tasks = open;
        self.persist()?;
        Ok(done)
    }

    /// Millisecond timestamp, bumped past every existing id. Once the
    /// largest id is `i64::MAX`, the highest free id below it is used.
    fn next_id(&self, now: DateTime<Utc>) -> TaskId {
        let candidate = now.timestamp_millis();
        match self.tasks.iter().map(|t| t.id.0).max() {
            Some(max) if max >= candidate => match max.checked_add(1) {
                Some(id) => TaskId(id),
                None => self.free_id_below(max),
            },
            _ => TaskId(candidate),
        }
    }

    fn free_id_below(&self, start: i64) -> TaskId {
        let taken: HashSet<i64> = self.tasks.iter().map(|t| t.id.0).collect();
        let id = (i64::MIN..start)
            .rev()
            .find(|id| !taken.contains(id))
            .unwrap_or(i64::MIN);
        TaskId(id)
    }

    fn persist(&mut self) -> Result<(), SlotError> {
        let snapshot = self.snapshot()?;
        self.slot.write(&self.key, &snapshot)
    }
}

/// Open the file-backed store in `data_dir`. Content that fails to parse is
/// copied into the recovery log before being dropped.
pub fn open_in(data_dir: &Path, key: &str) -> Result<TaskStore<DirSlot>, SlotError> {
    let (store, outcome) = TaskStore::load(DirSlot::new(data_dir), key)?;
    if let LoadOutcome::Discarded { raw, reason } = outcome {
        recovery::log_discarded_slot(data_dir, key, &raw, &reason);
    }
    Ok(store)
}

/// Keep the in-memory snapshot of a store whose last write failed.
pub fn record_failed_write<S: Slot>(data_dir: &Path, store: &TaskStore<S>, err: &SlotError) {
    let snapshot = store.snapshot().unwrap_or_default();
    recovery::log_failed_write(data_dir, store.key(), &snapshot, &err.to_string());
}
