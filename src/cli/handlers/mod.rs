use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::recovery;
use crate::io::slot::{DirSlot, SlotError};
use crate::model::config::ThemeName;
use crate::model::task::TaskId;
use crate::ops::filter::{CategoryFilter, Stats, StatusFilter, ViewQuery, filter_tasks};
use crate::ops::store::{self, TaskStore};
use crate::ops::validate::{TaskDraft, validate};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run a subcommand. `cli.command` must be `Some`; no subcommand means the TUI.
pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());

    match cli.command {
        None => Err("no command given (run `tl` without arguments for the TUI)".into()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(&data_dir, args, json),
            Commands::Stats => cmd_stats(&data_dir, json),
            Commands::Theme(args) => cmd_theme(&data_dir, args),
            Commands::Recovery(args) => cmd_recovery(&data_dir, args, json),

            // Write commands
            Commands::Add(args) => cmd_add(&data_dir, args, json),
            Commands::Toggle(args) => cmd_toggle(&data_dir, args),
            Commands::Rm(args) => cmd_rm(&data_dir, args),
            Commands::Clear => cmd_clear(&data_dir),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the `-C` override (if any) against the environment defaults.
pub fn resolve_data_dir(override_dir: Option<&str>) -> PathBuf {
    config_io::data_dir(override_dir.map(Path::new))
}

struct Session {
    data_dir: PathBuf,
    store: TaskStore<DirSlot>,
}

impl Session {
    fn open(data_dir: &Path) -> Result<Session, Box<dyn std::error::Error>> {
        let config = config_io::read_config(data_dir)?;
        let store = store::open_in(data_dir, &config.storage.key)?;
        Ok(Session {
            data_dir: data_dir.to_path_buf(),
            store,
        })
    }

    /// Pass a mutation result through, keeping the unsaved snapshot on failure.
    fn saved<T>(&self, result: Result<T, SlotError>) -> Result<T, SlotError> {
        if let Err(e) = &result {
            store::record_failed_write(&self.data_dir, &self.store, e);
        }
        result
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_id(raw: &str) -> Result<TaskId, String> {
    raw.parse()
        .map_err(|_| format!("invalid task id '{}' (expected a number)", raw))
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(data_dir: &Path, args: ListArgs, json: bool) -> CmdResult {
    let status = StatusFilter::parse_status(&args.status).ok_or_else(|| {
        format!(
            "unknown status '{}' (expected all, active or completed)",
            args.status
        )
    })?;
    let category = CategoryFilter::parse_filter(&args.category).ok_or_else(|| {
        format!(
            "unknown category '{}' (expected all, work, personal, shopping, health or other)",
            args.category
        )
    })?;
    let query = ViewQuery {
        status,
        search: args.search,
        category,
    };

    let session = Session::open(data_dir)?;
    let view = filter_tasks(session.store.tasks(), &query);
    let today = today();

    if json {
        return print_json(&ListJson {
            tasks: view.tasks.iter().map(|t| task_to_json(t, today)).collect(),
            stats: view.stats,
        });
    }

    if view.tasks.is_empty() {
        println!("No tasks found");
    }
    for task in &view.tasks {
        println!("{}", format_task_line(task, today));
    }
    println!();
    println!("{}", format_stats_line(&view.stats));
    Ok(())
}

fn cmd_stats(data_dir: &Path, json: bool) -> CmdResult {
    let session = Session::open(data_dir)?;
    let tasks = session.store.tasks();
    let stats = Stats::of(tasks);
    let today = today();
    let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();

    if json {
        return print_json(&StatsJson { stats, overdue });
    }
    println!("{}", format_stats_detail(&stats, overdue));
    Ok(())
}

fn cmd_theme(data_dir: &Path, args: ThemeArgs) -> CmdResult {
    let current = config_io::read_config(data_dir)?.ui.theme;
    let Some(raw) = args.theme else {
        println!("{}", current.as_str());
        return Ok(());
    };
    let theme = if raw.trim().eq_ignore_ascii_case("toggle") {
        current.toggled()
    } else {
        ThemeName::parse_theme(&raw)
            .ok_or_else(|| format!("unknown theme '{}' (expected light, dark or toggle)", raw))?
    };
    config_io::save_theme(data_dir, theme)?;
    println!("theme: {}", theme.as_str());
    Ok(())
}

fn cmd_recovery(data_dir: &Path, args: RecoveryCmd, json: bool) -> CmdResult {
    if let Some(RecoveryAction::Prune(prune)) = args.action {
        let before = match prune.before.as_deref() {
            Some(raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", raw))?;
                date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
            }
            None => None,
        };
        let removed = recovery::prune_recovery(data_dir, before, prune.all)?;
        println!("pruned {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(data_dir, args.limit);
    if json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        return print_json(&values);
    }
    if entries.is_empty() {
        println!("Recovery log is empty");
        return Ok(());
    }
    for entry in &entries {
        print!("{}", entry.to_markdown());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(data_dir: &Path, args: AddArgs, json: bool) -> CmdResult {
    let draft = TaskDraft {
        text: args.text,
        category: args.category.unwrap_or_default(),
        due_date: args.due.unwrap_or_default(),
    };
    let new_task = match validate(&draft) {
        Ok(t) => t,
        Err(errors) => {
            if json {
                print_json(&AddRejectedJson { errors: &errors })?;
            }
            return Err(format!("task not added\n{}", errors).into());
        }
    };

    let mut session = Session::open(data_dir)?;
    let result = session
        .store
        .add(&new_task.text, new_task.category, new_task.due_date)
        .map(|t| t.id);
    let id = session.saved(result)?;

    let today = today();
    let task = session
        .store
        .get(id)
        .ok_or("added task disappeared from the list")?;
    if json {
        return print_json(&task_to_json(task, today));
    }
    println!("{}", format_task_line(task, today));
    Ok(())
}

fn cmd_toggle(data_dir: &Path, args: IdArgs) -> CmdResult {
    let id = parse_id(&args.id)?;
    let mut session = Session::open(data_dir)?;
    let result = session.store.toggle(id);
    match session.saved(result)? {
        Some(true) => println!("completed {}", id),
        Some(false) => println!("reopened {}", id),
        None => println!("task {} not found", id),
    }
    Ok(())
}

fn cmd_rm(data_dir: &Path, args: IdArgs) -> CmdResult {
    let id = parse_id(&args.id)?;
    let mut session = Session::open(data_dir)?;
    let result = session.store.remove(id);
    match session.saved(result)? {
        Some(task) => {
            recovery::log_removed_tasks(&session.data_dir, std::slice::from_ref(&task));
            println!("deleted {} {}", task.id, task.text);
        }
        None => println!("task {} not found", id),
    }
    Ok(())
}

fn cmd_clear(data_dir: &Path) -> CmdResult {
    let mut session = Session::open(data_dir)?;
    let result = session.store.clear_completed();
    let removed = session.saved(result)?;
    recovery::log_removed_tasks(&session.data_dir, &removed);
    println!(
        "cleared {} completed task{}",
        removed.len(),
        plural(removed.len())
    );
    Ok(())
}
