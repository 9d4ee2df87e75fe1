use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::io::config_io;
use crate::io::recovery;
use crate::io::slot::{DirSlot, SlotError};
use crate::model::{Category, Config, TaskId, ThemeName, UiConfig};
use crate::ops::filter::{FilteredView, ViewQuery, filter_tasks};
use crate::ops::store::{self, TaskStore};
use crate::ops::validate::{FieldErrors, TaskDraft, validate};

use super::input;
use super::render;
use super::theme::Theme;
use super::toast::{Toast, ToastKind};

pub const ADDED_MESSAGE: &str = "Task added successfully!";
pub const REJECTED_MESSAGE: &str = "Please fix the errors!";

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the search line; the list filters live
    Search,
    /// The add-task popup is open
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Text,
    Category,
    DueDate,
}

impl FormField {
    pub fn next(self) -> FormField {
        match self {
            FormField::Text => FormField::Category,
            FormField::Category => FormField::DueDate,
            FormField::DueDate => FormField::Text,
        }
    }

    pub fn prev(self) -> FormField {
        match self {
            FormField::Text => FormField::DueDate,
            FormField::Category => FormField::Text,
            FormField::DueDate => FormField::Category,
        }
    }
}

/// Contents of the add-task popup. Category is picked from the fixed list,
/// `None` until the user chooses one.
#[derive(Debug, Clone)]
pub struct FormState {
    pub text: String,
    pub category: Option<Category>,
    pub due_date: String,
    pub focus: FormField,
    pub errors: FieldErrors,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            text: String::new(),
            category: None,
            due_date: String::new(),
            focus: FormField::Text,
            errors: FieldErrors::default(),
        }
    }
}

impl FormState {
    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            text: self.text.clone(),
            category: self.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
            due_date: self.due_date.clone(),
        }
    }

    /// Step the category choice forward (`delta > 0`) or back through the list
    pub fn cycle_category(&mut self, delta: isize) {
        let n = Category::ALL.len() as isize;
        let idx = match self.category {
            None if delta >= 0 => 0,
            None => n - 1,
            Some(c) => {
                let cur = Category::ALL.iter().position(|x| *x == c).unwrap_or(0) as isize;
                (cur + delta).rem_euclid(n)
            }
        };
        self.category = Some(Category::ALL[idx as usize]);
    }
}

/// Main application state
pub struct App {
    pub store: TaskStore<DirSlot>,
    pub data_dir: PathBuf,
    pub query: ViewQuery,
    pub mode: Mode,
    pub theme: Theme,
    ui_config: UiConfig,
    pub form: FormState,
    pub toast: Option<Toast>,
    toast_ttl: Duration,
    /// Index into the filtered list
    pub cursor: usize,
    pub scroll_offset: usize,
    pub today: NaiveDate,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore<DirSlot>, data_dir: PathBuf, config: Config) -> Self {
        let theme = Theme::from_config(config.ui.theme, &config.ui);
        App {
            store,
            data_dir,
            query: ViewQuery::default(),
            mode: Mode::Navigate,
            theme,
            toast_ttl: Duration::from_secs(config.ui.toast_seconds),
            ui_config: config.ui,
            form: FormState::default(),
            toast: None,
            cursor: 0,
            scroll_offset: 0,
            today: Local::now().date_naive(),
            should_quit: false,
        }
    }

    /// Tasks currently shown, plus whole-collection counts
    pub fn visible(&self) -> FilteredView<'_> {
        filter_tasks(self.store.tasks(), &self.query)
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.visible().tasks.get(self.cursor).map(|t| t.id)
    }

    /// Keep the cursor inside the filtered list after it shrinks
    pub fn clamp_cursor(&mut self) {
        let len = self.visible().tasks.len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().tasks.len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, len as isize - 1) as usize;
    }

    /// Search highlight pattern for the task list, if a search is active
    pub fn active_search_re(&self) -> Option<Regex> {
        if self.query.search.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){}", regex::escape(&self.query.search))).ok()
    }

    pub fn has_completed(&self) -> bool {
        self.store.tasks().iter().any(|t| t.completed)
    }

    // -- toasts ---------------------------------------------------------------

    pub fn show_toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.show_toast_at(kind, message, Instant::now());
    }

    pub fn show_toast_at(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) {
        self.toast = Some(Toast::new(kind, message, now, self.toast_ttl));
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Periodic housekeeping: expire the toast and roll the date over
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
        self.today = Local::now().date_naive();
    }

    // -- mutations ------------------------------------------------------------

    /// Report a failed slot write: keep the snapshot and tell the user
    fn write_failed(&mut self, err: &SlotError) {
        store::record_failed_write(&self.data_dir, &self.store, err);
        self.show_toast(ToastKind::Error, format!("Could not save: {}", err));
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Err(e) = self.store.toggle(id) {
            self.write_failed(&e);
        }
        self.clamp_cursor();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.store.remove(id) {
            Ok(Some(task)) => {
                recovery::log_removed_tasks(&self.data_dir, std::slice::from_ref(&task));
            }
            Ok(None) => {}
            Err(e) => self.write_failed(&e),
        }
        self.clamp_cursor();
    }

    pub fn clear_completed(&mut self) {
        if !self.has_completed() {
            return;
        }
        match self.store.clear_completed() {
            Ok(removed) => {
                recovery::log_removed_tasks(&self.data_dir, &removed);
                let n = removed.len();
                self.show_toast(
                    ToastKind::Success,
                    format!("Cleared {} completed task{}", n, if n == 1 { "" } else { "s" }),
                );
            }
            Err(e) => self.write_failed(&e),
        }
        self.clamp_cursor();
    }

    pub fn open_form(&mut self) {
        self.form = FormState::default();
        self.mode = Mode::Form;
    }

    pub fn cancel_form(&mut self) {
        self.form = FormState::default();
        self.mode = Mode::Navigate;
    }

    /// Validate the form; add the task on success, otherwise keep the
    /// form open with its field errors
    pub fn submit_form(&mut self) {
        match validate(&self.form.draft()) {
            Ok(new_task) => {
                let result = self
                    .store
                    .add(&new_task.text, new_task.category, new_task.due_date)
                    .map(|_| ());
                self.form = FormState::default();
                self.mode = Mode::Navigate;
                match result {
                    Ok(()) => {
                        // New tasks go to the top
                        self.cursor = 0;
                        self.scroll_offset = 0;
                        self.show_toast(ToastKind::Success, ADDED_MESSAGE);
                    }
                    Err(e) => self.write_failed(&e),
                }
            }
            Err(errors) => {
                self.form.errors = errors;
                self.show_toast(ToastKind::Error, REJECTED_MESSAGE);
            }
        }
    }

    /// Flip light/dark and save the choice to config.toml
    pub fn toggle_theme(&mut self) {
        let name: ThemeName = self.theme.name.toggled();
        self.ui_config.theme = name;
        self.theme = Theme::from_config(name, &self.ui_config);
        if let Err(e) = config_io::save_theme(&self.data_dir, name) {
            self.show_toast(ToastKind::Error, format!("Could not save theme: {}", e));
        }
    }
}

/// Run the TUI application against the task list in `data_dir`
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::read_config(data_dir)?;
    let store = store::open_in(data_dir, &config.storage.key)?;
    let mut app = App::new(store, data_dir.to_path_buf(), config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
