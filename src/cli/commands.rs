use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tl", about = concat!("[x] tasklist v", env!("CARGO_PKG_VERSION"), " - tasks by category, due date and status"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $TASKLIST_DIR or ~/.local/share/tasklist)
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the top of the list
    Add(AddArgs),
    /// List tasks, optionally filtered
    List(ListArgs),
    /// Flip a task between active and completed
    Toggle(IdArgs),
    /// Delete a task
    Rm(IdArgs),
    /// Delete every completed task
    Clear,
    /// Show task counts
    Stats,
    /// Show or change the color theme
    Theme(ThemeArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

#[derive(Args)]
pub struct AddArgs {
    /// What needs to be done (at least 3 characters)
    pub text: String,
    /// work, personal, shopping, health or other
    #[arg(short, long)]
    pub category: Option<String>,
    /// Due date as YYYY-MM-DD
    #[arg(short, long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// all, active or completed
    #[arg(long, default_value = "all")]
    pub status: String,
    /// Case-insensitive text to look for
    #[arg(long, default_value = "")]
    pub search: String,
    /// all or a single category
    #[arg(long, default_value = "all")]
    pub category: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID (as shown by `tl list`)
    pub id: String,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// light, dark or toggle (omit to print the current theme)
    pub theme: Option<String>,
}

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries (default: older than 30 days)
    Prune(PruneArgs),
}

#[derive(Args)]
pub struct PruneArgs {
    /// Remove every entry
    #[arg(long)]
    pub all: bool,
    /// Remove entries before this date (YYYY-MM-DD)
    #[arg(long)]
    pub before: Option<String>,
}
