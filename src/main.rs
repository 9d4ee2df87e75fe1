use clap::Parser;
use tasklist::cli::commands::Cli;
use tasklist::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // No subcommand → launch TUI
        None => {
            let data_dir = handlers::resolve_data_dir(cli.data_dir.as_deref());
            tasklist::tui::run(&data_dir)
        }
        Some(_) => handlers::dispatch(cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
