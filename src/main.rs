mod aggregate;
mod api;
mod cli;
mod dates;
mod error;
mod fetcher;
mod fmt;
mod goals;
mod logging;
mod models;
mod presenter;
mod reports;
mod settings;
mod tui;

use clap::Parser;

use cli::{Cli, Commands};
use logging::LogTarget;

fn main() {
    let cli = Cli::parse();
    let settings = settings::load_settings();

    // The dashboard owns the terminal, so its logs go to a file.
    let target = match cli.command {
        None | Some(Commands::Dashboard) => LogTarget::File(settings::log_path()),
        Some(_) => LogTarget::Stderr,
    };
    if let Err(e) = logging::init(target, &settings.log_level) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let result = match cli.command {
        None | Some(Commands::Dashboard) => cli::dashboard::run(),
        Some(Commands::Report { command }) => cli::report::dispatch(command),
        Some(Commands::Config { command }) => cli::config::run(command),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
