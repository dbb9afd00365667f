use clap::Parser;
use warehouse::cli::{self, App, Cli};

mod main_runtime;

use main_runtime::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = App::from_cli(&cli)?;
    // Held until the command returns so the file writer flushes on drop
    let _log_guard = init_logging(&app.config.logging, cli.verbose);
    cli::run(&app, cli.command)
}
