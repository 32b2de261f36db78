//! SpecAgg CLI main entry point

use clap::Parser;
use specagg_cli::{
    cli::Cli,
    commands::AggregateCommand,
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::info;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("SpecAgg v{}", env!("CARGO_PKG_VERSION"));

    AggregateCommand::run(&cli).await?;
    Ok(())
}
