//! Aggregate command: load configuration, run, print the summary

use crate::{
    cli::Cli,
    error::{CliError, CliResult},
    utils::{validate_file_exists, ColoredOutput},
};
use specagg_config::{AggregatorConfig, ConfigLoader};
use specagg_runtime::{Aggregator, RunReport};
use tracing::debug;

pub struct AggregateCommand;

impl AggregateCommand {
    pub async fn run(cli: &Cli) -> CliResult<RunReport> {
        let config = Self::load_config(cli)?;
        let aggregator = match &cli.local_root {
            Some(root) => {
                debug!(root = %root.display(), "reading specs from local checkouts");
                Aggregator::local(config, root)?
            }
            None => Aggregator::github(config)?,
        };

        let report = aggregator.run(&cli.branch).await?;
        Self::print_report(&report);
        Ok(report)
    }

    /// Configuration file (or the built-in one) with command line overrides
    pub fn load_config(cli: &Cli) -> CliResult<AggregatorConfig> {
        let mut config = match &cli.config {
            Some(path) => {
                validate_file_exists(path)?;
                ConfigLoader::default().load_from_file(path)?
            }
            None => AggregatorConfig::default(),
        };

        if let Some(dir) = &cli.output_dir {
            config.output_dir = dir.clone();
        }
        config
            .restrict_audiences(&cli.audiences)
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        Ok(config)
    }

    fn print_report(report: &RunReport) {
        for spec in &report.specs {
            println!(
                "{} Generated {}",
                ColoredOutput::success("✓"),
                ColoredOutput::highlight(&spec.path.display().to_string())
            );
            println!("  - Paths: {}", spec.paths);
            println!("  - Schemas: {}", spec.schemas);
            println!("  - Tags: {}", spec.tags);
            println!("  - Unique servers across operations: {}", spec.servers.len());
            for server in &spec.servers {
                println!("    {}", ColoredOutput::dim(&format!("• {}", server)));
            }
        }

        let skipped: Vec<_> = report.skipped_services().collect();
        if !skipped.is_empty() {
            println!(
                "{} No specs from: {}",
                ColoredOutput::warning("⚠"),
                skipped.join(", ")
            );
        }
        println!("\n{}", ColoredOutput::success("✓ Aggregation complete!"));
    }
}
