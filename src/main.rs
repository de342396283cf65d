use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use county_daily::config::Config;
use county_daily::constants;
use county_daily::logging;
use county_daily::pipeline::Pipeline;
use county_daily::sources::SourceRegistry;

#[derive(Parser)]
#[command(name = "county_daily")]
#[command(about = "Build a covidtracking-style daily.csv from county testing exports")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the sources and write daily.csv (the default)
    Run {
        /// Specific sources to include (comma-separated).
        /// Available: san_francisco, santa_clara, texas
        #[arg(long)]
        sources: Option<String>,
        /// Config file with input and output paths
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file, overriding the configured path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the supported sources in output order
    Sources,
}

fn run(
    sources: Option<String>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load(config_path.as_deref()).context("loading configuration")?;
    if let Some(output) = output {
        config.output_path = output;
    }

    let registry = match sources {
        Some(list) => {
            let names: Vec<String> = list.split(',').map(|s| s.trim().to_string()).collect();
            SourceRegistry::with_sources(&names)?
        }
        None => SourceRegistry::new(),
    };
    info!("Running sources: {}", registry.list_sources().join(", "));

    let result = Pipeline::run(&config, &registry).context("building daily.csv")?;
    for summary in &result.sources {
        println!("{}: {} records", summary.source_name, summary.records);
    }
    println!("Wrote {} records to {}", result.total_records, result.output_file.display());
    Ok(())
}

fn main() -> Result<()> {
    let _guard = logging::init_logging();

    let cli = Cli::parse();

    let outcome = match cli.command.unwrap_or(Commands::Run {
        sources: None,
        config: None,
        output: None,
    }) {
        Commands::Run { sources, config, output } => run(sources, config, output),
        Commands::Sources => {
            for name in constants::get_supported_sources() {
                println!("{name}");
            }
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        error!("Run failed: {:#}", e);
    }
    outcome
}
