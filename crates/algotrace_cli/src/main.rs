//! AlgoTrace CLI
//!
//! Runs a bundled algorithm and prints its encoded state trace.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod algorithms;
mod config;
mod params;

use algotrace_log::Encoder;
use algotrace_replay::export;
use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use config::RunConfig;
use params::Params;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "algotrace")]
#[command(about = "AlgoTrace - record algorithm execution as replayable state traces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bundled algorithms
    List,
    /// Run an algorithm and print its trace
    Run {
        /// Algorithm name
        algorithm: String,
        /// JSON file with the parameter object
        #[arg(short, long)]
        params: Option<PathBuf>,
        /// Parameter assignment, e.g. --set n=10
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,
        /// JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Force every record's autoplay hint
        #[arg(long)]
        autoplay: Option<bool>,
        /// Pretty-print the document
        #[arg(long)]
        pretty: bool,
        /// Namespace for reference tokens
        #[arg(long)]
        namespace: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("algotrace=info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for algorithm in algorithms::ALGORITHMS {
                println!(
                    "{:<18} {} (params: {})",
                    algorithm.name,
                    algorithm.description,
                    algorithm.parameters.join(", ")
                );
            }
            Ok(())
        }
        Commands::Run {
            algorithm,
            params,
            assignments,
            config,
            autoplay,
            pretty,
            namespace,
        } => {
            let algorithm = algorithms::find(&algorithm)
                .ok_or_else(|| eyre!("unknown algorithm {:?}, see `algotrace list`", algorithm))?;
            let config = match config {
                Some(path) => RunConfig::load(&path)?,
                None => RunConfig::default(),
            }
            .with_overrides(autoplay, pretty, namespace);

            let mut inputs = match params {
                Some(path) => Params::load(&path)?,
                None => Params::default(),
            };
            inputs.apply_assignments(&assignments)?;
            if inputs.is_empty() {
                tracing::info!(algorithm = algorithm.name, "no parameters given, using example");
                inputs = algorithm.example();
            }

            let log = algorithm.run(&inputs)?;
            let document = export(&log, &Encoder::new(config.encoder), &config.processor)?;
            println!("{}", document);
            Ok(())
        }
    }
}
