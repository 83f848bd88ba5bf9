//! Synheart Byte Trainer CLI
//!
//! Fail-closed ingestion and baseline training for byte-size health signals.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use synheart_byte_trainer::{
    commands::{self, CommandOutput},
    config::Config,
    core::TrainParams,
    schema, VERSION,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synheart-train")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Fail-closed ingestion and training for byte-size health events", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an NDJSON event file and write it to the events store
    Ingest {
        /// Input NDJSON path
        #[arg(long = "in")]
        in_path: PathBuf,

        /// Output NDJSON path
        #[arg(long = "out")]
        out_path: Option<PathBuf>,
    },

    /// Train a baseline model from ingested events
    Train {
        /// NDJSON events path
        #[arg(long)]
        events: Option<PathBuf>,

        /// Output directory for model artifacts
        #[arg(long)]
        models: Option<PathBuf>,

        /// Receipt path (overwritten on every run)
        #[arg(long)]
        receipt: Option<PathBuf>,

        /// Gradient descent steps
        #[arg(long)]
        steps: Option<usize>,

        /// Gradient descent learning rate
        #[arg(long)]
        learning_rate: Option<f64>,
    },

    /// Display the accepted event schema
    Schema,

    /// Show configuration
    Config {
        /// Write the effective configuration to this path
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Ingest { in_path, out_path } => {
            let out_path = out_path.unwrap_or_else(|| config.events_path.clone());
            finish(commands::ingest(&in_path, &out_path));
        }
        Commands::Train {
            events,
            models,
            receipt,
            steps,
            learning_rate,
        } => {
            let params = TrainParams {
                steps: steps.unwrap_or(config.training.steps),
                learning_rate: learning_rate.unwrap_or(config.training.learning_rate),
            };
            if let Err(e) = params.validate() {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            let events = events.unwrap_or_else(|| config.events_path.clone());
            let models = models.unwrap_or_else(|| config.models_dir.clone());
            let receipt = receipt.unwrap_or_else(|| config.receipt_path.clone());
            finish(commands::train(&events, &models, &receipt, &params));
        }
        Commands::Schema => {
            print_json(&schema::describe());
        }
        Commands::Config { write } => {
            cmd_config(&config, write);
        }
    }
}

/// Log to stderr so stdout carries only the JSON reports.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing output: {e}"),
    }
}

fn finish(output: CommandOutput) -> ! {
    print_json(&output.body);
    std::process::exit(output.exit_code);
}

fn cmd_config(config: &Config, write: Option<PathBuf>) {
    if let Some(path) = write {
        if let Err(e) = config.save(&path) {
            eprintln!("Error saving config: {e}");
            std::process::exit(1);
        }
        eprintln!("Configuration written to {}", path.display());
    }

    match serde_json::to_value(config) {
        Ok(value) => print_json(&value),
        Err(e) => {
            eprintln!("Error serializing config: {e}");
            std::process::exit(1);
        }
    }
}
