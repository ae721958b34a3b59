//! Oolong CLI

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod run;

#[derive(Parser)]
#[command(name = "oolong")]
#[command(about = "Oolong - CMS trigger-study processors")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

/// Which processor to run.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProcessorKind {
    /// METnoMu turn-on study over offline NanoAOD
    Hlt,
    /// Jet-trigger efficiencies over JME trigger ntuples
    Jmenano,
    /// Trigger efficiencies over custom NANO event-level branches
    CustomNano,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a processor over event-batch files and write the accumulator
    Run {
        /// Processor to run
        #[arg(long, value_enum)]
        processor: ProcessorKind,

        /// Layered YAML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Input batch files (EventBatch JSON)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output accumulator archive (JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Threads (0 = auto). Use 1 for a deterministic batch order.
        #[arg(long, default_value = "1")]
        threads: usize,
    },

    /// Merge accumulator archives into one
    Merge {
        /// Input accumulator archives (JSON)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output archive (JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Run { processor, config, inputs, output, threads } => {
            run::run(processor, &config, &inputs, output.as_deref(), threads)
        }
        Commands::Merge { inputs, output } => run::merge(&inputs, output.as_deref()),
    }
}
