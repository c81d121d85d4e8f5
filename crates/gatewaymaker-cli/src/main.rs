//! gatewaymaker CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gatewaymaker",
    version,
    about = "Randomized gateway exam generator"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a test and its answer key
    Generate {
        /// Config file path (default: gatewaymaker.toml, gatewaymaker.json,
        /// configuration/configuration.json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Random seed; reusing a seed reproduces the same test
        #[arg(long)]
        seed: Option<u64>,

        /// Number of tests to generate
        #[arg(long, default_value = "1")]
        count: usize,

        /// Output directory (overrides the config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: latex, plain (overrides the config)
        #[arg(long)]
        format: Option<String>,
    },

    /// Check the config and every fragment file
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the question pool of every set
    Pools {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example fragment files
    Init,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("gatewaymaker={level}").parse().unwrap())
                .add_directive(format!("gatewaymaker_core={level}").parse().unwrap()),
        )
        .init();

    let result = match cli.command {
        Commands::Generate {
            config,
            seed,
            count,
            output,
            format,
        } => commands::generate::execute(config, seed, count, output, format),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Pools { config } => commands::pools::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
