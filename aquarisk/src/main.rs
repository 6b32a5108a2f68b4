// aquarisk/src/main.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "aquarisk")]
#[command(about = "Transparent, rule-based water-quality risk classification", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 🚰 Runs the pipeline (CSV -> Validation -> Scoring -> Classification)
    Run {
        /// Input CSV file with one row per sample
        #[arg(long, short)]
        input: PathBuf,

        /// Project directory (aquarisk.yaml + config/ fragments)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Artifact directory (defaults to the configured target_path)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// 🔍 Scores a CSV and prints the highest-risk samples, writes nothing
    Inspect {
        /// Input CSV file
        #[arg(long, short)]
        input: PathBuf,

        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Number of samples to display
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// 📝 Scaffolds aquarisk.yaml and config/column_map.yml
    Init {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Overwrite existing files
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug aquarisk run ... for the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            project_dir,
            out_dir,
        } => {
            if let Err(e) = commands::run::execute(input, project_dir, out_dir).await {
                eprintln!("\n💥 CRITICAL PIPELINE ERROR: {e:#}");
                std::process::exit(1);
            }
        }

        Commands::Inspect {
            input,
            project_dir,
            limit,
        } => {
            if let Err(e) = commands::inspect::execute(input, project_dir, limit).await {
                eprintln!("❌ Inspect failed: {e:#}");
                std::process::exit(1);
            }
        }

        Commands::Init { project_dir, force } => {
            if let Err(e) = commands::init::execute(project_dir, force) {
                eprintln!("❌ Init failed: {e:#}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
