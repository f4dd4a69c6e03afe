use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scenestage_core::AppConfig;

mod commands;
mod playback;

#[derive(Parser)]
#[command(name = "scenestage")]
#[command(author, version, about = "Inspect and simulate cinematic scroll staging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every scene's metrics at one progress value
    Stage {
        /// Number of scenes in the presentation
        #[arg(short = 'n', long, default_value_t = 3)]
        scenes: usize,
        /// Global scroll progress (nominally 0.0-1.0)
        #[arg(short, long, allow_negative_numbers = true)]
        progress: f64,
        /// Use the quantized, cached calculator
        #[arg(short, long)]
        quantum: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show where each scene changes stage over a full sweep
    Timeline {
        #[arg(short = 'n', long, default_value_t = 3)]
        scenes: usize,
        /// Number of sweep steps between 0 and 1
        #[arg(short, long, default_value_t = 1000)]
        steps: u32,
        #[arg(short, long)]
        quantum: bool,
    },
    /// Animate a scroll and stage every frame
    Simulate {
        #[arg(short = 'n', long, default_value_t = 3)]
        scenes: usize,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        from: f64,
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        to: f64,
        /// Override the configured animation duration
        #[arg(short, long)]
        duration_ms: Option<u64>,
        /// Skip pre-calculating frames before playback
        #[arg(long)]
        no_warm: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Stage {
            scenes,
            progress,
            quantum,
            json,
        } => commands::stage::run(&config, scenes, progress, quantum, json),
        Commands::Timeline {
            scenes,
            steps,
            quantum,
        } => commands::timeline::run(&config, scenes, steps, quantum),
        Commands::Simulate {
            scenes,
            from,
            to,
            duration_ms,
            no_warm,
            json,
        } => {
            if let Some(duration_ms) = duration_ms {
                config.playback.duration_ms = duration_ms;
            }
            commands::simulate::run(&config, scenes, from, to, !no_warm, json).await
        }
        Commands::Config { init, force } => commands::config::run(&config, init, force),
    }
}
