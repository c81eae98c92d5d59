use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber;

use clip_compiler::{
    compilation::CompilationOutcome,
    config::Config,
    video::inventory::list_collections,
    CompilationEngine,
};

#[derive(Parser)]
#[command(
    name = "clip-compiler",
    version,
    about = "Compile rendered clips into a single video",
    long_about = "Clip-compiler gathers the most recent clips from a results sub-folder, brackets them with an optional intro and outro, joins them with fade transitions, and renders a single compilation video."
)]
struct Cli {
    /// Collection (sub-folder of the results root) to compile from
    #[arg(short = 'l', long)]
    collection: Option<String>,

    /// Optional intro clip played before the main clips
    #[arg(short, long)]
    intro: Option<PathBuf>,

    /// Optional outro clip played after the main clips
    #[arg(short, long)]
    outro: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting clip-compiler v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    config.validate()?;

    // Resolve the collection: CLI flag first, then configuration. Without
    // either, list what is available and leave the choice to the caller.
    let collection = match cli.collection.or_else(|| config.source.collection.clone()) {
        Some(collection) => collection,
        None => {
            let collections = list_collections(&config.source.results_root)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            if collections.is_empty() {
                info!(
                    "No collections found under {:?}. Render some clips first.",
                    config.source.results_root
                );
            } else {
                info!("Available collections under {:?}:", config.source.results_root);
                for collection in &collections {
                    info!("  - {}", collection);
                }
                info!("Re-run with --collection <name> to compile one of them.");
            }
            return Ok(());
        }
    };

    let engine = CompilationEngine::new(config);

    match engine.compile(&collection, cli.intro, cli.outro).await {
        Ok(CompilationOutcome::Completed(rendered)) => {
            info!(
                "Done: {} clip(s), {:.1}s, written to {:?}",
                rendered.clip_count, rendered.duration, rendered.path
            );
            Ok(())
        }
        Ok(CompilationOutcome::Disabled) => {
            info!("Compilation feature is disabled in config");
            Ok(())
        }
        Ok(CompilationOutcome::NothingToCompile) => {
            info!("No clips to compile for '{}'", collection);
            Ok(())
        }
        Err(e) => {
            error!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
