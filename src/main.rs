//! Legenda - Batch Subtitle Translation
//!
//! Entry point: parses arguments, sets up logging and configuration, then
//! hands off to the workflow.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use legenda::cli::{Args, Commands};
use legenda::config::Config;
use legenda::error::LegendaError;
use legenda::media::{ContainerTools, ContainerToolsFactory};
use legenda::progress::ConsoleWriter;
use legenda::report::{FileDeferredSink, FileOutcome};
use legenda::tracks::select_track;
use legenda::translate::{TranslationClient, TranslationService, TranslationServiceFactory};
use legenda::workflow::Workflow;

const DEFAULT_CONFIG_FILE: &str = "legenda.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Legenda - Batch Subtitle Translation");

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Batch { roots, no_progress } => {
            let workflow = build_workflow(&config)?;
            match workflow.tools().check_availability().await {
                Ok(version) => info!("Using {}", version),
                Err(e) => warn!("mkvtoolnix not available, extraction will fail: {}", e),
            }

            let roots = if roots.is_empty() { config.library.roots.clone() } else { roots };
            let workflow = workflow.with_progress(!no_progress);
            let summary = workflow.process_library(&roots).await;
            println!("{}", summary);
        }
        Commands::Process { input } => {
            if !input.exists() {
                return Err(LegendaError::FileNotFound(input.display().to_string()).into());
            }
            let workflow = build_workflow(&config)?;
            let outcome = workflow.process_file(&input).await;
            println!("{}: {}", input.display(), outcome.label());
            if let FileOutcome::Failed(reason) = outcome {
                return Err(anyhow::anyhow!(reason));
            }
        }
        Commands::Translate { input, output } => {
            info!("Translating subtitles: {}", input.display());
            let workflow = build_workflow(&config)?;
            let cues = workflow.translate_file(&input, &output).await?;
            println!("Translated {} cues into {}", cues, output.display());
        }
        Commands::Tracks { input } => {
            let workflow = build_workflow(&config)?;
            let tracks = workflow.tools().subtitle_tracks(&input).await;
            if tracks.is_empty() {
                println!("No subtitle tracks found.");
            } else {
                println!("{:<6} {:<24} {:<10} {:<30}", "ID", "Codec", "Language", "Name");
                println!("{}", "-".repeat(72));
                for track in &tracks {
                    println!("{:<6} {:<24} {:<10} {:<30}",
                        track.id,
                        track.codec,
                        track.language.as_deref().unwrap_or("und"),
                        track.name.as_deref().unwrap_or(""));
                }
            }
            let selection = select_track(&tracks, workflow.source_language(), workflow.target_language());
            println!("\nDecision: {:?}", selection);
        }
        Commands::Languages => {
            let service = TranslationServiceFactory::create_service(&config.translate)?;
            let languages = service.supported_languages().await?;
            println!("{:<10} {:<30} {}", "Code", "Name", "Targets");
            println!("{}", "-".repeat(60));
            for language in languages {
                println!("{:<10} {:<30} {}", language.code, language.name, language.targets.len());
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Default configuration written to {}", output.display());
        }
    }

    info!("Legenda finished");
    Ok(())
}

fn build_workflow(config: &Config) -> Result<Workflow> {
    info!("Translation endpoint: {} ({} -> {})",
          config.translate.endpoint, config.translate.source_language, config.translate.target_language);

    let tools = ContainerToolsFactory::create_tools(config.media.clone());
    let service = TranslationServiceFactory::create_service(&config.translate)?;
    let deferred = FileDeferredSink::new(&config.library.deferred_log);

    Ok(Workflow::new(
        config.clone(),
        tools,
        TranslationClient::new(service),
        Box::new(deferred),
    ))
}

/// `--config`, then `./legenda.toml`, then defaults; env overrides last
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => Config::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
            Config::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => Config::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".legenda").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "legenda.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(ConsoleWriter::default);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("legenda.log").display());

    Ok(())
}
