use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate missing subtitles for every container in the library
    Batch {
        /// Library root to scan (repeatable, replaces the configured roots)
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Run the pipeline on a single container file
    Process {
        /// Input container file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Translate one subtitle file
    Translate {
        /// Source subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Translated subtitle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List subtitle tracks of a container and the track that would be used
    Tracks {
        /// Input container file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List languages supported by the translation service
    Languages,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "legenda.toml")]
        output: PathBuf,
    },
}
