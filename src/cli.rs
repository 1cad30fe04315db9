use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pitwall")]
#[command(author, version, about = "Formula 1 race weekend metadata generator")]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (ignored when RUST_LOG is set)
    #[arg(short, long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate missing metadata for every season folder under a base folder
    Run {
        /// Folder holding one sub-folder per season
        #[arg(required = true)]
        base: PathBuf,

        /// Path of the base folder as seen by the media server (e.g. inside a container)
        #[arg(short, long)]
        mapped_folder: Option<String>,

        /// Store posters as JPEG instead of WebP
        #[arg(short = 'c', long)]
        convert_to_jpg: bool,

        /// Show what would be written without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how file names classify and sort
    Classify {
        /// File names to classify
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Create a synthetic season tree for manual runs
    Fixtures {
        /// Folder to create the seasons in
        #[arg(required = true)]
        dir: PathBuf,

        /// Remove generated metadata and posters instead
        #[arg(long)]
        clean: bool,
    },

    /// Display version information
    Version,
}
