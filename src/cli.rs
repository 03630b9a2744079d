use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cnvrt")]
#[command(author, version, about = "Batch image and video format converter")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one or more files as a single batch
    Convert {
        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target format, e.g. jpg or webm
        #[arg(short, long)]
        to: String,

        /// Output directory (defaults to the configured destination, then Downloads)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Flatten alpha channels instead of keeping them
        #[arg(long)]
        no_transparency: bool,
    },

    /// List the formats a source format can be converted to
    Formats {
        /// Source format, e.g. png
        format: String,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
