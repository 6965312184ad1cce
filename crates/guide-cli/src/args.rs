//! Argument definitions for `sb3-guide`

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turn Scratch 3 projects into step-by-step tutorials
#[derive(Debug, Parser)]
#[command(name = "sb3-guide")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show targets, rendered scripts, and the asset catalog
    Inspect {
        /// Project archive (.sb3)
        file: PathBuf,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,

        /// Config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a tutorial with the configured model
    Tutorial {
        /// Project archive (.sb3)
        file: PathBuf,

        /// Config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Synthesis timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Write the tutorial JSON here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also send the formatted tutorial to the document exporter
        #[arg(long)]
        export: bool,
    },

    /// Extract one asset by its content key
    Extract {
        /// Project archive (.sb3)
        file: PathBuf,

        /// Asset key, e.g. `83a9787d4cb6f3b7632b4ddfebf74367.wav`
        md5ext: String,

        /// Destination file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Package every resolvable asset into one zip
    ExtractAll {
        /// Project archive (.sb3)
        file: PathBuf,

        /// Destination zip
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Check a saved raw model response against the tutorial schema
    Validate {
        /// Response file (JSON)
        response: PathBuf,
    },
}
