//! CLI definitions for warmup
//!
//! All argument parsing structures using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_MANIFEST;

#[derive(Parser)]
#[command(
    name = "warmup",
    version,
    about = "Keep serverless functions warm",
    long_about = "Resolves warmer configuration from a service manifest, packages one\n\
                  scheduled warmer per group and runs invocation passes against its targets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Service manifest
    #[arg(long, short = 'c', default_value = DEFAULT_MANIFEST)]
    pub config: PathBuf,

    /// Deployment stage (falls back to the manifest, then `dev`)
    #[arg(long, short = 's', env = "WARMUP_STAGE")]
    pub stage: Option<String>,

    /// Deployment region (falls back to the manifest, then `us-east-1`)
    #[arg(long, short = 'r', env = "WARMUP_REGION")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print resolved warmers and their enabled targets
    Resolve {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Only this warmer
        #[arg(long, short = 'w')]
        warmer: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Write warmer artifacts and print function declarations
    Package {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Output format for declarations
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Remove warmer folders flagged with cleanFolder
    Clean {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Remove every warmer folder regardless of cleanFolder
        #[arg(long)]
        all: bool,
    },

    /// Run one invocation pass from packaged artifacts
    Invoke {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Warmers to invoke (can be specified multiple times)
        #[arg(long = "warmer", short = 'w')]
        warmers: Vec<String>,

        /// Invoke every warmer flagged with prewarm
        #[arg(long, conflicts_with = "warmers")]
        prewarm: bool,

        /// Lambda API endpoint (defaults to the regional endpoint)
        #[arg(long, env = "WARMUP_ENDPOINT")]
        endpoint: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Exit non-zero when any invocation fails
        #[arg(long)]
        fail_on_error: bool,
    },
}
