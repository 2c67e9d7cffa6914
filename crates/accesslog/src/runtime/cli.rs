//! CLI: command-line flags. Every flag overrides the matching config key.

use clap::Parser;

use crate::conf::IngestConfig;
use crate::stream::{NoMatchPolicy, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "accesslog", version, about = "Stream an access log as structured records")]
pub struct Cli {
    /// Access log file to read, or `-` for standard input
    #[arg(short, long)]
    pub path: Option<String>,

    /// Record rendering: json or text
    #[arg(short, long)]
    pub output: Option<OutputFormat>,

    /// What to do with lines that do not match: skip or abort
    #[arg(long)]
    pub on_no_match: Option<NoMatchPolicy>,

    /// Longest accepted line in bytes
    #[arg(long)]
    pub max_line_bytes: Option<usize>,

    /// TOML config file (default: $ACCESSLOG_CONFIG_FILE or ./accesslog.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// tracing filter used when RUST_LOG is not set
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Cli {
    /// Apply flags on top of a loaded config.
    pub fn apply(&self, config: &mut IngestConfig) {
        if let Some(path) = &self.path {
            config.path = Some(path.clone());
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(policy) = self.on_no_match {
            config.on_no_match = policy;
        }
        if let Some(max) = self.max_line_bytes {
            config.max_line_bytes = max;
        }
    }
}
