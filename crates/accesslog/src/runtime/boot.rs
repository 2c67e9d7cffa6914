//! Boot: logging init, config load, input opening.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{ConfigError, IngestConfig};
use crate::runtime::cli::Cli;

pub const DEFAULT_LOG_FILTER: &str = "accesslog=info";

#[derive(Debug, Error)]
pub enum BootError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        source: io::Error,
    },
}

/// Initialise the tracing / logging subsystem.
///
/// `RUST_LOG` wins over `filter`. Logs go to stderr; stdout carries records.
pub fn init_logging(filter: Option<&str>) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.unwrap_or(DEFAULT_LOG_FILTER).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Load config (file, env), apply CLI flags, validate.
pub fn configure(cli: &Cli) -> Result<IngestConfig, ConfigError> {
    let mut config = IngestConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    info!(
        "Loaded configuration: path={}, output={}, on_no_match={}, max_line_bytes={}",
        config.path.as_deref().unwrap_or("-"),
        config.output.as_str(),
        config.on_no_match.as_str(),
        config.max_line_bytes
    );
    Ok(config)
}

/// Open the input named by `path`; `-` is standard input.
pub fn open_input(path: &str) -> Result<Box<dyn BufRead>, BootError> {
    if path == "-" {
        info!("Reading from standard input");
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|source| {
        error!("Failed to open {}: {}", path, source);
        BootError::Open {
            path: path.to_string(),
            source,
        }
    })?;
    info!("Reading from: {}", path);
    Ok(Box::new(BufReader::new(file)))
}
