use std::process::ExitCode;

use accesslog::runtime::{boot, cli::Cli, ingest};
use clap::Parser;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    boot::init_logging(cli.log_filter.as_deref());

    let config = match boot::configure(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match ingest::ingest(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
