use std::process::ExitCode;

use clap::Parser;
use ledgerline::adapter::inbound::cli::{self, output, Cli};
use ledgerline::infrastructure::config::Config;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::failure(&e);
            return ExitCode::FAILURE;
        }
    };

    config.init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "ledgerline starting");

    tokio::select! {
        result = cli::execute(&cli.command, &config) => match result {
            Ok(value) => {
                output::success(&value);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Command failed");
                output::failure(&e);
                ExitCode::FAILURE
            }
        },
        _ = signal::ctrl_c() => {
            warn!("Interrupted");
            ExitCode::FAILURE
        }
    }
}
