use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use syncbench::bench::run_benchmark;
use syncbench::config::{BenchmarkConfig, Cli};
use syncbench::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout carries only the result
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: BenchmarkConfig) -> Result<()> {
    let format = config.format;
    let result = run_benchmark(config)?;
    println!("{}", result.render(format)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap sends help/version to stdout and everything else, with usage, to stderr
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_tracing();
    let config = cli.into_config();
    debug!(?config, "starting");

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
