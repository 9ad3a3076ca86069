//! superschema - tooling for the shared event envelope
//!
//! Exports the envelope schema, validates event files, previews how a
//! handler registry would route them, and mints envelope identifiers.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod input;
mod output;

use commands::Cli;
use config::{Config, LogFormat};

fn main() {
    std::process::exit(exit_code(run()));
}

fn run() -> Result<i32> {
    let config = Config::from_env()?;
    init_tracing(&config);

    Cli::parse().run()
}

/// Commands pick their own exit code; any error, configuration included,
/// is printed and exits with 2.
fn exit_code(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&e);
            2
        }
    }
}

/// Logs go to stderr so they never mix with command output.
fn init_tracing(config: &Config) {
    // Prefer RUST_LOG, fall back to SUPERSCHEMA_LOG_LEVEL
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_exit_code_passes_command_code_through() {
        assert_eq!(exit_code(Ok(0)), 0);
        assert_eq!(exit_code(Ok(1)), 1);
    }

    #[test]
    fn test_config_error_exits_with_usage_code() {
        let err = Config::from_lookup(|key| {
            (key == "SUPERSCHEMA_LOG_FORMAT").then(|| "yaml".to_string())
        })
        .unwrap_err();
        assert_eq!(exit_code(Err(err)), 2);
        assert_eq!(exit_code(Err(anyhow!("no such file"))), 2);
    }
}
