//! CLI commands.

mod check;
mod new_id;
mod route;
mod schema;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Tooling for the shared event envelope.
#[derive(Debug, Parser)]
#[command(name = "superschema")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table", env = "SUPERSCHEMA_FORMAT")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the envelope JSON Schema.
    Schema(schema::SchemaCommand),

    /// Validate event files.
    Check(check::CheckCommand),

    /// Show how a handler registry would route events.
    Route(route::RouteCommand),

    /// Generate envelope identifiers (UUIDv4).
    NewId(new_id::NewIdCommand),
}

impl Cli {
    /// Run the command and return the process exit code.
    pub fn run(self) -> Result<i32> {
        match self.command {
            Commands::Schema(cmd) => cmd.run(self.format),
            Commands::Check(cmd) => cmd.run(self.format),
            Commands::Route(cmd) => cmd.run(self.format),
            Commands::NewId(cmd) => cmd.run(self.format),
        }
    }
}
