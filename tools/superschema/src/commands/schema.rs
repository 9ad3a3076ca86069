//! Schema export.

use anyhow::Result;
use clap::Args;
use superschema_events::super_schema;

use crate::output::{format_json, OutputFormat};

/// Print the envelope JSON Schema.
#[derive(Debug, Args)]
pub struct SchemaCommand {
    /// Print on a single line.
    #[arg(long)]
    compact: bool,
}

impl SchemaCommand {
    pub fn run(self, _format: OutputFormat) -> Result<i32> {
        let schema = super_schema();
        if self.compact {
            println!("{schema}");
        } else {
            println!("{}", format_json(schema, "{}"));
        }
        Ok(0)
    }
}
