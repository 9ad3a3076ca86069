//! Identifier generation.

use anyhow::Result;
use clap::Args;
use superschema_id::Uuid4;

use crate::output::{format_json, OutputFormat};

/// Generate envelope identifiers.
#[derive(Debug, Args)]
pub struct NewIdCommand {
    /// How many identifiers to generate.
    #[arg(long, short = 'n', default_value = "1", value_parser = clap::value_parser!(u32).range(1..=10_000))]
    count: u32,
}

impl NewIdCommand {
    pub fn run(self, format: OutputFormat) -> Result<i32> {
        let ids: Vec<Uuid4> = (0..self.count).map(|_| Uuid4::new()).collect();
        match format {
            OutputFormat::Table => ids.iter().for_each(|id| println!("{id}")),
            OutputFormat::Json => println!("{}", format_json(&ids, "[]")),
        }
        Ok(0)
    }
}
