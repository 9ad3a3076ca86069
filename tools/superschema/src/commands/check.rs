//! Event file validation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use superschema_events::validate_event;
use tabled::Tabled;
use tracing::info;

use crate::input::{load_events, InputEvent};
use crate::output::{print_output, status_label, OutputFormat};

/// Validate event files against the envelope rules.
///
/// Exits with status 1 if any event is invalid.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Files or directories to read (`-` for JSON Lines on stdin).
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Only list invalid events.
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct CheckRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(skip)]
    valid: bool,
    #[serde(skip)]
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn status(valid: bool) -> String {
    if valid {
        status_label(true, "valid")
    } else {
        status_label(false, "invalid")
    }
}

fn check(event: InputEvent) -> CheckRow {
    let (valid, field, reason) = match &event.value {
        Err(syntax) => (false, String::new(), format!("malformed JSON: {syntax}")),
        Ok(value) => match validate_event(value) {
            Ok(()) => (true, String::new(), String::new()),
            Err(e) => (
                false,
                e.field().unwrap_or_default().to_string(),
                e.to_string(),
            ),
        },
    };

    CheckRow {
        source: event.source,
        valid,
        status: status(valid),
        field,
        reason,
    }
}

impl CheckCommand {
    pub fn run(self, format: OutputFormat) -> Result<i32> {
        let rows: Vec<CheckRow> = load_events(&self.paths)?.into_iter().map(check).collect();

        let total = rows.len();
        let invalid = rows.iter().filter(|r| !r.valid).count();
        info!(total, invalid, "checked events");

        let shown: Vec<CheckRow> = if self.quiet {
            rows.into_iter().filter(|r| !r.valid).collect()
        } else {
            rows
        };
        print_output(&shown, format);

        Ok(if invalid > 0 { 1 } else { 0 })
    }
}
