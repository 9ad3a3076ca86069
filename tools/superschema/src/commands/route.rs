//! Routing preview.
//!
//! Builds a registry whose handlers only record their key, dispatches every
//! event through a real dispatcher, and reports the outcome.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use superschema_events::{
    get_event_dispatcher, DispatchOutcome, ErrorCallback, Event, EventHandler, EventHandlers,
};
use tabled::Tabled;

use crate::input::load_events;
use crate::output::{print_output, status_label, OutputFormat};

/// Show which handler each event would be routed to.
#[derive(Debug, Args)]
pub struct RouteCommand {
    /// Registry key to register a handler under (repeatable). Use `__default__`
    /// for the fallback handler.
    #[arg(long = "handler", short = 'H', required = true)]
    handlers: Vec<String>,

    /// Files or directories to read (`-` for JSON Lines on stdin).
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize, Tabled)]
struct RouteRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Type")]
    event_type: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Handler")]
    handler: String,
}

/// Registry where every handler records the key it was registered under.
fn recording_registry(keys: &[String], hits: &Arc<Mutex<Vec<String>>>) -> EventHandlers {
    keys.iter()
        .map(|key| {
            let hits = Arc::clone(hits);
            let name = key.clone();
            let handler: EventHandler = Arc::new(move |_: &ErrorCallback, _: &Event| {
                if let Ok(mut hits) = hits.lock() {
                    hits.push(name.clone());
                }
            });
            (key.clone(), handler)
        })
        .collect()
}

fn describe(outcome: DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Rejected(reason) => status_label(false, &format!("rejected ({reason})")),
        DispatchOutcome::Undecodable => status_label(false, "rejected (event could not be decoded)"),
        DispatchOutcome::Dropped => status_label(false, "dropped"),
        DispatchOutcome::Handled(route) => status_label(true, &format!("handled ({route})")),
    }
}

impl RouteCommand {
    pub fn run(self, format: OutputFormat) -> Result<i32> {
        if self.handlers.iter().any(|key| key.is_empty()) {
            bail!("handler keys cannot be empty");
        }

        let hits = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&self.handlers, &hits);
        // Schema mismatches are reported through the outcome, not the callback.
        let dispatcher = get_event_dispatcher(|_| {}, registry);

        let mut rows = Vec::new();
        for input in load_events(&self.paths)? {
            let value = match input.value {
                Ok(value) => value,
                Err(syntax) => {
                    rows.push(RouteRow {
                        source: input.source,
                        event_type: String::new(),
                        outcome: status_label(false, &format!("malformed JSON: {syntax}")),
                        handler: String::new(),
                    });
                    continue;
                }
            };

            let outcome = dispatcher.route(&value);
            let handler = match outcome {
                DispatchOutcome::Handled(_) => hits
                    .lock()
                    .ok()
                    .and_then(|mut hits| hits.pop())
                    .unwrap_or_default(),
                _ => String::new(),
            };

            rows.push(RouteRow {
                source: input.source,
                event_type: value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
                outcome: match format {
                    OutputFormat::Table => describe(outcome),
                    OutputFormat::Json => plain(outcome),
                },
                handler,
            });
        }

        print_output(&rows, format);
        Ok(0)
    }
}

/// Machine-readable outcome: `rejected:<field>`, `dropped` or `handled:<route>`.
/// Rejections that are not tied to one field use `event` as the field.
fn plain(outcome: DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Rejected(reason) => {
            format!("rejected:{}", reason.field().unwrap_or("event"))
        }
        DispatchOutcome::Undecodable => "rejected:event".to_string(),
        DispatchOutcome::Dropped => "dropped".to_string(),
        DispatchOutcome::Handled(route) => format!("handled:{route}"),
    }
}
