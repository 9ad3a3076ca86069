//! Loading events from files and directories.
//!
//! - `.json` files hold one event or an array of events
//! - `.jsonl` / `.ndjson` files hold one event per line (blank lines skipped)
//! - directories are scanned one level deep for those extensions
//! - `-` reads JSON Lines from stdin

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

const JSON_EXTENSIONS: [&str; 1] = ["json"];
const LINES_EXTENSIONS: [&str; 2] = ["jsonl", "ndjson"];

/// One inbound value and where it came from.
#[derive(Debug, Clone)]
pub struct InputEvent {
    /// `path`, `path[index]` or `path:line`.
    pub source: String,

    /// The parsed value, or the JSON syntax error.
    pub value: Result<Value, String>,
}

/// Loads every event found under `paths`, in argument order.
pub fn load_events(paths: &[PathBuf]) -> Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .context("failed to read stdin")?;
            events.extend(parse_lines("<stdin>", &contents));
            continue;
        }

        if path.is_dir() {
            for file in discover(path) {
                events.extend(load_file(&file)?);
            }
        } else {
            events.extend(load_file(path)?);
        }
    }
    Ok(events)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn is_lines_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| LINES_EXTENSIONS.contains(&ext))
}

fn discover(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            extension(path)
                .is_some_and(|ext| JSON_EXTENSIONS.contains(&ext) || LINES_EXTENSIONS.contains(&ext))
        })
        .collect();

    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "discovered event files");
    files
}

fn load_file(path: &Path) -> Result<Vec<InputEvent>> {
    if !path.exists() {
        return Err(anyhow!("no such file: {}", path.display()));
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.display().to_string();

    if is_lines_file(path) {
        Ok(parse_lines(&name, &contents))
    } else {
        Ok(parse_document(&name, &contents))
    }
}

fn parse_document(name: &str, contents: &str) -> Vec<InputEvent> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, value)| InputEvent {
                source: format!("{name}[{i}]"),
                value: Ok(value),
            })
            .collect(),
        Ok(value) => vec![InputEvent {
            source: name.to_string(),
            value: Ok(value),
        }],
        Err(e) => vec![InputEvent {
            source: name.to_string(),
            value: Err(e.to_string()),
        }],
    }
}

fn parse_lines(name: &str, contents: &str) -> Vec<InputEvent> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| InputEvent {
            source: format!("{name}:{}", i + 1),
            value: serde_json::from_str(line).map_err(|e| e.to_string()),
        })
        .collect()
}
