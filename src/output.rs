//! Rendering of load reports and query results.
//!
//! Results go to stdout as JSON; the debug pretty-print goes to the log.

use std::fmt::Debug;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

/// Store status, as reported by the `health` command.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub store_path: String,
    pub store_exists: bool,
    pub records: usize,
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Pretty-printed JSON for `value`.
pub fn render_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes `value` as pretty JSON followed by a newline.
pub fn write_json(mut out: impl Write, value: &impl Serialize) -> Result<()> {
    writeln!(out, "{}", render_json(value)?)?;
    Ok(())
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    write_json(std::io::stdout().lock(), value)
}
