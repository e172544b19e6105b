//! JSON output for CLI commands
//!
//! One JSON object per line on stdout, UTF-8.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_lines(&mut io::stdout(), std::iter::once(response))
}

/// Write each item as one JSON line
pub fn write_lines<W, T, I>(out: &mut W, items: I) -> CliResult<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    for item in items {
        serde_json::to_writer(&mut *out, &item)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
