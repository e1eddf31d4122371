use std::io::{Write, stdout};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as one JSON document on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let formatted = to_json(value, pretty)?;
    let mut stdout = stdout().lock();
    writeln!(stdout, "{formatted}")?;
    Ok(())
}

/// Print shared catalog records as a JSON array.
pub fn print_records<T: Serialize>(records: &[Arc<T>], pretty: bool) -> Result<()> {
    let records: Vec<&T> = records.iter().map(|record| record.as_ref()).collect();
    print_json(&records, pretty)
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let formatted = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(formatted)
}
