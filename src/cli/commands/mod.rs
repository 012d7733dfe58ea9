//! CLI command implementations.

pub mod request;
pub mod ticks;
pub mod validate;

use anyhow::{Context, Result};
use risk_core::{ErrorResponse, RiskResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Read a JSON document from a file, or stdin for `-`.
pub fn read_json<T: DeserializeOwned>(input: &Path) -> Result<T> {
    let contents = if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read request file '{}'", input.display()))?
    };

    serde_json::from_str(&contents).context("Request is not valid JSON for this command")
}

/// Print a result as JSON; errors are printed as `{"error": ...}` and fail the command.
pub fn print_result<T: Serialize>(result: RiskResult<T>, pretty: bool) -> Result<()> {
    match result {
        Ok(value) => print_json(&value, pretty),
        Err(err) => {
            print_json(&ErrorResponse::from(&err), pretty)?;
            Err(err.into())
        }
    }
}

/// Stdout carries only this output; logging writes to stderr.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
