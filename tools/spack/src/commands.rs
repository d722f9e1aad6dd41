//! Subcommand handlers
//!
//! Each handler returns the text to print on stdout.

use anyhow::{Context, Result};
use serde_json::json;
use structpack::Value;
use tracing::debug;

use crate::config::{OutputFormat, SpackConfig};
use crate::{hex, values};

pub fn calcsize(config: &SpackConfig, output: OutputFormat, format: &str) -> Result<String> {
    let format = config.effective_format(format);
    let size = structpack::calcsize(&format)
        .with_context(|| format!("Cannot size format {:?}", format))?;

    match output {
        OutputFormat::Text => Ok(size.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "format": format,
            "size": size,
        }))?),
    }
}

pub fn pack(
    config: &SpackConfig,
    output: OutputFormat,
    format: &str,
    args: &[String],
) -> Result<String> {
    let format = config.effective_format(format);
    let values = values::parse_values(&format, args)
        .with_context(|| format!("Cannot read values for {:?}", format))?;
    let bytes = structpack::pack_to_vec(&format, &values)
        .with_context(|| format!("Cannot pack {:?}", format))?;
    debug!("Packed {} values into {} bytes", values.len(), bytes.len());

    let hex = hex::encode(&bytes, config.uppercase_hex);
    match output {
        OutputFormat::Text => Ok(hex),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "format": format,
            "size": bytes.len(),
            "hex": hex,
        }))?),
    }
}

pub fn unpack(
    config: &SpackConfig,
    output: OutputFormat,
    format: &str,
    hex_input: &str,
    offset: usize,
) -> Result<String> {
    let format = config.effective_format(format);
    let bytes = hex::decode(hex_input).context("Invalid hex input")?;
    let values = structpack::unpack_values_from(offset, &bytes, &format)
        .with_context(|| format!("Cannot unpack {:?} at offset {}", format, offset))?;
    debug!(
        "Unpacked {} values from {} bytes at offset {}",
        values.len(),
        bytes.len(),
        offset
    );

    match output {
        OutputFormat::Text => Ok(render_text(&values)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "format": format,
            "offset": offset,
            "values": values,
        }))?),
    }
}

/// One `kind value` line per field
fn render_text(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| format!("{}\t{}", value.kind(), value))
        .collect::<Vec<_>>()
        .join("\n")
}
