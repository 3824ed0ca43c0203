//! Shared output formatting for resolved locations.
//!
//! Provides JSON and plain-text formatters. Color/terminal formatting is left
//! to the caller.

use std::io::Write;

use serde::Serialize;

use crate::location::Location;

/// Longest inline excerpt shown by [`write_human`].
const EXCERPT_CHARS: usize = 72;

/// Write any serializable value (locations, requests) as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize + ?Sized>(value: &T, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Write resolved locations as human-readable plain text.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(
    argument: &str,
    locations: &[Location],
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  {argument}")?;
    writeln!(writer, "{}", "=".repeat(80))?;

    let width = locations.len().to_string().len();
    for (idx, location) in locations.iter().enumerate() {
        writeln!(
            writer,
            "  [{:>width$}] {:<12} {}",
            idx + 1,
            location.field_name(),
            excerpt(location.as_str())
        )?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    if locations.is_empty() {
        writeln!(writer, "\u{2717} no locations matched")?;
    } else {
        writeln!(writer, "\u{2713} {} location(s) resolved", locations.len())?;
    }
    Ok(())
}

/// First line of `text`, cut to [`EXCERPT_CHARS`] characters. The ellipsis
/// marks dropped characters or further lines; a trailing newline is neither.
fn excerpt(text: &str) -> String {
    let mut lines = text.lines();
    let first_line = lines.next().unwrap_or_default();
    let mut out: String = first_line.chars().take(EXCERPT_CHARS).collect();
    if first_line.chars().count() > EXCERPT_CHARS || lines.next().is_some() {
        out.push_str("...");
    }
    out
}
