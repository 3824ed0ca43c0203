//! `file://` arguments.
//!
//! Expands a glob against the local filesystem and turns every accepted match
//! into either a path reference or its content:
//! - matches whose extension is not accepted are skipped
//! - a matched directory is an error (use a more specific glob)
//! - devices, pipes and sockets are skipped
//! - reads are bounded by `ResolverConfig::max_file_size`

use std::io::Read;
use std::path::Path;

use glob::MatchOptions;
use serde_json::Value;
use tracing::debug;

use super::{ResolvePolicy, escape_unclosed_brackets, required_extensions};
use crate::config::ResolverConfig;
use crate::error::{ContentOrigin, LocationError};
use crate::location::RawItem;
use crate::policy::{ExtensionRule, extension_of};
use crate::scheme::Scheme;

/// Resolve a local path or glob pattern.
///
/// Matches are visited in the (sorted) order the glob enumerates them.
/// No matches is an empty result, not an error.
///
/// # Errors
///
/// - [`LocationError::Configuration`] if no extension set is given
/// - [`LocationError::InvalidPattern`] if the glob cannot be parsed
/// - [`LocationError::InvalidPath`] if an accepted match is a directory
/// - [`LocationError::UnsupportedExtension`] if an accepted extension has no rule
/// - [`LocationError::MalformedContent`] if JSON/NDJSON content fails to decode
/// - [`LocationError::Io`], [`LocationError::FileTooLarge`] or
///   [`LocationError::InvalidEncoding`] if a file cannot be read
pub fn resolve_files(
    pattern: &str,
    policy: ResolvePolicy<'_>,
    config: &ResolverConfig,
) -> Result<Vec<RawItem>, LocationError> {
    let accepted = required_extensions(Scheme::File, policy)?;

    let mut options = MatchOptions::new();
    options.require_literal_leading_dot = true;
    let matches = glob::glob_with(&escape_unclosed_brackets(pattern), options).map_err(|e| {
        LocationError::InvalidPattern {
            pattern: pattern.to_owned(),
            message: e.to_string(),
        }
    })?;

    let mut items = Vec::new();
    for entry in matches {
        let path = entry.map_err(|e| LocationError::Io {
            file: e.path().to_path_buf(),
            source: e.into(),
        })?;

        let name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let Some(extension) = extension_of(&name).filter(|ext| accepted.contains(*ext)) else {
            debug!(path = %path.display(), "skipping match without an accepted extension");
            continue;
        };

        if path.is_dir() {
            return Err(LocationError::InvalidPath { path });
        }
        if !path.is_file() {
            debug!(path = %path.display(), "skipping non-regular file");
            continue;
        }

        let rule = config.extension_policy.rule_for(extension).ok_or_else(|| {
            LocationError::UnsupportedExtension {
                file: path.clone(),
                extension: extension.to_owned(),
            }
        })?;

        let display = path.to_string_lossy().into_owned();
        if !policy.load_contents {
            items.push(RawItem::Path(display));
            continue;
        }

        let content = read_file_bounded(&path, config.max_file_size)?;
        match rule {
            ExtensionRule::Json => {
                items.push(RawItem::Content(reencode(&content, ContentOrigin::document(display))?));
            }
            ExtensionRule::Ndjson => {
                for (idx, line) in content.lines().enumerate() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let origin = ContentOrigin::line(display.as_str(), idx + 1);
                    items.push(RawItem::Content(reencode(line, origin)?));
                }
            }
            ExtensionRule::Opaque => items.push(RawItem::Content(content)),
        }
    }

    debug!(pattern, items = items.len(), "resolved file pattern");
    Ok(items)
}

/// Decode `text` as one JSON document and encode it back in minimal form.
fn reencode(text: &str, origin: ContentOrigin) -> Result<String, LocationError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| LocationError::malformed(origin.clone(), e))?;
    serde_json::to_string(&value).map_err(|e| LocationError::malformed(origin, e))
}

/// Read a file using a bounded streaming read, enforcing `max_file_size`.
///
/// Uses `Read::take` so the size check and the read are the same operation.
fn read_file_bounded(path: &Path, max_file_size: u64) -> Result<String, LocationError> {
    let io_error = |source| LocationError::Io {
        file: path.to_owned(),
        source,
    };

    let file = std::fs::File::open(path).map_err(io_error)?;

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(io_error)?;

    if buffer.len() as u64 > max_file_size {
        return Err(LocationError::FileTooLarge {
            file: path.to_owned(),
            limit: max_file_size,
        });
    }

    String::from_utf8(buffer).map_err(|_| LocationError::InvalidEncoding {
        source_name: path.display().to_string(),
    })
}
