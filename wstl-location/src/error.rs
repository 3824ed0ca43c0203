//! Error types for location resolution.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::scheme::Scheme;

/// Where a piece of malformed content came from.
///
/// `line` is 1-indexed and only set for newline-delimited sources; whole-document
/// sources (a `.json` file, a bucket object, a variable) leave it `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentOrigin {
    /// File path, bucket URI or variable name the content was read from.
    pub source: String,
    /// Line number within `source`, for NDJSON records.
    pub line: Option<usize>,
}

impl ContentOrigin {
    /// Origin covering a whole document.
    #[must_use]
    pub fn document(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            line: None,
        }
    }

    /// Origin pointing at one line of a newline-delimited document.
    #[must_use]
    pub fn line(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for ContentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.source),
            None => write!(f, "{}", self.source),
        }
    }
}

/// Errors raised while resolving a location argument.
///
/// Empty results (no glob matches, an empty listing, every entry filtered out)
/// are not errors; they surface as an empty `Vec<Location>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LocationError {
    /// The argument does not start with a recognized scheme prefix.
    #[error("missing {supported} supported prefix in argument '{argument}'")]
    UnknownScheme {
        /// The raw argument (or scheme name) that was rejected.
        argument: String,
        /// Comma-separated list of the accepted prefixes.
        supported: String,
    },

    /// A file or bucket argument was resolved without an accepted-extension set.
    #[error("empty required extensions for {} argument", .scheme.prefix())]
    Configuration {
        /// Scheme that requires the extension set.
        scheme: Scheme,
    },

    /// A glob match is a directory rather than a file.
    #[error("use a glob expression to specify files in directory {}", .path.display())]
    InvalidPath {
        /// The directory that was matched.
        path: PathBuf,
    },

    /// The glob expression itself could not be parsed.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A bucket argument has no extractable bucket name.
    #[error("invalid bucket name in path '{path}'")]
    InvalidBucketPath {
        /// The normalized bucket path.
        path: String,
    },

    /// A matched file has an accepted extension with no handling rule.
    #[error("no handling rule for extension '{extension}' of file {}", .file.display())]
    UnsupportedExtension {
        /// The matched file.
        file: PathBuf,
        /// Its extension, including the leading dot.
        extension: String,
    },

    /// JSON or NDJSON content failed to decode.
    #[error("malformed JSON content in {origin}: {source}")]
    MalformedContent {
        /// File (and line) holding the bad content.
        origin: ContentOrigin,
        /// Decoder diagnostic.
        source: serde_json::Error,
    },

    /// A `py://` argument names a variable that is not defined.
    #[error("there is no variable named {name}")]
    UndefinedVariable {
        /// The variable name.
        name: String,
    },

    /// A variable holds a value that cannot be encoded as JSON input.
    #[error("variable {name} of type {type_name} is not JSON serializable")]
    UnsupportedVariableType {
        /// The variable name.
        name: String,
        /// Type of the rejected value.
        type_name: String,
    },

    /// No storage client could be constructed.
    #[error("unable to create storage client: {reason}")]
    BackendUnavailable {
        /// Why the backend could not be reached.
        reason: String,
    },

    /// A bucket or object does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// The missing bucket name or object URI.
        resource: String,
    },

    /// A matched file could not be read.
    #[error("failed to read {}: {source}", .file.display())]
    Io {
        /// The file being read.
        file: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A matched file exceeds the configured size limit.
    #[error("file {} exceeds maximum size of {limit} bytes", .file.display())]
    FileTooLarge {
        /// The oversized file.
        file: PathBuf,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// File or object content is not valid UTF-8.
    #[error("content of {source_name} is not valid UTF-8")]
    InvalidEncoding {
        /// The file path or object URI.
        source_name: String,
    },

    /// Any other storage backend failure (listing or download).
    #[error("storage backend error: {0}")]
    Storage(String),
}

impl LocationError {
    pub(crate) fn malformed(origin: ContentOrigin, source: serde_json::Error) -> Self {
        Self::MalformedContent { origin, source }
    }
}
