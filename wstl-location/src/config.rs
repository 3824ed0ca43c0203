//! Configuration types for location resolution.
//!
//! Split into the per-call request (what to resolve) and the resolver config
//! (limits and extension rules shared by every call).

use std::collections::BTreeSet;

use crate::policy::ExtensionPolicy;

/// Extensions accepted for JSON-bearing arguments (`--input`, `--code_config`).
pub const JSON_FILE_EXT: &[&str] = &[".json", ".ndjson"];

/// Extensions accepted for mapping-library arguments (`--library_config`).
pub const WSTL_FILE_EXT: &[&str] = &[".wstl"];

/// Extensions accepted for unit-configuration arguments (`--unit_config`).
pub const TEXTPROTO_FILE_EXT: &[&str] = &[".textproto"];

/// A single resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResolutionRequest {
    /// The argument including its scheme prefix, e.g. `file://data/*.ndjson`.
    pub raw_argument: String,
    /// Extensions (with leading dot) the call may consider.
    /// Required for `file://` and `gs://`; ignored for `json://` and `py://`.
    pub accepted_extensions: Option<BTreeSet<String>>,
    /// Return file contents instead of path references (`file://` only;
    /// `gs://` always yields bucket URIs, `json://` and `py://` always content).
    pub load_contents: bool,
}

impl ResolutionRequest {
    /// Request for `raw_argument` with no extension set and path-only loading.
    #[must_use]
    pub fn new(raw_argument: impl Into<String>) -> Self {
        Self {
            raw_argument: raw_argument.into(),
            accepted_extensions: None,
            load_contents: false,
        }
    }

    /// Set the accepted extensions, e.g. [`JSON_FILE_EXT`].
    #[must_use]
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.accepted_extensions = Some(extensions.iter().copied().map(str::to_owned).collect());
        self
    }

    /// Choose between loading contents and keeping path references.
    #[must_use]
    pub fn load_contents(mut self, load_contents: bool) -> Self {
        self.load_contents = load_contents;
        self
    }
}

/// Limits and rules shared by every resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResolverConfig {
    /// Maximum size of a file read by the file resolver (default: 10 MB).
    pub max_file_size: u64,
    /// How each accepted extension is handled.
    pub extension_policy: ExtensionPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10_485_760,
            extension_policy: ExtensionPolicy::default(),
        }
    }
}
