//! Extension handling rules.

use std::collections::BTreeMap;

/// How the contents of a file with a given extension are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtensionRule {
    /// A single JSON document: decoded to validate, re-encoded as one item.
    Json,
    /// Newline-delimited JSON: one decoded and re-encoded item per non-empty line.
    Ndjson,
    /// Readable text that is never parsed (Whistle sources, textprotos).
    Opaque,
}

/// Mapping from extension (with leading dot) to its [`ExtensionRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    rules: BTreeMap<String, ExtensionRule>,
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self::empty()
            .with_rule(".json", ExtensionRule::Json)
            .with_rule(".ndjson", ExtensionRule::Ndjson)
            .with_rule(".wstl", ExtensionRule::Opaque)
            .with_rule(".textproto", ExtensionRule::Opaque)
    }
}

impl ExtensionPolicy {
    /// A policy with no rules; every extension is unsupported.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Register (or replace) the rule for `extension`.
    #[must_use]
    pub fn with_rule(mut self, extension: &str, rule: ExtensionRule) -> Self {
        self.rules.insert(extension.to_owned(), rule);
        self
    }

    /// Rule for `extension`, if one is registered.
    #[must_use]
    pub fn rule_for(&self, extension: &str) -> Option<ExtensionRule> {
        self.rules.get(extension).copied()
    }
}

/// Extension of the last path segment of `name`, including the leading dot.
///
/// Leading dots of the segment are part of the stem, so `.bashrc` has no
/// extension while `dir/file.tar.json` has `.json`.
#[must_use]
pub fn extension_of(name: &str) -> Option<&str> {
    let leaf = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem_start = leaf.len() - leaf.trim_start_matches('.').len();
    let dot = leaf[stem_start..].rfind('.')?;
    Some(&leaf[stem_start + dot..])
}
