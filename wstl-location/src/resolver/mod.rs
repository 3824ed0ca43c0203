//! Scheme-specific resolvers.
//!
//! Each resolver turns a payload into an ordered list of [`RawItem`]s:
//! - `inline` - the payload itself
//! - `file` - local glob expansion with extension rules
//! - `bucket` - object listing with leaf-wildcard matching
//! - `variable` - host namespace lookup and JSON serialization

pub mod bucket;
pub mod file;
pub mod inline;
pub mod variable;

use std::collections::BTreeSet;

use crate::config::ResolverConfig;
use crate::error::LocationError;
use crate::location::RawItem;
use crate::namespace::Namespace;
use crate::scheme::Scheme;
use crate::store::ObjectStore;

/// Per-call options passed to a resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvePolicy<'a> {
    /// Extensions the call may consider; required by `file` and `bucket`.
    pub accepted_extensions: Option<&'a BTreeSet<String>>,
    /// Read file contents instead of returning paths.
    pub load_contents: bool,
}

/// Collaborators shared by resolution calls: config, host namespace, storage.
///
/// Everything is borrowed read-only, so a context can serve concurrent calls.
#[derive(Clone, Default)]
pub struct ResolveContext<'a> {
    config: ResolverConfig,
    namespace: Option<&'a dyn Namespace>,
    store: Option<&'a dyn ObjectStore>,
}

impl<'a> ResolveContext<'a> {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            namespace: None,
            store: None,
        }
    }

    /// Namespace consulted by `py://` arguments.
    #[must_use]
    pub fn with_namespace(mut self, namespace: &'a dyn Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Storage backend consulted by `gs://` arguments.
    #[must_use]
    pub fn with_store(mut self, store: &'a dyn ObjectStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&'a dyn Namespace> {
        self.namespace
    }

    #[must_use]
    pub fn store(&self) -> Option<&'a dyn ObjectStore> {
        self.store
    }
}

impl std::fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("config", &self.config)
            .field("namespace", &self.namespace.is_some())
            .field("store", &self.store.is_some())
            .finish()
    }
}

/// The resolver variant selected by a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolver {
    Inline,
    File,
    Bucket,
    Variable,
}

impl From<Scheme> for Resolver {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Json => Self::Inline,
            Scheme::File => Self::File,
            Scheme::Gs => Self::Bucket,
            Scheme::Py => Self::Variable,
        }
    }
}

impl Resolver {
    /// Resolve `payload` into raw items.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the selected resolver unchanged; see
    /// [`file::resolve_files`], [`bucket::resolve_bucket`] and
    /// [`variable::resolve_variable`].
    pub fn resolve(
        self,
        payload: &str,
        policy: ResolvePolicy<'_>,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<RawItem>, LocationError> {
        match self {
            Self::Inline => Ok(inline::resolve_inline(payload)),
            Self::File => file::resolve_files(payload, policy, ctx.config()),
            Self::Bucket => bucket::resolve_bucket(payload, policy, ctx.store()),
            Self::Variable => variable::resolve_variable(payload, ctx.namespace()),
        }
    }
}

/// The accepted extension set, or [`LocationError::Configuration`] when it is
/// missing or empty.
pub(crate) fn required_extensions<'a>(
    scheme: Scheme,
    policy: ResolvePolicy<'a>,
) -> Result<&'a BTreeSet<String>, LocationError> {
    policy
        .accepted_extensions
        .filter(|exts| !exts.is_empty())
        .ok_or(LocationError::Configuration { scheme })
}

/// Rewrite every `[` that never closes as the bracket expression `[[]`.
///
/// Shell wildcards take an unterminated `[` literally, while `glob` rejects it.
/// A `!` right after `[`, and a `]` right after that, belong to the set.
pub(crate) fn escape_unclosed_brackets(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '[' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let mut j = i + 1;
        if chars.get(j) == Some(&'!') {
            j += 1;
        }
        if chars.get(j) == Some(&']') {
            j += 1;
        }
        match chars[j.min(chars.len())..].iter().position(|&c| c == ']') {
            Some(offset) => {
                let close = j + offset;
                out.extend(&chars[i..=close]);
                i = close + 1;
            }
            None => {
                out.push_str("[[]");
                i += 1;
            }
        }
    }
    out
}
