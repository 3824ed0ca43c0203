//! # wstl-location
//!
//! Resolves Whistle notebook location arguments into [`Location`] values.
//!
//! An argument carries a scheme prefix that selects how it is resolved:
//!
//! - `json://<literal>` - the literal itself, as inline content
//! - `file://<path-or-glob>` - matching local files, as paths or decoded content
//! - `gs://<bucket>/<key-or-glob>` - matching bucket objects, as `gs://` URIs
//! - `py://<name>` - a host variable, serialized to JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wstl_location::{
//!     JSON_FILE_EXT, JsonNamespace, ResolutionRequest, ResolveContext, ResolverConfig,
//!     resolve_location,
//! };
//!
//! let namespace = JsonNamespace::new().with("patient", serde_json::json!({"id": "p1"}));
//! let ctx = ResolveContext::new(ResolverConfig::default()).with_namespace(&namespace);
//!
//! let request = ResolutionRequest::new("file://data/*.ndjson")
//!     .with_extensions(JSON_FILE_EXT)
//!     .load_contents(true);
//! let inputs = resolve_location(&request, &ctx).unwrap();
//! println!("{} input(s)", inputs.len());
//! ```

mod config;
mod error;
mod location;
mod namespace;
pub mod output;
mod policy;
pub mod request;
pub mod resolver;
mod scheme;
pub mod store;

pub use config::{
    JSON_FILE_EXT, ResolutionRequest, ResolverConfig, TEXTPROTO_FILE_EXT, WSTL_FILE_EXT,
};
pub use error::{ContentOrigin, LocationError};
pub use location::{Location, RawItem, build, build_named};
pub use namespace::{JsonNamespace, Namespace, NamespaceValue};
pub use policy::{ExtensionPolicy, ExtensionRule, extension_of};
pub use request::{
    FhirVersion, IncrementalTransformRequest, RequestError, TransformArgs, ValidationRequest,
    build_transform_request, build_validation_request,
};
pub use resolver::{ResolveContext, ResolvePolicy, Resolver};
pub use scheme::{Scheme, dispatch, supported_prefixes};
pub use store::{DirectoryStore, InMemoryStore, ObjectRef, ObjectStore, load_object_json};

use tracing::info;

/// Resolve one argument into an ordered list of locations.
///
/// This is the primary public API. Each call is independent: nothing is cached
/// and the context is only read.
///
/// # Errors
///
/// Returns the first [`LocationError`] raised by dispatch or by the selected
/// resolver. An argument that matches nothing resolves to an empty `Vec`, which
/// callers may choose to treat as a failure.
pub fn resolve_location(
    request: &ResolutionRequest,
    ctx: &ResolveContext<'_>,
) -> Result<Vec<Location>, LocationError> {
    let (scheme, payload) = dispatch(&request.raw_argument)?;
    let policy = ResolvePolicy {
        accepted_extensions: request.accepted_extensions.as_ref(),
        load_contents: request.load_contents,
    };

    let items = Resolver::from(scheme).resolve(payload, policy, ctx)?;
    let locations = build(scheme, items, !request.load_contents);
    info!(
        scheme = %scheme,
        argument = %request.raw_argument,
        locations = locations.len(),
        "resolved location argument"
    );
    Ok(locations)
}
