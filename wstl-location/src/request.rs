//! Outbound transform and validation requests assembled from location arguments.
//!
//! Each argument kind has a fixed extension set and loading mode:
//!
//! | argument         | extensions          | contents |
//! |------------------|---------------------|----------|
//! | `input`          | `.json`, `.ndjson`  | loaded   |
//! | `library_config` | `.wstl`             | paths    |
//! | `code_config`    | `.json`, `.ndjson`  | paths    |
//! | `unit_config`    | `.textproto`        | paths    |

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::config::{JSON_FILE_EXT, ResolutionRequest, TEXTPROTO_FILE_EXT, WSTL_FILE_EXT};
use crate::error::LocationError;
use crate::location::Location;
use crate::resolve_location;
use crate::resolver::ResolveContext;

/// Errors from request assembly.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RequestError {
    /// One of the arguments failed to resolve.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// An input argument was given but matched nothing.
    #[error("no inputs matching argument {0}")]
    NoInputs(String),

    /// The requested FHIR version is not supported by the validation service.
    #[error("FHIR version {version} is incorrect or not supported, {supported} are supported versions")]
    UnsupportedFhirVersion {
        /// The rejected version string.
        version: String,
        /// Comma-separated supported versions.
        supported: String,
    },
}

/// Location arguments of a transform cell. Every argument is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct TransformArgs {
    pub input: Option<String>,
    pub library_config: Option<String>,
    pub code_config: Option<String>,
    pub unit_config: Option<String>,
}

impl TransformArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input(mut self, arg: impl Into<String>) -> Self {
        self.input = Some(arg.into());
        self
    }

    #[must_use]
    pub fn with_library_config(mut self, arg: impl Into<String>) -> Self {
        self.library_config = Some(arg.into());
        self
    }

    #[must_use]
    pub fn with_code_config(mut self, arg: impl Into<String>) -> Self {
        self.code_config = Some(arg.into());
        self
    }

    #[must_use]
    pub fn with_unit_config(mut self, arg: impl Into<String>) -> Self {
        self.unit_config = Some(arg.into());
        self
    }
}

/// Request for one incremental transform of a Whistle cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncrementalTransformRequest {
    pub session_id: String,
    /// Whistle source of the cell.
    pub wstl: String,
    pub input: Vec<Location>,
    pub library_config: Vec<Location>,
    pub code_config: Vec<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_config: Option<Location>,
}

/// FHIR versions understood by the validation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FhirVersion {
    Stu3,
}

impl FhirVersion {
    pub const ALL: [Self; 1] = [Self::Stu3];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stu3 => "STU3",
        }
    }
}

impl fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FhirVersion {
    type Err = RequestError;

    /// Case-insensitive: `stu3`, `STU3` and `Stu3` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RequestError::UnsupportedFhirVersion {
                version: s.to_owned(),
                supported: Self::ALL
                    .into_iter()
                    .map(Self::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            })
    }
}

/// Request to validate resources against a FHIR version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRequest {
    pub fhir_version: FhirVersion,
    pub input: Vec<Location>,
}

fn resolve_arg(
    ctx: &ResolveContext<'_>,
    arg: &str,
    extensions: &[&str],
    load_contents: bool,
) -> Result<Vec<Location>, LocationError> {
    let request = ResolutionRequest::new(arg)
        .with_extensions(extensions)
        .load_contents(load_contents);
    resolve_location(&request, ctx)
}

/// Assemble the transform request for a cell.
///
/// # Errors
///
/// - [`RequestError::Location`] if any argument fails to resolve
/// - [`RequestError::NoInputs`] if `args.input` is set but matches nothing
pub fn build_transform_request(
    ctx: &ResolveContext<'_>,
    session_id: &str,
    wstl: &str,
    args: &TransformArgs,
) -> Result<IncrementalTransformRequest, RequestError> {
    let mut request = IncrementalTransformRequest {
        session_id: session_id.to_owned(),
        wstl: wstl.to_owned(),
        ..IncrementalTransformRequest::default()
    };

    if let Some(arg) = &args.library_config {
        request.library_config = resolve_arg(ctx, arg, WSTL_FILE_EXT, false)?;
    }
    if let Some(arg) = &args.code_config {
        request.code_config = resolve_arg(ctx, arg, JSON_FILE_EXT, false)?;
    }
    if let Some(arg) = &args.unit_config {
        request.unit_config = resolve_arg(ctx, arg, TEXTPROTO_FILE_EXT, false)?
            .into_iter()
            .next();
    }
    if let Some(arg) = &args.input {
        request.input = resolve_arg(ctx, arg, JSON_FILE_EXT, true)?;
        if request.input.is_empty() {
            return Err(RequestError::NoInputs(arg.clone()));
        }
    }

    Ok(request)
}

/// Assemble a validation request for `input_arg` against `fhir_version`.
///
/// # Errors
///
/// - [`RequestError::UnsupportedFhirVersion`] for anything but `stu3`
/// - [`RequestError::Location`] if the input fails to resolve
pub fn build_validation_request(
    ctx: &ResolveContext<'_>,
    fhir_version: &str,
    input_arg: &str,
) -> Result<ValidationRequest, RequestError> {
    let fhir_version: FhirVersion = fhir_version.parse()?;
    let input = resolve_arg(ctx, input_arg, JSON_FILE_EXT, true)?;
    Ok(ValidationRequest {
        fhir_version,
        input,
    })
}
