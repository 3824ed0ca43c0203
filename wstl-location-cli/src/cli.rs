use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use wstl_location::output::{write_human, write_json};
use wstl_location::resolver::bucket::BucketPath;
use wstl_location::{
    DirectoryStore, JsonNamespace, ResolutionRequest, ResolveContext, ResolverConfig, Scheme,
    TransformArgs, build_transform_request, build_validation_request, dispatch, load_object_json,
    resolve_location,
};

use crate::{logging, vars};

/// Resolve Whistle notebook location arguments
///
/// Arguments carry a scheme prefix: json://, file://, gs:// or py://.
///
/// Examples:
///   wstl-loc resolve 'file://data/*.ndjson' --ext .json --ext .ndjson
///   wstl-loc --bucket-root ./buckets resolve 'gs://lib/*' --ext .wstl --paths
///   wstl-loc --var patient='{"id":"p1"}' transform --input py://patient
#[derive(Parser, Debug)]
#[command(name = "wstl-loc", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub globals: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Verbose output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory whose subdirectories stand in for gs:// buckets
    #[arg(long, env = "WSTL_BUCKET_ROOT", value_name = "DIR", global = true)]
    pub bucket_root: Option<PathBuf>,

    /// JSON object file whose members become py:// variables
    #[arg(long, value_name = "FILE", global = true)]
    pub vars: Option<PathBuf>,

    /// Bind one py:// variable; VALUE is parsed as JSON, else kept as a string
    #[arg(long = "var", value_name = "NAME=VALUE", global = true)]
    pub var: Vec<String>,

    /// Largest local file that may be loaded, in bytes
    #[arg(long, env = "WSTL_MAX_FILE_SIZE", value_name = "BYTES", global = true)]
    pub max_file_size: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve one argument and print its locations
    Resolve(ResolveArgs),
    /// Assemble an incremental transform request
    Transform(TransformCmd),
    /// Assemble a FHIR validation request
    Validate(ValidateCmd),
    /// Print the JSON object stored at gs://bucket/key
    Fetch(FetchCmd),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Argument with its scheme prefix
    pub argument: String,

    /// Accepted file extension, with leading dot (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Keep file:// matches as paths instead of loading their contents
    #[arg(long)]
    pub paths: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct TransformCmd {
    /// Input records (.json, .ndjson), loaded as content
    #[arg(long)]
    pub input: Option<String>,

    /// Mapping libraries (.wstl)
    #[arg(long)]
    pub library_config: Option<String>,

    /// Code harmonization configs (.json, .ndjson)
    #[arg(long)]
    pub code_config: Option<String>,

    /// Unit harmonization config (.textproto); the first match is used
    #[arg(long)]
    pub unit_config: Option<String>,

    /// Session the cell belongs to
    #[arg(long, default_value = "local")]
    pub session_id: String,

    /// File holding the Whistle source of the cell
    #[arg(long, value_name = "FILE")]
    pub cell: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateCmd {
    /// Resources to validate (.json, .ndjson)
    #[arg(long)]
    pub input: String,

    /// FHIR version to validate against
    #[arg(long, default_value = "stu3")]
    pub fhir_version: String,
}

#[derive(Args, Debug)]
pub struct FetchCmd {
    /// Object URI, gs://bucket/key
    pub uri: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
}

/// Stores and variables owned for the duration of one command.
struct Runtime {
    config: ResolverConfig,
    namespace: JsonNamespace,
    store: Option<DirectoryStore>,
}

impl Runtime {
    fn from_globals(globals: &GlobalArgs) -> Result<Self> {
        let mut config = ResolverConfig::default();
        if let Some(limit) = globals.max_file_size {
            config.max_file_size = limit;
        }

        let namespace = vars::load_namespace(globals.vars.as_deref(), &globals.var)?;
        debug!(variables = namespace.len(), "loaded py:// namespace");

        let store = match &globals.bucket_root {
            Some(root) => {
                debug!(root = %root.display(), "using directory bucket store");
                Some(DirectoryStore::open(root.clone())?)
            }
            None => None,
        };

        Ok(Self {
            config,
            namespace,
            store,
        })
    }

    fn context(&self) -> ResolveContext<'_> {
        let ctx = ResolveContext::new(self.config.clone()).with_namespace(&self.namespace);
        match &self.store {
            Some(store) => ctx.with_store(store),
            None => ctx,
        }
    }
}

/// Parse the command line, set up logging and run the chosen subcommand.
///
/// # Errors
///
/// Returns any error raised while running the subcommand.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.globals.verbose);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Run a parsed command, writing its output to `out`.
///
/// # Errors
///
/// Returns an error if resolution, request assembly or writing fails.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let runtime = Runtime::from_globals(&cli.globals)?;
    let ctx = runtime.context();

    match &cli.command {
        Command::Resolve(args) => {
            let extensions: Vec<&str> = args.extensions.iter().map(String::as_str).collect();
            let mut request =
                ResolutionRequest::new(args.argument.as_str()).load_contents(!args.paths);
            if !extensions.is_empty() {
                request = request.with_extensions(&extensions);
            }
            let locations = resolve_location(&request, &ctx)?;
            match args.format {
                OutputFormat::Json => write_json(&locations, out),
                OutputFormat::Human => write_human(&args.argument, &locations, out),
            }
        }
        Command::Transform(cmd) => {
            let wstl = match &cmd.cell {
                Some(path) => fs::read_to_string(path)
                    .with_context(|| format!("failed to read cell {}", path.display()))?,
                None => String::new(),
            };
            let request = build_transform_request(&ctx, &cmd.session_id, &wstl, &cmd.to_args())?;
            write_json(&request, out)
        }
        Command::Validate(cmd) => {
            let request = build_validation_request(&ctx, &cmd.fhir_version, &cmd.input)?;
            write_json(&request, out)
        }
        Command::Fetch(cmd) => {
            let (scheme, payload) = dispatch(&cmd.uri)?;
            if scheme != Scheme::Gs {
                bail!("fetch expects a gs:// URI, got '{}'", cmd.uri);
            }
            let path = BucketPath::parse(payload)?;
            let Some(store) = &runtime.store else {
                bail!("fetch needs a bucket store; pass --bucket-root or set WSTL_BUCKET_ROOT");
            };
            let value = load_object_json(store, &path.bucket, &path.key_pattern)?;
            write_json(&value, out)
        }
    }
}

impl TransformCmd {
    fn to_args(&self) -> TransformArgs {
        let mut args = TransformArgs::new();
        if let Some(a) = &self.input {
            args = args.with_input(a.as_str());
        }
        if let Some(a) = &self.library_config {
            args = args.with_library_config(a.as_str());
        }
        if let Some(a) = &self.code_config {
            args = args.with_code_config(a.as_str());
        }
        if let Some(a) = &self.unit_config {
            args = args.with_unit_config(a.as_str());
        }
        args
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn run_cli(argv: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(argv)?;
        let mut buf = Vec::new();
        execute(&cli, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    fn run_json(argv: &[&str]) -> Value {
        serde_json::from_str(&run_cli(argv).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wstl-loc",
            "resolve",
            "json://{}",
            "-vv",
            "--var",
            "a=1",
            "--max-file-size",
            "64",
        ])
        .unwrap();
        assert_eq!(cli.globals.verbose, 2);
        assert_eq!(cli.globals.var, vec!["a=1".to_owned()]);
        assert_eq!(cli.globals.max_file_size, Some(64));
        let Command::Resolve(args) = cli.command else {
            panic!("expected the resolve subcommand");
        };
        assert_eq!(args.argument, "json://{}");
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.paths);
    }

    #[test]
    fn test_validate_requires_input() {
        assert!(Cli::try_parse_from(["wstl-loc", "validate"]).is_err());
    }

    #[test]
    fn test_resolve_inline() {
        let out = run_json(&["wstl-loc", "resolve", r#"json://{"a": 1}"#]);
        assert_eq!(out, json!([{"inline_json": "{\"a\": 1}"}]));
    }

    #[test]
    fn test_resolve_files_as_paths_and_content() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.json");
        fs::write(&file, r#"{"k": [1, 2]}"#).unwrap();
        let arg = format!("file://{}/*", tmp.path().display());

        let out = run_json(&["wstl-loc", "resolve", &arg, "--ext", ".json"]);
        assert_eq!(out, json!([{"inline_json": "{\"k\":[1,2]}"}]));

        let out = run_json(&["wstl-loc", "resolve", &arg, "--ext", ".json", "--paths"]);
        assert_eq!(out, json!([{"local_path": file.display().to_string()}]));
    }

    #[test]
    fn test_resolve_file_without_ext_fails() {
        let err = run_cli(&["wstl-loc", "resolve", "file://*.json"]).unwrap_err();
        assert!(err.to_string().contains("empty required extensions for file://"), "got: {err}");
    }

    #[test]
    fn test_resolve_human_format() {
        let out = run_cli(&[
            "wstl-loc", "resolve", "py://name", "--var", "name=alice", "--format", "human",
        ])
        .unwrap();
        assert!(out.contains("[1] inline_json  alice"), "got:\n{out}");
    }

    #[test]
    fn test_transform_with_bucket_root() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("bucket/lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("one.wstl"), "x: 1").unwrap();
        fs::write(lib.join("two.txt"), "").unwrap();
        let cell = tmp.path().join("cell.wstl");
        fs::write(&cell, "out: $root").unwrap();
        let root = tmp.path().display().to_string();
        let cell = cell.display().to_string();

        let out = run_json(&[
            "wstl-loc",
            "--bucket-root",
            &root,
            "--var",
            r#"rec={"b":1,"a":2}"#,
            "transform",
            "--input",
            "py://rec",
            "--library-config",
            "gs://bucket/lib/*",
            "--session-id",
            "s9",
            "--cell",
            &cell,
        ]);
        assert_eq!(
            out,
            json!({
                "session_id": "s9",
                "wstl": "out: $root",
                "input": [{"inline_json": "{\"a\":2,\"b\":1}"}],
                "library_config": [{"gcs_location": "gs://bucket/lib/one.wstl"}],
                "code_config": []
            })
        );
    }

    #[test]
    fn test_validate() {
        let out = run_json(&["wstl-loc", "validate", "--input", "json://{}"]);
        assert_eq!(out, json!({"fhir_version": "STU3", "input": [{"inline_json": "{}"}]}));
        assert!(
            run_cli(&["wstl-loc", "validate", "--input", "json://{}", "--fhir-version", "r4"])
                .is_err()
        );
    }

    #[test]
    fn test_fetch() {
        let tmp = TempDir::new().unwrap();
        let bucket = tmp.path().join("b");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join("obj.json"), r#"{"hello": "world"}"#).unwrap();
        let root = tmp.path().display().to_string();

        let out = run_json(&["wstl-loc", "--bucket-root", &root, "fetch", "gs://b/obj.json"]);
        assert_eq!(out, json!({"hello": "world"}));

        let err = run_cli(&["wstl-loc", "fetch", "file://obj.json"]).unwrap_err();
        assert!(err.to_string().contains("expects a gs:// URI"), "got: {err}");
    }
}
