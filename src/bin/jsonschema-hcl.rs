//! jsonschema-hcl CLI
//!
//! Command-line interface for converting JSON Schema documents between JSON,
//! YAML and HCL.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jsonschema_hcl::{loader, normalize, ConvertError, Format, NormalizeOptions, Registry};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "jsonschema-hcl")]
#[command(about = "Convert JSON Schema documents between JSON and HCL")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a schema file to another format
    Convert {
        /// Schema file (.json, .yaml, .yml or .hcl)
        input: PathBuf,

        /// Input format (default: inferred from the extension)
        #[arg(long, value_parser = parse_format)]
        from: Option<Format>,

        /// Output format: json or hcl
        #[arg(long, value_parser = parse_format)]
        to: Format,

        /// Output file (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Substitute resolvable $ref pointers
        #[arg(long)]
        resolve_refs: bool,

        /// Merge allOf members into their parent schema
        #[arg(long)]
        flatten_all_of: bool,

        /// Rename anyOf to oneOf where no oneOf is present
        #[arg(long)]
        any_of_to_one_of: bool,

        /// Maximum reference-resolution sweeps before giving up
        #[arg(long, default_value_t = jsonschema_hcl::DEFAULT_MAX_REF_SWEEPS)]
        max_ref_sweeps: usize,

        /// Extra schema files to load first so their $id can be referenced
        #[arg(long = "with", value_name = "FILE")]
        with: Vec<PathBuf>,
    },

    /// Print the embedded draft-07 meta-schema
    BaseSchema {
        /// Output format: json or hcl
        #[arg(long, value_parser = parse_format, default_value = "json")]
        to: Format,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

struct ConvertArgs {
    input: PathBuf,
    from: Option<Format>,
    to: Format,
    output: Option<PathBuf>,
    pretty: bool,
    options: NormalizeOptions,
    with: Vec<PathBuf>,
}

fn parse_format(s: &str) -> Result<Format, String> {
    Format::parse(s).ok_or_else(|| format!("unknown format '{s}' (expected json, yaml or hcl)"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input,
            from,
            to,
            output,
            pretty,
            resolve_refs,
            flatten_all_of,
            any_of_to_one_of,
            max_ref_sweeps,
            with,
        } => run_convert(ConvertArgs {
            input,
            from,
            to,
            output,
            pretty,
            options: NormalizeOptions::new()
                .resolve_refs(resolve_refs)
                .flatten_all_of(flatten_all_of)
                .any_of_to_one_of(any_of_to_one_of)
                .max_ref_sweeps(max_ref_sweeps),
            with,
        }),

        Commands::BaseSchema { to, pretty } => run_base_schema(to, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), ConvertError> {
    let registry = Registry::new();

    for path in &args.with {
        debug!(path = %path.display(), "preloading schema");
        loader::load_schema(path, None, &registry)?;
    }

    let mut schema = loader::load_schema(&args.input, args.from, &registry)?;

    let report = normalize(&mut schema, &registry, &args.options)?;
    debug!(
        substitutions = report.refs.substitutions,
        unresolved = report.refs.unresolved.len(),
        all_of = report.all_of_flattened,
        any_of = report.any_of_renamed,
        "normalized"
    );

    let rendered = loader::encode(&schema, args.to, args.pretty)?;
    emit(args.output, &rendered)
}

fn run_base_schema(to: Format, pretty: bool) -> Result<(), ConvertError> {
    let schema = loader::base_schema(&Registry::new())?;
    let rendered = loader::encode(&schema, to, pretty)?;
    emit(None, &rendered)
}

fn emit(output: Option<PathBuf>, rendered: &str) -> Result<(), ConvertError> {
    match output {
        Some(path) => loader::write_output(&path, rendered),
        None => {
            if rendered.ends_with('\n') {
                print!("{}", rendered);
            } else {
                println!("{}", rendered);
            }
            Ok(())
        }
    }
}
