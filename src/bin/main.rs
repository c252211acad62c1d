//! Device Models Repository CLI
//!
//! Command-line tool for resolving models and validating repository files.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqwest::blocking::Client;
use tracing_subscriber::EnvFilter;

use dmr_resolver::{
    dtmi_to_path, format_models, is_remote_location, validate_file, CancellationToken,
    DependencyMode, Dtmi, ModelsFormat, ResolverClient, ResolverError, ResolverOptions,
    DEFAULT_REPOSITORY,
};

const SUCCESS: i32 = 0;
const INVALID_ARGUMENTS: i32 = 1;
const VALIDATION_ERROR: i32 = 2;
const RESOLUTION_ERROR: i32 = 3;

#[derive(Parser)]
#[command(name = "dmr-client")]
#[command(about = "Resolve device models and their dependencies from a models repository")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more DTMIs and print the result
    Export(ExportArgs),
    /// Check a model file against repository conventions
    Validate(ValidateArgs),
    /// Print the repository path a DTMI maps to
    Path(PathArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// DTMIs to resolve
    #[arg(required = true)]
    dtmis: Vec<String>,

    /// Repository directory or base URI
    #[arg(long, default_value = DEFAULT_REPOSITORY)]
    repo: String,

    /// Dependency resolution mode
    #[arg(long, value_enum, default_value_t = DependencyMode::Enabled)]
    deps: DependencyMode,

    /// Output format
    #[arg(long, value_enum, default_value_t = ModelsFormat::Json)]
    format: ModelsFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Model file to check
    model_file: PathBuf,

    /// Local repository root; enables the file-placement check
    #[arg(long)]
    repo: Option<String>,
}

#[derive(Args)]
struct PathArgs {
    /// The DTMI to map
    dtmi: String,

    /// Map to the expanded bundle path
    #[arg(long)]
    expanded: bool,
}

fn error_code(err: &ResolverError) -> i32 {
    match err {
        ResolverError::InvalidDtmiFormat(_)
        | ResolverError::InvalidRepositoryLocation { .. } => INVALID_ARGUMENTS,
        ResolverError::MissingRootId
        | ResolverError::MismatchedRootId { .. }
        | ResolverError::MalformedExpandedDocument
        | ResolverError::Json(_) => VALIDATION_ERROR,
        _ => RESOLUTION_ERROR,
    }
}

fn fail(err: &ResolverError) -> i32 {
    eprintln!("Error: {}", err);
    error_code(err)
}

/// Write output to file or stdout
fn write_output(content: &str, output: Option<&PathBuf>) -> Result<(), ResolverError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Wrote resolved models to {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn run_export(args: ExportArgs, http: Client) -> i32 {
    let options = ResolverOptions::new(args.deps);
    let client = match ResolverClient::from_location(&args.repo, options, http) {
        Ok(client) => client,
        Err(err) => return fail(&err),
    };

    let outcome = match client.resolve(
        args.dtmis.iter().map(String::as_str),
        &CancellationToken::new(),
    ) {
        Ok(outcome) => outcome,
        Err(err) => return fail(&err),
    };

    let models = match outcome.models() {
        Some(models) => models,
        None => {
            eprintln!("Resolution cancelled");
            return RESOLUTION_ERROR;
        }
    };

    eprintln!("Resolved {} models from {}", models.len(), args.repo);

    let payload = match format_models(&models, args.format) {
        Ok(payload) => payload,
        Err(err) => return fail(&err),
    };

    match write_output(&payload, args.output.as_ref()) {
        Ok(()) => SUCCESS,
        Err(err) => fail(&err),
    }
}

fn run_validate(args: ValidateArgs) -> i32 {
    if args.repo.as_deref().is_some_and(is_remote_location) {
        eprintln!("Error: model file path validation requires a local repository");
        return INVALID_ARGUMENTS;
    }
    let repo_base = args.repo.as_deref().map(PathBuf::from);

    let report = match validate_file(&args.model_file, repo_base.as_deref()) {
        Ok(report) => report,
        Err(err) => return fail(&err),
    };

    if report.passed() {
        println!("Validation passed for {}", args.model_file.display());
        SUCCESS
    } else {
        for diagnostic in &report.diagnostics {
            eprintln!("Error: {}", diagnostic);
        }
        VALIDATION_ERROR
    }
}

fn run_path(args: PathArgs) -> i32 {
    match Dtmi::parse(&args.dtmi) {
        Ok(dtmi) => {
            println!("{}", dtmi_to_path(&dtmi, args.expanded));
            SUCCESS
        }
        Err(err) => fail(&err),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // One HTTP client per process; resolution calls share its connection pool.
    let http = Client::new();

    let code = match cli.command {
        Commands::Export(args) => run_export(args, http),
        Commands::Validate(args) => run_validate(args),
        Commands::Path(args) => run_path(args),
    };

    std::process::exit(code);
}
