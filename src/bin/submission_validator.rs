use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use submission_validator::app::App;
use submission_validator::config::{ChecksumLocation, ConfigLoader, ResolvedConfig};
use submission_validator::error::ValidatorError;
use submission_validator::loader::{load_schemas, load_submission};
use submission_validator::output::JsonOutput;
use submission_validator::schema::{SchemaHttpClient, SchemaValidator};
use submission_validator::taxonomy::{EnaTaxonomyHttpClient, TaxonomyResolver};
use submission_validator::taxonomy_validator::TaxonomyValidator;
use submission_validator::upload::{
    ChecksumSource, DirectoryChecksumSource, HttpChecksumSource, UploadValidator,
};

const EXIT_INVALID_SUBMISSION: u8 = 4;

#[derive(Parser)]
#[command(name = "submission-validator")]
#[command(about = "Validate biological sample submissions before archival")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Validate a submission document and print the error report")]
    Validate(ValidateArgs),
}

#[derive(Args)]
struct ValidateArgs {
    submission: PathBuf,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    schema_dir: Option<Utf8PathBuf>,

    #[arg(long)]
    schema_url: Option<String>,

    #[arg(long)]
    taxonomy_url: Option<String>,

    #[arg(long)]
    skip_taxonomy: bool,

    #[arg(long)]
    secure_key: Option<String>,

    #[arg(long, conflicts_with = "checksums_root")]
    checksums_url: Option<String>,

    #[arg(long)]
    checksums_root: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(err) = report.downcast_ref::<ValidatorError>() {
                return ExitCode::from(map_exit_code(err));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &ValidatorError) -> u8 {
    match error {
        ValidatorError::EntityNotFound { .. }
        | ValidatorError::SubmissionRead(_)
        | ValidatorError::SubmissionParse(_)
        | ValidatorError::SchemaRead(_)
        | ValidatorError::SchemaParse(_)
        | ValidatorError::ConfigRead(_)
        | ValidatorError::ConfigParse(_) => 2,
        err if err.is_remote() => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => run_validate(args),
    }
}

fn run_validate(args: ValidateArgs) -> miette::Result<ExitCode> {
    let config = apply_overrides(ConfigLoader::resolve(args.config.as_deref())?, &args);
    let mut submission = load_submission(&args.submission)?;
    if submission.is_empty() {
        tracing::warn!(path = %args.submission.display(), "submission holds no entities");
    }

    let mut app = App::new();
    if let Some(schema_dir) = &config.schema_dir {
        let schemas = load_schemas(schema_dir)?;
        let client = SchemaHttpClient::new(&config.schema_url)?;
        app = app.with_validator(SchemaValidator::new(client, schemas));
    }
    if !args.skip_taxonomy {
        let client = EnaTaxonomyHttpClient::new(&config.taxonomy_url)?;
        app = app.with_validator(TaxonomyValidator::new(TaxonomyResolver::new(client)));
    }
    if let Some(secure_key) = &args.secure_key {
        let source: Box<dyn ChecksumSource> = match &config.checksums {
            Some(ChecksumLocation::Http(url)) => Box::new(HttpChecksumSource::new(url)?),
            Some(ChecksumLocation::Directory(root)) => {
                Box::new(DirectoryChecksumSource::new(root.clone()))
            }
            None => {
                return Err(miette::Report::msg(
                    "--secure-key requires --checksums-url or --checksums-root",
                ));
            }
        };
        app = app.with_validator(UploadValidator::new(secure_key, source.as_ref())?);
    }
    tracing::info!(validators = ?app.validator_names(), "validation configured");

    let report = app.validate(&mut submission);
    JsonOutput::print_report(&report).into_diagnostic()?;
    if report.valid {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INVALID_SUBMISSION))
    }
}

fn apply_overrides(mut config: ResolvedConfig, args: &ValidateArgs) -> ResolvedConfig {
    if let Some(url) = &args.taxonomy_url {
        config.taxonomy_url = url.clone();
    }
    if let Some(url) = &args.schema_url {
        config.schema_url = url.clone();
    }
    if let Some(dir) = &args.schema_dir {
        config.schema_dir = Some(dir.clone());
    }
    if let Some(url) = &args.checksums_url {
        config.checksums = Some(ChecksumLocation::Http(url.clone()));
    }
    if let Some(root) = &args.checksums_root {
        config.checksums = Some(ChecksumLocation::Directory(root.clone()));
    }
    config
}
