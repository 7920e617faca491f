//! @ai:module:intent CLI entry point for signature compatibility checks
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on parser, diff, config, output, writer

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use sigcheck::config::DEFAULT_CONFIG_FILE;
use sigcheck::{
    diff_many, output, parse_file, write_signature, ApiModel, CheckConfig, NullMode, OutputFormat,
    ParseOptions,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sigcheck")]
#[command(author, version, about = "Check API signature files for incompatible changes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a released signature file against one or more current ones
    Check {
        /// Signature file of the released API
        previous: PathBuf,

        /// Signature files of the current API
        #[arg(required = true)]
        current: Vec<PathBuf>,

        #[command(flatten)]
        mode: ModeArgs,

        /// Path to configuration file (defaults to ./sigcheck.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Diagnostic code to suppress (repeatable)
        #[arg(long, value_name = "CODE")]
        suppress: Vec<u32>,

        /// Diagnostic code to report as an error (repeatable)
        #[arg(long, value_name = "CODE")]
        error: Vec<u32>,

        /// Report every finding as an error
        #[arg(long)]
        warnings_as_errors: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Parse a signature file and show its API model
    Parse {
        /// Path to signature file
        path: PathBuf,

        #[command(flatten)]
        mode: ModeArgs,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print a signature file in canonical form
    Format {
        /// Path to signature file
        path: PathBuf,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },
}

#[derive(Args, Clone, Copy)]
struct ModeArgs {
    /// Treat bare types as non-null
    #[arg(long, conflicts_with = "legacy")]
    null_aware: bool,

    /// Treat bare types as having unknown nullness
    #[arg(long)]
    legacy: bool,
}

impl ModeArgs {
    fn null_mode(&self) -> Option<NullMode> {
        if self.null_aware {
            Some(NullMode::NullAware)
        } else if self.legacy {
            Some(NullMode::Legacy)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

struct CheckArgs {
    previous: PathBuf,
    current: Vec<PathBuf>,
    mode: ModeArgs,
    config: Option<PathBuf>,
    suppress: Vec<u32>,
    error: Vec<u32>,
    warnings_as_errors: bool,
    format: Format,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sigcheck=info".parse()?),
        )
        .init();

    match cli.command {
        Commands::Check {
            previous,
            current,
            mode,
            config,
            suppress,
            error,
            warnings_as_errors,
            format,
        } => check(CheckArgs {
            previous,
            current,
            mode,
            config,
            suppress,
            error,
            warnings_as_errors,
            format,
        }),

        Commands::Parse { path, mode, format } => {
            let model = load_model(&path, &ParseOptions { null_mode: mode.null_mode() })?;
            report_unresolved(&model);
            println!("{}", output::format_model(&model, format.into()));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Format { path, mode } => {
            let model = load_model(&path, &ParseOptions { null_mode: mode.null_mode() })?;
            print!("{}", write_signature(&model));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init { output } => {
            CheckConfig::default()
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Configuration saved to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// @ai:intent Parse all inputs, compare them and print one report per current file
/// @ai:effects fs:read, io
fn check(args: CheckArgs) -> Result<ExitCode> {
    let mut config = load_or_default_config(args.config.as_deref())?;
    if let Some(mode) = args.mode.null_mode() {
        config.parse.null_mode = Some(mode);
    }
    config.policy.suppress.extend(args.suppress);
    config.policy.errors.extend(args.error);
    config.policy.warnings_as_errors |= args.warnings_as_errors;

    let options = config.parse.options();
    let previous = load_model(&args.previous, &options)?;
    let currents = args
        .current
        .par_iter()
        .map(|path| load_model(path, &options))
        .collect::<Result<Vec<ApiModel>>>()?;

    for model in std::iter::once(&previous).chain(&currents) {
        report_unresolved(model);
    }

    let mut failed = false;
    for result in diff_many(&previous, &currents) {
        let diagnostics = config.policy.apply(&result?);
        tracing::info!(
            current = %diagnostics.current,
            errors = diagnostics.errors(),
            warnings = diagnostics.warnings(),
            "compatibility check finished"
        );
        println!("{}", output::format_diagnostics(&diagnostics, args.format.into()));
        failed |= diagnostics.has_errors();
    }

    if failed {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn load_model(path: &Path, options: &ParseOptions) -> Result<ApiModel> {
    parse_file(path, options).with_context(|| format!("parsing {}", path.display()))
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<&Path>) -> Result<CheckConfig> {
    match path {
        Some(p) => {
            CheckConfig::load(p).with_context(|| format!("loading config {}", p.display()))
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);

            if default_path.exists() {
                CheckConfig::load(&default_path)
                    .with_context(|| format!("loading config {}", default_path.display()))
            } else {
                Ok(CheckConfig::default())
            }
        }
    }
}

fn report_unresolved(model: &ApiModel) {
    for unresolved in model.unresolved_references() {
        tracing::warn!(
            source = %model.source,
            class = %unresolved.class,
            reference = %unresolved.reference,
            line = unresolved.line,
            "unresolved superclass or interface"
        );
    }
}
