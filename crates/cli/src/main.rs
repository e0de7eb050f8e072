mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use gizmo_codegen::Target;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Gizmo expression toolchain.
#[derive(Parser)]
#[command(name = "gizmo", version, about = "Gizmo expression toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to the config file (default: ./gizmo.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an expression document
    Check {
        /// Path to the expression JSON document
        file: PathBuf,
    },

    /// Compile an expression or parameter binding to target source
    Compile {
        /// Path to the expression or binding JSON document
        file: PathBuf,
        /// Target dialect (arduino or micropython)
        #[arg(long)]
        target: Option<Target>,
        /// Constraint JSON of the destination parameter; clamps the result
        #[arg(long)]
        constraint: Option<PathBuf>,
    },

    /// Evaluate an expression against fixed values
    Eval {
        /// Path to the expression JSON document
        file: PathBuf,
        /// JSON object of device -> property -> number
        #[arg(long)]
        values: Option<PathBuf>,
    },

    /// Evaluate expressions against telemetry records read from stdin
    Watch {
        /// Expression JSON documents to re-evaluate after each record
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Check { file } => {
            commands::check::cmd_check(&file, cli.output, cli.quiet);
        }
        Commands::Compile {
            file,
            target,
            constraint,
        } => {
            let mut options = config.compile;
            if let Some(t) = target {
                options.target = t;
            }
            commands::compile::cmd_compile(
                &file,
                constraint.as_deref(),
                options,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Eval { file, values } => {
            commands::eval::cmd_eval(&file, values.as_deref(), &config.eval, cli.output, cli.quiet);
        }
        Commands::Watch { files } => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    let msg = format!("error: failed to start runtime: {}", e);
                    report_error(&msg, cli.output, cli.quiet);
                    process::exit(1);
                }
            };
            rt.block_on(commands::watch::cmd_watch(
                &files,
                &config,
                cli.output,
                cli.quiet,
            ));
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Report an error message in the appropriate format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
