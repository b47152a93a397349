mod commands;
mod definition;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::metadata::LevelFilter;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Type-containing enumerations: check definitions, export schemas, parse and convert wire values.
#[derive(Parser)]
#[command(
    name = "typenum",
    version,
    about = "Type-containing enumerations: definitions, schemas and wire formats"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log registry construction and parsing to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a definition file and build its enums
    Check {
        /// Path to the definition file (.toml or .json)
        definitions: PathBuf,
    },

    /// Print the JSON Schema of an enum's wire form
    Schema {
        /// Path to the definition file (.toml or .json)
        definitions: PathBuf,
        /// Enum to export; all enums when omitted
        #[arg(long = "enum")]
        enum_name: Option<String>,
    },

    /// Parse a wire value and print the enum value it denotes
    Parse {
        /// Path to the definition file (.toml or .json)
        definitions: PathBuf,
        /// Enum the wire value belongs to
        #[arg(long = "enum")]
        enum_name: String,
        /// Path to the JSON wire value, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Re-emit a wire value through another enum with the same variants
    Convert {
        /// Path to the definition file (.toml or .json)
        definitions: PathBuf,
        /// Enum the input is written in
        #[arg(long)]
        from: String,
        /// Enum to write the output in
        #[arg(long)]
        to: String,
        /// Path to the JSON wire value, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Validate a wire value against an enum's JSON Schema
    Validate {
        /// Path to the definition file (.toml or .json)
        definitions: PathBuf,
        /// Enum the wire value belongs to
        #[arg(long = "enum")]
        enum_name: String,
        /// Path to the JSON wire value, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        );
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("cannot set default tracing subscriber: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { definitions } => {
            commands::check::cmd_check(&definitions, cli.output, cli.quiet);
        }
        Commands::Schema {
            definitions,
            enum_name,
        } => {
            commands::schema::cmd_schema(&definitions, enum_name.as_deref(), cli.output, cli.quiet);
        }
        Commands::Parse {
            definitions,
            enum_name,
            input,
        } => {
            commands::parse::cmd_parse(&definitions, &enum_name, &input, cli.output, cli.quiet);
        }
        Commands::Convert {
            definitions,
            from,
            to,
            input,
        } => {
            commands::convert::cmd_convert(&definitions, &from, &to, &input, cli.output, cli.quiet);
        }
        Commands::Validate {
            definitions,
            enum_name,
            input,
        } => {
            commands::validate::cmd_validate(
                &definitions,
                &enum_name,
                &input,
                cli.output,
                cli.quiet,
            );
        }
    }
}

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
