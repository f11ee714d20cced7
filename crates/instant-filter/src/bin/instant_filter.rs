//! instant-filter - inspect how query strings compile into query documents.
//!
//! Run with: cargo run --bin instant-filter -- compile 'age__gt=30&name__icontains=bo'

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use instant_filter::{FilterConfig, FilterError, QueryCompiler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Compile HTTP query-string filters into document-store query documents.
#[derive(Parser)]
#[command(name = "instant-filter")]
#[command(version)]
struct Cli {
    /// Operator and identity-field configuration (JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a query string, e.g. 'age__gt=30&tag=a&tag=b'
    Compile {
        /// URL-encoded query string; a leading '?' is ignored
        query: String,
    },
    /// Build the smart-id document for an identifier
    Find {
        /// Opaque identifier
        id: String,
    },
    /// List operator tokens and the operator each resolves to
    Operators,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let compiler = match &cli.config {
        Some(path) => FilterConfig::from_path(path)
            .and_then(|config| config.build())
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => QueryCompiler::new(),
    };

    match cli.command {
        Command::Compile { query } => match compiler.compile_query_string(&query) {
            Ok(doc) => print_json(&doc, cli.compact),
            Err(err @ (FilterError::OperatorNotFound { .. } | FilterError::ValueInvalid { .. })) => {
                print_json(&err.to_body(), cli.compact)?;
                Err(err).context("query rejected")
            }
            Err(err) => Err(err.into()),
        },
        Command::Find { id } => print_json(&compiler.find(&id), cli.compact),
        Command::Operators => {
            for entry in compiler.registry().entries() {
                println!("{:<12} {}", entry.token(), entry.operator());
            }
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}
