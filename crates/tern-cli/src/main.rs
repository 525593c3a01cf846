#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tern_core::{Config, Source};

#[derive(Parser, Debug)]
#[command(name = "tern")]
#[command(author, version, about = "Inspect how tern lexes and parses JavaScript expressions", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Print the token stream of a source file
    Tokens {
        /// File to read, relative to the working directory
        file: Option<PathBuf>,

        /// Source text to use instead of a file
        #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
        eval: Option<String>,
    },

    /// Parse a source file and print its expression tree
    Parse {
        /// File to read, relative to the working directory
        file: Option<PathBuf>,

        /// Source text to use instead of a file
        #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
        eval: Option<String>,

        /// Accept a sequence of statements instead of a single expression
        #[arg(long)]
        script: bool,

        /// Maximum expression nesting (overrides tern.json)
        #[arg(long, value_name = "N", env = "TERN_MAX_DEPTH")]
        max_depth: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::load(cwd)
        .into_diagnostic()?
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Tokens { file, eval }) => {
            let input =
                Source::load(&config.cwd, file.as_deref(), eval.as_deref()).into_diagnostic()?;
            commands::tokens::run(&input, cli.json)
        }
        Some(Commands::Parse {
            file,
            eval,
            script,
            max_depth,
        }) => {
            let mut options = config.parser;
            if let Some(max_depth) = max_depth {
                options.max_depth = max_depth;
            }
            let input =
                Source::load(&config.cwd, file.as_deref(), eval.as_deref()).into_diagnostic()?;
            commands::parse::run(&input, script, options, cli.json)
        }
    }
}
