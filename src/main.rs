mod commands;
mod info;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::OutputFormat;
use docxref::diagnostics;

/// Exit code for runtime errors: bad config, unreadable content, uid collisions.
const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Parser)]
#[command(name = "docxref", version, about = "Cross-reference resolution for documentation builds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log pipeline progress (otherwise RUST_LOG applies).
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve all references and write the manifest
    Build {
        /// Diagnostics format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Exit 2 when any reference is unresolved
        #[arg(long)]
        strict: bool,
    },
    /// Verify the manifest on disk matches current content
    Check,
    /// Output the docxref reference document
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// List every uid with its link target
    List,
    /// Show what a single token resolves to
    Resolve {
        /// Reference token, e.g. `ReqRest.RestClient` or `getting_started`
        token: String,
    },
    /// Build, then rebuild whenever content changes
    Watch,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let root = PathBuf::from(".");
    let result = match cli.command {
        Commands::Build { format, strict } => commands::build(&root, strict, format),
        Commands::Check => commands::check(&root),
        Commands::Info { json } => {
            info::run(&root, json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::List => commands::list(&root).map(|()| ExitCode::SUCCESS),
        Commands::Resolve { token } => commands::resolve(&root, &token),
        Commands::Watch => watch::run(&root),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        },
    }
}
