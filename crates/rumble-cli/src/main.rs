//! `rumble-schemas`: keep the committed schema artifacts in step with the
//! message catalog.
//!
//! Exit codes: 0 on success, 1 when `check` finds drift, 2 when the
//! command could not run (bad catalog, unreadable root, deadline).

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rumble::drift::DEFAULT_SCHEMA_ROOT;

#[derive(Parser)]
#[command(name = "rumble-schemas")]
#[command(about = "Generate and check Rumble's JSON Schema artifacts")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct RootArg {
    /// Directory the artifacts are committed under
    #[arg(long, env = "RUMBLE_SCHEMA_DIR", default_value = DEFAULT_SCHEMA_ROOT)]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare committed artifacts against the catalog
    Check {
        #[command(flatten)]
        root: RootArg,

        /// Give up after this many milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,

        /// Extra attempts for reads that fail transiently
        #[arg(long)]
        retries: Option<u32>,

        /// Fail when artifacts exist that no catalog entry claims
        #[arg(long)]
        strict_orphans: bool,
    },

    /// Rewrite every artifact that differs from the catalog
    Generate {
        #[command(flatten)]
        root: RootArg,

        /// Also delete artifacts no catalog entry claims
        #[arg(long)]
        prune: bool,
    },

    /// Print every catalog entry with its direction and artifact paths
    List,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            root,
            deadline_ms,
            retries,
            strict_orphans,
        } => {
            let options = commands::check::CheckOptions {
                root: root.root,
                deadline_ms,
                retries,
                strict_orphans,
            };
            commands::check::run(options).await
        }
        Commands::Generate { root, prune } => commands::generate::run(root.root, prune).await,
        Commands::List => commands::list::run(),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
