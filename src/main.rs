//! # docqa CLI
//!
//! ## Usage
//!
//! ```bash
//! docqa --config ./config/docqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa ingest <paths...>` | Ingest files or directories and list the documents |
//! | `docqa ask "<prompt>" --file <path>` | Ingest files, then answer one question |
//! | `docqa chat` | Interactive question loop with collection commands |
//! | `docqa formats` | List supported formats and loader availability |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docqa::progress::ProgressMode;
use docqa::{chat, commands, config, formats, loaders, logging};

/// docqa: ask questions about your documents.
///
/// Configuration is read from `--config`, or `./config/docqa.toml` when that
/// file exists.
#[derive(Parser)]
#[command(name = "docqa", version, about = "Ask questions about a collection of documents")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress output on stderr. Defaults to `human` on a terminal, else `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest files or directories into a collection.
    ///
    /// Directories are walked recursively. Each file is reported as
    /// processed, skipped, or failed; failures never stop the batch.
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Collection name (defaults to `[session].default_collection`).
        #[arg(long)]
        collection: Option<String>,
    },

    /// Ingest files, then ask a single question.
    Ask {
        prompt: String,

        /// File or directory to ingest first. Repeatable.
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        #[arg(long)]
        collection: Option<String>,

        /// Print the answer, citations and ingested files as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive chat over a collection.
    Chat {
        #[arg(long)]
        collection: Option<String>,
    },

    /// List supported document formats.
    Formats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_or_default(cli.config.as_deref())?;
    logging::init_with_config(&cfg.logging);

    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Ingest { paths, collection } => {
            commands::run_ingest(&cfg, &paths, collection.as_deref(), progress.as_ref()).await?;
        }
        Commands::Ask {
            prompt,
            files,
            collection,
            json,
        } => {
            commands::run_ask(
                &cfg,
                &prompt,
                &files,
                collection.as_deref(),
                json,
                progress.as_ref(),
            )
            .await?;
        }
        Commands::Chat { collection } => {
            let session = commands::open_local_session(&cfg, collection.as_deref())?;
            chat::run_chat(session, progress.as_ref()).await?;
        }
        Commands::Formats => {
            formats::list_formats(&loaders::default_registry());
        }
    }

    Ok(())
}
