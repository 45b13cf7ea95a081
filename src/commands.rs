//! One-shot CLI commands and the session wiring they share.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use docqa_core::store::memory::InMemoryStore;
use docqa_core::store::Store;
use docqa_core::{
    AskOutcome, BatchReport, CollectionSession, ConversationTurn, FileDescriptor, IngestError,
};
use walkdir::WalkDir;

use crate::config::Config;
use crate::engine::{EngineSettings, LocalEngineFactory};
use crate::loaders::default_registry;
use crate::progress::{IngestProgressEvent, IngestProgressReporter};
use crate::uploads::UploadDir;

/// Open a session on `collection` (or the configured default) with the
/// bundled loaders, the local engine over `store`, and the configured
/// upload directory.
pub fn open_session(
    config: &Config,
    store: Arc<dyn Store>,
    collection: Option<&str>,
) -> Result<CollectionSession> {
    let name = collection.unwrap_or(&config.session.default_collection);
    let factory = LocalEngineFactory::new(store, EngineSettings::from_config(config));
    let session = CollectionSession::new(
        name,
        Some(Arc::new(factory)),
        default_registry(),
        Arc::new(UploadDir::from_config(&config.uploads)),
    )?;
    Ok(session)
}

/// A session backed by a fresh in-memory store.
pub fn open_local_session(config: &Config, collection: Option<&str>) -> Result<CollectionSession> {
    open_session(config, Arc::new(InMemoryStore::new()), collection)
}

/// Files read from the command line, plus the paths that could not be read.
#[derive(Debug, Default)]
pub struct InputSet {
    pub files: Vec<(FileDescriptor, Vec<u8>)>,
    pub failures: Vec<IngestError>,
}

/// Read every file named by `paths`, walking directories recursively.
/// Entries are sorted within each directory. A path that is missing or
/// unreadable is recorded in [`InputSet::failures`] and the rest are
/// still read.
pub fn read_inputs(paths: &[PathBuf]) -> InputSet {
    let mut inputs = InputSet::default();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        inputs.push(entry.path(), read_input(entry.path()))
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let at = e.path().unwrap_or(path.as_path()).to_path_buf();
                        inputs.fail(&at, e.to_string());
                    }
                }
            }
        } else if path.is_file() {
            inputs.push(path, read_input(path));
        } else {
            inputs.fail(path, "No such file or directory".to_string());
        }
    }
    inputs
}

impl InputSet {
    fn push(&mut self, path: &Path, read: Result<(FileDescriptor, Vec<u8>)>) {
        match read {
            Ok(file) => self.files.push(file),
            Err(e) => self.fail(path, format!("{:#}", e)),
        }
    }

    fn fail(&mut self, path: &Path, reason: String) {
        tracing::warn!(path = %path.display(), %reason, "skipping unreadable input");
        self.failures.push(IngestError::Failure {
            file_name: path.display().to_string(),
            reason,
        });
    }
}

fn read_input(path: &Path) -> Result<(FileDescriptor, Vec<u8>)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((FileDescriptor::new(name, bytes.len() as u64), bytes))
}

/// Ingest `files`, reporting each through `progress`.
pub async fn ingest_files(
    session: &mut CollectionSession,
    files: Vec<(FileDescriptor, Vec<u8>)>,
    progress: &dyn IngestProgressReporter,
) -> BatchReport {
    let collection = session.collection_name().to_string();
    session
        .ingest_batch_with(files, |n, total, report| {
            progress.report(&IngestProgressEvent {
                collection: &collection,
                n,
                total,
                report,
            })
        })
        .await
}

/// Print one line per read failure and per batch report, then the totals.
pub fn print_batch(read_failures: &[IngestError], batch: &BatchReport) {
    for failure in read_failures {
        println!("{}", failure);
    }
    for report in &batch.reports {
        println!("{}", report.message());
    }
    println!(
        "\n{} ingested, {} skipped, {} failed ({} chunks)",
        batch.ingested(),
        batch.skipped(),
        batch.failed() + read_failures.len(),
        batch.chunks_written()
    );
}

/// Print the ingested-file listing for the session.
pub fn print_files(session: &CollectionSession) {
    let files = session.files();
    if files.is_empty() {
        println!("No documents in collection '{}'.", session.collection_name());
        return;
    }
    println!(
        "Collection '{}': {} documents, {} chunks",
        session.collection_name(),
        files.len(),
        session.tracker().total_chunks()
    );
    println!(
        "{:<32} {:<6} {:>12} {:>7}  INGESTED",
        "NAME", "TYPE", "BYTES", "CHUNKS"
    );
    for f in files {
        println!(
            "{:<32} {:<6} {:>12} {:>7}  {}",
            f.name,
            f.file_type.label(),
            f.size_display(),
            f.chunk_count,
            f.ingested_at_display()
        );
    }
}

pub fn print_turn(turn: &ConversationTurn) {
    println!("{}", turn.content());
    if !turn.sources().is_empty() {
        println!("\nSources:");
        for (i, c) in turn.sources().iter().enumerate() {
            println!("  [{}] {}: {}", i + 1, c.source_id(), c.excerpt());
        }
    }
}

/// `docqa ingest`: ingest paths and list the resulting documents.
pub async fn run_ingest(
    config: &Config,
    paths: &[PathBuf],
    collection: Option<&str>,
    progress: &dyn IngestProgressReporter,
) -> Result<()> {
    let mut session = open_local_session(config, collection)?;
    let inputs = read_inputs(paths);
    let batch = ingest_files(&mut session, inputs.files, progress).await;
    print_batch(&inputs.failures, &batch);
    println!();
    print_files(&session);
    if batch.ingested() == 0 && (batch.failed() > 0 || !inputs.failures.is_empty()) {
        bail!("no files were ingested");
    }
    Ok(())
}

/// `docqa ask`: ingest `files`, then answer `prompt` once.
pub async fn run_ask(
    config: &Config,
    prompt: &str,
    files: &[PathBuf],
    collection: Option<&str>,
    json: bool,
    progress: &dyn IngestProgressReporter,
) -> Result<()> {
    let mut session = open_local_session(config, collection)?;
    let inputs = read_inputs(files);
    for failure in &inputs.failures {
        eprintln!("{}", failure);
    }
    let batch = ingest_files(&mut session, inputs.files, progress).await;

    let outcome = session.ask(prompt).await;
    if outcome == AskOutcome::Skipped {
        bail!("prompt is empty");
    }
    let Some(answer) = session.conversation().last() else {
        bail!("no answer recorded");
    };

    if json {
        let out = serde_json::json!({
            "collection": session.collection_name(),
            "question": prompt,
            "answer": answer.content(),
            "sources": answer.sources(),
            "ok": outcome.is_answered(),
            "files": session.files(),
            "errors": inputs
                .failures
                .iter()
                .chain(batch.reports.iter().filter_map(|r| r.error()))
                .map(|e| e.to_string())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_turn(answer);
    }

    if let AskOutcome::Failed(e) = outcome {
        bail!(e);
    }
    Ok(())
}
