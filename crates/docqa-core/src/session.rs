//! The collection session: single owner of all per-user state.
//!
//! A [`CollectionSession`] holds the active collection name, the lazily
//! bound [`RetrievalEngine`], the [`IngestionTracker`], and the
//! [`ConversationLog`]. Switching or clearing the collection resets the
//! tracker and log together and releases the engine handle, so the next
//! ingest or query binds a fresh engine.
//!
//! Every mutating method takes `&mut self`, so a switch or clear can never
//! run while an ingest or query holds the engine handle.
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use docqa_core::{CollectionSession, LoaderRegistry, UploadSink};
//!
//! struct Discard;
//!
//! impl UploadSink for Discard {
//!     fn persist(&self, _collection: &str, name: &str, _bytes: &[u8]) -> anyhow::Result<PathBuf> {
//!         Ok(PathBuf::from(name))
//!     }
//! }
//!
//! let mut session =
//!     CollectionSession::new("research", None, LoaderRegistry::new(), Arc::new(Discard)).unwrap();
//! assert!(!session.is_engine_available());
//! assert!(session.set_collection("  ").is_err());
//! assert_eq!(session.collection_name(), "research");
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::conversation::ConversationLog;
use crate::engine::{EngineFactory, RetrievalEngine};
use crate::error::SessionError;
use crate::loader::LoaderRegistry;
use crate::orchestrator::{AskOutcome, QueryOrchestrator};
use crate::tracker::{BatchReport, FileDescriptor, IngestReport, IngestedFile, IngestionTracker};

/// Write-through storage for uploaded bytes.
///
/// Returns the path a loader should be opened on.
pub trait UploadSink: Send + Sync {
    fn persist(&self, collection: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Lazy access to the session's engine handle.
///
/// Borrowed out of a [`CollectionSession`] for the duration of one ingest or
/// query; binds through the factory on first use.
pub struct EngineSlot<'a> {
    collection: &'a str,
    factory: Option<&'a dyn EngineFactory>,
    engine: &'a mut Option<Box<dyn RetrievalEngine>>,
}

impl<'a> EngineSlot<'a> {
    pub fn new(
        collection: &'a str,
        factory: Option<&'a dyn EngineFactory>,
        engine: &'a mut Option<Box<dyn RetrievalEngine>>,
    ) -> Self {
        Self {
            collection,
            factory,
            engine,
        }
    }

    /// Return the bound engine, binding it first if necessary.
    pub fn get(&mut self) -> Result<&dyn RetrievalEngine, SessionError> {
        if self.engine.is_none() {
            let factory = self.factory.ok_or(SessionError::EngineUnavailable)?;
            let engine = factory
                .bind(self.collection)
                .map_err(|e| SessionError::EngineBind {
                    collection: self.collection.to_string(),
                    reason: format!("{:#}", e),
                })?;
            tracing::info!(collection = self.collection, "bound retrieval engine");
            *self.engine = Some(engine);
        }
        self.engine.as_deref().ok_or(SessionError::EngineUnavailable)
    }

    /// Like [`get`](Self::get), but keeps the borrow for the slot's lifetime.
    pub fn into_engine(mut self) -> Result<&'a dyn RetrievalEngine, SessionError> {
        self.get()?;
        let engine: &'a Option<Box<dyn RetrievalEngine>> = self.engine;
        engine.as_deref().ok_or(SessionError::EngineUnavailable)
    }
}

/// Per-user session state for one active collection.
pub struct CollectionSession {
    collection: String,
    factory: Option<Arc<dyn EngineFactory>>,
    engine: Option<Box<dyn RetrievalEngine>>,
    loaders: LoaderRegistry,
    uploads: Arc<dyn UploadSink>,
    tracker: IngestionTracker,
    log: ConversationLog,
    orchestrator: QueryOrchestrator,
}

impl CollectionSession {
    /// Create a session on `collection`.
    ///
    /// `factory` is `None` when no retrieval engine is available in this
    /// deployment; the session still works, but every ingest and query
    /// reports the engine as unavailable.
    pub fn new(
        collection: &str,
        factory: Option<Arc<dyn EngineFactory>>,
        loaders: LoaderRegistry,
        uploads: Arc<dyn UploadSink>,
    ) -> Result<Self, SessionError> {
        let collection = validate_name(collection)?;
        Ok(Self {
            collection,
            factory,
            engine: None,
            loaders,
            uploads,
            tracker: IngestionTracker::new(),
            log: ConversationLog::new(),
            orchestrator: QueryOrchestrator::new(),
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Whether an engine factory was supplied at construction.
    pub fn is_engine_available(&self) -> bool {
        self.factory.is_some()
    }

    /// Whether an engine handle is currently bound.
    pub fn is_engine_bound(&self) -> bool {
        self.engine.is_some()
    }

    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    pub fn tracker(&self) -> &IngestionTracker {
        &self.tracker
    }

    /// Ingested files in ingestion order.
    pub fn files(&self) -> &[IngestedFile] {
        self.tracker.files()
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.log
    }

    /// Make `name` the active collection.
    ///
    /// Returns `Ok(false)` when `name` is already active. Otherwise the
    /// engine handle is released and all ingestion and conversation records
    /// are discarded; they are not restored if the old name is selected
    /// again.
    pub fn set_collection(&mut self, name: &str) -> Result<bool, SessionError> {
        let name = validate_name(name)?;
        if name == self.collection {
            return Ok(false);
        }
        tracing::info!(from = %self.collection, to = %name, "switching collection");
        self.engine = None;
        self.tracker.clear();
        self.log.clear();
        self.collection = name;
        Ok(true)
    }

    /// Return the engine bound to the active collection, binding it if needed.
    pub fn ensure_engine_bound(&mut self) -> Result<&dyn RetrievalEngine, SessionError> {
        EngineSlot::new(&self.collection, self.factory.as_deref(), &mut self.engine).into_engine()
    }

    /// Delete the collection's stored vectors and reset local state.
    ///
    /// Local state is always reset and the collection name kept. If the
    /// engine cannot delete the stored vectors, the reset still happens and
    /// [`SessionError::PartialClear`] is returned.
    pub async fn clear(&mut self) -> Result<(), SessionError> {
        let remote = if self.factory.is_some() {
            let mut slot =
                EngineSlot::new(&self.collection, self.factory.as_deref(), &mut self.engine);
            match slot.get() {
                Ok(engine) => engine
                    .delete_collection()
                    .await
                    .map_err(|e| format!("{:#}", e)),
                Err(e) => Err(e.to_string()),
            }
        } else {
            Ok(())
        };

        self.engine = None;
        self.tracker.clear();
        self.log.clear();

        match remote {
            Ok(()) => {
                tracing::info!(collection = %self.collection, "cleared collection");
                Ok(())
            }
            Err(reason) => {
                let err = SessionError::PartialClear {
                    collection: self.collection.clone(),
                    reason,
                };
                tracing::warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Drop the conversation history only.
    pub fn clear_history(&mut self) {
        self.log.clear();
    }

    /// Ingest one file into the active collection.
    pub async fn ingest(&mut self, file: &FileDescriptor, bytes: &[u8]) -> IngestReport {
        let mut slot = EngineSlot::new(&self.collection, self.factory.as_deref(), &mut self.engine);
        self.tracker
            .ingest(&mut slot, &self.loaders, self.uploads.as_ref(), file, bytes)
            .await
    }

    /// Ingest files one after another, in order.
    ///
    /// A failure never stops the batch, and a file ingested earlier in the
    /// batch counts as a duplicate for later files with the same name.
    pub async fn ingest_batch(&mut self, files: Vec<(FileDescriptor, Vec<u8>)>) -> BatchReport {
        self.ingest_batch_with(files, |_, _, _| {}).await
    }

    /// [`ingest_batch`](Self::ingest_batch) with a callback invoked after
    /// each file as `(position, total, report)`, position starting at 1.
    pub async fn ingest_batch_with<F>(
        &mut self,
        files: Vec<(FileDescriptor, Vec<u8>)>,
        mut on_report: F,
    ) -> BatchReport
    where
        F: FnMut(usize, usize, &IngestReport) + Send,
    {
        let total = files.len();
        let mut batch = BatchReport::default();
        for (i, (file, bytes)) in files.into_iter().enumerate() {
            let report = self.ingest(&file, &bytes).await;
            on_report(i + 1, total, &report);
            batch.reports.push(report);
        }
        batch
    }

    /// Ask a question. Never fails; see [`QueryOrchestrator::ask`].
    pub async fn ask(&mut self, prompt: &str) -> AskOutcome {
        let mut slot = EngineSlot::new(&self.collection, self.factory.as_deref(), &mut self.engine);
        self.orchestrator.ask(&mut slot, &mut self.log, prompt).await
    }
}

fn validate_name(name: &str) -> Result<String, SessionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Discard;

    impl UploadSink for Discard {
        fn persist(&self, _collection: &str, file_name: &str, _bytes: &[u8]) -> Result<PathBuf> {
            Ok(PathBuf::from(file_name))
        }
    }

    fn session(name: &str) -> CollectionSession {
        CollectionSession::new(name, None, LoaderRegistry::new(), Arc::new(Discard)).unwrap()
    }

    #[test]
    fn blank_name_rejected_at_construction() {
        let err = CollectionSession::new("   ", None, LoaderRegistry::new(), Arc::new(Discard))
            .err()
            .unwrap();
        assert_eq!(err, SessionError::InvalidName);
    }

    #[test]
    fn name_is_trimmed() {
        let s = session("  research ");
        assert_eq!(s.collection_name(), "research");
    }

    #[test]
    fn same_name_is_noop() {
        let mut s = session("default");
        assert_eq!(s.set_collection("default"), Ok(false));
        assert_eq!(s.set_collection(" default "), Ok(false));
    }

    #[test]
    fn blank_switch_leaves_state() {
        let mut s = session("default");
        s.log.append_user("q");
        assert_eq!(s.set_collection(""), Err(SessionError::InvalidName));
        assert_eq!(s.collection_name(), "default");
        assert_eq!(s.conversation().len(), 1);
    }

    #[test]
    fn switch_discards_history() {
        let mut s = session("a");
        s.log.append_user("q");
        assert_eq!(s.set_collection("b"), Ok(true));
        assert!(s.conversation().is_empty());
        assert_eq!(s.collection_name(), "b");
    }

    #[test]
    fn no_factory_means_unavailable() {
        let mut s = session("a");
        assert!(!s.is_engine_available());
        assert_eq!(
            s.ensure_engine_bound().err(),
            Some(SessionError::EngineUnavailable)
        );
        assert!(!s.is_engine_bound());
    }
}
