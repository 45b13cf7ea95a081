//! # docqa Core
//!
//! Session orchestration for document question answering: which collection
//! is active, which files have been ingested into it, and the
//! question/answer history with source citations.
//!
//! The retrieval engine and the format-specific loaders are collaborators
//! reached through traits ([`engine::RetrievalEngine`],
//! [`loader::LoaderFactory`]). This crate contains no tokio, filesystem
//! I/O, or document-parsing dependencies; the `docqa` app crate supplies
//! concrete implementations.
//!
//! ```text
//!  file ──▶ IngestionTracker ──▶ LoaderRegistry ──▶ RetrievalEngine.ingest
//!                 │                                        │
//!                 └──────────── IngestedFile ◀─── chunk count
//!
//!  prompt ──▶ QueryOrchestrator ──▶ RetrievalEngine.query
//!                 │                        │
//!                 └──▶ ConversationLog ◀───┘ answer + citations
//! ```

pub mod chunk;
pub mod citation;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod file_type;
pub mod loader;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod tracker;

pub use citation::Citation;
pub use conversation::{ConversationLog, ConversationTurn, Role};
pub use engine::{EngineFactory, QueryAnswer, RetrievalEngine, RetrievedPassage};
pub use error::{IngestError, QueryError, SessionError};
pub use file_type::FileType;
pub use loader::{DocumentUnit, Loader, LoaderFactory, LoaderRegistry};
pub use orchestrator::{AskOutcome, QueryOrchestrator};
pub use session::{CollectionSession, EngineSlot, UploadSink};
pub use tracker::{
    BatchReport, FileDescriptor, IngestOutcome, IngestReport, IngestedFile, IngestionTracker,
};
