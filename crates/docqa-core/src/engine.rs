//! Retrieval engine contract.
//!
//! The engine owns one named collection: it consumes loaders during
//! ingestion, answers prompts with retrieved passages, and can drop the
//! collection's stored vectors. Its failures are implementation-defined,
//! so every method returns [`anyhow::Result`]; the session converts them
//! into the typed outcomes in [`crate::error`].
//!
//! Engines are created through an [`EngineFactory`] so the session can
//! bind lazily and re-bind after a collection switch or clear.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::loader::Loader;

/// A passage returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Origin document identifier, if the engine knows it.
    pub source_id: Option<String>,
    /// Full passage text; the conversation log truncates it for display.
    pub excerpt: String,
}

impl RetrievedPassage {
    pub fn new(source_id: Option<String>, excerpt: impl Into<String>) -> Self {
        Self {
            source_id,
            excerpt: excerpt.into(),
        }
    }
}

/// Result of [`RetrievalEngine::query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    /// `None` when the engine reported no sources at all.
    #[serde(default)]
    pub sources: Option<Vec<RetrievedPassage>>,
}

impl QueryAnswer {
    pub fn new(answer: impl Into<String>, sources: Vec<RetrievedPassage>) -> Self {
        Self {
            answer: answer.into(),
            sources: Some(sources),
        }
    }

    /// An answer without a sources field.
    pub fn without_sources(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: None,
        }
    }
}

/// Engine bound to a single collection.
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    /// Name of the collection this engine is bound to.
    fn collection(&self) -> &str;

    /// Parse and embed the loader's document, returning the number of
    /// retrievable chunks produced.
    async fn ingest(&self, loader: &dyn Loader) -> Result<usize>;

    /// Answer a prompt from the collection's contents.
    async fn query(&self, prompt: &str) -> Result<QueryAnswer>;

    /// Delete the collection's stored vectors. Best-effort.
    async fn delete_collection(&self) -> Result<()>;
}

/// Constructs engines bound to a named collection.
pub trait EngineFactory: Send + Sync {
    fn bind(&self, collection: &str) -> Result<Box<dyn RetrievalEngine>>;
}
