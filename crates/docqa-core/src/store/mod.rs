//! Passage storage for retrieval engines.
//!
//! The [`Store`] trait is the persistence seam behind an engine: chunks are
//! written per collection, searched per collection, and dropped per
//! collection. [`memory::InMemoryStore`] is the bundled backend.
//!
//! Implementations must be `Send + Sync`; several sessions may share one
//! store, each bound to its own collection.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::chunk::Chunk;

/// A chunk matched by a search, with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct PassageHit {
    pub chunk_id: String,
    pub source: String,
    pub text: String,
    /// Relevance in `[0.0, 1.0]`.
    pub score: f64,
}

/// Abstract passage store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_chunks`](Store::insert_chunks) | Append chunks to a collection |
/// | [`keyword_search`](Store::keyword_search) | Rank a collection's chunks for a query |
/// | [`delete_collection`](Store::delete_collection) | Drop every chunk in a collection |
/// | [`count`](Store::count) | Number of chunks in a collection |
#[async_trait]
pub trait Store: Send + Sync {
    /// Append chunks to `collection`, creating it if needed. Returns the
    /// number of chunks written.
    async fn insert_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<usize>;

    /// Best-scoring chunks for `query`, highest first, at most `limit`.
    async fn keyword_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PassageHit>>;

    /// Drop the collection. Returns whether it existed.
    async fn delete_collection(&self, collection: &str) -> Result<bool>;

    async fn count(&self, collection: &str) -> Result<usize>;
}
