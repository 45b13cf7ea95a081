//! In-memory [`Store`] implementation.
//!
//! Collections live in a `HashMap` behind a `std::sync::RwLock`. Search is a
//! brute-force keyword overlap score: the fraction of distinct query terms
//! that appear in a chunk, with term frequency breaking ties.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use async_trait::async_trait;

use crate::chunk::Chunk;

use super::{PassageHit, Store};

/// Words ignored when scoring, unless the query has nothing else.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "about", "as", "at", "be", "by", "can", "do", "does", "for", "from",
    "how", "in", "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "what", "when",
    "where", "which", "who", "why", "with",
];

/// Process-local passage store.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Chunk>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Chunk>>> {
        self.collections.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Chunk>>> {
        self.collections.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Names of collections that currently hold chunks.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Lowercased alphanumeric terms of `text`.
fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn query_terms(query: &str) -> HashSet<String> {
    let all: HashSet<String> = terms(query).into_iter().collect();
    let content: HashSet<String> = all
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect();
    if content.is_empty() {
        all
    } else {
        content
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<usize> {
        let mut collections = self.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .extend_from_slice(chunks);
        Ok(chunks.len())
    }

    async fn keyword_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PassageHit>> {
        let wanted = query_terms(query);
        if wanted.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let collections = self.read();
        let Some(chunks) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f64, usize, &Chunk)> = chunks
            .iter()
            .filter_map(|chunk| {
                let chunk_terms = terms(&chunk.text);
                let matched = wanted
                    .iter()
                    .filter(|t| chunk_terms.iter().any(|ct| ct == *t))
                    .count();
                if matched == 0 {
                    return None;
                }
                let frequency = chunk_terms.iter().filter(|ct| wanted.contains(*ct)).count();
                Some((matched as f64 / wanted.len() as f64, frequency, chunk))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.cmp(&a.1))
        });
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, _, chunk)| PassageHit {
                chunk_id: chunk.id.clone(),
                source: chunk.source.clone(),
                text: chunk.text.clone(),
                score,
            })
            .collect())
    }

    async fn delete_collection(&self, collection: &str) -> Result<bool> {
        Ok(self.write().remove(collection).is_some())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.read().get(collection).map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::chunk_text;

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = InMemoryStore::new();
        store
            .insert_chunks("a", &chunk_text("a.txt", "rust cargo crates", 700))
            .await
            .unwrap();
        store
            .insert_chunks("b", &chunk_text("b.txt", "python pip wheels", 700))
            .await
            .unwrap();

        assert_eq!(store.count("a").await.unwrap(), 1);
        assert!(store.keyword_search("a", "python", 5).await.unwrap().is_empty());
        assert_eq!(store.keyword_search("b", "python", 5).await.unwrap().len(), 1);
        assert_eq!(store.collections(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn ranks_by_term_coverage() {
        let store = InMemoryStore::new();
        let text = "Deployment uses Kubernetes.\n\nDocker images are built nightly.\n\nKubernetes deployment runbook for Docker.";
        store
            .insert_chunks("ops", &chunk_text("ops.md", text, 12))
            .await
            .unwrap();

        let hits = store
            .keyword_search("ops", "How does the Kubernetes deployment use Docker?", 3)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits[0].text.contains("runbook"));
        // "uses" does not match "use"
        assert!((hits[0].score - 0.75).abs() < 1e-9);
        assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);
        assert_eq!(hits[0].source, "ops.md");
    }

    #[tokio::test]
    async fn stopword_only_query_still_matches() {
        let store = InMemoryStore::new();
        store
            .insert_chunks("c", &chunk_text("c.txt", "what it is", 700))
            .await
            .unwrap();
        let hits = store.keyword_search("c", "what is it", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn delete_drops_collection() {
        let store = InMemoryStore::new();
        store
            .insert_chunks("a", &chunk_text("a.txt", "text", 700))
            .await
            .unwrap();
        assert!(store.delete_collection("a").await.unwrap());
        assert!(!store.delete_collection("a").await.unwrap());
        assert_eq!(store.count("a").await.unwrap(), 0);
    }
}
