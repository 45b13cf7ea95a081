//! Local keyword-retrieval engine.
//!
//! [`LocalEngine`] implements the [`RetrievalEngine`] contract over a shared
//! [`Store`]: ingestion chunks every loaded unit and stores the chunks under
//! the bound collection; queries rank the collection's chunks by keyword
//! coverage and answer extractively with the sentences that mention the
//! query terms.
//!
//! Engines are cheap handles. [`LocalEngineFactory`] hands out one per
//! collection, all sharing the same store.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use docqa_core::chunk::chunk_text;
use docqa_core::store::{PassageHit, Store};
use docqa_core::{EngineFactory, Loader, QueryAnswer, RetrievalEngine, RetrievedPassage};

use crate::config::Config;

/// Sentences quoted in an extractive answer.
const MAX_ANSWER_SENTENCES: usize = 3;

/// Retrieval settings shared by every engine a factory creates.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub max_tokens: usize,
    pub top_k: usize,
    pub min_score: f64,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_tokens: config.chunking.max_tokens,
            top_k: config.retrieval.top_k,
            min_score: config.retrieval.min_score,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct LocalEngineFactory {
    store: Arc<dyn Store>,
    settings: EngineSettings,
}

impl LocalEngineFactory {
    pub fn new(store: Arc<dyn Store>, settings: EngineSettings) -> Self {
        Self { store, settings }
    }
}

impl EngineFactory for LocalEngineFactory {
    fn bind(&self, collection: &str) -> Result<Box<dyn RetrievalEngine>> {
        Ok(Box::new(LocalEngine {
            collection: collection.to_string(),
            store: self.store.clone(),
            settings: self.settings,
        }))
    }
}

pub struct LocalEngine {
    collection: String,
    store: Arc<dyn Store>,
    settings: EngineSettings,
}

#[async_trait]
impl RetrievalEngine for LocalEngine {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn ingest(&self, loader: &dyn Loader) -> Result<usize> {
        let units = loader.load()?;
        let mut chunks = Vec::new();
        for unit in &units {
            chunks.extend(chunk_text(&unit.source, &unit.content, self.settings.max_tokens));
        }
        if chunks.is_empty() {
            anyhow::bail!("no extractable text");
        }
        let written = self.store.insert_chunks(&self.collection, &chunks).await?;
        tracing::debug!(
            collection = %self.collection,
            path = %loader.path().display(),
            units = units.len(),
            chunks = written,
            "stored chunks"
        );
        Ok(written)
    }

    async fn query(&self, prompt: &str) -> Result<QueryAnswer> {
        let hits: Vec<PassageHit> = self
            .store
            .keyword_search(&self.collection, prompt, self.settings.top_k)
            .await?
            .into_iter()
            .filter(|h| h.score >= self.settings.min_score)
            .collect();

        if hits.is_empty() {
            return Ok(QueryAnswer::new(
                format!(
                    "I could not find any relevant passages in collection '{}'.",
                    self.collection
                ),
                Vec::new(),
            ));
        }

        let answer = compose_answer(prompt, &hits);
        let sources = hits
            .into_iter()
            .map(|h| RetrievedPassage::new(Some(h.source), h.text))
            .collect();
        Ok(QueryAnswer::new(answer, sources))
    }

    async fn delete_collection(&self) -> Result<()> {
        let existed = self.store.delete_collection(&self.collection).await?;
        tracing::debug!(collection = %self.collection, existed, "deleted stored chunks");
        Ok(())
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(str::to_lowercase)
}

/// Quote the first sentences, in rank order, that mention a query word.
/// Falls back to the best passage when no sentence does.
fn compose_answer(prompt: &str, hits: &[PassageHit]) -> String {
    let wanted: Vec<String> = words(prompt).collect();
    let mut picked: Vec<&str> = Vec::new();

    'outer: for hit in hits {
        for sentence in sentences(&hit.text) {
            if picked.contains(&sentence) {
                continue;
            }
            if words(sentence).any(|w| wanted.contains(&w)) {
                picked.push(sentence);
                if picked.len() == MAX_ANSWER_SENTENCES {
                    break 'outer;
                }
            }
        }
    }

    if picked.is_empty() {
        return hits[0].text.trim().to_string();
    }
    picked.join(" ")
}

/// Sentences split on `.`, `!`, `?` and line breaks, terminators kept.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?' | '\n') {
            let end = i + c.len_utf8();
            let s = text[start..end].trim();
            if !s.is_empty() {
                out.push(s);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}
