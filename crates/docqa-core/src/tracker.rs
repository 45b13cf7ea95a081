//! Idempotent ingestion bookkeeping.
//!
//! The tracker owns the set of [`IngestedFile`] records for the active
//! collection. A file is either absent or present with the chunk count the
//! engine reported; nothing is recorded until the engine call succeeds.
//! Uniqueness is by file name only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::IngestError;
use crate::file_type::FileType;
use crate::loader::LoaderRegistry;
use crate::session::{EngineSlot, UploadSink};

/// An uploaded file as presented for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub byte_size: u64,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, byte_size: u64) -> Self {
        Self {
            name: name.into(),
            byte_size,
        }
    }
}

/// Record of a successfully ingested file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestedFile {
    pub name: String,
    pub byte_size: u64,
    pub file_type: FileType,
    pub ingested_at: DateTime<Utc>,
    pub chunk_count: usize,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
}

impl IngestedFile {
    /// Ingestion time as `YYYY-MM-DD HH:MM` (UTC).
    pub fn ingested_at_display(&self) -> String {
        self.ingested_at.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Byte size with thousands separators.
    pub fn size_display(&self) -> String {
        format_thousands(self.byte_size)
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested(IngestedFile),
    /// A file with the same name is already recorded; nothing was done.
    AlreadyIngested,
    Rejected(IngestError),
}

/// Per-file result of an ingestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub file_name: String,
    pub outcome: IngestOutcome,
}

impl IngestReport {
    pub fn is_ingested(&self) -> bool {
        matches!(self.outcome, IngestOutcome::Ingested(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, IngestOutcome::AlreadyIngested)
    }

    pub fn error(&self) -> Option<&IngestError> {
        match &self.outcome {
            IngestOutcome::Rejected(e) => Some(e),
            _ => None,
        }
    }

    /// One-line, user-facing description of the outcome.
    pub fn message(&self) -> String {
        match &self.outcome {
            IngestOutcome::Ingested(file) => {
                format!("Processed {} chunks from {}", file.chunk_count, file.name)
            }
            IngestOutcome::AlreadyIngested => {
                format!("Skipped {}: already ingested", self.file_name)
            }
            IngestOutcome::Rejected(e) => e.to_string(),
        }
    }
}

/// Results for a batch, one report per submitted file, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub reports: Vec<IngestReport>,
}

impl BatchReport {
    pub fn ingested(&self) -> usize {
        self.reports.iter().filter(|r| r.is_ingested()).count()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.error().is_some()).count()
    }

    /// Chunks produced by files ingested in this batch.
    pub fn chunks_written(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|r| match &r.outcome {
                IngestOutcome::Ingested(f) => Some(f.chunk_count),
                _ => None,
            })
            .sum()
    }
}

/// Ingested-file records for the active collection.
#[derive(Debug, Clone, Default)]
pub struct IngestionTracker {
    files: Vec<IngestedFile>,
}

impl IngestionTracker {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&IngestedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Records in ingestion order.
    pub fn files(&self) -> &[IngestedFile] {
        &self.files
    }

    pub fn total_chunks(&self) -> usize {
        self.files.iter().map(|f| f.chunk_count).sum()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Ingest one file.
    ///
    /// Resolution order: extension, duplicate name, loader, engine. Every
    /// failure after the loader lookup (engine binding, upload write,
    /// loader open, engine ingest) becomes [`IngestError::Failure`] and
    /// leaves the tracker untouched.
    pub async fn ingest(
        &mut self,
        engine: &mut EngineSlot<'_>,
        loaders: &LoaderRegistry,
        uploads: &dyn UploadSink,
        file: &FileDescriptor,
        bytes: &[u8],
    ) -> IngestReport {
        let outcome = self.ingest_inner(engine, loaders, uploads, file, bytes).await;
        match &outcome {
            IngestOutcome::Ingested(record) => tracing::info!(
                file = %record.name,
                file_type = %record.file_type,
                chunks = record.chunk_count,
                "ingested file"
            ),
            IngestOutcome::AlreadyIngested => {
                tracing::debug!(file = %file.name, "skipping already ingested file")
            }
            IngestOutcome::Rejected(e) => tracing::warn!(file = %file.name, "{}", e),
        }
        IngestReport {
            file_name: file.name.clone(),
            outcome,
        }
    }

    async fn ingest_inner(
        &mut self,
        engine: &mut EngineSlot<'_>,
        loaders: &LoaderRegistry,
        uploads: &dyn UploadSink,
        file: &FileDescriptor,
        bytes: &[u8],
    ) -> IngestOutcome {
        let Some(file_type) = FileType::from_file_name(&file.name) else {
            return IngestOutcome::Rejected(IngestError::UnsupportedFileType {
                file_name: file.name.clone(),
            });
        };

        if self.contains(&file.name) {
            return IngestOutcome::AlreadyIngested;
        }

        let Some(factory) = loaders.loader_for(file_type) else {
            return IngestOutcome::Rejected(IngestError::NoLoader {
                file_name: file.name.clone(),
                file_type,
            });
        };

        let failure = |reason: String| {
            IngestOutcome::Rejected(IngestError::Failure {
                file_name: file.name.clone(),
                reason,
            })
        };

        let engine = match engine.get() {
            Ok(engine) => engine,
            Err(e) => return failure(e.to_string()),
        };

        let path = match uploads.persist(engine.collection(), &file.name, bytes) {
            Ok(path) => path,
            Err(e) => return failure(format!("{:#}", e)),
        };

        let loader = match factory.open(&path) {
            Ok(loader) => loader,
            Err(e) => return failure(format!("{:#}", e)),
        };

        let chunk_count = match engine.ingest(loader.as_ref()).await {
            Ok(n) => n,
            Err(e) => return failure(format!("{:#}", e)),
        };

        let record = IngestedFile {
            name: file.name.clone(),
            byte_size: file.byte_size,
            file_type,
            ingested_at: Utc::now(),
            chunk_count,
            sha256: format!("{:x}", Sha256::digest(bytes)),
        };
        self.files.push(record.clone());
        IngestOutcome::Ingested(record)
    }
}

pub(crate) fn format_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, chunks: usize) -> IngestedFile {
        IngestedFile {
            name: name.to_string(),
            byte_size: 1234,
            file_type: FileType::Text,
            ingested_at: Utc::now(),
            chunk_count: chunks,
            sha256: String::new(),
        }
    }

    #[test]
    fn format_thousands_groups_digits() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn report_messages() {
        let ingested = IngestReport {
            file_name: "report.pdf".into(),
            outcome: IngestOutcome::Ingested(record("report.pdf", 12)),
        };
        assert_eq!(ingested.message(), "Processed 12 chunks from report.pdf");

        let skipped = IngestReport {
            file_name: "report.pdf".into(),
            outcome: IngestOutcome::AlreadyIngested,
        };
        assert_eq!(skipped.message(), "Skipped report.pdf: already ingested");
        assert!(skipped.error().is_none());
    }

    #[test]
    fn batch_counts() {
        let batch = BatchReport {
            reports: vec![
                IngestReport {
                    file_name: "a.txt".into(),
                    outcome: IngestOutcome::Ingested(record("a.txt", 3)),
                },
                IngestReport {
                    file_name: "b.png".into(),
                    outcome: IngestOutcome::Rejected(IngestError::UnsupportedFileType {
                        file_name: "b.png".into(),
                    }),
                },
                IngestReport {
                    file_name: "a.txt".into(),
                    outcome: IngestOutcome::AlreadyIngested,
                },
            ],
        };
        assert_eq!(batch.ingested(), 1);
        assert_eq!(batch.failed(), 1);
        assert_eq!(batch.skipped(), 1);
        assert_eq!(batch.chunks_written(), 3);
    }

    #[test]
    fn display_helpers() {
        let file = record("a.txt", 1);
        assert_eq!(file.size_display(), "1,234");
        assert_eq!(file.ingested_at_display().len(), "2024-01-01 00:00".len());
    }
}
