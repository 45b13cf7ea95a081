//! Batch ingestion progress reporting.
//!
//! One event per file as a batch is ingested, written to **stderr** so
//! stdout remains parseable for scripts.

use std::io::Write;

use docqa_core::{IngestOutcome, IngestReport};

/// Progress of one file within a batch.
#[derive(Clone, Debug)]
pub struct IngestProgressEvent<'a> {
    pub collection: &'a str,
    /// Position in the batch, starting at 1.
    pub n: usize,
    pub total: usize,
    pub report: &'a IngestReport,
}

impl IngestProgressEvent<'_> {
    fn status(&self) -> &'static str {
        match self.report.outcome {
            IngestOutcome::Ingested(_) => "ingested",
            IngestOutcome::AlreadyIngested => "skipped",
            IngestOutcome::Rejected(_) => "failed",
        }
    }
}

/// Reports ingestion progress. Implementations write to stderr.
pub trait IngestProgressReporter: Send + Sync {
    fn report(&self, event: &IngestProgressEvent<'_>);
}

/// Human-friendly progress: `[2/5] research  ingested  Processed 3 chunks from a.pdf`.
pub struct StderrProgress;

impl IngestProgressReporter for StderrProgress {
    fn report(&self, event: &IngestProgressEvent<'_>) {
        let line = format!(
            "[{}/{}] {}  {:<8}  {}\n",
            event.n,
            event.total,
            event.collection,
            event.status(),
            event.report.message()
        );
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line.
pub struct JsonProgress;

impl JsonProgress {
    fn to_json(event: &IngestProgressEvent<'_>) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "event": "progress",
            "collection": event.collection,
            "n": event.n,
            "total": event.total,
            "file": event.report.file_name,
            "status": event.status(),
            "message": event.report.message(),
        });
        if let IngestOutcome::Ingested(file) = &event.report.outcome {
            obj["chunks"] = serde_json::json!(file.chunk_count);
        }
        obj
    }
}

impl IngestProgressReporter for JsonProgress {
    fn report(&self, event: &IngestProgressEvent<'_>) {
        if let Ok(line) = serde_json::to_string(&Self::to_json(event)) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl IngestProgressReporter for NoProgress {
    fn report(&self, _event: &IngestProgressEvent<'_>) {}
}

/// Progress mode for the CLI: off, human, or JSON.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn IngestProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::IngestError;

    #[test]
    fn json_event_carries_status() {
        let report = IngestReport {
            file_name: "x.png".into(),
            outcome: IngestOutcome::Rejected(IngestError::UnsupportedFileType {
                file_name: "x.png".into(),
            }),
        };
        let event = IngestProgressEvent {
            collection: "default",
            n: 1,
            total: 2,
            report: &report,
        };
        let json = JsonProgress::to_json(&event);
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "Unsupported file type: x.png");
        assert_eq!(json["total"], 2);
        assert!(json.get("chunks").is_none());
    }
}
