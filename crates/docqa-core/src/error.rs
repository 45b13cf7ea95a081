//! Error taxonomy for session, ingestion, and query operations.
//!
//! Only [`SessionError::InvalidName`] rejects an operation outright.
//! Ingestion and query failures are carried as values inside
//! [`crate::tracker::IngestReport`] and [`crate::orchestrator::AskOutcome`].

use crate::file_type::FileType;

/// Session-level errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("collection name cannot be empty")]
    InvalidName,
    #[error("retrieval engine is not available")]
    EngineUnavailable,
    #[error("failed to open collection '{collection}': {reason}")]
    EngineBind { collection: String, reason: String },
    /// Local state was cleared but the engine could not delete the
    /// collection's stored vectors.
    #[error("collection '{collection}' cleared locally, but stored vectors may remain: {reason}")]
    PartialClear { collection: String, reason: String },
}

/// Per-file ingestion failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("Unsupported file type: {file_name}")]
    UnsupportedFileType { file_name: String },
    #[error("No loader available for {file_type}")]
    NoLoader { file_name: String, file_type: FileType },
    #[error("Error processing {file_name}: {reason}")]
    Failure { file_name: String, reason: String },
}

impl IngestError {
    /// The file the failure is attributed to.
    pub fn file_name(&self) -> &str {
        match self {
            IngestError::UnsupportedFileType { file_name }
            | IngestError::NoLoader { file_name, .. }
            | IngestError::Failure { file_name, .. } => file_name,
        }
    }
}

/// Query failures. The display form is the assistant turn recorded in
/// the conversation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Error generating response: {0}")]
    Generation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        assert_eq!(
            SessionError::InvalidName.to_string(),
            "collection name cannot be empty"
        );
        let err = SessionError::PartialClear {
            collection: "default".into(),
            reason: "store offline".into(),
        };
        assert!(err.to_string().contains("default"));
        assert!(err.to_string().ends_with("store offline"));
    }

    #[test]
    fn ingest_error_display_and_file_name() {
        let err = IngestError::UnsupportedFileType {
            file_name: "photo.png".into(),
        };
        assert_eq!(err.to_string(), "Unsupported file type: photo.png");
        assert_eq!(err.file_name(), "photo.png");

        let err = IngestError::NoLoader {
            file_name: "q3.xlsx".into(),
            file_type: FileType::Excel,
        };
        assert_eq!(err.to_string(), "No loader available for excel");
        assert_eq!(err.file_name(), "q3.xlsx");

        let err = IngestError::Failure {
            file_name: "bad.pdf".into(),
            reason: "corrupt xref".into(),
        };
        assert_eq!(err.to_string(), "Error processing bad.pdf: corrupt xref");
    }

    #[test]
    fn query_error_display() {
        let err = QueryError::Generation("timeout".into());
        assert_eq!(err.to_string(), "Error generating response: timeout");
    }
}
