//! Question answering against the bound retrieval engine.
//!
//! [`QueryOrchestrator::ask`] never fails: every non-blank prompt produces
//! exactly one user turn followed by exactly one assistant turn. Engine
//! errors become the assistant turn's content.

use crate::conversation::ConversationLog;
use crate::error::QueryError;
use crate::session::EngineSlot;

/// Result of [`QueryOrchestrator::ask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The prompt was blank; nothing was recorded.
    Skipped,
    /// The engine answered; `citations` sources were attached.
    Answered { citations: usize },
    /// The engine failed; the error message was recorded as the answer.
    Failed(QueryError),
}

impl AskOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, AskOutcome::Answered { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOrchestrator;

impl QueryOrchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Record `prompt`, query the engine, and record the answer or failure.
    ///
    /// The engine is bound only after the user turn is recorded; a binding
    /// error is handled the same way as a query error.
    pub async fn ask(
        &self,
        engine: &mut EngineSlot<'_>,
        log: &mut ConversationLog,
        prompt: &str,
    ) -> AskOutcome {
        if prompt.trim().is_empty() {
            return AskOutcome::Skipped;
        }

        log.append_user(prompt);

        let result = match engine.get() {
            Ok(engine) => {
                tracing::debug!(collection = engine.collection(), "querying engine");
                engine.query(prompt).await.map_err(|e| format!("{:#}", e))
            }
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(answer) => {
                let sources = answer.sources.unwrap_or_default();
                log.append_assistant(answer.answer, &sources);
                AskOutcome::Answered {
                    citations: sources.len(),
                }
            }
            Err(reason) => {
                let err = QueryError::Generation(reason);
                tracing::warn!("{}", err);
                log.append_assistant(err.to_string(), &[]);
                AskOutcome::Failed(err)
            }
        }
    }
}
