//! Map-reduce summarization: concurrent per-chunk digests, then one synthesis call.

use std::sync::Arc;

use futures_util::future::try_join_all;
use thiserror::Error;

use crate::completion::{CompletionClient, CompletionClientError, CompletionRequest};
use crate::retrieval::AnalysisRecord;

use super::partition::partition;
use super::prompts::{SYSTEM_PROMPT, digest_prompt, synthesis_prompt};

/// Fixed fan-out of the digest step.
pub const DIGEST_CHUNKS: usize = 3;

/// Errors raised while producing an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// One of the concurrent digest calls failed; no synthesis was attempted.
    #[error("Digest of chunk {chunk} failed: {source}")]
    Digest {
        /// Zero-based chunk index.
        chunk: usize,
        #[source]
        source: CompletionClientError,
    },
    /// The final synthesis call failed.
    #[error("Synthesis failed: {0}")]
    Synthesis(#[source] CompletionClientError),
}

/// Narrative summarizer bounded to `DIGEST_CHUNKS + 1` completion calls per request.
#[derive(Clone)]
pub struct Summarizer {
    completion: Arc<dyn CompletionClient>,
}

impl Summarizer {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    /// Answer `query` from `records`.
    ///
    /// Every chunk is digested even when empty. All digest calls are in flight together; the
    /// first failure drops the remaining ones and fails the whole call.
    pub async fn summarize(
        &self,
        query: &str,
        records: &[AnalysisRecord],
    ) -> Result<String, AnalysisError> {
        let chunks = partition(records, DIGEST_CHUNKS);
        tracing::debug!(
            records = records.len(),
            chunk_sizes = ?chunks.iter().map(|chunk| chunk.len()).collect::<Vec<_>>(),
            "Digesting review chunks"
        );

        let digests = try_join_all(chunks.into_iter().enumerate().map(|(index, chunk)| {
            let request = CompletionRequest {
                system: SYSTEM_PROMPT.to_string(),
                prompt: digest_prompt(chunk),
            };
            async move {
                self.completion
                    .complete(request)
                    .await
                    .map_err(|source| AnalysisError::Digest {
                        chunk: index,
                        source,
                    })
            }
        }))
        .await
        .inspect_err(|error| tracing::warn!(error = %error, "Digest step failed"))?;

        let narrative = self
            .completion
            .complete(CompletionRequest {
                system: SYSTEM_PROMPT.to_string(),
                prompt: synthesis_prompt(query, &digests),
            })
            .await
            .map_err(AnalysisError::Synthesis)?;

        tracing::debug!(chars = narrative.len(), "Synthesis complete");
        Ok(narrative)
    }
}
