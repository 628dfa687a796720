//! Raw execution output -> natural-language answer

use crate::core::error::{AskError, Result};
use crate::core::types::ExecutionResult;
use crate::llm::prompts::{failure_summary_prompt, success_summary_prompt};
use crate::llm::TextCompletion;
use std::sync::Arc;

/// Which template a summary used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    /// Condense successful output
    Result,
    /// Explain a failure and suggest a fix
    Failure,
}

/// Build the summary prompt, branching on the failure payload
pub fn summary_prompt(
    question: &str,
    command: &str,
    result: &ExecutionResult,
) -> (SummaryKind, String) {
    match result.failure_text() {
        Some(error) => (
            SummaryKind::Failure,
            failure_summary_prompt(question, command, error),
        ),
        None => (
            SummaryKind::Result,
            success_summary_prompt(question, command, result.raw_text().as_deref()),
        ),
    }
}

pub struct ResponseSummarizer<C> {
    llm: Arc<C>,
}

impl<C: TextCompletion> ResponseSummarizer<C> {
    pub fn new(llm: Arc<C>) -> Self {
        Self { llm }
    }

    /// One completion per call; failures are fatal for the request
    pub async fn summarize(
        &self,
        question: &str,
        command: &str,
        result: &ExecutionResult,
    ) -> Result<String> {
        let (kind, prompt) = summary_prompt(question, command, result);
        tracing::debug!(?kind, prompt = %prompt, "summary prompt");

        let answer = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| AskError::Summarization(e.to_string()))?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AskError::Summarization("model returned an empty answer".into()));
        }
        Ok(answer.to_string())
    }
}
