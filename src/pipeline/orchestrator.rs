//! Question -> (command, result, answer)
//!
//! SYNTHESIZE -> POLICY -> EXECUTE -> LOG -> SUMMARIZE, strictly in order,
//! with no retry edge. Execution failures and policy rejections become
//! failure payloads that the summarizer explains; synthesis and
//! summarization failures abort the request.

use crate::core::config::AskConfig;
use crate::core::error::{AskError, Result};
use crate::core::types::{AnswerTriple, ExecutionResult};
use crate::llm::{LlmClient, TextCompletion};
use crate::pipeline::audit::AuditLogger;
use crate::pipeline::executor::{CommandExecution, RemoteExecutor};
use crate::pipeline::policy::{CommandPolicy, PolicyVerdict};
use crate::pipeline::summarizer::ResponseSummarizer;
use crate::pipeline::synthesizer::CommandSynthesizer;
use std::sync::Arc;

pub struct Pipeline<C, E> {
    synthesizer: CommandSynthesizer<C>,
    policy: CommandPolicy,
    executor: E,
    audit: AuditLogger,
    summarizer: ResponseSummarizer<C>,
}

impl Pipeline<LlmClient, RemoteExecutor> {
    /// Build the production pipeline from a validated config
    pub fn from_config(config: &AskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(LlmClient::from_config(&config.llm)),
            RemoteExecutor::from_config(&config.executor),
            CommandPolicy::from_config(&config.policy),
            AuditLogger::from_config(&config.audit),
        ))
    }
}

impl<C: TextCompletion, E: CommandExecution> Pipeline<C, E> {
    pub fn new(llm: Arc<C>, executor: E, policy: CommandPolicy, audit: AuditLogger) -> Self {
        Self {
            synthesizer: CommandSynthesizer::new(llm.clone()),
            policy,
            executor,
            audit,
            summarizer: ResponseSummarizer::new(llm),
        }
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Answer one question
    ///
    /// Blank questions are rejected here and never reach the model.
    pub async fn ask(&self, question: &str) -> Result<AnswerTriple> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }
        self.run(question).await
    }

    /// Run all stages for a non-empty question
    pub async fn run(&self, question: &str) -> Result<AnswerTriple> {
        tracing::info!(question = %question, "processing question");

        let command = self.synthesizer.synthesize(question).await?;

        let result = match self.policy.check(&command) {
            PolicyVerdict::Allowed => self.executor.execute(&command).await,
            PolicyVerdict::Rejected(reason) => {
                tracing::warn!(command = %command, reason = %reason, "command rejected by policy");
                ExecutionResult::failure(format!(
                    "command rejected by read-only policy: {}",
                    reason
                ))
            }
        };

        // Best effort; never gates the answer
        self.audit.record_async(question, &command, &result).await;

        let answer = self.summarizer.summarize(question, &command, &result).await?;
        tracing::info!(failed = result.is_failure(), "answer ready");

        Ok(AnswerTriple {
            command,
            result,
            answer,
        })
    }
}
