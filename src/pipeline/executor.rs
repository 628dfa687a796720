//! Remote command execution
//!
//! The execution service holds the cloud credentials and the CLI; this
//! side only translates the protocol and classifies failures. Every
//! outcome, including transport errors, comes back as an
//! [`ExecutionResult`] so it can be explained to the user.

use crate::core::config::ExecutorConfig;
use crate::core::types::ExecutionResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Runs a command somewhere and reports what happened
#[async_trait]
pub trait CommandExecution: Send + Sync {
    async fn execute(&self, command: &str) -> ExecutionResult;
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    input: &'a str,
}

/// HTTP proxy to the execution service
pub struct RemoteExecutor {
    client: Client,
    url: String,
}

impl RemoteExecutor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CommandExecution for RemoteExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        let response = match self
            .client
            .post(&self.url)
            .json(&ExecuteRequest { input: command })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "execution service unreachable");
                return ExecutionResult::failure(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "could not read error body");
                    "<unreadable body>".to_string()
                }
            };
            tracing::warn!(%status, "execution service returned an error status");
            return ExecutionResult::failure(format!(
                "execution service error: {}, {}",
                status.as_u16(),
                body
            ));
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => {
                let result = ExecutionResult::from_body(body);
                tracing::info!(failed = result.is_failure(), "command executed");
                result
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed response from execution service");
                ExecutionResult::failure(format!(
                    "malformed response from execution service: {}",
                    e
                ))
            }
        }
    }
}
