//! Language-model access
//!
//! Pipeline stages only see [`TextCompletion`]; [`LlmClient`] is the HTTP
//! implementation.

pub mod client;
pub mod prompts;

pub use client::{ApiFormat, LlmClient};

use crate::core::error::Result;
use async_trait::async_trait;

/// A single prompt in, a single text answer out
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
