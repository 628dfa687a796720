//! Natural language question -> one CLI command

use crate::core::error::{AskError, Result};
use crate::llm::prompts::synthesis_prompt;
use crate::llm::TextCompletion;
use std::sync::Arc;

/// Turns questions into command lines via the language model
pub struct CommandSynthesizer<C> {
    llm: Arc<C>,
}

impl<C: TextCompletion> CommandSynthesizer<C> {
    pub fn new(llm: Arc<C>) -> Self {
        Self { llm }
    }

    /// Ask the model for exactly one command answering `question`
    ///
    /// Completion failures are fatal for the request; there is no retry
    /// and no fallback command.
    pub async fn synthesize(&self, question: &str) -> Result<String> {
        let prompt = synthesis_prompt(question);
        tracing::debug!(prompt = %prompt, "synthesis prompt");

        let response = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| AskError::Synthesis(e.to_string()))?;

        let command = extract_command(&response)?;
        tracing::info!(command = %command, "synthesized command");
        Ok(command.to_string())
    }
}

/// Pull the command line out of a model response
///
/// Strips a Markdown code fence, surrounding backticks and an echoed
/// `Answer:` label. What remains must be a single non-empty line.
pub fn extract_command(response: &str) -> Result<&str> {
    let mut text = response.trim();

    if let Some(inner) = text.strip_prefix("```") {
        let inner = inner.strip_suffix("```").unwrap_or(inner);
        // Drop the info string (```bash) when the fence opens on its own line
        text = match inner.split_once('\n') {
            Some((info, body)) if !info.trim().contains(' ') => body,
            _ => inner,
        }
        .trim();
    }

    text = text.trim_matches('`').trim();
    if let Some(rest) = text.strip_prefix("Answer:") {
        text = rest.trim();
    }

    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    match lines.as_slice() {
        [] => Err(AskError::Synthesis("model returned no command".into())),
        [line] => Ok(line.trim()),
        many => Err(AskError::Synthesis(format!(
            "expected exactly one command line, got {}: {:?}",
            many.len(),
            response
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedCompletion {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedCompletion {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextCompletion for CannedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(AskError::LlmError(e.to_string())),
            }
        }
    }

    #[test]
    fn test_extract_plain_command() {
        let cmd = extract_command("  gcloud iam roles list --format=json\n").unwrap();
        assert_eq!(cmd, "gcloud iam roles list --format=json");
    }

    #[test]
    fn test_extract_fenced_command() {
        let response = "```bash\ngcloud storage buckets list --format=json\n```";
        assert_eq!(
            extract_command(response).unwrap(),
            "gcloud storage buckets list --format=json"
        );

        let response = "```\ngcloud storage buckets list --format=json\n```";
        assert_eq!(
            extract_command(response).unwrap(),
            "gcloud storage buckets list --format=json"
        );
    }

    #[test]
    fn test_extract_inline_backticks_and_label() {
        assert_eq!(
            extract_command("`gcloud iam roles list --format=json`").unwrap(),
            "gcloud iam roles list --format=json"
        );
        assert_eq!(
            extract_command(r#"Answer: gcloud compute instances list --filter="status=RUNNING" --format=json"#)
                .unwrap(),
            r#"gcloud compute instances list --filter="status=RUNNING" --format=json"#
        );
    }

    #[test]
    fn test_extract_rejects_multiple_lines() {
        let response = "gcloud compute instances list --format=json\ngcloud compute disks list --format=json";
        assert!(matches!(extract_command(response), Err(AskError::Synthesis(_))));
    }

    #[test]
    fn test_extract_rejects_empty() {
        assert!(matches!(extract_command("   \n "), Err(AskError::Synthesis(_))));
        assert!(matches!(extract_command("``````"), Err(AskError::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_synthesize_sends_question_in_prompt() {
        let llm = CannedCompletion::ok("gcloud compute instances list --format=json\n");
        let synthesizer = CommandSynthesizer::new(llm.clone());

        let command = synthesizer.synthesize("List all VMs").await.unwrap();
        assert_eq!(command, "gcloud compute instances list --format=json");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Question: List all VMs"));
    }

    #[tokio::test]
    async fn test_synthesize_propagates_llm_failure() {
        let llm = Arc::new(CannedCompletion {
            reply: Err(AskError::LlmError("quota exceeded".into())),
            prompts: Mutex::new(Vec::new()),
        });
        let synthesizer = CommandSynthesizer::new(llm.clone());

        let err = synthesizer.synthesize("List all VMs").await.unwrap_err();
        assert!(matches!(err, AskError::Synthesis(_)));
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    }
}
