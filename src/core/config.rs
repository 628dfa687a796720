//! Pipeline configuration
//!
//! Loaded once by the binary (TOML file, then environment overrides) and
//! passed explicitly into [`crate::pipeline::Pipeline`]. Components never
//! read the environment themselves.

use crate::core::error::{AskError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default completion endpoint (Gemini REST API root)
pub const DEFAULT_LLM_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default completion model
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
/// Default execution service endpoint
pub const DEFAULT_EXECUTOR_URL: &str = "http://localhost:3000/ask";

/// Top-level configuration for the ask pipeline
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AskConfig {
    pub llm: LlmConfig,
    pub executor: ExecutorConfig,
    pub audit: AuditConfig,
    pub policy: PolicyConfig,
}

/// Language-model endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; usually supplied through `LLM_API_KEY` / `GEMINI_API_KEY`
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_LLM_URL.into(),
            model: DEFAULT_MODEL.into(),
        }
    }
}

/// Execution service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Full URL of the execution endpoint (receives `{"input": command}`)
    pub url: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EXECUTOR_URL.into(),
        }
    }
}

/// Audit log locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub log_dir: PathBuf,
    /// Newline-delimited JSON records
    pub jsonl_file: String,
    /// Human-readable blocks
    pub text_file: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            jsonl_file: "gcp_logs.jsonl".into(),
            text_file: "gcp_logs.log".into(),
        }
    }
}

impl AuditConfig {
    pub fn jsonl_path(&self) -> PathBuf {
        self.log_dir.join(&self.jsonl_file)
    }

    pub fn text_path(&self) -> PathBuf {
        self.log_dir.join(&self.text_file)
    }
}

/// Read-only command policy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Reject commands that fail the read-only check before execution
    pub enforce: bool,
    /// The only CLI program commands may invoke
    pub program: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enforce: true,
            program: "gcloud".into(),
        }
    }
}

impl AskConfig {
    /// Parse a config from TOML text; missing sections take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AskError::ConfigError(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply process environment overrides
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Recognized: `LLM_API_KEY` (falls back to `GEMINI_API_KEY`),
    /// `LLM_API_URL`, `LLM_MODEL`, `EXECUTOR_URL`, `CLOUDASK_LOG_DIR`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("LLM_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
            self.llm.api_key = key;
        }
        if let Some(url) = non_empty("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Some(model) = non_empty("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = non_empty("EXECUTOR_URL") {
            self.executor.url = url;
        }
        if let Some(dir) = non_empty("CLOUDASK_LOG_DIR") {
            self.audit.log_dir = PathBuf::from(dir);
        }
        self
    }

    /// Validate configuration before building a pipeline
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(AskError::ConfigError(
                "LLM API key not set (LLM_API_KEY or GEMINI_API_KEY)".into(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(AskError::ConfigError("llm.model must not be empty".into()));
        }
        for (name, url) in [("llm.api_url", &self.llm.api_url), ("executor.url", &self.executor.url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AskError::ConfigError(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }
        if self.policy.enforce && self.policy.program.trim().is_empty() {
            return Err(AskError::ConfigError(
                "policy.program must be set when policy.enforce is true".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AskConfig::default();
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.executor.url, "http://localhost:3000/ask");
        assert_eq!(config.audit.jsonl_path(), PathBuf::from("logs/gcp_logs.jsonl"));
        assert_eq!(config.audit.text_path(), PathBuf::from("logs/gcp_logs.log"));
        assert!(config.policy.enforce);
        assert_eq!(config.policy.program, "gcloud");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AskConfig::from_toml_str(
            r#"
            [executor]
            url = "http://127.0.0.1:9000/ask"

            [audit]
            log_dir = "/var/log/cloudask"
            "#,
        )
        .unwrap();

        assert_eq!(config.executor.url, "http://127.0.0.1:9000/ask");
        assert_eq!(config.audit.log_dir, PathBuf::from("/var/log/cloudask"));
        assert_eq!(config.audit.jsonl_file, "gcp_logs.jsonl");
        assert_eq!(config.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_toml() {
        let result = AskConfig::from_toml_str("[executor\nurl = 3");
        assert!(matches!(result, Err(AskError::TomlError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = AskConfig::default().with_overrides(lookup_from(&[
            ("LLM_API_KEY", "secret"),
            ("LLM_MODEL", "gemini-1.5-flash"),
            ("EXECUTOR_URL", "http://exec:3000/ask"),
            ("CLOUDASK_LOG_DIR", "/tmp/audit"),
        ]));

        assert_eq!(config.llm.api_key, "secret");
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.executor.url, "http://exec:3000/ask");
        assert_eq!(config.audit.log_dir, PathBuf::from("/tmp/audit"));
    }

    #[test]
    fn test_gemini_key_fallback() {
        let config =
            AskConfig::default().with_overrides(lookup_from(&[("GEMINI_API_KEY", "g-key")]));
        assert_eq!(config.llm.api_key, "g-key");

        let config = AskConfig::default().with_overrides(lookup_from(&[
            ("LLM_API_KEY", "primary"),
            ("GEMINI_API_KEY", "g-key"),
        ]));
        assert_eq!(config.llm.api_key, "primary");
    }

    #[test]
    fn test_blank_override_ignored() {
        let config = AskConfig::default().with_overrides(lookup_from(&[("LLM_MODEL", "  ")]));
        assert_eq!(config.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = AskConfig::default();
        assert!(matches!(config.validate(), Err(AskError::ConfigError(_))));

        let mut config = AskConfig::default();
        config.llm.api_key = "key".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_executor() {
        let mut config = AskConfig::default();
        config.llm.api_key = "key".into();
        config.executor.url = "localhost:3000/ask".into();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("executor.url"));
    }
}
