use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskError {
    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Command synthesis failed: {0}")]
    Synthesis(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AskError>;
