pub mod config;
pub mod error;
pub mod types;

pub use config::AskConfig;
pub use error::{AskError, Result};
pub use types::{AnswerTriple, ExecutionResult, LogEntry};
