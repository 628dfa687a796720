//! Request pipeline
//!
//! question -> CommandSynthesizer -> CommandPolicy -> CommandExecution
//! -> AuditLogger -> ResponseSummarizer -> AnswerTriple

pub mod audit;
pub mod executor;
pub mod orchestrator;
pub mod policy;
pub mod summarizer;
pub mod synthesizer;

pub use audit::{read_entries, AuditLogger};
pub use executor::{CommandExecution, RemoteExecutor};
pub use orchestrator::Pipeline;
pub use policy::{CommandPolicy, PolicyVerdict};
pub use summarizer::{summary_prompt, ResponseSummarizer, SummaryKind};
pub use synthesizer::{extract_command, CommandSynthesizer};
