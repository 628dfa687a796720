//! Cloudask - natural-language questions about cloud infrastructure

pub mod core;
pub mod llm;
pub mod pipeline;
