//! Append-only audit trail
//!
//! Two sibling files: newline-delimited JSON for machines and a plain-text
//! block file for people. Each entry is rendered in memory and written with
//! a single `write_all` per file, with the file opened in append mode, so
//! concurrent writers rely only on the OS append guarantee.

use crate::core::config::AuditConfig;
use crate::core::error::Result;
use crate::core::types::{render_value, ExecutionResult, LogEntry};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const BLOCK_RULE_WIDTH: usize = 60;

/// Writes one record per processed request
#[derive(Debug, Clone)]
pub struct AuditLogger {
    jsonl_path: PathBuf,
    text_path: PathBuf,
}

impl AuditLogger {
    pub fn new(jsonl_path: impl Into<PathBuf>, text_path: impl Into<PathBuf>) -> Self {
        Self {
            jsonl_path: jsonl_path.into(),
            text_path: text_path.into(),
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.jsonl_path(), config.text_path())
    }

    pub fn jsonl_path(&self) -> &Path {
        &self.jsonl_path
    }

    pub fn text_path(&self) -> &Path {
        &self.text_path
    }

    /// Record a request without ever failing the caller
    ///
    /// I/O errors are reported through tracing and otherwise dropped.
    pub fn record(&self, question: &str, command: &str, result: &ExecutionResult) -> Option<LogEntry> {
        let entry = LogEntry::new(question, command, result);
        match self.append(&entry) {
            Ok(()) => {
                tracing::debug!(request_id = %entry.request_id, "audit entry written");
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %entry.request_id,
                    path = %self.jsonl_path.display(),
                    error = %e,
                    "failed to write audit entry"
                );
                None
            }
        }
    }

    /// [`record`](Self::record) on the blocking pool, for async callers
    pub async fn record_async(
        &self,
        question: &str,
        command: &str,
        result: &ExecutionResult,
    ) -> Option<LogEntry> {
        let logger = self.clone();
        let question = question.to_string();
        let command = command.to_string();
        let result = result.clone();
        match tokio::task::spawn_blocking(move || logger.record(&question, &command, &result)).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "audit task failed");
                None
            }
        }
    }

    /// Append one entry to both files
    pub fn append(&self, entry: &LogEntry) -> io::Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        append_to(&self.jsonl_path, line.as_bytes())?;
        append_to(&self.text_path, text_block(entry).as_bytes())
    }
}

fn append_to(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(bytes)
}

/// Human-readable rendering of one entry
pub fn text_block(entry: &LogEntry) -> String {
    let raw = entry
        .raw_output
        .as_ref()
        .map(render_value)
        .unwrap_or_else(|| "None".into());
    format!(
        "\n{rule}\nTimestamp : {}\nQuestion  : {}\nCommand   : {}\nRaw Output: {}\nError     : {}\n",
        entry.timestamp.to_rfc3339(),
        entry.question,
        entry.command,
        raw,
        entry.error.as_deref().unwrap_or("None"),
        rule = "=".repeat(BLOCK_RULE_WIDTH),
    )
}

/// Read every entry of a structured log, in file order
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>> {
    let file = fs::File::open(path)?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}
