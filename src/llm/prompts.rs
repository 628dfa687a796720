//! Prompt templates for command synthesis and summarization

/// Few-shot examples: (question, command)
pub const SYNTHESIS_EXAMPLES: &[(&str, &str)] = &[
    (
        "List all active VMs",
        r#"gcloud compute instances list --filter="status=RUNNING" --format=json"#,
    ),
    (
        "Show all storage buckets",
        "gcloud storage buckets list --format=json",
    ),
    ("Get IAM roles", "gcloud iam roles list --format=json"),
    (
        "List all unused IP addresses",
        r#"gcloud compute addresses list --filter="status=RESERVED" --format=json"#,
    ),
    (
        "List all used IP addresses",
        r#"gcloud compute addresses list --filter="status=IN_USE" --format=json"#,
    ),
];

const SYNTHESIS_RULES: &str = r#"You are an expert in Google Cloud Platform CLI.
Convert the following natural language question into exactly ONE valid gcloud CLI command.

Rules:
- Always include --format=json for structured output.
- Do NOT include destructive commands (delete, remove, stop, terminate).
- If the exact data is not available in a single command, generate the closest valid gcloud command with the right filter.
- Do NOT include --project or --zone unless explicitly mentioned in the question (defaults are already configured).
- Use official gcloud CLI syntax only.
- Return ONLY the gcloud command without explanations or extra text.
"#;

/// Closing instruction of the success summary
pub const SUCCESS_INSTRUCTION: &str =
    "Summarize the above result into a clear, concise human-readable answer for the user.";

/// Closing instruction of the failure summary
pub const FAILURE_INSTRUCTION: &str = "The command failed. Summarize the error in simple language for the user,
and suggest what they need to fix (e.g., missing flags, missing permissions, required parameters).";

/// Prompt asking for one command answering `question`
pub fn synthesis_prompt(question: &str) -> String {
    let mut prompt = String::from(SYNTHESIS_RULES);
    prompt.push_str("\nExamples:\n");
    for (example, command) in SYNTHESIS_EXAMPLES {
        prompt.push_str(&format!(
            "Question: \"{}\"\nAnswer: {}\n\n",
            example, command
        ));
    }
    prompt.push_str(&format!("Now convert:\nQuestion: {}\n", question));
    prompt
}

/// Prompt condensing raw command output into an answer
pub fn success_summary_prompt(question: &str, command: &str, raw_output: Option<&str>) -> String {
    format!(
        "Question: {}\nGCP Command: {}\nRaw Output: {}\n\n{}\n",
        question,
        command,
        raw_output.unwrap_or("None"),
        SUCCESS_INSTRUCTION
    )
}

/// Prompt explaining a failed command and suggesting a fix
pub fn failure_summary_prompt(question: &str, command: &str, error_output: &str) -> String {
    format!(
        "Question: {}\nGCP Command: {}\nError Output: {}\n\n{}\n",
        question, command, error_output, FAILURE_INSTRUCTION
    )
}
