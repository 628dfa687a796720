//! Read-only command policy
//!
//! The synthesis prompt already forbids mutating commands, but the model
//! is not trusted: every command is checked here before it reaches the
//! execution service. A command passes only if it invokes the configured
//! program, contains no shell control operators, names no denied verb
//! anywhere, and its verb is a reviewed read-only verb.
//!
//! The service runs commands through a shell, so quotes are removed
//! before any word is compared. The verb is the first word after the path
//! of known command groups; words before it must all be known groups.

use crate::core::config::PolicyConfig;

/// Verbs that only read state
const READ_ONLY_VERBS: &[&str] = &[
    "list",
    "describe",
    "get-iam-policy",
    "get-value",
    "read",
    "search",
    "lookup",
    "info",
    "show",
    "get",
];

/// Read-only verb families matched by prefix
const READ_ONLY_PREFIXES: &[&str] = &["list-", "describe-"];

/// Verbs that mutate or could mutate state
const DENIED_VERBS: &[&str] = &[
    "delete",
    "remove",
    "stop",
    "terminate",
    "create",
    "update",
    "patch",
    "set",
    "reset",
    "deploy",
    "start",
    "restart",
    "resize",
    "move",
    "import",
    "export",
    "rm",
    "mv",
    "cp",
];

const DENIED_PREFIXES: &[&str] = &["add-", "remove-", "set-", "delete-"];

/// Reviewed command groups that may appear between the program and its verb
const COMMAND_GROUPS: &[&str] = &[
    "alpha",
    "beta",
    "access-context-manager",
    "accounts",
    "addresses",
    "app",
    "artifacts",
    "asset",
    "auth",
    "backend-services",
    "billing",
    "buckets",
    "builds",
    "clusters",
    "compute",
    "config",
    "configurations",
    "container",
    "disks",
    "dns",
    "firewall-rules",
    "folders",
    "forwarding-rules",
    "functions",
    "iam",
    "images",
    "instance-groups",
    "instance-templates",
    "instances",
    "jobs",
    "keyrings",
    "keys",
    "kms",
    "logging",
    "logs",
    "machine-types",
    "managed",
    "managed-zones",
    "networks",
    "node-pools",
    "objects",
    "operations",
    "organizations",
    "projects",
    "pubsub",
    "record-sets",
    "regions",
    "repositories",
    "resource-manager",
    "revisions",
    "roles",
    "routers",
    "run",
    "secrets",
    "service-accounts",
    "services",
    "snapshots",
    "sql",
    "storage",
    "subnets",
    "subscriptions",
    "topics",
    "versions",
    "zones",
];

const CONTROL_OPERATORS: &[char] = &[';', '&', '|', '`', '>', '<', '\n', '\r'];

/// Outcome of checking one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyVerdict {
    Allowed,
    Rejected(String),
}

impl PolicyVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyVerdict::Allowed)
    }
}

/// Allow-list / deny-list check on synthesized commands
#[derive(Debug, Clone)]
pub struct CommandPolicy {
    program: String,
    enforce: bool,
}

impl CommandPolicy {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            enforce: true,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            program: config.program.clone(),
            enforce: config.enforce,
        }
    }

    /// A policy that lets everything through
    pub fn permissive() -> Self {
        Self {
            program: String::new(),
            enforce: false,
        }
    }

    pub fn check(&self, command: &str) -> PolicyVerdict {
        if !self.enforce {
            return PolicyVerdict::Allowed;
        }

        let words = match tokenize(command) {
            Ok(words) => words,
            Err(reason) => return PolicyVerdict::Rejected(reason),
        };

        let Some(first) = words.first() else {
            return PolicyVerdict::Rejected("empty command".into());
        };
        if *first != self.program {
            return PolicyVerdict::Rejected(format!(
                "only {} commands are allowed, got {:?}",
                self.program, first
            ));
        }

        let args = &words[1..];
        if let Some(word) = non_flag_words(args).find(|w| is_denied(w)) {
            return PolicyVerdict::Rejected(format!("{:?} is not a read-only operation", word));
        }
        match verb(args) {
            Some(verb) if is_read_only(verb) => PolicyVerdict::Allowed,
            Some(verb) => {
                PolicyVerdict::Rejected(format!("{:?} is not a reviewed read-only verb", verb))
            }
            None => PolicyVerdict::Rejected(format!(
                "no read-only verb ({}) found",
                READ_ONLY_VERBS.join(", ")
            )),
        }
    }
}

/// Split on whitespace the way the shell would, removing quotes
///
/// Control operators and expansions outside quotes are an error.
fn tokenize(command: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut quote: Option<char> = None;
    for c in command.trim().chars() {
        match quote {
            Some(q) if c == q => quote = None,
            // Double quotes still expand and escape in the shell
            Some('"') if matches!(c, '`' | '$' | '\\') => {
                return Err(format!("{:?} inside double quotes is not allowed", c));
            }
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    quoted = true;
                }
                '\\' => {
                    return Err("backslash escapes are not allowed".into());
                }
                '$' => {
                    return Err("shell expansion is not allowed".into());
                }
                c if CONTROL_OPERATORS.contains(&c) => {
                    return Err(format!("shell operator {:?} is not allowed", c));
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() || quoted {
                        words.push(std::mem::take(&mut current));
                        quoted = false;
                    }
                }
                c => current.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err("unbalanced quotes".into());
    }
    if !current.is_empty() || quoted {
        words.push(current);
    }
    Ok(words)
}

/// Every word that is not a flag, flag values included
///
/// Boolean flags do not take values, so a bare word after one may still
/// be read as a verb by the CLI.
fn non_flag_words(words: &[String]) -> impl Iterator<Item = &str> {
    words
        .iter()
        .filter(|w| !w.starts_with('-'))
        .map(|w| w.as_str())
}

/// First non-flag word that is not a known command group
fn verb(words: &[String]) -> Option<&str> {
    non_flag_words(words).find(|w| !COMMAND_GROUPS.contains(w))
}

fn is_read_only(word: &str) -> bool {
    READ_ONLY_VERBS.contains(&word) || READ_ONLY_PREFIXES.iter().any(|p| word.starts_with(p))
}

fn is_denied(word: &str) -> bool {
    let word = word.to_ascii_lowercase();
    DENIED_VERBS.contains(&word.as_str()) || DENIED_PREFIXES.iter().any(|p| word.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::SYNTHESIS_EXAMPLES;

    fn policy() -> CommandPolicy {
        CommandPolicy::new("gcloud")
    }

    fn rejected(command: &str) -> bool {
        !policy().check(command).is_allowed()
    }

    #[test]
    fn test_allows_prompt_examples() {
        for (_, command) in SYNTHESIS_EXAMPLES {
            assert_eq!(policy().check(command), PolicyVerdict::Allowed, "{}", command);
        }
    }

    #[test]
    fn test_allows_describe_with_resource_name() {
        assert!(policy()
            .check("gcloud compute instances describe web-1 --zone us-central1-a --format=json")
            .is_allowed());
        assert!(policy()
            .check("gcloud projects get-iam-policy my-project --format=json")
            .is_allowed());
    }

    #[test]
    fn test_rejects_destructive_verbs() {
        assert!(rejected("gcloud compute instances delete web-1 --quiet"));
        assert!(rejected("gcloud compute instances stop web-1"));
        assert!(rejected("gcloud storage rm gs://bucket/object"));
        assert!(rejected("gcloud compute instances add-tags web-1 --tags=x"));
        assert!(rejected("gcloud compute instances create web-2"));
    }

    #[test]
    fn test_rejects_denied_verb_even_with_list() {
        assert!(rejected("gcloud compute instances list delete"));
    }

    #[test]
    fn test_filter_values_are_not_verbs() {
        assert!(policy()
            .check(r#"gcloud compute instances list --filter="name ~ stop AND status=RUNNING" --format=json"#)
            .is_allowed());
        assert!(policy()
            .check("gcloud compute instances list --filter 'name:delete' --format=json")
            .is_allowed());
    }

    #[test]
    fn test_bare_denied_word_after_flag_is_rejected() {
        assert!(rejected("gcloud compute instances --log-http delete web-1 list"));
        assert!(rejected("gcloud compute instances list --filter stop --format=json"));
    }

    #[test]
    fn test_rejects_other_programs() {
        assert!(rejected("kubectl get pods"));
        assert!(rejected("rm -rf /"));
        assert!(rejected(""));
    }

    #[test]
    fn test_rejects_shell_chaining() {
        assert!(rejected("gcloud compute instances list; rm -rf /"));
        assert!(rejected("gcloud compute instances list && gcloud compute instances delete x"));
        assert!(rejected("gcloud compute instances list | sh"));
        assert!(rejected("gcloud compute instances list > /etc/passwd"));
        assert!(rejected("gcloud compute instances list $(whoami)"));
        assert!(rejected("gcloud compute instances list `whoami`"));
        assert!(rejected(r#"gcloud compute instances list --filter="$(whoami)""#));
        assert!(rejected("gcloud compute instances list --filter=$HOME"));
    }

    #[test]
    fn test_operators_inside_quotes_are_allowed() {
        assert!(policy()
            .check(r#"gcloud compute instances list --filter="labels.env=prod OR labels.env=dev" --format="table(name;zone)""#)
            .is_allowed());
    }

    #[test]
    fn test_rejects_unbalanced_quotes() {
        assert!(rejected(r#"gcloud compute instances list --filter="status=RUNNING"#));
    }

    #[test]
    fn test_rejects_without_read_only_verb() {
        let verdict = policy().check("gcloud compute ssh web-1");
        assert!(matches!(verdict, PolicyVerdict::Rejected(reason) if reason.contains("\"ssh\" is not a reviewed read-only verb")));

        let verdict = policy().check("gcloud compute instances --format=json");
        assert!(matches!(verdict, PolicyVerdict::Rejected(reason) if reason.contains("no read-only verb")));
    }

    #[test]
    fn test_quoted_denied_verbs_are_rejected() {
        assert!(rejected(r#"gcloud compute instances "delete" web-1 list --quiet"#));
        assert!(rejected("gcloud compute instances de'le'te web-1 list --quiet"));
        assert!(rejected(r"gcloud compute instances de\lete web-1 list --quiet"));
        assert!(rejected(r#"gcloud compute instances list --filter="$HOME""#));
    }

    #[test]
    fn test_verb_must_follow_group_path() {
        assert!(rejected("gcloud compute instances suspend web-1 list"));
        assert!(rejected("gcloud services disable compute.googleapis.com info"));
        assert!(rejected("gcloud compute instances --quiet suspend list"));
        assert_eq!(
            policy().check("gcloud services disable compute.googleapis.com info"),
            PolicyVerdict::Rejected("\"disable\" is not a reviewed read-only verb".into())
        );
    }

    #[test]
    fn test_read_only_verb_with_resource_named_like_a_verb() {
        assert!(policy()
            .check("gcloud compute instances describe list --zone=us-central1-a")
            .is_allowed());
        assert!(policy().check("gcloud config get-value project").is_allowed());
    }

    #[test]
    fn test_permissive_allows_everything() {
        assert!(CommandPolicy::permissive()
            .check("gcloud compute instances delete web-1")
            .is_allowed());
    }

    #[test]
    fn test_from_config_respects_enforce_flag() {
        let config = PolicyConfig {
            enforce: false,
            program: "gcloud".into(),
        };
        assert!(CommandPolicy::from_config(&config)
            .check("gcloud compute instances delete web-1")
            .is_allowed());
    }
}
