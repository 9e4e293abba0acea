//! Hardcoded secret detection
//!
//! Documentation in this bundle routinely shows insecure code as a
//! counter-example, so the rule skips lines marked as bad examples and
//! values that are obviously placeholders.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::engine::common::{excerpt, redact_secret};
use crate::parser::frontmatter::Metadata;
use crate::rules::{Hit, Rule, Severity, ALL_SCANNED};

pub const SECRET_RULES: &[Rule] = &[Rule::predicate(
    "hardcoded-secret",
    Severity::Critical,
    ALL_SCANNED,
    find_hardcoded_secret,
    "Hardcoded credential or API token",
)];

/// `api_key = "..."`, `"password": "..."` and friends
static SECRET_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b[a-z0-9_.-]*(api[_-]?key|secret|token|passwd|password|access[_-]?key|private[_-]?key|auth)[a-z0-9_]*["']?\s*[:=]\s*["'`]([^"'`\s]{8,})["'`]"#,
    )
    .unwrap()
});

/// Token formats recognizable on their own
static TOKEN_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(sk-[A-Za-z0-9_-]{16,}|AKIA[0-9A-Z]{16}|gh[pousr]_[A-Za-z0-9_]{36,}|github_pat_[A-Za-z0-9_]{22,}|xox[abprs]-[A-Za-z0-9-]{10,})",
    )
    .unwrap()
});

/// Words that mark a line as documenting what not to do
static BAD_EXAMPLE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(wrong|bad|incorrect|don'?t|avoid|insecure)\b|❌").unwrap()
});

const PLACEHOLDER_MARKERS: &[&str] = &[
    "your",
    "example",
    "placeholder",
    "xxx",
    "changeme",
    "change-me",
    "dummy",
    "redacted",
    "sample",
    "<",
    "${",
    "process.env",
    "os.environ",
    "...",
    "***",
];

/// Whether a candidate secret value is an example token rather than a real one
pub fn is_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether line `idx` or one of the two lines before it is marked as a bad example
pub fn documents_counterexample(lines: &[&str], idx: usize) -> bool {
    lines[idx.saturating_sub(2)..=idx]
        .iter()
        .any(|line| BAD_EXAMPLE_MARKER.is_match(line))
}

/// Candidate secret values on a line
fn secret_values(line: &str) -> impl Iterator<Item = &str> {
    let assigned = SECRET_ASSIGNMENT
        .captures_iter(line)
        .filter_map(|c| c.get(2).map(|m| m.as_str()));
    let prefixed = TOKEN_PREFIX.find_iter(line).map(|m| m.as_str());
    assigned.chain(prefixed)
}

fn find_hardcoded_secret(content: &str, _: Option<&Metadata>, _: &Config) -> Option<Hit> {
    let lines: Vec<&str> = content.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let Some(secret) = secret_values(line).find(|v| !is_placeholder(v)) else {
            continue;
        };
        if documents_counterexample(&lines, idx) {
            continue;
        }
        return Some(Hit::new(idx + 1, excerpt(&redact_secret(line, secret))));
    }

    None
}
