//! Capability and permission rules

use crate::classify::Category;
use crate::config::Config;
use crate::engine::common::excerpt;
use crate::parser::frontmatter::Metadata;
use crate::rules::{Hit, Rule, Severity, ALL_SCANNED};

pub const PRIVILEGE_RULES: &[Rule] = &[
    Rule::predicate(
        "excessive-privilege",
        Severity::High,
        &[Category::Agent, Category::Skill, Category::Command],
        find_excessive_privilege,
        "Requests every high-capability tool at once",
    ),
    Rule::pattern(
        "permission-bypass",
        Severity::High,
        ALL_SCANNED,
        r"--dangerously-skip-permissions|(?i:\bbypass_?permissions\b)",
        "Disables the permission system",
    ),
];

/// Tools that together amount to unrestricted access
pub const MAXIMAL_TOOLS: &[&str] = &["Bash", "Write", "Edit", "WebFetch", "WebSearch", "Task"];

/// Front-matter keys that declare tool access
pub const TOOL_KEYS: &[&str] = &["tools", "allowed-tools", "allowed_tools"];

/// Tool name without any `(...)` scope, e.g. `Bash(git:*)` -> `Bash`
fn base_tool_name(tool: &str) -> &str {
    tool.split('(').next().unwrap_or(tool).trim()
}

fn find_excessive_privilege(content: &str, metadata: Option<&Metadata>, _: &Config) -> Option<Hit> {
    let metadata = metadata?;

    for &key in TOOL_KEYS {
        let Some(value) = metadata.get(key) else {
            continue;
        };
        let items = value.items();
        let has_all = MAXIMAL_TOOLS
            .iter()
            .all(|wanted| items.iter().any(|t| base_tool_name(t) == *wanted));
        if has_all {
            let line = metadata.line_of(key).unwrap_or(1);
            let text = content.lines().nth(line.saturating_sub(1)).unwrap_or(key);
            return Some(Hit::new(line, excerpt(text)));
        }
    }

    None
}
