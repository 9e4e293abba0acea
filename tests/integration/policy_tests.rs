//! Integration tests for the policy file

use std::path::Path;

use content_guardrails::{
    config::{Config, CONFIG_RELATIVE_PATH, DEFAULT_AUDIT_LOG},
    output::{Action, Outcome},
    scan, Category, Gate, HookInput, Severity,
};
use serde_json::json;
use tempfile::TempDir;

fn write_policy(root: &Path, toml: &str) {
    let path = root.join(CONFIG_RELATIVE_PATH);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, toml).unwrap();
}

fn write_event(path: &str, content: &str) -> HookInput {
    let event = json!({
        "tool_name": "Write",
        "tool_input": { "file_path": path, "content": content },
    });
    HookInput::from_json(&event.to_string()).unwrap()
}

// ============================================================================
// Exemptions
// ============================================================================

#[test]
fn test_exempted_rule_never_reports() {
    let content = "const apiKey = \"sk-proj-AbCdEfGh12345678\"";
    assert!(!scan(content, Category::Agent, &Config::default()).is_empty());

    let config: Config = toml::from_str("[allow]\nrules = [\"hardcoded-secret\"]\n").unwrap();
    assert!(scan(content, Category::Agent, &config).is_empty());
}

#[test]
fn test_exemption_from_policy_file() {
    let dir = TempDir::new().unwrap();
    write_policy(dir.path(), "[allow]\nrules = [\"excessive-privilege\"]\n");

    let mut gate = Gate::open(dir.path()).unwrap();
    let outcome = gate.intercept(&write_event(
        "agents/all.md",
        "---\ntools: Bash, Write, Edit, WebFetch, WebSearch, Task\n---\n",
    ));
    assert_eq!(outcome.action(), Some(Action::Pass));
}

#[test]
fn test_trusted_domain_whitelist() {
    let content = "Docs live at https://wiki.internal.example.net/page\n";
    let findings = scan(content, Category::Command, &Config::default());
    assert_eq!(findings[0].rule_id, "external-url");

    let config: Config = toml::from_str("[allow]\ndomains = [\"internal.example.net\"]\n").unwrap();
    assert!(scan(content, Category::Command, &config).is_empty());
}

// ============================================================================
// Thresholds
// ============================================================================

#[test]
fn test_stricter_thresholds() {
    let dir = TempDir::new().unwrap();
    write_policy(
        dir.path(),
        "[general]\nblock_severity = \"high\"\nwarn_severity = \"medium\"\n",
    );

    let mut gate = Gate::open(dir.path()).unwrap();
    let blocked = gate.intercept(&write_event("rules/a.md", "zero\u{200B}width\n"));
    assert!(blocked.is_block());

    let warned = gate.intercept(&write_event("rules/b.md", "See https://unknown-site.net\n"));
    assert_eq!(warned.action(), Some(Action::Warn));
}

#[test]
fn test_malformed_policy_uses_defaults() {
    let dir = TempDir::new().unwrap();
    write_policy(dir.path(), "[general]\nblock_severity = \"catastrophic\"\n");

    let gate = Gate::open(dir.path()).unwrap();
    assert_eq!(gate.config().general.block_severity, Severity::Critical);
    assert_eq!(gate.config().general.warn_severity, Severity::High);
}

// ============================================================================
// Audit log location
// ============================================================================

#[test]
fn test_escaping_audit_path_is_redirected() {
    let outer = TempDir::new().unwrap();
    let root = outer.path().join("plugin");
    std::fs::create_dir_all(&root).unwrap();
    write_policy(&root, "[general]\naudit_log = \"../stolen.jsonl\"\n");

    let mut gate = Gate::open(&root).unwrap();
    let outcome = gate.intercept(&write_event("agents/a.md", "Be concise.\n"));
    assert!(matches!(outcome, Outcome::Decided(_)));

    assert!(!outer.path().join("stolen.jsonl").exists());
    let log = std::fs::read_to_string(root.join(DEFAULT_AUDIT_LOG)).unwrap();
    assert_eq!(log.lines().count(), 1);
    let entry: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
    assert_eq!(entry["target"], "agents/a.md");
}

#[test]
fn test_custom_audit_path_inside_root() {
    let dir = TempDir::new().unwrap();
    write_policy(dir.path(), "[general]\naudit_log = \"logs/guard.jsonl\"\n");

    let mut gate = Gate::open(dir.path()).unwrap();
    gate.intercept(&write_event("agents/a.md", "Be concise.\n"));
    assert!(dir.path().join("logs/guard.jsonl").exists());
}
