//! Gate outcomes and the messages shown to the user
//!
//! An allowed write echoes the event back on stdout. A blocked write exits
//! with [`EXIT_BLOCK`] and explains itself on stderr.

use serde::Serialize;
use std::fmt::Write as _;

use crate::classify::Category;
use crate::config::{Config, CONFIG_RELATIVE_PATH};
use crate::engine::{worst_severity, Finding};
use crate::rules::Severity;

/// Exit status that tells the host to halt the write
pub const EXIT_BLOCK: i32 = 2;

/// Gate decision for a scanned piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Block,
    Warn,
    Pass,
}

impl Action {
    /// Decide from the worst severity present and the policy thresholds
    pub fn decide(worst: Option<Severity>, config: &Config) -> Self {
        match worst {
            Some(s) if s >= config.general.block_severity => Action::Block,
            Some(s) if s >= config.general.warn_severity => Action::Warn,
            _ => Action::Pass,
        }
    }

    pub fn from_findings(findings: &[Finding], config: &Config) -> Self {
        Self::decide(worst_severity(findings), config)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Block => "BLOCK",
            Action::Warn => "WARN",
            Action::Pass => "PASS",
        }
    }
}

/// Why an event was let through without scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// No file path or no non-blank content
    NoContent,
    /// Path lies outside the protected areas
    NotProtected,
    /// One of the scanner's own files
    SelfExcluded,
    /// Protected area, but not a recognized content type
    Unrecognized,
}

/// Result of scanning one write
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Path relative to the installation root
    pub target: String,
    pub category: Category,
    pub action: Action,
    pub findings: Vec<Finding>,
}

/// Terminal state of one intercepted event
#[derive(Debug, Clone)]
pub enum Outcome {
    Passthrough(PassReason),
    Decided(Verdict),
}

impl Outcome {
    pub fn action(&self) -> Option<Action> {
        match self {
            Outcome::Passthrough(_) => None,
            Outcome::Decided(verdict) => Some(verdict.action),
        }
    }

    pub fn is_block(&self) -> bool {
        self.action() == Some(Action::Block)
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_block() {
            EXIT_BLOCK
        } else {
            0
        }
    }

    /// Text for stderr, if the outcome has anything to say
    pub fn diagnostics(&self, config: &Config) -> Option<String> {
        match self {
            Outcome::Decided(v) if v.action == Action::Block => Some(block_message(v, config)),
            Outcome::Decided(v) if v.action == Action::Warn => Some(warn_message(v, config)),
            _ => None,
        }
    }
}

fn count(findings: &[&Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

fn write_finding(out: &mut String, finding: &Finding) {
    let _ = writeln!(
        out,
        "  {} [{}] line {}: {}",
        finding.severity, finding.rule_id, finding.line, finding.description
    );
    let _ = writeln!(out, "      > {}", finding.excerpt);
}

/// Message for a blocked write: every blocking finding in full, counts of
/// the rest, and how to override
pub fn block_message(verdict: &Verdict, config: &Config) -> String {
    let (blocking, rest): (Vec<&Finding>, Vec<&Finding>) = verdict
        .findings
        .iter()
        .partition(|f| f.severity >= config.general.block_severity);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "[content-guardrails] Blocked write to {} ({}): {} blocking finding(s)",
        verdict.target,
        verdict.category,
        blocking.len()
    );
    for finding in &blocking {
        write_finding(&mut out, finding);
    }

    if !rest.is_empty() {
        let _ = writeln!(
            out,
            "Also found: {} high, {} medium",
            count(&rest, Severity::High),
            count(&rest, Severity::Medium)
        );
    }

    let ids: Vec<&str> = blocking.iter().map(|f| f.rule_id.as_str()).collect();
    let _ = write!(
        out,
        "If this content is intentional, add the rule id(s) to `[allow] rules` in {}: {}",
        CONFIG_RELATIVE_PATH,
        ids.join(", ")
    );
    out
}

/// Message for a write that goes through with warnings
pub fn warn_message(verdict: &Verdict, config: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[content-guardrails] Warning for {} ({}):",
        verdict.target, verdict.category
    );
    for finding in verdict
        .findings
        .iter()
        .filter(|f| f.severity >= config.general.warn_severity)
    {
        write_finding(&mut out, finding);
    }
    let _ = write!(out, "The write was allowed.");
    out
}
