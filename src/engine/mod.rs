//! Scan engine for content-guardrails
//!
//! Applies every rule relevant to a content category and returns the
//! findings, worst first.

pub mod common;

use serde::Serialize;

use crate::classify::Category;
use crate::config::Config;
use crate::parser::frontmatter::{extract_metadata, Metadata};
use crate::rules::{library, CompiledMatcher, CompiledRule, RuleLibrary, Severity};

/// One rule match in one piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub description: String,
    /// 1-based line of the match
    pub line: usize,
    pub excerpt: String,
}

impl Finding {
    fn from_rule(rule: &CompiledRule, line: usize, excerpt: String) -> Self {
        Self {
            rule_id: rule.rule.id.to_string(),
            severity: rule.rule.severity,
            description: rule.rule.description.to_string(),
            line: line.max(1),
            excerpt,
        }
    }
}

/// Worst severity among findings
pub fn worst_severity(findings: &[Finding]) -> Option<Severity> {
    findings.iter().map(|f| f.severity).max()
}

/// Scan content of a given category with the built-in rule library
pub fn scan(content: &str, category: Category, config: &Config) -> Vec<Finding> {
    ScanEngine::new(library()).scan(content, category, config)
}

/// Applies a rule library to content
pub struct ScanEngine<'a> {
    library: &'a RuleLibrary,
}

impl<'a> ScanEngine<'a> {
    pub fn new(library: &'a RuleLibrary) -> Self {
        Self { library }
    }

    /// Scan content, returning at most one finding per rule sorted by
    /// severity (stable, so library order breaks ties)
    pub fn scan(&self, content: &str, category: Category, config: &Config) -> Vec<Finding> {
        if !category.is_scannable() {
            return Vec::new();
        }

        let metadata = if category.has_metadata() {
            extract_metadata(content)
        } else {
            None
        };

        let mut findings: Vec<Finding> = self
            .library
            .iter()
            .filter(|r| r.rule.applies_to(category))
            .filter(|r| !config.is_rule_allowed(r.rule.id))
            .filter_map(|r| evaluate(r, content, metadata.as_ref(), config))
            .collect();

        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        log::debug!(
            "scanned {} bytes as {}: {} finding(s)",
            content.len(),
            category,
            findings.len()
        );
        findings
    }
}

/// Evaluate one rule against content
fn evaluate(
    rule: &CompiledRule,
    content: &str,
    metadata: Option<&Metadata>,
    config: &Config,
) -> Option<Finding> {
    match &rule.matcher {
        CompiledMatcher::Predicate(predicate) => predicate(content, metadata, config)
            .map(|hit| Finding::from_rule(rule, hit.line, hit.excerpt)),
        CompiledMatcher::Pattern {
            regex,
            cross_line: true,
        } => regex.find(content).map(|m| {
            let line = common::line_number_at(content, m.start());
            let first_line = m.as_str().trim_start().lines().next().unwrap_or("");
            Finding::from_rule(rule, line, common::excerpt(first_line))
        }),
        CompiledMatcher::Pattern {
            regex,
            cross_line: false,
        } => content
            .lines()
            .enumerate()
            .find(|(_, line)| regex.is_match(line))
            .map(|(idx, line)| Finding::from_rule(rule, idx + 1, common::excerpt(line))),
    }
}
