//! Detection rules for content-guardrails
//!
//! Rules are declared in `const` tables, one module per threat family, and
//! compiled once per process into the read-only [`RuleLibrary`].

pub mod allowlist;
pub mod dangerous;
pub mod exfiltration;
pub mod injection;
pub mod privilege;
pub mod secrets;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::classify::Category;
use crate::config::Config;
use crate::parser::frontmatter::Metadata;

/// Finding severity, ordered `Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
        }
    }

    /// All severities, worst first
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::High, Severity::Medium];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Severity::from_str(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown severity '{}', expected critical, high or medium",
                raw
            ))
        })
    }
}

/// Where a predicate matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// 1-based line number
    pub line: usize,
    pub excerpt: String,
}

impl Hit {
    pub fn new(line: usize, excerpt: impl Into<String>) -> Self {
        Self {
            line,
            excerpt: excerpt.into(),
        }
    }
}

/// A custom matcher over the whole document
pub type Predicate = fn(&str, Option<&Metadata>, &Config) -> Option<Hit>;

/// How a rule matches content
#[derive(Clone, Copy)]
pub enum Matcher {
    /// Regular expression, matched per line unless `cross_line` is set
    Pattern {
        pattern: &'static str,
        cross_line: bool,
    },
    Predicate(Predicate),
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Pattern {
                pattern,
                cross_line,
            } => f
                .debug_struct("Pattern")
                .field("pattern", pattern)
                .field("cross_line", cross_line)
                .finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A detection rule definition
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable identifier, also used for policy exemptions
    pub id: &'static str,

    pub severity: Severity,

    /// Content categories the rule applies to
    pub categories: &'static [Category],

    pub matcher: Matcher,

    /// Human-readable description of the problem
    pub description: &'static str,
}

impl Rule {
    /// Line-by-line pattern rule
    pub const fn pattern(
        id: &'static str,
        severity: Severity,
        categories: &'static [Category],
        pattern: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            severity,
            categories,
            matcher: Matcher::Pattern {
                pattern,
                cross_line: false,
            },
            description,
        }
    }

    /// Pattern rule matched against the whole content at once
    pub const fn cross_line(
        id: &'static str,
        severity: Severity,
        categories: &'static [Category],
        pattern: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            severity,
            categories,
            matcher: Matcher::Pattern {
                pattern,
                cross_line: true,
            },
            description,
        }
    }

    pub const fn predicate(
        id: &'static str,
        severity: Severity,
        categories: &'static [Category],
        predicate: Predicate,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            severity,
            categories,
            matcher: Matcher::Predicate(predicate),
            description,
        }
    }

    pub fn applies_to(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// Markdown prompt documents
pub const DOCUMENTS: &[Category] = &[
    Category::Agent,
    Category::Skill,
    Category::Command,
    Category::Rule,
];

/// Hook configuration and scripts
pub const HOOKS: &[Category] = &[Category::HookConfig, Category::HookScript];

/// Content that runs or tells the assistant to run shell commands
pub const EXECUTABLE: &[Category] = &[
    Category::HookConfig,
    Category::HookScript,
    Category::Command,
    Category::Skill,
];

/// Every scannable category
pub const ALL_SCANNED: &[Category] = &[
    Category::Agent,
    Category::Skill,
    Category::Command,
    Category::Rule,
    Category::HookConfig,
    Category::HookScript,
];

/// A rule with its matcher compiled
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: &'static Rule,
    pub matcher: CompiledMatcher,
}

pub enum CompiledMatcher {
    Pattern { regex: Regex, cross_line: bool },
    Predicate(Predicate),
}

impl fmt::Debug for CompiledMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledMatcher::Pattern { regex, cross_line } => f
                .debug_struct("Pattern")
                .field("regex", &regex.as_str())
                .field("cross_line", cross_line)
                .finish(),
            CompiledMatcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// The ordered, immutable rule catalog
#[derive(Debug)]
pub struct RuleLibrary {
    rules: Vec<CompiledRule>,
}

static LIBRARY: Lazy<RuleLibrary> = Lazy::new(|| RuleLibrary::compile(builtin_rules()));

/// The process-wide rule library
pub fn library() -> &'static RuleLibrary {
    &LIBRARY
}

/// Built-in rule definitions in evaluation order
pub fn builtin_rules() -> impl Iterator<Item = &'static Rule> {
    secrets::SECRET_RULES
        .iter()
        .chain(injection::INJECTION_RULES.iter())
        .chain(exfiltration::EXFILTRATION_RULES.iter())
        .chain(dangerous::DANGEROUS_RULES.iter())
        .chain(privilege::PRIVILEGE_RULES.iter())
}

impl RuleLibrary {
    /// Compile rule definitions. A rule whose pattern does not compile is
    /// dropped with an error log.
    pub fn compile(rules: impl IntoIterator<Item = &'static Rule>) -> Self {
        let rules = rules
            .into_iter()
            .filter_map(|rule| {
                let matcher = match rule.matcher {
                    Matcher::Pattern {
                        pattern,
                        cross_line,
                    } => match Regex::new(pattern) {
                        Ok(regex) => CompiledMatcher::Pattern { regex, cross_line },
                        Err(e) => {
                            log::error!("rule {} has invalid pattern: {}", rule.id, e);
                            return None;
                        }
                    },
                    Matcher::Predicate(predicate) => CompiledMatcher::Predicate(predicate),
                };
                Some(CompiledRule { rule, matcher })
            })
            .collect();

        Self { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
