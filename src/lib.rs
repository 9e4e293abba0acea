//! content-guardrails - Content-security gate for plugin bundles
//!
//! Scans agent, skill, command and rule documents, hook configurations and
//! hook scripts for planted secrets, prompt injection, exfiltration and other
//! dangerous content before it is written, and audits existing trees.
//!
//! # Features
//!
//! - **Path classification**: decides what a file is from where it lives
//! - **Rule library**: a fixed, severity-ranked set of content rules
//! - **Front-matter aware**: tool grants in document metadata are checked
//! - **Severity policy**: block and warn thresholds, rule exemptions, trusted domains
//! - **Audit logging**: JSONL log of every decision
//!
//! # Example
//!
//! ```
//! use content_guardrails::{classify, scan, Category, Config, Severity};
//!
//! let category = classify("agents/reviewer.md");
//! assert_eq!(category, Category::Agent);
//!
//! let findings = scan(
//!     "const apiKey = \"sk-proj-AbCdEfGh12345678\"",
//!     category,
//!     &Config::default(),
//! );
//! assert_eq!(findings[0].rule_id, "hardcoded-secret");
//! assert_eq!(findings[0].severity, Severity::Critical);
//! ```

pub mod audit;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod input;
pub mod output;
pub mod parser;
pub mod rules;

// Re-exports for convenience
pub use classify::{classify, Category};
pub use config::Config;
pub use engine::{scan, Finding};
pub use error::{GuardError, Result};
pub use gate::Gate;
pub use input::{HookInput, ToolInput};
pub use output::{Action, Outcome, Verdict};
pub use rules::Severity;
