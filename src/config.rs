//! Policy configuration for content-guardrails
//!
//! Read from `<root>/.content-guardrails/config.toml` once per invocation.
//! A missing or broken file falls back to the embedded defaults.

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::error::{GuardError, Result};
use crate::rules::Severity;

/// Policy file location, relative to the installation root
pub const CONFIG_RELATIVE_PATH: &str = ".content-guardrails/config.toml";

/// Audit log location used when none (or an unsafe one) is configured
pub const DEFAULT_AUDIT_LOG: &str = ".content-guardrails/audit.jsonl";

/// General configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Findings at or above this severity block the write
    pub block_severity: Severity,

    /// Findings at or above this severity (but below blocking) warn
    pub warn_severity: Severity,

    /// Audit log path, relative to the installation root
    pub audit_log: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            block_severity: Severity::Critical,
            warn_severity: Severity::High,
            audit_log: DEFAULT_AUDIT_LOG.to_string(),
        }
    }
}

/// Exceptions section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AllowConfig {
    /// Extra trusted domains for URL rules
    pub domains: Vec<String>,

    /// Rule ids that are never reported
    pub rules: Vec<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub allow: AllowConfig,
}

impl Config {
    /// Load the policy for an installation root, falling back to defaults
    pub fn load(root: &Path) -> Self {
        let path = root.join(CONFIG_RELATIVE_PATH);
        if !path.exists() {
            return Config::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{}; using default policy", e);
            Config::default()
        })
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GuardError::io(path, e))?;
        toml::from_str(&content).map_err(|source| GuardError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether a rule id is exempted by policy
    pub fn is_rule_allowed(&self, rule_id: &str) -> bool {
        self.allow.rules.iter().any(|r| r == rule_id)
    }

    /// Audit log path under `root`. Absolute paths and paths that climb out
    /// of the root are replaced by the default location.
    pub fn audit_path(&self, root: &Path) -> PathBuf {
        match confine_relative(&self.general.audit_log) {
            Some(relative) => root.join(relative),
            None => {
                log::warn!(
                    "audit_log '{}' escapes the installation root; using {}",
                    self.general.audit_log,
                    DEFAULT_AUDIT_LOG
                );
                root.join(DEFAULT_AUDIT_LOG)
            }
        }
    }
}

/// Lexically normalize a relative path, rejecting anything that is absolute
/// or resolves above its starting point.
pub fn confine_relative(path: &str) -> Option<PathBuf> {
    let path = Path::new(path.trim());
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if normalized.as_os_str().is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
block_severity = "critical"
warn_severity = "high"
audit_log = ".content-guardrails/audit.jsonl"

[allow]
domains = []
rules = []
"#;
