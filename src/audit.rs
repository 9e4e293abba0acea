//! JSONL audit logging for content-guardrails
//!
//! Every scan decision is appended as one JSON line. Entries are never
//! rewritten; each line goes out in a single `write_all` on an append-mode
//! handle so concurrent invocations interleave whole lines.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::classify::Category;
use crate::engine::Finding;
use crate::output::{Action, Verdict};

/// What produced an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Inline pre-write interception
    Scan,
    /// Whole-tree audit
    FullScan,
    /// Post-hoc single file check
    Check,
    /// Scan aborted by an error, write blocked
    ScanError,
}

/// A finding as recorded in the log
#[derive(Debug, Clone, Serialize)]
pub struct LoggedFinding {
    /// Originating file, for multi-file events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(flatten)]
    pub finding: Finding,
}

/// An audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub event: EventKind,

    /// What caused the scan (hook event and tool, or CLI command)
    pub trigger: String,

    /// Target path or directory, relative to the installation root
    pub target: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    pub findings: Vec<LoggedFinding>,

    pub action: Action,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_scanned: Option<usize>,
}

impl AuditEntry {
    pub fn new(
        event: EventKind,
        trigger: impl Into<String>,
        target: impl Into<String>,
        action: Action,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
            trigger: trigger.into(),
            target: target.into(),
            category: None,
            findings: Vec::new(),
            action,
            session_id: None,
            files_scanned: None,
        }
    }

    /// Entry for a single-file decision
    pub fn for_verdict(event: EventKind, trigger: impl Into<String>, verdict: &Verdict) -> Self {
        let mut entry = Self::new(event, trigger, verdict.target.clone(), verdict.action);
        entry.category = Some(verdict.category);
        entry.findings = verdict
            .findings
            .iter()
            .cloned()
            .map(|finding| LoggedFinding {
                file: None,
                finding,
            })
            .collect();
        entry
    }

    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }
}

/// Where the writer stands with its log file
#[derive(Default)]
enum LogState {
    /// Not opened yet; the file is created on the first entry
    Pending(PathBuf),
    Open(File),
    /// No log configured, or opening it failed
    #[default]
    Disabled,
}

/// Append-only JSONL writer. The log file is only created once there is
/// something to write.
#[derive(Default)]
pub struct AuditLogger {
    state: LogState,
}

impl AuditLogger {
    pub fn new(path: Option<&Path>) -> Self {
        let state = match path {
            Some(p) => LogState::Pending(p.to_path_buf()),
            None => LogState::Disabled,
        };
        Self { state }
    }

    /// Open (creating if needed) the pending log. On failure the logger is
    /// disabled and a warning is logged; the gate keeps working.
    fn file(&mut self) -> Option<&mut File> {
        if let LogState::Pending(path) = &self.state {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            self.state = match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => LogState::Open(file),
                Err(e) => {
                    log::warn!("cannot open audit log {}: {}", path.display(), e);
                    LogState::Disabled
                }
            };
        }

        match &mut self.state {
            LogState::Open(file) => Some(file),
            _ => None,
        }
    }

    /// Append an entry
    pub fn log(&mut self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(file) = self.file() {
            let mut line = serde_json::to_string(entry)?;
            line.push('\n');
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    /// Append an entry, reporting failures only as a warning
    pub fn record(&mut self, entry: &AuditEntry) {
        if let Err(e) = self.log(entry) {
            log::warn!("failed to write audit log: {}", e);
        }
    }
}
