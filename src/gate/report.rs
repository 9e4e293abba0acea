//! Reports for full scans and single-file checks

use serde::Serialize;
use std::fmt::Write as _;

use crate::classify::Category;
use crate::engine::Finding;
use crate::output::Action;
use crate::rules::Severity;

/// Overall result of a full scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanStatus {
    #[serde(rename = "CLEAN")]
    Clean,
    #[serde(rename = "ACCEPTABLE")]
    Acceptable,
    #[serde(rename = "REVIEW REQUIRED")]
    ReviewRequired,
    #[serde(rename = "CRITICAL ISSUES FOUND")]
    CriticalIssuesFound,
}

impl ScanStatus {
    pub fn from_worst(worst: Option<Severity>) -> Self {
        match worst {
            None => ScanStatus::Clean,
            Some(Severity::Medium) => ScanStatus::Acceptable,
            Some(Severity::High) => ScanStatus::ReviewRequired,
            Some(Severity::Critical) => ScanStatus::CriticalIssuesFound,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Clean => "CLEAN",
            ScanStatus::Acceptable => "ACCEPTABLE",
            ScanStatus::ReviewRequired => "REVIEW REQUIRED",
            ScanStatus::CriticalIssuesFound => "CRITICAL ISSUES FOUND",
        }
    }
}

/// A finding tagged with the file it came from
#[derive(Debug, Clone, Serialize)]
pub struct FileFinding {
    pub file: String,
    #[serde(flatten)]
    pub finding: Finding,
}

/// Aggregate result of a full scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Scanned directory, relative to the root (`.` for the whole root)
    pub target: String,
    /// Number of classified files scanned
    pub total_files: usize,
    pub findings: Vec<FileFinding>,
    pub status: ScanStatus,
}

impl ScanReport {
    pub fn new(target: String, total_files: usize, findings: Vec<FileFinding>) -> Self {
        let status = ScanStatus::from_worst(findings.iter().map(|f| f.finding.severity).max());
        Self {
            target,
            total_files,
            findings,
            status,
        }
    }

    pub fn has_critical(&self) -> bool {
        self.status == ScanStatus::CriticalIssuesFound
    }

    /// 1 when a CRITICAL finding exists, else 0
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_critical())
    }

    /// Human-readable report, findings grouped by severity
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Content security scan: {}", self.target);
        let _ = writeln!(out, "Files scanned: {}", self.total_files);

        for severity in Severity::ALL.iter() {
            let bucket: Vec<&FileFinding> = self
                .findings
                .iter()
                .filter(|f| f.finding.severity == *severity)
                .collect();
            if bucket.is_empty() {
                continue;
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{} ({})", severity, bucket.len());
            for f in bucket {
                let _ = writeln!(
                    out,
                    "  {}:{} [{}] {}",
                    f.file, f.finding.line, f.finding.rule_id, f.finding.description
                );
                let _ = writeln!(out, "      > {}", f.finding.excerpt);
            }
        }

        let _ = writeln!(out);
        let _ = write!(out, "Status: {}", self.status.as_str());
        out
    }
}

/// Result of an advisory single-file check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub target: String,
    pub category: Category,
    pub findings: Vec<Finding>,
    /// What the gate would have decided; `None` when nothing was scanned
    pub action: Option<Action>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn render_text(&self) -> String {
        if self.action.is_none() {
            return format!(
                "{}: not a recognized content type, nothing to check",
                self.target
            );
        }
        if self.is_clean() {
            return format!("{} ({}): CLEAN", self.target, self.category);
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({}): {} finding(s)",
            self.target,
            self.category,
            self.findings.len()
        );
        for f in &self.findings {
            let _ = writeln!(
                out,
                "  {} [{}] line {}: {}",
                f.severity, f.rule_id, f.line, f.description
            );
            let _ = writeln!(out, "      > {}", f.excerpt);
        }
        let _ = write!(out, "The file is already written; review it by hand.");
        out
    }
}
