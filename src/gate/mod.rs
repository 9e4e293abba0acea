//! Gate controller
//!
//! Ties classification, scanning and policy together for the three ways the
//! scanner is invoked: intercepting a pending write, auditing a whole tree,
//! and checking one file after the fact.

pub mod paths;
pub mod report;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::audit::{AuditEntry, AuditLogger, EventKind, LoggedFinding};
use crate::classify::{classify, Category};
use crate::config::Config;
use crate::engine::{common, Finding, ScanEngine};
use crate::error::{GuardError, Result};
use crate::input::HookInput;
use crate::output::{Action, Outcome, PassReason, Verdict};
use crate::rules::{library, RuleLibrary, Severity};

use paths::{to_slash, PROTECTED_AREAS, SCANNED_EXTENSIONS, SELF_PATHS, SKIPPED_DIRS};
use report::{CheckReport, FileFinding, ScanReport};

/// Rule id reported when a scan is aborted
pub const SCAN_ERROR_RULE: &str = "scan-error";

/// Verdict for content that could not be scanned: always a block
pub fn fail_closed(target: &str, reason: &str) -> Verdict {
    Verdict {
        target: target.to_string(),
        category: classify(target),
        action: Action::Block,
        findings: vec![Finding {
            rule_id: SCAN_ERROR_RULE.to_string(),
            severity: Severity::Critical,
            description: "Scan did not complete; the write was blocked unscanned".to_string(),
            line: 1,
            excerpt: common::excerpt(reason),
        }],
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scan panicked".to_string()
    }
}

/// Result of an evaluation run under `catch_unwind`
type Guarded = std::thread::Result<Result<Outcome>>;

/// Content gate bound to one installation root
pub struct Gate {
    root: PathBuf,
    config: Config,
    library: &'static RuleLibrary,
    audit: AuditLogger,
}

impl Gate {
    /// Create a gate for `root` with an explicit policy
    pub fn new(root: &Path, config: Config) -> Result<Self> {
        let root = root.canonicalize().map_err(|e| GuardError::io(root, e))?;
        let audit = AuditLogger::new(Some(&config.audit_path(&root)));
        Ok(Self {
            root,
            config,
            library: library(),
            audit,
        })
    }

    /// Scan with `library` instead of the built-in rules
    pub fn with_library(mut self, library: &'static RuleLibrary) -> Self {
        self.library = library;
        self
    }

    /// Create a gate for `root` with the policy file found under it
    pub fn open(root: &Path) -> Result<Self> {
        Self::new(root, Config::load(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decide on a pending write. Decisions are audited; passthroughs are not.
    ///
    /// An error or panic while evaluating blocks the write when there was
    /// content to inspect.
    pub fn intercept(&mut self, input: &HookInput) -> Outcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(input)));
        self.settle(input, result)
    }

    /// Turn an evaluation result into the final outcome, failing closed on
    /// an error or panic
    fn settle(&mut self, input: &HookInput, result: Guarded) -> Outcome {
        let reason = match result {
            Ok(Ok(outcome)) => {
                if let Outcome::Decided(verdict) = &outcome {
                    self.record(
                        AuditEntry::for_verdict(EventKind::Scan, input.trigger(), verdict)
                            .with_session(input.session_id.clone()),
                    );
                }
                return outcome;
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(&*payload),
        };

        if !input.tool_input.has_content() {
            log::warn!("scan aborted with nothing to inspect: {}", reason);
            return Outcome::Passthrough(PassReason::NoContent);
        }

        log::error!("scan aborted, blocking write: {}", reason);
        let target = input.tool_input.file_path().unwrap_or("<unknown>");
        let verdict = fail_closed(target, &reason);
        self.record(
            AuditEntry::for_verdict(EventKind::ScanError, input.trigger(), &verdict)
                .with_session(input.session_id.clone()),
        );
        Outcome::Decided(verdict)
    }

    fn evaluate(&self, input: &HookInput) -> Result<Outcome> {
        let Some(file_path) = input.tool_input.file_path() else {
            return Ok(Outcome::Passthrough(PassReason::NoContent));
        };
        let target = paths::resolve(&self.root, Path::new(file_path))
            .map_err(|e| GuardError::io(file_path, e))?;

        if !target.is_protected() {
            return Ok(Outcome::Passthrough(PassReason::NotProtected));
        }
        let content = match input.tool_input.content() {
            Some(content) if !content.trim().is_empty() => content,
            _ => return Ok(Outcome::Passthrough(PassReason::NoContent)),
        };
        if target.is_self() {
            log::debug!("{} is one of the scanner's own files", target.as_str());
            return Ok(Outcome::Passthrough(PassReason::SelfExcluded));
        }

        let category = classify(target.as_str());
        if !category.is_scannable() {
            return Ok(Outcome::Passthrough(PassReason::Unrecognized));
        }

        Ok(Outcome::Decided(self.verdict_for(
            target.as_str().to_string(),
            category,
            &content,
        )))
    }

    fn verdict_for(&self, target: String, category: Category, content: &str) -> Verdict {
        let findings = ScanEngine::new(self.library).scan(content, category, &self.config);
        let action = Action::from_findings(&findings, &self.config);
        Verdict {
            target,
            category,
            action,
            findings,
        }
    }

    /// Scan every recognized file under `dir` (relative to the root, or
    /// absolute), or under all protected areas when `dir` is `None`
    pub fn full_scan(&mut self, dir: Option<&Path>) -> Result<ScanReport> {
        let (target, walk_roots) = match dir {
            Some(dir) => {
                let candidate = if dir.is_absolute() {
                    dir.to_path_buf()
                } else {
                    self.root.join(dir)
                };
                let canonical = candidate
                    .canonicalize()
                    .map_err(|e| GuardError::io(&candidate, e))?;
                let relative = canonical
                    .strip_prefix(&self.root)
                    .map_err(|_| GuardError::PathOutsideRoot(dir.to_path_buf()))?;
                let target = if relative.as_os_str().is_empty() {
                    ".".to_string()
                } else {
                    to_slash(relative)
                };
                (target, vec![canonical])
            }
            None => {
                let areas = PROTECTED_AREAS
                    .iter()
                    .chain(std::iter::once(&".claude"))
                    .map(|area| self.root.join(area))
                    .filter(|p| p.is_dir())
                    .collect();
                (".".to_string(), areas)
            }
        };

        let mut total_files = 0;
        let mut findings = Vec::new();

        for walk_root in &walk_roots {
            let walker = WalkDir::new(walk_root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_skipped_dir(e));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::warn!("skipping unreadable entry: {}", e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() || !has_scanned_extension(entry.path()) {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                    continue;
                };
                let relative = to_slash(relative);
                if SELF_PATHS.contains(&relative.as_str()) {
                    continue;
                }
                let category = classify(&relative);
                if !category.is_scannable() {
                    continue;
                }
                let content = match std::fs::read_to_string(entry.path()) {
                    Ok(content) => content,
                    Err(e) => {
                        log::warn!("skipping {}: {}", relative, e);
                        continue;
                    }
                };

                total_files += 1;
                findings.extend(
                    ScanEngine::new(self.library)
                        .scan(&content, category, &self.config)
                        .into_iter()
                        .map(|finding| FileFinding {
                            file: relative.clone(),
                            finding,
                        }),
                );
            }
        }

        let report = ScanReport::new(target, total_files, findings);
        log::debug!(
            "full scan of {}: {} file(s), {} finding(s)",
            report.target,
            report.total_files,
            report.findings.len()
        );

        let worst = report.findings.iter().map(|f| f.finding.severity).max();
        let mut entry = AuditEntry::new(
            EventKind::FullScan,
            "scan",
            report.target.clone(),
            Action::decide(worst, &self.config),
        );
        entry.findings = report
            .findings
            .iter()
            .map(|f| LoggedFinding {
                file: Some(f.file.clone()),
                finding: f.finding.clone(),
            })
            .collect();
        entry.files_scanned = Some(report.total_files);
        self.record(entry);

        Ok(report)
    }

    /// Scan a file that is already on disk. Advisory: the result is logged
    /// and reported, never enforced.
    pub fn check_path(&mut self, path: &Path) -> Result<CheckReport> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let metadata = std::fs::metadata(&absolute).map_err(|e| GuardError::io(&absolute, e))?;
        if !metadata.is_file() {
            return Err(GuardError::NotAFile(absolute));
        }

        let target =
            paths::resolve(&self.root, &absolute).map_err(|e| GuardError::io(&absolute, e))?;
        let category = classify(target.as_str());
        if !category.is_scannable() {
            return Ok(CheckReport {
                target: target.as_str().to_string(),
                category,
                findings: Vec::new(),
                action: None,
            });
        }

        let content =
            std::fs::read_to_string(&absolute).map_err(|e| GuardError::io(&absolute, e))?;
        let verdict = self.verdict_for(target.as_str().to_string(), category, &content);
        self.record(AuditEntry::for_verdict(EventKind::Check, "check", &verdict));

        Ok(CheckReport {
            target: verdict.target,
            category,
            findings: verdict.findings,
            action: Some(verdict.action),
        })
    }

    fn record(&mut self, entry: AuditEntry) {
        self.audit.record(&entry);
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn has_scanned_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCANNED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
