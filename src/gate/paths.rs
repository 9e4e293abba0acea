//! Where a path lands relative to the installation root

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::classify::normalize_path;

/// Top-level directories whose content is gated
pub const PROTECTED_AREAS: &[&str] = &["agents", "skills", "commands", "rules", "hooks", "scripts"];

/// The scanner's own files, as exact paths relative to the root
pub const SELF_PATHS: &[&str] = &[
    "hooks/content-guardrails.json",
    "rules/content-security.md",
    "skills/content-security/SKILL.md",
];

/// Directories never descended into by a full scan
pub const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    "target",
];

/// File extensions a full scan reads
pub const SCANNED_EXTENSIONS: &[&str] = &["md", "json", "js", "mjs", "cjs", "ts", "sh", "py"];

/// A resolved write or check target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Inside the root; forward-slash path relative to it
    Inside(String),
    /// Outside the root; the absolute path as given
    Outside(String),
}

impl Target {
    /// Path string used for classification and reporting
    pub fn as_str(&self) -> &str {
        match self {
            Target::Inside(p) | Target::Outside(p) => p,
        }
    }

    pub fn is_self(&self) -> bool {
        matches!(self, Target::Inside(p) if SELF_PATHS.contains(&p.as_str()))
    }

    /// Under a protected area of the root, or anywhere beneath a `.claude/`
    /// directory.
    ///
    /// Only the first component counts: `docs/agents/x.md` is not protected
    /// even though [`classify`](crate::classify::classify), which looks at
    /// every directory, calls it an agent. Writes there pass through and are
    /// only reported by a full scan that covers `docs/`.
    pub fn is_protected(&self) -> bool {
        let normalized = normalize_path(self.as_str());
        if format!("/{}", normalized).contains("/.claude/") {
            return true;
        }
        match self {
            Target::Inside(_) => normalized
                .split('/')
                .next()
                .is_some_and(|first| PROTECTED_AREAS.contains(&first)),
            Target::Outside(_) => false,
        }
    }
}

/// Resolve `path` against the canonical `root`.
///
/// The parent directory is canonicalized through its deepest existing
/// ancestor, so a file that does not exist yet still resolves. The final
/// component is kept as written: a symlinked file is judged by where it sits,
/// not by what it points to.
pub fn resolve(root: &Path, path: &Path) -> std::io::Result<Target> {
    let absolute = if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&root.join(path))
    };

    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => canonicalize_existing(parent)?.join(name),
        _ => absolute.clone(),
    };

    Ok(match resolved.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => Target::Inside(to_slash(relative)),
        _ => Target::Outside(resolved.to_string_lossy().into_owned()),
    })
}

/// Canonicalize the longest existing prefix of `path` and re-attach the rest
fn canonicalize_existing(path: &Path) -> std::io::Result<PathBuf> {
    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();

    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Drop `.` and fold `..` without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join path components with `/`
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
