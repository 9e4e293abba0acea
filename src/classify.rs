//! Content classification by path
//!
//! Maps a file path onto the kind of plugin content it holds. Anything that
//! does not match a known structure is `Unrecognized` and is never scanned.

use serde::Serialize;
use std::fmt;

/// What a file is, judged from where it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// `agents/**.md`
    Agent,
    /// `skills/**.md`
    Skill,
    /// `commands/**.md`
    Command,
    /// `rules/**.md`
    Rule,
    /// `hooks/**.json`
    HookConfig,
    /// Executable hook scripts under `hooks/`
    HookScript,
    Unrecognized,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Agent => "agent",
            Category::Skill => "skill",
            Category::Command => "command",
            Category::Rule => "rule",
            Category::HookConfig => "hook-config",
            Category::HookScript => "hook-script",
            Category::Unrecognized => "unrecognized",
        }
    }

    /// Markdown documents that may open with a front-matter block
    pub fn has_metadata(&self) -> bool {
        matches!(
            self,
            Category::Agent | Category::Skill | Category::Command | Category::Rule
        )
    }

    pub fn is_scannable(&self) -> bool {
        *self != Category::Unrecognized
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extensions treated as executable hook code
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "sh", "py"];

/// Normalize a path for matching: forward slashes, lowercase, no leading `./`
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/").to_lowercase();
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

/// Classify a path into a content category
pub fn classify(path: &str) -> Category {
    let normalized = normalize_path(path);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

    let Some((file_name, dirs)) = segments.split_last() else {
        return Category::Unrecognized;
    };
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return Category::Unrecognized;
    };

    for dir in dirs {
        let category = match (*dir, extension) {
            ("agents", "md") => Category::Agent,
            ("skills", "md") => Category::Skill,
            ("commands", "md") => Category::Command,
            ("rules", "md") => Category::Rule,
            ("hooks", "json") => Category::HookConfig,
            ("hooks", ext) if SCRIPT_EXTENSIONS.contains(&ext) => Category::HookScript,
            _ => continue,
        };
        return category;
    }

    Category::Unrecognized
}
