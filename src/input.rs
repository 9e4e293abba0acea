//! Input parsing for the hook event JSON format
//!
//! Parses the event the host sends on stdin before a file write or edit.

use serde::Deserialize;
use std::borrow::Cow;

/// Main input structure for a pre-write hook event
#[derive(Debug, Deserialize)]
pub struct HookInput {
    /// Name of the tool being invoked (e.g., "Write", "Edit", "MultiEdit")
    pub tool_name: String,

    /// Arguments of the tool call
    pub tool_input: ToolInput,

    /// Host session, copied into audit entries
    #[serde(default)]
    pub session_id: Option<String>,

    /// Hook event name (e.g., "PreToolUse")
    #[serde(default)]
    pub hook_event_name: Option<String>,
}

/// What the tool is about to do to a file
#[derive(Debug, Clone)]
pub enum ToolInput {
    /// Full replacement content
    Write { file_path: String, content: String },

    /// Replace one fragment with another
    Edit {
        file_path: String,
        new_string: String,
    },

    /// Several fragment replacements in one file
    MultiEdit {
        file_path: String,
        fragments: Vec<String>,
    },

    /// A path with nothing to inspect (reads and the like)
    PathOnly { file_path: String },

    /// No file path: nothing this gate inspects
    Unknown { raw: serde_json::Value },
}

impl<'de> Deserialize<'de> for ToolInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let Some(obj) = value.as_object() else {
            return Ok(ToolInput::Unknown { raw: value });
        };
        let Some(file_path) = obj.get("file_path").and_then(|v| v.as_str()) else {
            return Ok(ToolInput::Unknown { raw: value });
        };
        let file_path = file_path.to_string();

        // MultiEdit carries an array of {old_string, new_string}
        if let Some(edits) = obj.get("edits").and_then(|v| v.as_array()) {
            let fragments = edits
                .iter()
                .filter_map(|e| e.get("new_string").and_then(|v| v.as_str()))
                .map(String::from)
                .collect();
            return Ok(ToolInput::MultiEdit {
                file_path,
                fragments,
            });
        }

        if let Some(new_string) = obj.get("new_string").and_then(|v| v.as_str()) {
            return Ok(ToolInput::Edit {
                file_path,
                new_string: new_string.to_string(),
            });
        }

        if let Some(content) = obj.get("content").and_then(|v| v.as_str()) {
            return Ok(ToolInput::Write {
                file_path,
                content: content.to_string(),
            });
        }

        Ok(ToolInput::PathOnly { file_path })
    }
}

impl ToolInput {
    /// Target file path, if the tool has one
    pub fn file_path(&self) -> Option<&str> {
        match self {
            ToolInput::Write { file_path, .. }
            | ToolInput::Edit { file_path, .. }
            | ToolInput::MultiEdit { file_path, .. }
            | ToolInput::PathOnly { file_path } => Some(file_path),
            ToolInput::Unknown { .. } => None,
        }
    }

    /// Text that is about to land in the file
    pub fn content(&self) -> Option<Cow<'_, str>> {
        match self {
            ToolInput::Write { content, .. } => Some(Cow::Borrowed(content.as_str())),
            ToolInput::Edit { new_string, .. } => Some(Cow::Borrowed(new_string.as_str())),
            ToolInput::MultiEdit { fragments, .. } => Some(Cow::Owned(fragments.join("\n"))),
            ToolInput::PathOnly { .. } | ToolInput::Unknown { .. } => None,
        }
    }

    /// Whether there is non-blank content to inspect
    pub fn has_content(&self) -> bool {
        self.content().is_some_and(|c| !c.trim().is_empty())
    }
}

impl HookInput {
    /// Parse a hook event
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Trigger description for audit entries, e.g. `PreToolUse:Write`
    pub fn trigger(&self) -> String {
        format!(
            "{}:{}",
            self.hook_event_name.as_deref().unwrap_or("PreToolUse"),
            self.tool_name
        )
    }
}
