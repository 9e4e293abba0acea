//! Front-matter extraction for agent, skill, command and rule documents
//!
//! Only the small YAML subset these documents use is understood: scalar
//! `key: value` pairs, block lists (`- item`) and inline lists (`[a, b]`).
//! Parsing is best-effort and never fails a scan.

use std::collections::BTreeMap;

/// A front-matter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Scalar(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Items of the value. A scalar is read as a comma-separated list, which
    /// is how `tools: Read, Write` is commonly written.
    pub fn items(&self) -> Vec<&str> {
        match self {
            MetaValue::Scalar(value) => value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
            MetaValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// Parsed front-matter, keyed in sorted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, (MetaValue, usize)>,
}

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key).map(|(value, _)| value)
    }

    /// 1-based line of the document where `key` was declared
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.entries.get(key).map(|(_, line)| *line)
    }

    fn insert(&mut self, key: String, value: MetaValue, line: usize) {
        self.entries.insert(key, (value, line));
    }
}

/// Parser state between lines
#[derive(Debug)]
enum ParseState {
    /// Waiting for the next `key: value` line
    SeekingKey,
    /// Collecting `- item` lines for a key declared with an empty value
    InBlockList {
        key: String,
        line: usize,
        items: Vec<String>,
    },
}

/// Line-oriented front-matter parser
#[derive(Debug)]
pub struct FrontmatterParser {
    state: ParseState,
    metadata: Metadata,
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontmatterParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::SeekingKey,
            metadata: Metadata::default(),
        }
    }

    /// Feed one line of the block (without the delimiters)
    pub fn feed(&mut self, line_no: usize, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        match std::mem::replace(&mut self.state, ParseState::SeekingKey) {
            ParseState::InBlockList {
                key,
                line: key_line,
                mut items,
            } => {
                if let Some(item) = list_item(trimmed) {
                    if !item.is_empty() {
                        items.push(unquote(item));
                    }
                    self.state = ParseState::InBlockList {
                        key,
                        line: key_line,
                        items,
                    };
                    return;
                }
                self.close_block(key, key_line, items);
                self.seek_key(line_no, line);
            }
            ParseState::SeekingKey => self.seek_key(line_no, line),
        }
    }

    /// Finish parsing and return what was collected
    pub fn finish(mut self) -> Metadata {
        if let ParseState::InBlockList { key, line, items } =
            std::mem::replace(&mut self.state, ParseState::SeekingKey)
        {
            self.close_block(key, line, items);
        }
        self.metadata
    }

    fn seek_key(&mut self, line_no: usize, line: &str) {
        // Indented lines outside a list belong to nested maps we don't model
        if line.starts_with(char::is_whitespace) {
            return;
        }
        let Some((key, value)) = line.split_once(':') else {
            return;
        };
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        let value = value.trim();

        if value.is_empty() {
            self.state = ParseState::InBlockList {
                key: key.to_string(),
                line: line_no,
                items: Vec::new(),
            };
        } else if let Some(rest) = value.strip_prefix('[') {
            self.metadata
                .insert(key.to_string(), MetaValue::List(inline_list(rest)), line_no);
        } else {
            self.metadata
                .insert(key.to_string(), MetaValue::Scalar(unquote(value)), line_no);
        }
    }

    fn close_block(&mut self, key: String, line: usize, items: Vec<String>) {
        let value = if items.is_empty() {
            MetaValue::Scalar(String::new())
        } else {
            MetaValue::List(items)
        };
        self.metadata.insert(key, value, line);
    }
}

/// Extract the front-matter block opening at offset zero.
///
/// Returns `None` unless the very first line is `---`. An unterminated block
/// yields whatever could be parsed.
pub fn extract_metadata(content: &str) -> Option<Metadata> {
    let mut lines = content.lines().enumerate();
    let (_, first) = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let mut parser = FrontmatterParser::new();
    for (idx, line) in lines {
        if line.trim_end() == "---" {
            break;
        }
        parser.feed(idx + 1, line);
    }
    Some(parser.finish())
}

fn list_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        return Some("");
    }
    trimmed.strip_prefix("- ").map(str::trim)
}

/// Items of an inline list, given the text after the opening `[`
fn inline_list(rest: &str) -> Vec<String> {
    let items = match rest.trim_end().strip_suffix(']') {
        Some(inner) => split_outside_brackets(inner),
        // Malformed: no closing bracket, fall back to plain comma splitting
        None => rest.split(',').collect(),
    };
    items
        .into_iter()
        .map(|item| unquote(item.trim()))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Split on commas that are not inside quotes or parentheses, so that
/// `Bash(git add, git commit)` stays one item.
fn split_outside_brackets(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                items.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&inner[start..]);
    items
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}
