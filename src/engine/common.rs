//! Common utilities for the scan engine and rule predicates

/// Longest excerpt kept on a finding, in characters
pub const MAX_EXCERPT_CHARS: usize = 120;

/// Trim and bound a piece of matched text for display and logging
pub fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let mut bounded: String = trimmed.chars().take(MAX_EXCERPT_CHARS).collect();
    bounded.push_str("...");
    bounded
}

/// 1-based line number of a byte offset
pub fn line_number_at(content: &str, offset: usize) -> usize {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Mask a secret value inside a line, keeping a short prefix to help locate it
pub fn redact_secret(line: &str, secret: &str) -> String {
    if secret.is_empty() {
        return line.to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    line.replace(secret, &format!("{}****", visible))
}
