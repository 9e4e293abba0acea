//! Trusted domains for URL-based rules
//!
//! A URL is trusted when its host equals, or is a subdomain of, an entry in
//! the built-in list or the policy's `[allow] domains`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;

/// Domains every installation trusts
pub const BUILTIN_TRUSTED_DOMAINS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "0.0.0.0",
    "::1",
    "github.com",
    "githubusercontent.com",
    "anthropic.com",
    "claude.ai",
    "claude.com",
    "npmjs.com",
    "npmjs.org",
    "pypi.org",
    "crates.io",
    "docs.rs",
    "rust-lang.org",
    "python.org",
    "nodejs.org",
    "mozilla.org",
    "example.com",
    "example.org",
];

/// `http(s)://` with an optional userinfo, a hostname or bracketed IPv6
/// address, an optional port, then anything up to whitespace, quotes or
/// brackets
pub static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?i)\bhttps?://(?:[^\s"'`<>()\[\]{}/?#@]*@)?"#,
        r"(?:\[[0-9a-f:.]+\]|[a-z0-9.-]+)(?::[0-9]+)?",
        r#"(?:[/?#][^\s"'`<>()\[\]{}]*)?"#,
    ))
    .unwrap()
});

/// Punctuation that ends a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Whether `c` can appear in a DNS name
fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

/// Host part of a URL, lowercased, without userinfo or port
pub fn host_of(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    let authority = authority.rsplit('@').next().unwrap_or(authority);

    let host = if let Some(bracketed) = authority.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or("")
    } else {
        let end = authority.find(|c: char| !is_host_char(c)).unwrap_or(authority.len());
        &authority[..end]
    };

    let host = host.trim_end_matches('.').to_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Whether `host` equals `entry` or is a subdomain of it
pub fn domain_matches(host: &str, entry: &str) -> bool {
    let entry = entry.trim().trim_start_matches("*.").trim_end_matches('.');
    if entry.is_empty() {
        return false;
    }
    let entry = entry.to_lowercase();
    host == entry
        || host
            .strip_suffix(entry.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Whether `host` is trusted by the built-in list or the policy whitelist
pub fn is_trusted_host(host: &str, config: &Config) -> bool {
    BUILTIN_TRUSTED_DOMAINS
        .iter()
        .copied()
        .chain(config.allow.domains.iter().map(String::as_str))
        .any(|entry| domain_matches(host, entry))
}

/// URLs in `text` whose host is not trusted, without trailing punctuation
pub fn untrusted_urls<'a>(text: &'a str, config: &'a Config) -> impl Iterator<Item = &'a str> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(move |url| match host_of(url) {
            Some(host) => !is_trusted_host(&host, config),
            None => false,
        })
}
