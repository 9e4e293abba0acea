//! Outbound network rules
//!
//! Hooks run with the user's privileges, so a network call from a hook to a
//! host nobody vetted is treated as exfiltration. Prompt documents only get
//! a note when they point the assistant at an unknown site.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::engine::common::excerpt;
use crate::parser::frontmatter::Metadata;
use crate::rules::allowlist::untrusted_urls;
use crate::rules::{Hit, Rule, Severity, DOCUMENTS, HOOKS};

pub const EXFILTRATION_RULES: &[Rule] = &[
    Rule::predicate(
        "data-exfiltration",
        Severity::Critical,
        HOOKS,
        find_untrusted_network_call,
        "Network call to an untrusted host from hook code",
    ),
    Rule::predicate(
        "external-url",
        Severity::Medium,
        DOCUMENTS,
        find_external_url,
        "Reference to an untrusted external URL",
    ),
];

/// Calls that send or fetch data over the network
static NETWORK_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(fetch|axios(\.\w+)?|got(\.\w+)?|superagent|https?\.(request|get)|",
        r"requests\.(get|post|put|patch)|urllib\.request|urlopen|httpx\.\w+|",
        r"curl|wget|nc|ncat|invoke-webrequest|invoke-restmethod|iwr|irm)\b",
    ))
    .unwrap()
});

/// A network call to an untrusted host. The call and the URL may sit on
/// different lines (a multi-line argument list, or a URL held in a variable),
/// so once the file makes any network call every URL in it is checked. A line
/// holding both is preferred as the reported location.
fn find_untrusted_network_call(content: &str, _: Option<&Metadata>, config: &Config) -> Option<Hit> {
    if !NETWORK_CALL.is_match(content) {
        return None;
    }

    let untrusted_line = |(idx, line): (usize, &str)| {
        untrusted_urls(line, config)
            .next()
            .map(|_| Hit::new(idx + 1, excerpt(line)))
    };

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| NETWORK_CALL.is_match(line))
        .find_map(untrusted_line)
        .or_else(|| content.lines().enumerate().find_map(untrusted_line))
}

fn find_external_url(content: &str, _: Option<&Metadata>, config: &Config) -> Option<Hit> {
    content.lines().enumerate().find_map(|(idx, line)| {
        untrusted_urls(line, config)
            .next()
            .map(|url| Hit::new(idx + 1, excerpt(url)))
    })
}
