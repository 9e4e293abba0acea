//! Prompt-injection rules for agent, skill, command and rule documents

use crate::rules::{Rule, Severity, DOCUMENTS};

pub const INJECTION_RULES: &[Rule] = &[
    Rule::pattern(
        "prompt-injection",
        Severity::Critical,
        DOCUMENTS,
        concat!(
            r"(?i)\b(ignore|disregard|forget|override)\s+(all\s+|any\s+)?(of\s+)?(the\s+|your\s+)?",
            r"(previous|prior|above|earlier|preceding|system)\s+(instructions|prompts?|rules|directions|guidelines)",
            r"|\byou\s+are\s+now\s+(in\s+)?(dan|developer\s+mode|jailbreak|unrestricted)",
            r"|\bdo\s+not\s+(tell|inform|alert)\s+the\s+user\b",
        ),
        "Instruction that tries to override the assistant's guidelines",
    ),
    Rule::cross_line(
        "hidden-instructions",
        Severity::High,
        DOCUMENTS,
        r"(?is)<!--(?:[^-]|-[^-])*?\b(ignore|execute|run|send|upload|exfiltrate|curl|wget|fetch|secretly)\b.*?-->",
        "Instructions hidden in an HTML comment",
    ),
    Rule::pattern(
        "invisible-unicode",
        Severity::High,
        DOCUMENTS,
        r"[\x{200B}-\x{200F}\x{202A}-\x{202E}\x{2060}-\x{2064}\x{FEFF}]",
        "Invisible or bidirectional-control Unicode characters",
    ),
];
