//! Dangerous shell behaviour in hooks, commands and skills

use crate::rules::{Rule, Severity, ALL_SCANNED, EXECUTABLE};

pub const DANGEROUS_RULES: &[Rule] = &[
    Rule::pattern(
        "remote-code-execution",
        Severity::Critical,
        EXECUTABLE,
        concat!(
            r"\b(curl|wget)\b[^|\n]*\|\s*(sudo\s+)?(ba|z|k|da)?sh\b",
            r"|\b(curl|wget)\b[^|\n]*\|\s*(sudo\s+)?(python3?|node|perl|ruby)\b",
            r"|\b(ba|z)?sh\s+-c\s+[\x22']?\$\((curl|wget)\b",
            r"|(?i:\biex\b\s*\(?\s*(\(?new-object\s+net\.webclient|irm|iwr|invoke-restmethod|invoke-webrequest))",
        ),
        "Downloads remote content and executes it",
    ),
    Rule::pattern(
        "destructive-command",
        Severity::Critical,
        EXECUTABLE,
        concat!(
            r"\brm\s+(-[a-zA-Z]+\s+)*-[a-zA-Z]*[rRf][a-zA-Z]*\s+(-[a-zA-Z]+\s+)*",
            r"(/\*?|~/?|\$\{?HOME\}?/?|/(etc|usr|var|bin|sbin|lib|boot|opt)/?)([\s\x22';&|)]|$)",
            r"|\bdd\b[^\n]*\bof=/dev/(sd|nvme|hd|vd|xvd)[a-z]",
            r"|\bmkfs(\.\w+)?\s+/dev/",
            r"|:\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
            r"|\bchmod\s+-R\s+[0-7]{3,4}\s+/(\s|$)",
        ),
        "Destroys system or user data",
    ),
    Rule::pattern(
        "credential-access",
        Severity::High,
        ALL_SCANNED,
        concat!(
            r"(~|\$HOME|\$\{HOME\}|/home/[^/\s]+|/Users/[^/\s]+|/root)/\.",
            r"(aws/credentials|kube/config|docker/config\.json|netrc|npmrc|pypirc|pgpass|gnupg/)",
            r"|\.ssh/id_(rsa|ed25519|ecdsa|dsa)([^.\w]|$)",
            r"|\bcat\s+[^\n|;]*\.env(\.local|\.production)?([^.\w]|$)",
        ),
        "Reads credential files",
    ),
    Rule::pattern(
        "privilege-escalation",
        Severity::High,
        EXECUTABLE,
        concat!(
            r"\bsudo\s+[a-z]",
            r"|\bchmod\s+(-R\s+)?(0?777|[ugoa]*\+s|[4267]755)(\s|$)",
            r"|\bchown\s+(-R\s+)?root\b",
            r"|/etc/sudoers",
        ),
        "Escalates privileges or loosens file permissions",
    ),
    Rule::pattern(
        "persistence",
        Severity::High,
        EXECUTABLE,
        concat!(
            r"(>>?|\btee\s+-a)\s*(~|\$HOME|\$\{HOME\})/\.(bashrc|zshrc|bash_profile|profile|zprofile|zshenv)\b",
            r"|\|\s*crontab\b|\bcrontab\s+-e\b",
            r"|\blaunchctl\s+load\b|\bsystemctl\s+(--user\s+)?enable\b",
            r"|/Library/LaunchAgents/|/etc/cron\.",
        ),
        "Installs itself to run again later",
    ),
    Rule::pattern(
        "obfuscated-payload",
        Severity::High,
        EXECUTABLE,
        concat!(
            r"\bbase64\s+(-d|--decode|-D)\b[^\n]*\|\s*(ba|z)?sh\b",
            r"|\batob\s*\(",
            r"|Buffer\.from\([^)]*[\x22']base64[\x22']\s*\)",
            r"|(\\x[0-9a-fA-F]{2}){8,}",
            r"|[A-Za-z0-9+/]{200,}={0,2}",
        ),
        "Encoded or obfuscated payload",
    ),
    Rule::pattern(
        "dynamic-eval",
        Severity::Medium,
        &[crate::classify::Category::HookScript],
        r"\beval\s*\(|\bnew\s+Function\s*\(|\bexec\s*\(|\bvm\.runIn\w*Context\s*\(",
        "Evaluates dynamically built code",
    ),
];
