//! content-guardrails - Content-security gate for plugin bundles
//!
//! # Usage
//!
//! ```bash
//! # As a pre-write hook (reads the event JSON on stdin, exit 2 blocks)
//! echo '{"tool_name":"Write","tool_input":{"file_path":"agents/a.md","content":"..."}}' \
//!     | content-guardrails intercept
//!
//! # Audit the whole installation
//! content-guardrails --root ~/.claude scan
//!
//! # Check one file after the fact
//! content-guardrails check hooks/session-start.sh
//! ```

mod cli;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use content_guardrails::{
    config::Config,
    gate::{fail_closed, Gate},
    input::HookInput,
    output::{block_message, Outcome, PassReason, EXIT_BLOCK},
    rules::library,
};

use cli::{Cli, Commands};

/// Environment variable holding the log filter
const LOG_ENV: &str = "CONTENT_GUARDRAILS_LOG";

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().filter_or(LOG_ENV, "warn")).init();

    let cli = Cli::parse();
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = load_config(cli.config.as_deref(), &root);

    match cli.command {
        Commands::Intercept => run_intercept(&root, config),
        Commands::Scan { dir, json } => run_scan(&root, config, dir.as_deref(), json),
        Commands::Check { path } => run_check(&root, config, &path),
        Commands::Rules => list_rules(),
    }
}

fn load_config(path: Option<&Path>, root: &Path) -> Config {
    match path {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            log::warn!("{}; using default policy", e);
            Config::default()
        }),
        None => Config::load(root),
    }
}

fn exit_with(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run_intercept(root: &Path, config: Config) -> ExitCode {
    let mut raw = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut raw) {
        // Nothing was inspected, so nothing may pass
        let verdict = fail_closed("<stdin>", &format!("failed to read hook event: {}", e));
        eprintln!("{}", block_message(&verdict, &config));
        return exit_with(EXIT_BLOCK);
    }

    if raw.trim().is_empty() {
        return ExitCode::SUCCESS;
    }

    let input = match HookInput::from_json(&raw) {
        Ok(input) => input,
        Err(e) => {
            // Malformed input could be an evasion attempt
            let verdict = fail_closed("<unparsed event>", &e.to_string());
            eprintln!("{}", block_message(&verdict, &config));
            return exit_with(EXIT_BLOCK);
        }
    };

    let outcome = match Gate::new(root, config.clone()) {
        Ok(mut gate) => gate.intercept(&input),
        Err(e) if input.tool_input.has_content() => {
            let target = input.tool_input.file_path().unwrap_or("<unknown>");
            Outcome::Decided(fail_closed(target, &e.to_string()))
        }
        Err(e) => {
            log::warn!("gate unavailable: {}", e);
            Outcome::Passthrough(PassReason::NoContent)
        }
    };

    if let Some(message) = outcome.diagnostics(&config) {
        eprintln!("{}", message);
    }

    if outcome.is_block() {
        return exit_with(outcome.exit_code());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = handle.write_all(raw.as_bytes());
    let _ = handle.flush();
    ExitCode::SUCCESS
}

fn run_scan(root: &Path, config: Config, dir: Option<&Path>, json: bool) -> ExitCode {
    let report = match Gate::new(root, config).and_then(|mut gate| gate.full_scan(dir)) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("content-guardrails: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("content-guardrails: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report.render_text());
    }

    exit_with(report.exit_code())
}

fn run_check(root: &Path, config: Config, path: &Path) -> ExitCode {
    match Gate::new(root, config).and_then(|mut gate| gate.check_path(path)) {
        Ok(report) => println!("{}", report.render_text()),
        Err(e) => eprintln!("content-guardrails: {}", e),
    }
    ExitCode::SUCCESS
}

fn list_rules() -> ExitCode {
    println!("{} rules", library().len());
    for compiled in library().iter() {
        let rule = compiled.rule;
        let categories: Vec<&str> = rule.categories.iter().map(|c| c.as_str()).collect();
        println!(
            "{:<8} {:<22} {}  [{}]",
            rule.severity.as_str(),
            rule.id,
            rule.description,
            categories.join(", ")
        );
    }
    ExitCode::SUCCESS
}
