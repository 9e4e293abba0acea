use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// content-guardrails - content-security gate for plugin bundles
#[derive(Parser, Debug)]
#[command(name = "content-guardrails")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Installation root that protected paths are relative to
    #[arg(long, global = true, env = "CONTENT_GUARDRAILS_ROOT")]
    pub root: Option<PathBuf>,

    /// Policy file (default: <root>/.content-guardrails/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Gate a pending write: reads the hook event on stdin, exits 2 to block
    Intercept,

    /// Audit every protected file, or one directory under the root
    Scan {
        /// Directory to scan, inside the root
        dir: Option<PathBuf>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check one file that is already on disk (advisory, always exits 0)
    Check {
        /// File to check
        path: PathBuf,
    },

    /// List the built-in rules
    Rules,
}
