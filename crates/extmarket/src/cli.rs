//! Clap derive structures for the `extmarket` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use extmarket_core::SortKey;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// extmarket -- browse the JupyterLab extension catalog
#[derive(Debug, Parser)]
#[command(
    name = "extmarket",
    version,
    about = "Browse the JupyterLab extension catalog from the command line",
    long_about = "Search, filter and page through the JupyterLab extension catalog.\n\n\
        Results load incrementally, one page at a time, the same way the\n\
        marketplace sidebar fills in as you scroll.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Catalog project URL (overrides endpoint.url)
    #[arg(long, short = 'e', env = "EXTMARKET_URL", global = true)]
    pub endpoint: Option<String>,

    /// Catalog API key
    #[arg(long, env = "EXTMARKET_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "EXTMARKET_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides endpoint.timeout)
    #[arg(long, env = "EXTMARKET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search and page through the catalog
    #[command(alias = "ls", alias = "b")]
    Browse(BrowseArgs),

    /// Show everything known about one extension
    Show(ShowArgs),

    /// Inspect and edit remembered sort and version choices
    Prefs(PrefsArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),
}

// ── Shared catalog source ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Read the catalog from a JSON file instead of the REST endpoint
    #[arg(long, value_name = "PATH")]
    pub fixture: Option<PathBuf>,
}

// ── Browse ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Text matched against name, description, summary and author
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only show extensions in this category (e.g. widgets, themes)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Result ordering [default: saved preference, else new_and_rising]
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortKey>,

    /// JupyterLab version: 3, 4 or all [default: saved preference, else all]
    #[arg(id = "lab_version", long = "lab-version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Number of pages to load, scrolling to the bottom after each
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    pub pages: u64,

    #[command(flatten)]
    pub source: SourceArgs,
}

// ── Show ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Numeric extension id (see `extmarket browse`)
    pub id: u64,

    #[command(flatten)]
    pub source: SourceArgs,
}

// ── Prefs ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Show saved preferences
    Show,

    /// Remember a sort and/or version choice
    Set {
        /// Sort key to remember
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortKey>,

        /// JupyterLab version to remember: 3, 4 or all
        #[arg(id = "lab_version", long = "lab-version", value_name = "VERSION")]
        version: Option<String>,
    },

    /// Forget all saved preferences
    Clear,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the effective configuration (secrets redacted)
    Show,
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_sort(raw: &str) -> Result<SortKey, String> {
    raw.parse::<SortKey>().map_err(|_| {
        let valid: Vec<&str> = <SortKey as strum::IntoEnumIterator>::iter()
            .map(SortKey::as_str)
            .collect();
        format!("unknown sort {raw:?} (expected one of: {})", valid.join(", "))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sort_accepts_legacy_alias() {
        assert_eq!(parse_sort("up_and_coming").unwrap(), SortKey::NewAndRising);
        assert_eq!(parse_sort("github_stars").unwrap(), SortKey::GithubStars);
        assert!(parse_sort("stars").unwrap_err().contains("download_count_month"));
    }
}
