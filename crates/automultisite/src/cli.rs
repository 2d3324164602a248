//! Clap derive structures for the `automultisite` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept free
//! of workspace types so `build.rs` can include it for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// automultisite -- local subsites for multi-site web roots
#[derive(Debug, Parser)]
#[command(
    name = "automultisite",
    version,
    about = "Scaffold local subsites of a multi-site web root",
    long_about = "Creates subsite folders, web root symlinks and alias records for a\n\
        multi-site web root, and resolves which site directory a request URI maps to.",
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
    /// Web root of the project (the directory holding `sites/`)
    #[arg(long, short = 'r', env = "AUTOMULTISITE_WEB_ROOT", global = true)]
    pub web_root: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AUTOMULTISITE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Settings key that receives the config sync directory.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaArg {
    /// `$settings['config_sync_directory']`
    ConfigSyncDirectory,
    /// `$config_directories['sync']`
    ConfigDirectories,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set up a new subsite: web root symlink, site folder, alias record
    #[command(name = "multisite:new", alias = "new")]
    New(NewArgs),

    /// Show the sites map a request URI resolves to
    #[command(name = "multisite:resolve", alias = "resolve")]
    Resolve(ResolveArgs),

    /// Show the settings overrides applied to a site folder
    #[command(name = "multisite:settings", alias = "settings")]
    Settings(SettingsArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── multisite:new ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Key of the new subsite, without the folder prefix
    pub site_key: String,

    /// Prefix for the folder names (default: `local-`)
    #[arg(long)]
    pub prefix: Option<String>,
}

// ── multisite:resolve ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Site URI to resolve (default: SIMPLETEST_BASE_URL, then a --uri=
    /// argument of this invocation)
    #[arg(long)]
    pub uri: Option<String>,

    /// Sites directory to scan (default: `<web root>/sites`)
    #[arg(long)]
    pub sites_dir: Option<PathBuf>,

    /// Prefix of subsite folder names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Prefix prepended to folder names in aliases
    #[arg(long)]
    pub alias_prefix: Option<String>,

    /// Server part of the aliases (default: `localhost`)
    #[arg(long)]
    pub server_prefix: Option<String>,
}

// ── multisite:settings ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Path of the site folder, e.g. `sites/local-foo`
    pub site_path: PathBuf,

    /// Base database name to derive the site database from
    #[arg(long)]
    pub database: Option<String>,

    /// Settings key that receives the config sync directory
    #[arg(long, value_enum)]
    pub schema: Option<SchemaArg>,

    /// Prefix of subsite folder names
    #[arg(long)]
    pub prefix: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the configuration file locations
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
