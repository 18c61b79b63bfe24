//! Clap derive structures for the `mapinv` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. This
//! file is also compiled by `build.rs` for man pages, so it depends on
//! clap alone.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mapinv -- inventory of web map services
#[derive(Debug, Parser)]
#[command(
    name = "mapinv",
    version,
    about = "Inventory GeoServer map services and mirror them into Airtable",
    long_about = "Crawls GeoServer instances into a local JSON data file, then keeps\n\
        an Airtable base in step with it: one table per kind, rows linked\n\
        to the rows of the kinds they reference.",
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
    /// Config file to use instead of the platform default
    #[arg(long, short = 'C', env = "MAPINV_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Data file (overrides the config file)
    #[arg(long, short = 'd', env = "MAPINV_DATA_FILE", global = true)]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MAPINV_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "MAPINV_TIMEOUT", global = true)]
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

/// Inventory kind, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Servers,
    Namespaces,
    Repositories,
    Styles,
    Layers,
    LayerGroups,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crawl GeoServer and inspect the local data file
    Data(DataArgs),

    /// Compare and synchronise the data file with Airtable
    #[command(alias = "at")]
    Airtable(AirtableArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Data ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommand,
}

#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Crawl every configured server and write the data file
    Fetch,

    /// List one kind from the data file
    #[command(alias = "ls")]
    List {
        /// Kind to list
        kind: KindArg,
    },
}

// ── Airtable ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AirtableArgs {
    #[command(subcommand)]
    pub command: AirtableCommand,
}

#[derive(Debug, Subcommand)]
pub enum AirtableCommand {
    /// Show missing, current, outdated and orphaned records per kind
    Status {
        /// Limit to one kind
        #[arg(long, short = 'k')]
        kind: Option<KindArg>,
    },

    /// Create, update and delete records until Airtable matches the data file
    Sync {
        /// Limit to one kind (its predecessors must already be synced)
        #[arg(long, short = 'k')]
        kind: Option<KindArg>,
    },

    /// Delete every record this tool manages
    Reset {
        /// Limit to one kind
        #[arg(long, short = 'k')]
        kind: Option<KindArg>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Store the Airtable API key in the system keyring
    SetApiKey,

    /// Store a GeoServer password in the system keyring
    SetPassword {
        /// Server label
        #[arg(long, short = 's')]
        server: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
