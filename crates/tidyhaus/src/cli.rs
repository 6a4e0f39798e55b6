//! Clap derive structures for the `tidyhaus` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tidyhaus -- coordinated entity renaming for Home Assistant
#[derive(Debug, Parser)]
#[command(
    name = "tidyhaus",
    version,
    about = "Bring Home Assistant entity ids and names into a consistent convention",
    long_about = "Previews and applies coordinated renames of Home Assistant entities:\n\
        area-aware \"{area} {device} {function}\" display names, matching entity ids,\n\
        and automatic rewriting of scene, script, and automation references.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "TIDYHAUS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Home Assistant base URL (overrides profile)
    #[arg(long, short = 'u', env = "TIDYHAUS_URL", global = true)]
    pub url: Option<String>,

    /// Long-lived access token
    #[arg(long, env = "TIDYHAUS_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TIDYHAUS_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "TIDYHAUS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "TIDYHAUS_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show areas with their entity organization
    #[command(alias = "a")]
    Areas(AreasArgs),

    /// Preview the renames for one area and domain
    #[command(alias = "p")]
    Preview(PreviewArgs),

    /// Preview, confirm, and apply renames
    #[command(alias = "x")]
    Execute(ExecuteArgs),

    /// Show scenes, groups, scripts, and automations referencing an entity
    Deps(DepsArgs),

    /// Rename a device and remember the name as an override
    RenameDevice(RenameDeviceArgs),

    /// Manage naming overrides
    #[command(subcommand, alias = "ov")]
    Override(OverrideCommand),

    /// Registry statistics
    Stats,

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Preview / Execute ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Area name or id
    #[arg(long, short = 'a')]
    pub area: String,

    /// Entity domain (e.g. light, sensor), or "all"
    #[arg(long, short = 'd', default_value = "all")]
    pub domain: String,

    /// Skip entities already carrying the "maintained" label
    #[arg(long)]
    pub skip_reviewed: bool,

    /// Show only entities whose name or id would change
    #[arg(long)]
    pub only_changes: bool,

    /// Include disabled entities
    #[arg(long)]
    pub show_disabled: bool,
}

#[derive(Debug, Args)]
pub struct AreasArgs {
    /// Only areas containing at least one entity
    #[arg(long)]
    pub non_empty: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Debug, Args)]
pub struct ExecuteArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Restrict to specific entity ids (repeatable); default: every
    /// entity the preview wants to rename
    #[arg(long = "entity", short = 'e', value_name = "ENTITY_ID")]
    pub entities: Vec<String>,

    /// Also rename devices to their suggested names
    #[arg(long)]
    pub rename_devices: bool,

    /// Re-enable disabled entities that get renamed
    #[arg(long)]
    pub enable_disabled: bool,

    /// Show the plan without applying anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct DepsArgs {
    /// Entity id to inspect, e.g. light.bad_decke
    pub entity_id: String,
}

#[derive(Debug, Args)]
pub struct RenameDeviceArgs {
    /// Device registry id
    pub device_id: String,

    /// New display name
    pub name: String,
}

// ── Overrides ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum OverrideCommand {
    /// Set an area display-name override
    Area {
        /// Area id
        area_id: String,
        /// Full display name
        name: String,
    },

    /// Set a device basename override
    Device {
        /// Device registry id
        device_id: String,
        /// Device basename (without the area prefix)
        name: String,
    },

    /// Set an entity basename override and push the new friendly name
    Entity {
        /// Entity id, e.g. light.bad_decke
        entity_id: String,
        /// Entity basename
        name: String,
    },

    /// Remove an override
    Remove {
        /// Override scope
        #[arg(value_enum)]
        scope: OverrideScopeArg,
        /// Area id, device id, or entity id
        id: String,
    },

    /// List stored overrides
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OverrideScopeArg {
    Area,
    Device,
    Entity,
}

// ── Config & completions ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a starter configuration file
    Init {
        /// Home Assistant base URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Print the active configuration (tokens redacted)
    Show,

    /// Print the configuration file path
    Path,

    /// Store an access token in the system keyring
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
