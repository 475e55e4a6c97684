use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "outpostctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative outpost management against a GraphQL control plane", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// GraphQL endpoint (overrides the config file)
    #[arg(long, global = true, env = "OUTPOSTCTL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API token sent as a bearer credential
    #[arg(long, global = true, env = "OUTPOSTCTL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Outpost manifest (desired state)
    #[arg(short, long, global = true, default_value = "outposts.toml")]
    pub manifest: PathBuf,

    /// Client settings file [default: ~/.config/outpostctl/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Refresh outposts and show what apply would change
    Plan(PlanArgs),

    /// Make remote outposts match the manifest
    Apply(ApplyArgs),

    /// Read one outpost and print its remote record
    Show(ShowArgs),

    /// Adopt an existing remote outpost into state
    Import(ImportArgs),

    /// Delete one outpost
    Destroy(DestroyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Reconcile
// ============================================================================

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Limit to one outpost (`outpost.<name>` or `<name>`)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Limit to one outpost (`outpost.<name>` or `<name>`)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show what would change without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Outposts reconciled in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,
}

// ============================================================================
// Single outpost
// ============================================================================

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Outpost name as recorded in state
    pub name: String,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Name to record the outpost under
    pub name: String,

    /// Remote identifier of the outpost
    pub id: String,
}

#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Outpost name as recorded in state
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
