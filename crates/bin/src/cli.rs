//! CLI argument definitions for the Blueprint binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Blueprint deployment description resolver
#[derive(Parser, Debug)]
#[command(name = "blueprint")]
#[command(about = "Blueprint: resolve templated deployment descriptions into concrete manifests")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a description
    Resolve(ResolveArgs),
    /// Strip authoring entries from a resolved description
    Clean(CleanArgs),
    /// List the components of a description
    Components(ComponentsArgs),
}

/// Options shared by every command that resolves a description
#[derive(clap::Args, Debug)]
pub struct ResolverArgs {
    /// Directory holding `<ComponentName>/defaults.json` catalogues.
    /// Enables the default-parameter cross-check.
    #[arg(long, env = "BLUEPRINT_COMPONENT_CONFIG_DIR")]
    pub component_config_dir: Option<PathBuf>,

    /// Bound on each substitution pass
    #[arg(long, default_value_t = 10, env = "BLUEPRINT_MAX_ITERATIONS")]
    pub max_iterations: usize,
}

/// Arguments for the resolve command
#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Description to resolve
    pub input: PathBuf,

    /// Where to write the result (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also strip authoring entries after resolving
    #[arg(long)]
    pub clean: bool,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

/// Arguments for the clean command
#[derive(clap::Args, Debug)]
pub struct CleanArgs {
    /// Resolved description to clean
    pub input: PathBuf,

    /// Where to write the result (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the components command
#[derive(clap::Args, Debug)]
pub struct ComponentsArgs {
    /// Description to list (resolved first)
    pub input: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}
