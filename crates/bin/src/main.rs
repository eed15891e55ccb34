use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so resolved output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("blueprint=info".parse()?))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Clean(args) => commands::clean::run(args),
        Commands::Components(args) => commands::components::run(args),
    }
}
