//! Subcommand implementations.

pub mod clean;
pub mod components;
pub mod resolve;

use blueprint::resolve::{ResolveReport, ResolverConfig};

use crate::cli::ResolverArgs;

impl From<&ResolverArgs> for ResolverConfig {
    fn from(args: &ResolverArgs) -> Self {
        let config = ResolverConfig::default().with_max_iterations(args.max_iterations);
        match &args.component_config_dir {
            Some(dir) => config.with_component_config_dir(dir),
            None => config,
        }
    }
}

/// Prints the default-parameter findings to stderr.
fn print_findings(report: &ResolveReport) {
    for finding in report.errors() {
        eprintln!("error: {finding}");
    }
    for finding in report.warnings() {
        eprintln!("warning: {finding}");
    }
}
