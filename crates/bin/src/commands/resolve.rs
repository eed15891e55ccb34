//! Resolve command - expands a description, optionally cleaning it.

use blueprint::{
    clean::Cleaner,
    resolve::{Resolver, ResolverConfig},
    tree,
};

use super::print_findings;
use crate::{cli::ResolveArgs, output::write_tree};

/// Run the resolve command
pub fn run(args: &ResolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut description = tree::load(&args.input)?;

    let resolver = Resolver::new(ResolverConfig::from(&args.resolver));
    let report = resolver.resolve(&mut description)?;
    print_findings(&report);

    if args.clean {
        Cleaner::default().clean(&mut description)?;
    }

    write_tree(&description, args.output.as_deref())?;
    if let Some(output) = &args.output {
        tracing::info!(output = %output.display(), "Wrote resolved description");
    }
    Ok(())
}
