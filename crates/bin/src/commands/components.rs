//! Components command - lists where each component of a description runs.

use blueprint::{
    manifest,
    resolve::{Resolver, ResolverConfig},
    tree,
};

use super::print_findings;
use crate::{
    cli::ComponentsArgs,
    output::{OutputFormat, print_table},
};

/// Run the components command
pub fn run(args: &ComponentsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut description = tree::load(&args.input)?;
    let report = Resolver::new(ResolverConfig::from(&args.resolver)).resolve(&mut description)?;
    print_findings(&report);

    let components = manifest::components(&description)?;

    match OutputFormat::from_json_flag(args.json) {
        OutputFormat::Human => {
            if components.is_empty() {
                println!("No components found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = components
                .iter()
                .map(|c| {
                    vec![
                        c.deployment_id.clone(),
                        c.node_name.clone().unwrap_or_else(|| "-".to_string()),
                        c.component_name.clone(),
                        c.version.clone().unwrap_or_else(|| "-".to_string()),
                        c.environment.len().to_string(),
                    ]
                })
                .collect();
            print_table(&["DEPLOYMENT ID", "NODE", "COMPONENT", "VERSION", "ENV"], &rows);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&components)?);
        }
    }

    Ok(())
}
