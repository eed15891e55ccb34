//! Clean command - strips authoring entries from a resolved description.

use blueprint::{clean::Cleaner, tree};

use crate::{cli::CleanArgs, output::write_tree};

/// Run the clean command
pub fn run(args: &CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut description = tree::load(&args.input)?;
    Cleaner::default().clean(&mut description)?;
    write_tree(&description, args.output.as_deref())?;
    Ok(())
}
