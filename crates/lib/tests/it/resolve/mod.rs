//! Resolution integration tests
//!
//! Organized by the stage of resolution they exercise, with complete
//! descriptions resolved end to end in `end_to_end`.

mod directives;
mod end_to_end;
mod references;
mod structure;
