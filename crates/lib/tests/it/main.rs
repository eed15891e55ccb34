/*! Integration tests for Blueprint.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - tree: Addressing, mutation, loading and saving of descriptions
 * - walker: Driving the depth-first walker with a custom visitor
 * - scope: Scope-chain visibility and deployment-path lookups
 * - expr: The sandboxed expression language
 * - resolve: Resolution of references, templates, directives and structure
 * - clean: Stripping authoring entries from resolved descriptions
 * - manifest: Component and database views for deployers
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("blueprint=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod expr;
mod manifest;
mod resolve;
mod scope;
mod tree;
mod walker;
