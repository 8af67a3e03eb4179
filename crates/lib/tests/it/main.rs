/*! Integration tests for Satchel.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - store: Tests for the Store operation set (save/update/load/delete,
 *   bulk updates, change hooks, the end-to-end scenario)
 * - backend: Tests for the Backend trait and the InMemory implementation
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("satchel=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod store;
