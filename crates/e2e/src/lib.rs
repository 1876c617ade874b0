//! StepDiff end-to-end test scaffolding
//!
//! Provides an in-memory implementation of the engine's collaborator traits
//! plus fluent fixtures for runs and step records. The integration tests in
//! `tests/` drive the full pipeline through [`stepdiff_engine::CompareService`].

pub mod backend;
pub mod fixtures;

pub use backend::InMemoryBackend;
pub use fixtures::{compound_ref, request, run, step, StepBuilder};

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
