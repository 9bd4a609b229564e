//! Adorn Testing Infrastructure
//!
//! Shared fixtures for exercising the composition engine: method
//! declarations, stock decorators, catalog builders and proptest strategies.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! adorn-testkit = { path = "../adorn-testkit" }
//! ```
//!
//! ```rust,no_run
//! use adorn_testkit::*;
//!
//! let mut composer = composer_with(standard_catalog());
//! composer.declare(add_method()).unwrap();
//! ```

pub mod builders;
pub mod decorators;
pub mod fixtures;
pub mod strategies;

pub use builders::*;
pub use decorators::*;
pub use fixtures::*;

/// Install a test-writer tracing subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
