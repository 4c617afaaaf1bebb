//! Shared test fixtures for triageflow crates.
//!
//! This crate provides data types and pure functions for testing.
//! It does NOT depend on `triageflow-solver` to avoid two copies of the
//! solver types in the solver's own tests.
//!
//! - [`hospital`] - Patients, hospitals and transfer fixtures
//! - [`logistics`] - Supply centers, zones, routes and route networks
//! - [`items`] - Item lots and a brute-force knapsack oracle
//! - [`random`] - Seeded generators for property tests
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! triageflow-test = { workspace = true }
//! ```

pub mod hospital;
pub mod items;
pub mod logistics;
pub mod random;

pub use hospital::{hospital, patient, transfer};
pub use items::{brute_force_best, classic_items};
pub use logistics::{center, link, route, zone};
