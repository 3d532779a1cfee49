//! Crate-level tests that drive the full tick pipeline.
//!
//! - `determinism.rs`: same seed and commands give the same game
//! - `integration.rs`: end-to-end scenarios through [`Simulation`](crate::simulation::Simulation)
//! - `invariants.rs`: property tests over random seeds and command streams
//! - `helpers.rs`: setup utilities shared by the above

mod determinism;
mod helpers;
mod integration;
