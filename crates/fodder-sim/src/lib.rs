//! Simulation engine for FODDER.
//!
//! Owns the hecs ECS world and the squad, runs the per-tick systems
//! and produces `GameStateSnapshot`s for the render sink.

pub mod audio;
pub mod engine;
pub mod error;
pub mod squad;
pub mod systems;
pub mod weapon;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use error::SimError;
pub use fodder_core as core;

#[cfg(test)]
mod tests;
