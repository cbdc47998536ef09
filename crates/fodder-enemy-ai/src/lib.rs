//! Enemy AI for FODDER.
//!
//! Implements the per-type enemy profiles and the pursue/hold decision
//! that drives direct pursuit toward the squad.

pub mod fsm;
pub mod profiles;

pub use fodder_core as core;
