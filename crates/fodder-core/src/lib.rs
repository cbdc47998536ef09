//! Core types and definitions for the FODDER squad combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, input, snapshots, weapon templates, events, and
//! constants. It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod input;
pub mod save;
pub mod state;
pub mod types;
pub mod weapons;
