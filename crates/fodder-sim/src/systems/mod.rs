//! Systems that operate on the simulation world each tick.
//!
//! Systems are plain functions over `&mut World` (or `&World` when read-only)
//! plus the engine-owned squad. They keep no state of their own apart from
//! the spawn scheduler's timers.

pub mod collision;
pub mod enemy_ai;
pub mod movement;
pub mod persistence;
pub mod pickup;
pub mod projectile;
pub mod snapshot;
pub mod spawner;
