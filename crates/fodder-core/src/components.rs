//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Entity center in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// Velocity in units/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Monotonic creation sequence. Passes that need a stable order
/// (collision scans, snapshots) sort by this instead of archetype order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpawnOrder(pub u64);

/// Facing angle in radians (0 = +x).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Facing(pub f64);

/// Hostile combatant state (weapon lives in its own component).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub hp: f64,
    pub max_hp: f64,
    pub speed: f64,
    /// Entity-level cooldown between fire requests (ms).
    pub fire_rate_ms: f64,
    /// Earliest clock time for the next fire request (ms).
    pub next_shot_ms: f64,
    pub stance: EnemyStance,
}

/// A bullet in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub damage: f64,
    pub owner: Side,
    /// Display color, carried for the render sink.
    pub color: String,
    pub radius: f64,
    pub speed: f64,
    pub distance_traveled: f64,
    pub max_range: f64,
}

/// Marks a cage holding one captive soldier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cage;

/// Loot crate carrying one weapon template key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponCrate {
    pub weapon_key: String,
}
