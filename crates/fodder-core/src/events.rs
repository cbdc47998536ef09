//! Events emitted by the simulation for audio feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Fire-and-forget audio notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    /// One projectile left a muzzle.
    Shot { side: Side, weapon_key: String },
    /// A fire request found an empty magazine and started a reload.
    Empty { side: Side, weapon_key: String },
    /// A soldier's magazine was refilled.
    ReloadComplete { soldier_index: usize },
    EnemyKilled { kind: EnemyKind },
    SoldierDown { remaining: usize },
    /// A captive joined the squad.
    Rescue { squad_size: usize },
    WeaponPickup { weapon_key: String },
    GameOver,
}

impl AudioEvent {
    /// Stable event name used as the sound lookup key.
    pub fn name(&self) -> &'static str {
        match self {
            AudioEvent::Shot { .. } => "shot",
            AudioEvent::Empty { .. } => "empty",
            AudioEvent::ReloadComplete { .. } => "reload",
            AudioEvent::EnemyKilled { .. } => "enemy_killed",
            AudioEvent::SoldierDown { .. } => "soldier_down",
            AudioEvent::Rescue { .. } => "rescue",
            AudioEvent::WeaponPickup { .. } => "pickup",
            AudioEvent::GameOver => "game_over",
        }
    }
}
