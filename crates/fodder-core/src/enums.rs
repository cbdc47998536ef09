//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy archetype. Serialized in the persisted upper-case form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyKind {
    Light,
    Heavy,
    Sniper,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Light, EnemyKind::Heavy, EnemyKind::Sniper];
}

/// Which side fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

/// Trigger behaviour of a weapon template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireMode {
    #[default]
    Semi,
    Auto,
    Burst,
}

/// Broad weapon family, used for enemy loadout bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponClass {
    Pistol,
    Shotgun,
    Mp,
    Rifle,
}

/// Observable weapon state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponState {
    #[default]
    Ready,
    /// A shot was fired within the fire interval or burst shots are pending.
    Firing,
    Reloading,
}

/// Enemy movement decision for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyStance {
    #[default]
    Pursue,
    /// Inside hold range: stand and shoot.
    Hold,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Playing,
    Paused,
    GameOver,
}
