//! Type-specific enemy profiles.
//!
//! Consolidates per-type parameters for spawning and the behaviour FSM.

use fodder_core::enums::{EnemyKind, WeaponClass};

/// Behavioral profile for an enemy type.
pub struct EnemyProfile {
    pub max_hp: f64,
    /// Pursuit speed (units/s).
    pub speed: f64,
    /// Entity-level cooldown between fire requests (ms).
    pub fire_rate_ms: f64,
    /// Weapon families this type draws from when any are available.
    pub preferred_classes: &'static [WeaponClass],
}

/// Get the behavioral profile for a given enemy type.
pub fn get_profile(kind: EnemyKind) -> EnemyProfile {
    use fodder_core::constants::*;

    match kind {
        EnemyKind::Light => EnemyProfile {
            max_hp: LIGHT_MAX_HP,
            speed: ENEMY_SPEED,
            fire_rate_ms: LIGHT_FIRE_RATE_MS,
            preferred_classes: &[WeaponClass::Pistol],
        },
        EnemyKind::Heavy => EnemyProfile {
            max_hp: HEAVY_MAX_HP,
            speed: ENEMY_SPEED,
            fire_rate_ms: HEAVY_FIRE_RATE_MS,
            preferred_classes: &[WeaponClass::Mp, WeaponClass::Shotgun],
        },
        EnemyKind::Sniper => EnemyProfile {
            max_hp: SNIPER_MAX_HP,
            speed: ENEMY_SPEED,
            fire_rate_ms: SNIPER_FIRE_RATE_MS,
            preferred_classes: &[WeaponClass::Rifle],
        },
    }
}
