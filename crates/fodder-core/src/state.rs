//! Game state snapshot: the complete visible state handed to the render sink each tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::AudioEvent;
use crate::types::SimTime;

/// Complete read-only view produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub sandbox: bool,
    pub squad: SquadView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub cages: Vec<CageView>,
    pub crates: Vec<CrateView>,
    pub audio_events: Vec<AudioEvent>,
    pub hud: HudView,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SquadView {
    pub position: DVec2,
    pub soldiers: Vec<SoldierView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoldierView {
    pub position: DVec2,
    pub hp: f64,
    pub max_hp: f64,
    pub aim_angle: f64,
    pub weapon_key: String,
    pub ammo: u32,
    pub magazine_size: u32,
    pub weapon_state: WeaponState,
    /// Reload fraction in [0, 1]; 0 when not reloading.
    pub reload_progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    /// Creation sequence, stable for the entity's lifetime.
    pub id: u64,
    pub position: DVec2,
    pub kind: EnemyKind,
    pub hp: f64,
    pub max_hp: f64,
    pub facing: f64,
    pub stance: EnemyStance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: DVec2,
    pub owner: Side,
    pub color: String,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CageView {
    pub position: DVec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrateView {
    pub position: DVec2,
    pub weapon_key: String,
}

/// Counters for the heads-up display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HudView {
    pub enemy_count: usize,
    pub max_enemies: usize,
    pub squad_size: usize,
    pub max_squad_size: usize,
}
