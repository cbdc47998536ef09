//! Persistence snapshot exchanged with the save/load collaborator.
//!
//! The field names match the persisted JSON shape exactly. Bullets and
//! spawn timers are intentionally absent.

use serde::{Deserialize, Serialize};

use crate::enums::EnemyKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub squad: SavedSquad,
    pub enemies: Vec<SavedEnemy>,
    pub cages: Vec<SavedCage>,
    pub weapon_crates: Vec<SavedCrate>,
    /// Wall-clock milliseconds supplied by the caller.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSquad {
    pub x: f64,
    pub y: f64,
    pub soldiers: Vec<SavedSoldier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSoldier {
    pub hp: f64,
    pub weapon_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEnemy {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub hp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCage {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCrate {
    pub x: f64,
    pub y: f64,
    pub weapon_type: String,
}
