//! Session commands sent from the menu/tooling layer to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::EnemyKind;

/// All possible out-of-band actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionCommand {
    // --- Session lifecycle ---
    /// Reset everything and start a regular session.
    StartNewGame,
    /// Start a session with automatic spawning disabled.
    StartSandbox,
    Pause,
    Resume,
    TogglePause,
    /// Drop the session and return to the main menu.
    QuitToMenu,

    // --- Manual spawns ---
    /// Spawn an enemy; random type and off-edge position when omitted.
    SpawnEnemy {
        kind: Option<EnemyKind>,
        at: Option<DVec2>,
    },
    /// Spawn a cage; random in-bounds position when omitted.
    SpawnCage { at: Option<DVec2> },
    /// Spawn a weapon crate; random position / template when omitted.
    SpawnCrate {
        at: Option<DVec2>,
        weapon: Option<String>,
    },
    /// Remove all enemies, cages and crates.
    ClearField,

    // --- Squad ---
    /// Reload every soldier whose magazine is not full.
    Reload,
}
