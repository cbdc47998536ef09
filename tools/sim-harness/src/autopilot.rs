//! Scripted squad input for headless runs.
//!
//! Aims at the nearest enemy and holds the trigger while one is alive.
//! Walks toward the nearest cage while the squad has room, otherwise toward
//! the nearest crate, and backs off from enemies that get too close.

use glam::DVec2;

use fodder_core::input::{InputSnapshot, MoveKeys, PointerState};
use fodder_core::state::GameStateSnapshot;

/// Distance at which the squad backs away from an enemy.
const KITE_DISTANCE: f64 = 150.0;
/// Distance under which the squad stops walking toward a goal.
const ARRIVE_DISTANCE: f64 = 8.0;

pub fn next_input(snapshot: &GameStateSnapshot) -> InputSnapshot {
    let squad_pos = snapshot.squad.position;

    let enemy = nearest(squad_pos, snapshot.enemies.iter().map(|e| e.position));
    let pointer = match enemy {
        Some(target) => PointerState {
            x: target.x,
            y: target.y,
            pressed: true,
        },
        None => PointerState {
            x: squad_pos.x,
            y: squad_pos.y - 100.0,
            pressed: false,
        },
    };

    let goal = if snapshot.hud.squad_size < snapshot.hud.max_squad_size {
        nearest(squad_pos, snapshot.cages.iter().map(|c| c.position))
    } else {
        None
    }
    .or_else(|| nearest(squad_pos, snapshot.crates.iter().map(|c| c.position)));

    let heading = match enemy {
        Some(threat) if threat.distance(squad_pos) < KITE_DISTANCE => squad_pos - threat,
        _ => match goal {
            Some(goal) if goal.distance(squad_pos) > ARRIVE_DISTANCE => goal - squad_pos,
            _ => DVec2::ZERO,
        },
    };

    InputSnapshot {
        keys: keys_toward(heading),
        pointer,
    }
}

fn nearest(from: DVec2, points: impl Iterator<Item = DVec2>) -> Option<DVec2> {
    points.min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

/// Quantize a heading into the four movement keys.
fn keys_toward(heading: DVec2) -> MoveKeys {
    let threshold = heading.length() * 0.38;
    MoveKeys {
        up: heading.y < -threshold,
        down: heading.y > threshold,
        left: heading.x < -threshold,
        right: heading.x > threshold,
    }
}
