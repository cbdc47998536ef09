//! Persistence export: flattens the world into a `SaveSnapshot`.
//!
//! Restoring lives on the engine, which owns the state being replaced.

use hecs::World;

use fodder_core::components::{Cage, Enemy, Position, SpawnOrder, WeaponCrate};
use fodder_core::save::*;

use crate::squad::Squad;

pub fn export(world: &World, squad: &Squad, timestamp: i64) -> SaveSnapshot {
    SaveSnapshot {
        squad: SavedSquad {
            x: squad.position.x,
            y: squad.position.y,
            soldiers: squad
                .soldiers
                .iter()
                .map(|soldier| SavedSoldier {
                    hp: soldier.hp,
                    weapon_type: soldier.weapon.key().to_string(),
                })
                .collect(),
        },
        enemies: export_enemies(world),
        cages: export_cages(world),
        weapon_crates: export_crates(world),
        timestamp,
    }
}

fn export_enemies(world: &World) -> Vec<SavedEnemy> {
    let mut enemies: Vec<(SpawnOrder, SavedEnemy)> = world
        .query::<(&Enemy, &Position, &SpawnOrder)>()
        .iter()
        .map(|(_, (enemy, pos, order))| {
            (
                *order,
                SavedEnemy {
                    x: pos.0.x,
                    y: pos.0.y,
                    kind: enemy.kind,
                    hp: enemy.hp,
                },
            )
        })
        .collect();
    enemies.sort_by_key(|(order, _)| *order);
    enemies.into_iter().map(|(_, saved)| saved).collect()
}

fn export_cages(world: &World) -> Vec<SavedCage> {
    let mut cages: Vec<(SpawnOrder, SavedCage)> = world
        .query::<(&Cage, &Position, &SpawnOrder)>()
        .iter()
        .map(|(_, (_cage, pos, order))| {
            (
                *order,
                SavedCage {
                    x: pos.0.x,
                    y: pos.0.y,
                },
            )
        })
        .collect();
    cages.sort_by_key(|(order, _)| *order);
    cages.into_iter().map(|(_, saved)| saved).collect()
}

fn export_crates(world: &World) -> Vec<SavedCrate> {
    let mut crates: Vec<(SpawnOrder, SavedCrate)> = world
        .query::<(&WeaponCrate, &Position, &SpawnOrder)>()
        .iter()
        .map(|(_, (weapon_crate, pos, order))| {
            (
                *order,
                SavedCrate {
                    x: pos.0.x,
                    y: pos.0.y,
                    weapon_type: weapon_crate.weapon_key.clone(),
                },
            )
        })
        .collect();
    crates.sort_by_key(|(order, _)| *order);
    crates.into_iter().map(|(_, saved)| saved).collect()
}
