//! Snapshot system: builds the read-only `GameStateSnapshot` for the render sink.
//!
//! Never modifies the world. Entity lists are emitted in creation order.

use hecs::World;

use fodder_core::components::*;
use fodder_core::constants::{MAX_ENEMIES, MAX_SQUAD_SIZE};
use fodder_core::enums::GamePhase;
use fodder_core::events::AudioEvent;
use fodder_core::state::*;
use fodder_core::types::SimTime;

use crate::squad::Squad;

pub fn build_snapshot(
    world: &World,
    squad: &Squad,
    time: &SimTime,
    phase: GamePhase,
    sandbox: bool,
    audio_events: Vec<AudioEvent>,
) -> GameStateSnapshot {
    let enemies = build_enemies(world);

    GameStateSnapshot {
        time: *time,
        phase,
        sandbox,
        squad: build_squad(squad, time.now_ms()),
        hud: HudView {
            enemy_count: enemies.len(),
            max_enemies: MAX_ENEMIES,
            squad_size: squad.len(),
            max_squad_size: MAX_SQUAD_SIZE,
        },
        enemies,
        projectiles: build_projectiles(world),
        cages: build_cages(world),
        crates: build_crates(world),
        audio_events,
    }
}

fn build_squad(squad: &Squad, now_ms: f64) -> SquadView {
    SquadView {
        position: squad.position,
        soldiers: squad
            .soldiers
            .iter()
            .map(|soldier| {
                let weapon = &soldier.weapon;
                SoldierView {
                    position: soldier.position,
                    hp: soldier.hp,
                    max_hp: soldier.max_hp,
                    aim_angle: soldier.aim_angle,
                    weapon_key: weapon.key().to_string(),
                    ammo: weapon.ammo(),
                    magazine_size: weapon.template().magazine_size,
                    weapon_state: weapon.state(now_ms),
                    reload_progress: weapon.reload_progress(now_ms),
                }
            })
            .collect(),
    }
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<(SpawnOrder, EnemyView)> = world
        .query::<(&Enemy, &Position, &Facing, &SpawnOrder)>()
        .iter()
        .map(|(_, (enemy, pos, facing, order))| {
            (
                *order,
                EnemyView {
                    id: order.0,
                    position: pos.0,
                    kind: enemy.kind,
                    hp: enemy.hp,
                    max_hp: enemy.max_hp,
                    facing: facing.0,
                    stance: enemy.stance,
                },
            )
        })
        .collect();
    enemies.sort_by_key(|(order, _)| *order);
    enemies.into_iter().map(|(_, view)| view).collect()
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<(SpawnOrder, ProjectileView)> = world
        .query::<(&Projectile, &Position, &SpawnOrder)>()
        .iter()
        .map(|(_, (projectile, pos, order))| {
            (
                *order,
                ProjectileView {
                    position: pos.0,
                    owner: projectile.owner,
                    color: projectile.color.clone(),
                    radius: projectile.radius,
                },
            )
        })
        .collect();
    projectiles.sort_by_key(|(order, _)| *order);
    projectiles.into_iter().map(|(_, view)| view).collect()
}

fn build_cages(world: &World) -> Vec<CageView> {
    let mut cages: Vec<(SpawnOrder, CageView)> = world
        .query::<(&Cage, &Position, &SpawnOrder)>()
        .iter()
        .map(|(_, (_cage, pos, order))| (*order, CageView { position: pos.0 }))
        .collect();
    cages.sort_by_key(|(order, _)| *order);
    cages.into_iter().map(|(_, view)| view).collect()
}

fn build_crates(world: &World) -> Vec<CrateView> {
    let mut crates: Vec<(SpawnOrder, CrateView)> = world
        .query::<(&WeaponCrate, &Position, &SpawnOrder)>()
        .iter()
        .map(|(_, (weapon_crate, pos, order))| {
            (
                *order,
                CrateView {
                    position: pos.0,
                    weapon_key: weapon_crate.weapon_key.clone(),
                },
            )
        })
        .collect();
    crates.sort_by_key(|(order, _)| *order);
    crates.into_iter().map(|(_, view)| view).collect()
}
