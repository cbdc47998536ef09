//! Collision system: enemy separation, squad push and projectile hits.
//!
//! Passes run in a fixed order and iterate entities by creation sequence,
//! so results do not depend on archetype storage order.

use glam::DVec2;
use hecs::{Entity, World};

use fodder_core::components::{Enemy, Position, Projectile, SpawnOrder};
use fodder_core::constants::*;
use fodder_core::enums::{EnemyKind, Side};
use fodder_core::events::AudioEvent;

use crate::squad::Squad;

/// Run all three passes.
pub fn run(
    world: &mut World,
    squad: &mut Squad,
    dt: f64,
    despawn_buffer: &mut Vec<Entity>,
    audio_events: &mut Vec<AudioEvent>,
) {
    separate_enemies(world, dt);
    push_squad(world, squad);
    resolve_hits(world, squad, despawn_buffer, audio_events);
}

/// Enemies in creation order with their current positions.
fn enemies_in_order(world: &World) -> Vec<(SpawnOrder, Entity, DVec2)> {
    let mut enemies: Vec<(SpawnOrder, Entity, DVec2)> = world
        .query::<(&Enemy, &Position, &SpawnOrder)>()
        .iter()
        .map(|(entity, (_enemy, pos, order))| (*order, entity, pos.0))
        .collect();
    enemies.sort_by_key(|(order, _, _)| *order);
    enemies
}

fn write_positions(world: &mut World, enemies: &[(SpawnOrder, Entity, DVec2)]) {
    for (_, entity, position) in enemies {
        if let Ok(mut pos) = world.get::<&mut Position>(*entity) {
            pos.0 = *position;
        }
    }
}

/// Pairwise soft separation. Each enemy of an overlapping pair moves half of
/// `(ENEMY_MIN_DIST - d) * SEPARATION_GAIN * dt` away from the other.
/// Coincident pairs have no defined direction and are left alone.
pub fn separate_enemies(world: &mut World, dt: f64) {
    let mut enemies = enemies_in_order(world);

    for i in 0..enemies.len() {
        for j in (i + 1)..enemies.len() {
            let delta = enemies[j].2 - enemies[i].2;
            let distance = delta.length();
            if distance <= 0.0 || distance >= ENEMY_MIN_DIST {
                continue;
            }
            let force = (ENEMY_MIN_DIST - distance) * SEPARATION_GAIN * dt;
            let push = delta / distance * (force / 2.0);
            enemies[i].2 -= push;
            enemies[j].2 += push;
        }
    }

    write_positions(world, &enemies);
}

/// Resolve squad/enemy overlap. The squad yields the full overlap, the enemy
/// a [`ENEMY_PUSH_SHARE`] fraction of it.
pub fn push_squad(world: &mut World, squad: &mut Squad) {
    let min_dist = SQUAD_RADIUS + ENEMY_SIZE / 2.0;
    let mut enemies = enemies_in_order(world);

    for (_, _, enemy_pos) in enemies.iter_mut() {
        let delta = squad.position - *enemy_pos;
        let distance = delta.length();
        if distance <= 0.0 || distance >= min_dist {
            continue;
        }
        let overlap = min_dist - distance;
        let normal = delta / distance;
        squad.position += normal * overlap;
        *enemy_pos -= normal * (overlap * ENEMY_PUSH_SHARE);
    }

    write_positions(world, &enemies);
}

struct Target {
    entity: Entity,
    position: DVec2,
    hp: f64,
    kind: EnemyKind,
}

/// Apply projectile hits.
///
/// Projectiles are scanned newest first. A player projectile tests enemies
/// newest first, an enemy projectile tests soldiers last slot first; the
/// first overlap takes the damage and consumes the projectile. Targets
/// killed earlier in the pass are skipped. Dead enemies and soldiers are
/// removed once the pass is complete.
pub fn resolve_hits(
    world: &mut World,
    squad: &mut Squad,
    despawn_buffer: &mut Vec<Entity>,
    audio_events: &mut Vec<AudioEvent>,
) {
    despawn_buffer.clear();

    let mut projectiles: Vec<(SpawnOrder, Entity, DVec2, f64, f64, Side)> = world
        .query::<(&Projectile, &Position, &SpawnOrder)>()
        .iter()
        .map(|(entity, (projectile, pos, order))| {
            (
                *order,
                entity,
                pos.0,
                projectile.radius,
                projectile.damage,
                projectile.owner,
            )
        })
        .collect();
    projectiles.sort_by_key(|p| p.0);

    let mut targets: Vec<(SpawnOrder, Target)> = world
        .query::<(&Enemy, &Position, &SpawnOrder)>()
        .iter()
        .map(|(entity, (enemy, pos, order))| {
            (
                *order,
                Target {
                    entity,
                    position: pos.0,
                    hp: enemy.hp,
                    kind: enemy.kind,
                },
            )
        })
        .collect();
    targets.sort_by_key(|(order, _)| *order);

    for &(_, bullet, position, radius, damage, owner) in projectiles.iter().rev() {
        let hit = match owner {
            Side::Player => {
                let reach = ENEMY_SIZE / 2.0 + radius;
                targets
                    .iter_mut()
                    .rev()
                    .map(|(_, target)| target)
                    .find(|target| target.hp > 0.0 && target.position.distance(position) < reach)
                    .map(|target| {
                        target.hp -= damage;
                        if target.hp <= 0.0 {
                            audio_events.push(AudioEvent::EnemyKilled { kind: target.kind });
                        }
                    })
                    .is_some()
            }
            Side::Enemy => {
                let reach = SOLDIER_SIZE / 2.0 + radius;
                squad
                    .soldiers
                    .iter_mut()
                    .rev()
                    .find(|soldier| soldier.is_alive() && soldier.position.distance(position) < reach)
                    .map(|soldier| soldier.take_damage(damage))
                    .is_some()
            }
        };
        if hit {
            despawn_buffer.push(bullet);
        }
    }

    for (_, target) in &targets {
        if target.hp <= 0.0 {
            despawn_buffer.push(target.entity);
        } else if let Ok(mut enemy) = world.get::<&mut Enemy>(target.entity) {
            enemy.hp = target.hp;
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    let fallen = squad.remove_dead();
    let survivors = squad.len();
    for down in (0..fallen).rev() {
        audio_events.push(AudioEvent::SoldierDown {
            remaining: survivors + down,
        });
    }
}
