//! Entity spawn factories for the simulation world.
//!
//! Creates enemies, cages, crates and projectiles with their component
//! bundles, plus the random placement helpers shared by the scheduler and
//! the manual spawn commands.

use glam::DVec2;
use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use fodder_core::components::*;
use fodder_core::constants::*;
use fodder_core::enums::*;
use fodder_core::types::{heading_vector, Arena};
use fodder_core::weapons::WeaponCatalog;
use fodder_enemy_ai::profiles::get_profile;

use crate::systems::projectile::ProjectileSpawn;
use crate::weapon::WeaponInstance;

/// Scripted opening of a regular session: one light enemy and one cage.
pub fn setup_session(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    catalog: &WeaponCatalog,
    next_order: &mut u64,
    fallback_weapon: &str,
) {
    spawn_enemy(
        world,
        rng,
        catalog,
        next_order,
        EnemyKind::Light,
        DVec2::new(OPENING_ENEMY_X, OPENING_ENEMY_Y),
        fallback_weapon,
    );
    spawn_cage(world, next_order, DVec2::new(OPENING_CAGE_X, OPENING_CAGE_Y));
}

/// Take the next creation sequence number.
pub fn take_spawn_order(next_order: &mut u64) -> SpawnOrder {
    let order = SpawnOrder(*next_order);
    *next_order += 1;
    order
}

/// Spawn an enemy of `kind` with profile stats and a class-biased weapon.
pub fn spawn_enemy(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    catalog: &WeaponCatalog,
    next_order: &mut u64,
    kind: EnemyKind,
    position: DVec2,
    fallback_weapon: &str,
) -> Entity {
    let profile = get_profile(kind);
    let weapon_key = choose_enemy_weapon(catalog, kind, rng, fallback_weapon);
    let weapon = WeaponInstance::new(catalog.get(&weapon_key));

    let enemy = Enemy {
        kind,
        hp: profile.max_hp,
        max_hp: profile.max_hp,
        speed: profile.speed,
        fire_rate_ms: profile.fire_rate_ms,
        next_shot_ms: 0.0,
        stance: EnemyStance::Pursue,
    };

    log::debug!("spawn {kind:?} at ({:.0}, {:.0}) with {weapon_key}", position.x, position.y);

    world.spawn((
        enemy,
        Position(position),
        Facing(0.0),
        weapon,
        take_spawn_order(next_order),
    ))
}

pub fn spawn_cage(world: &mut World, next_order: &mut u64, position: DVec2) -> Entity {
    log::debug!("spawn cage at ({:.0}, {:.0})", position.x, position.y);
    world.spawn((Cage, Position(position), take_spawn_order(next_order)))
}

pub fn spawn_crate(
    world: &mut World,
    next_order: &mut u64,
    position: DVec2,
    weapon_key: String,
) -> Entity {
    log::debug!(
        "spawn crate ({weapon_key}) at ({:.0}, {:.0})",
        position.x,
        position.y
    );
    world.spawn((
        WeaponCrate { weapon_key },
        Position(position),
        take_spawn_order(next_order),
    ))
}

pub fn spawn_projectile(world: &mut World, next_order: &mut u64, spawn: ProjectileSpawn) -> Entity {
    let velocity = heading_vector(spawn.angle) * PROJECTILE_SPEED;
    world.spawn((
        Projectile {
            damage: spawn.damage,
            owner: spawn.owner,
            color: spawn.color,
            radius: PROJECTILE_RADIUS,
            speed: PROJECTILE_SPEED,
            distance_traveled: 0.0,
            max_range: spawn.range,
        },
        Position(spawn.origin),
        Velocity(velocity),
        take_spawn_order(next_order),
    ))
}

/// A point just outside a uniformly chosen arena edge.
pub fn random_edge_position(rng: &mut ChaCha8Rng, arena: &Arena) -> DVec2 {
    match rng.gen_range(0..4) {
        0 => DVec2::new(random_span(rng, 0.0, arena.width), -EDGE_SPAWN_OFFSET),
        1 => DVec2::new(
            arena.width + EDGE_SPAWN_OFFSET,
            random_span(rng, 0.0, arena.height),
        ),
        2 => DVec2::new(
            random_span(rng, 0.0, arena.width),
            arena.height + EDGE_SPAWN_OFFSET,
        ),
        _ => DVec2::new(-EDGE_SPAWN_OFFSET, random_span(rng, 0.0, arena.height)),
    }
}

/// A point inside the arena, at least [`SPAWN_MARGIN`] from every edge.
pub fn random_field_position(rng: &mut ChaCha8Rng, arena: &Arena) -> DVec2 {
    DVec2::new(
        random_span(rng, SPAWN_MARGIN, arena.width - SPAWN_MARGIN),
        random_span(rng, SPAWN_MARGIN, arena.height - SPAWN_MARGIN),
    )
}

fn random_span(rng: &mut ChaCha8Rng, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        (low + high) / 2.0
    }
}

pub fn random_enemy_kind(rng: &mut ChaCha8Rng) -> EnemyKind {
    EnemyKind::ALL[rng.gen_range(0..EnemyKind::ALL.len())]
}

/// Pick a weapon key for an enemy of `kind`.
///
/// Draws from the kind's preferred classes, then from any template, then
/// falls back to `fallback` when the catalog is empty.
pub fn choose_enemy_weapon(
    catalog: &WeaponCatalog,
    kind: EnemyKind,
    rng: &mut ChaCha8Rng,
    fallback: &str,
) -> String {
    let preferred: Vec<&str> = get_profile(kind)
        .preferred_classes
        .iter()
        .flat_map(|class| catalog.keys_of_class(*class))
        .collect();

    if let Some(key) = preferred.choose(rng) {
        return key.to_string();
    }
    random_catalog_weapon(catalog, rng, fallback)
}

/// Loot for a crate: any template other than the starting weapon, falling
/// back to the full catalog.
pub fn random_crate_weapon(
    catalog: &WeaponCatalog,
    rng: &mut ChaCha8Rng,
    starting_weapon: &str,
) -> String {
    let loot: Vec<&str> = catalog
        .keys()
        .into_iter()
        .filter(|key| *key != starting_weapon)
        .collect();
    match loot.choose(rng) {
        Some(key) => key.to_string(),
        None => random_catalog_weapon(catalog, rng, starting_weapon),
    }
}

/// Any registered template key, uniformly; `fallback` when none exist.
pub fn random_catalog_weapon(catalog: &WeaponCatalog, rng: &mut ChaCha8Rng, fallback: &str) -> String {
    catalog
        .keys()
        .choose(rng)
        .map(|key| key.to_string())
        .unwrap_or_else(|| fallback.to_string())
}
