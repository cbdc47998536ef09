//! Spawn scheduler: three independent timers that top up enemies, cages
//! and crates up to their population caps.

use hecs::World;
use rand_chacha::ChaCha8Rng;

use fodder_core::components::{Cage, Enemy, WeaponCrate};
use fodder_core::constants::*;
use fodder_core::types::Arena;
use fodder_core::weapons::WeaponCatalog;

use crate::world_setup;

/// Timer state. Each timer resets to zero when it passes its interval,
/// whether or not the cap allowed a spawn.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    /// Automatic spawning; off in sandbox sessions.
    pub enabled: bool,
    pub enemy_timer: f64,
    pub cage_timer: f64,
    pub crate_timer: f64,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SpawnScheduler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            enemy_timer: 0.0,
            cage_timer: 0.0,
            crate_timer: 0.0,
        }
    }

    pub fn reset_timers(&mut self) {
        self.enemy_timer = 0.0;
        self.cage_timer = 0.0;
        self.crate_timer = 0.0;
    }
}

/// Timers that passed their interval this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Due {
    enemy: bool,
    cage: bool,
    weapon_crate: bool,
}

fn advance(scheduler: &mut SpawnScheduler, dt: f64) -> Due {
    fn step(timer: &mut f64, dt: f64, interval: f64) -> bool {
        *timer += dt;
        if *timer > interval {
            *timer = 0.0;
            true
        } else {
            false
        }
    }

    Due {
        enemy: step(&mut scheduler.enemy_timer, dt, ENEMY_SPAWN_INTERVAL),
        cage: step(&mut scheduler.cage_timer, dt, CAGE_SPAWN_INTERVAL),
        weapon_crate: step(&mut scheduler.crate_timer, dt, CRATE_SPAWN_INTERVAL),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    catalog: &WeaponCatalog,
    scheduler: &mut SpawnScheduler,
    arena: &Arena,
    starting_weapon: &str,
    next_order: &mut u64,
    dt: f64,
) {
    let due = advance(scheduler, dt);
    if !scheduler.enabled {
        return;
    }

    if due.enemy && world.query::<&Enemy>().iter().count() < MAX_ENEMIES {
        let kind = world_setup::random_enemy_kind(rng);
        let position = world_setup::random_edge_position(rng, arena);
        world_setup::spawn_enemy(world, rng, catalog, next_order, kind, position, starting_weapon);
    }

    if due.cage && world.query::<&Cage>().iter().count() < MAX_CAGES {
        let position = world_setup::random_field_position(rng, arena);
        world_setup::spawn_cage(world, next_order, position);
    }

    if due.weapon_crate && world.query::<&WeaponCrate>().iter().count() < MAX_CRATES {
        let position = world_setup::random_field_position(rng, arena);
        let weapon_key = world_setup::random_crate_weapon(catalog, rng, starting_weapon);
        world_setup::spawn_crate(world, next_order, position, weapon_key);
    }
}
