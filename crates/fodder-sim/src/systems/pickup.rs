//! Pickup system: cage rescues and weapon crate loot.

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use fodder_core::components::{Cage, Position, SpawnOrder, WeaponCrate};
use fodder_core::constants::{CAGE_RESCUE_RADIUS, CRATE_PICKUP_RADIUS};
use fodder_core::events::AudioEvent;
use fodder_core::weapons::WeaponCatalog;

use crate::squad::Squad;

/// Free captives whose cage touches any soldier. Each opened cage adds one
/// soldier carrying the starting weapon. A full squad leaves cages closed.
pub fn rescue_cages(
    world: &mut World,
    squad: &mut Squad,
    catalog: &WeaponCatalog,
    starting_weapon: &str,
    despawn_buffer: &mut Vec<Entity>,
    audio_events: &mut Vec<AudioEvent>,
) {
    despawn_buffer.clear();

    let mut cages: Vec<(SpawnOrder, Entity, DVec2)> = world
        .query::<(&Cage, &Position, &SpawnOrder)>()
        .iter()
        .map(|(entity, (_cage, pos, order))| (*order, entity, pos.0))
        .collect();
    cages.sort_by_key(|(order, _, _)| *order);

    for (_, entity, cage_pos) in cages.into_iter().rev() {
        if squad.is_full() {
            break;
        }
        let touched = squad
            .soldiers
            .iter()
            .any(|soldier| soldier.position.distance(cage_pos) < CAGE_RESCUE_RADIUS);
        if touched && squad.add_soldier(catalog.get(starting_weapon)) {
            despawn_buffer.push(entity);
            log::debug!("captive rescued, squad size {}", squad.len());
            audio_events.push(AudioEvent::Rescue {
                squad_size: squad.len(),
            });
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}

/// Open crates within reach of the squad center. The weapon goes to one
/// random soldier; the crate is consumed even when nobody can take it.
pub fn loot_crates(
    world: &mut World,
    squad: &mut Squad,
    catalog: &WeaponCatalog,
    rng: &mut ChaCha8Rng,
    despawn_buffer: &mut Vec<Entity>,
    audio_events: &mut Vec<AudioEvent>,
) {
    despawn_buffer.clear();

    let mut crates: Vec<(SpawnOrder, Entity, DVec2, String)> = world
        .query::<(&WeaponCrate, &Position, &SpawnOrder)>()
        .iter()
        .map(|(entity, (weapon_crate, pos, order))| {
            (*order, entity, pos.0, weapon_crate.weapon_key.clone())
        })
        .collect();
    crates.sort_by_key(|(order, _, _, _)| *order);

    for (_, entity, crate_pos, weapon_key) in crates.into_iter().rev() {
        if squad.position.distance(crate_pos) >= CRATE_PICKUP_RADIUS {
            continue;
        }
        despawn_buffer.push(entity);

        if squad.is_empty() {
            continue;
        }
        let lucky = rng.gen_range(0..squad.len());
        squad.soldiers[lucky].equip(catalog.get(&weapon_key));
        log::debug!("soldier {lucky} picked up {weapon_key}");
        audio_events.push(AudioEvent::WeaponPickup { weapon_key });
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
