//! Projectile system: muzzle placement, straight-line flight and expiry.

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use fodder_core::components::{Position, Projectile, Velocity};
use fodder_core::constants::{MUZZLE_OFFSET, MUZZLE_OFFSET_STEP, PROJECTILE_BOUNDS_MARGIN};
use fodder_core::enums::Side;
use fodder_core::events::AudioEvent;
use fodder_core::types::{heading_vector, Arena};
use fodder_core::weapons::WeaponTemplate;

use crate::world_setup;

/// A projectile requested by a shooter this tick, spawned after the
/// shooter passes finish.
#[derive(Debug, Clone)]
pub struct ProjectileSpawn {
    pub origin: DVec2,
    /// Flight direction in radians, spread already applied.
    pub angle: f64,
    pub damage: f64,
    pub range: f64,
    pub color: String,
    pub owner: Side,
}

/// Build shot `index` of a volley or burst.
///
/// The muzzle sits `15 + 6 * index` units along the aim direction; the
/// flight angle gets a uniform spread of half the template spread either way.
pub fn muzzle_shot(
    shooter: DVec2,
    aim_angle: f64,
    index: u32,
    template: &WeaponTemplate,
    owner: Side,
    rng: &mut ChaCha8Rng,
) -> ProjectileSpawn {
    let half_spread = template.spread_deg.to_radians() / 2.0;
    let deviation = if half_spread > 0.0 {
        rng.gen_range(-half_spread..=half_spread)
    } else {
        0.0
    };
    let offset = MUZZLE_OFFSET + MUZZLE_OFFSET_STEP * index as f64;

    ProjectileSpawn {
        origin: shooter + heading_vector(aim_angle) * offset,
        angle: aim_angle + deviation,
        damage: template.damage,
        range: template.range,
        color: template.color.clone(),
        owner,
    }
}

/// Queue `count` shots and one `Shot` audio event per projectile.
#[allow(clippy::too_many_arguments)]
pub fn queue_volley(
    shooter: DVec2,
    aim_angle: f64,
    first_index: u32,
    count: u32,
    template: &WeaponTemplate,
    owner: Side,
    rng: &mut ChaCha8Rng,
    spawns: &mut Vec<ProjectileSpawn>,
    audio_events: &mut Vec<AudioEvent>,
) {
    for i in 0..count {
        spawns.push(muzzle_shot(shooter, aim_angle, first_index + i, template, owner, rng));
        audio_events.push(AudioEvent::Shot {
            side: owner,
            weapon_key: template.key.clone(),
        });
    }
}

/// Materialize queued shots as entities, in queue order.
pub fn spawn_queued(world: &mut World, spawns: &mut Vec<ProjectileSpawn>, next_order: &mut u64) {
    for spawn in spawns.drain(..) {
        world_setup::spawn_projectile(world, next_order, spawn);
    }
}

/// Advance every projectile and despawn the ones past their range or
/// outside the arena margin.
pub fn run(world: &mut World, arena: &Arena, dt: f64, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (pos, vel, projectile)) in
        world.query_mut::<(&mut Position, &Velocity, &mut Projectile)>()
    {
        pos.0 += vel.0 * dt;
        projectile.distance_traveled += projectile.speed * dt;

        let spent = projectile.distance_traveled >= projectile.max_range;
        if spent || !arena.contains_with_margin(pos.0, PROJECTILE_BOUNDS_MARGIN) {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
