//! Enemy AI system: pursuit, facing and autonomous fire.
//!
//! Calls the pure decision function from fodder-enemy-ai for each enemy,
//! then writes the result back and runs the two fire gates.

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use fodder_core::components::{Enemy, Facing, Position, SpawnOrder};
use fodder_core::enums::Side;
use fodder_core::events::AudioEvent;

use fodder_enemy_ai::fsm::{evaluate, may_request_fire, EnemyContext};

use crate::systems::projectile::{queue_volley, ProjectileSpawn};
use crate::weapon::{DenyReason, FireDecision, WeaponInstance};

/// Enemies act oldest first.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    squad_center: DVec2,
    dt: f64,
    now_ms: f64,
    rng: &mut ChaCha8Rng,
    spawns: &mut Vec<ProjectileSpawn>,
    audio_events: &mut Vec<AudioEvent>,
) {
    let mut order: Vec<(SpawnOrder, Entity)> = world
        .query::<(&Enemy, &SpawnOrder)>()
        .iter()
        .map(|(entity, (_enemy, spawn_order))| (*spawn_order, entity))
        .collect();
    order.sort_by_key(|(spawn_order, _)| *spawn_order);

    for (_, entity) in order {
        let Ok((enemy, pos, facing, weapon)) = world
            .query_one_mut::<(&mut Enemy, &mut Position, &mut Facing, &mut WeaponInstance)>(entity)
        else {
            continue;
        };
        weapon.update(now_ms);

        let update = evaluate(&EnemyContext {
            position: pos.0,
            squad_center,
            speed: enemy.speed,
            dt,
        });
        enemy.stance = update.stance;
        facing.0 = update.facing;
        pos.0 = update.new_position;

        // Entity cadence first, then the weapon's own gate.
        if may_request_fire(now_ms, enemy.next_shot_ms) {
            let decision = weapon.request_fire(now_ms);
            match decision {
                FireDecision::Volley { count } => queue_volley(
                    pos.0,
                    facing.0,
                    0,
                    count,
                    weapon.template(),
                    Side::Enemy,
                    rng,
                    spawns,
                    audio_events,
                ),
                FireDecision::Denied(DenyReason::Empty) => {
                    audio_events.push(AudioEvent::Empty {
                        side: Side::Enemy,
                        weapon_key: weapon.key().to_string(),
                    });
                }
                FireDecision::BurstArmed | FireDecision::Denied(_) => {}
            }
            if decision.authorized() {
                enemy.next_shot_ms = now_ms + enemy.fire_rate_ms;
            }
        }

        while let Some(shot_index) = weapon.next_burst_shot(now_ms) {
            queue_volley(
                pos.0,
                facing.0,
                shot_index,
                1,
                weapon.template(),
                Side::Enemy,
                rng,
                spawns,
                audio_events,
            );
        }
    }
}
