//! Squad movement, formation placement and soldier fire.

use rand_chacha::ChaCha8Rng;

use fodder_core::constants::SQUAD_SPEED;
use fodder_core::enums::Side;
use fodder_core::events::AudioEvent;
use fodder_core::input::InputSnapshot;
use fodder_core::types::{angle_between, Arena};

use crate::squad::Squad;
use crate::systems::projectile::{queue_volley, ProjectileSpawn};
use crate::weapon::{DenyReason, FireDecision};

/// Move the squad from the held keys, re-place the formation, then let every
/// soldier aim at the pointer and fire.
#[allow(clippy::too_many_arguments)]
pub fn run(
    squad: &mut Squad,
    input: &InputSnapshot,
    arena: &Arena,
    dt: f64,
    now_ms: f64,
    rng: &mut ChaCha8Rng,
    spawns: &mut Vec<ProjectileSpawn>,
    audio_events: &mut Vec<AudioEvent>,
) {
    let step = input.keys.direction() * SQUAD_SPEED * dt;
    squad.position = arena.clamp_squad(squad.position + step);
    squad.apply_formation();

    let target = input.pointer.target();
    for (index, soldier) in squad.soldiers.iter_mut().enumerate() {
        if soldier.weapon.update(now_ms) {
            audio_events.push(AudioEvent::ReloadComplete {
                soldier_index: index,
            });
        }

        soldier.aim_angle = angle_between(soldier.position, target);

        if input.pointer.pressed {
            match soldier.weapon.request_fire(now_ms) {
                FireDecision::Volley { count } => queue_volley(
                    soldier.position,
                    soldier.aim_angle,
                    0,
                    count,
                    soldier.weapon.template(),
                    Side::Player,
                    rng,
                    spawns,
                    audio_events,
                ),
                FireDecision::Denied(DenyReason::Empty) => {
                    audio_events.push(AudioEvent::Empty {
                        side: Side::Player,
                        weapon_key: soldier.weapon.key().to_string(),
                    });
                }
                FireDecision::BurstArmed | FireDecision::Denied(_) => {}
            }
        }

        while let Some(shot_index) = soldier.weapon.next_burst_shot(now_ms) {
            queue_volley(
                soldier.position,
                soldier.aim_angle,
                shot_index,
                1,
                soldier.weapon.template(),
                Side::Player,
                rng,
                spawns,
                audio_events,
            );
        }
    }
}
