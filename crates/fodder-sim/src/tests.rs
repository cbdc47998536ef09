//! Tests for the simulation engine, collision passes, pickups and spawning.

use std::sync::{Arc, Mutex};

use glam::DVec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fodder_core::commands::SessionCommand;
use fodder_core::components::*;
use fodder_core::constants::*;
use fodder_core::enums::*;
use fodder_core::events::AudioEvent;
use fodder_core::input::{InputSnapshot, MoveKeys, PointerState};
use fodder_core::save::*;
use fodder_core::state::GameStateSnapshot;
use fodder_core::types::{heading_vector, Arena};
use fodder_core::weapons::WeaponCatalog;

use crate::audio::AudioSink;
use crate::engine::{SimConfig, SimulationEngine};
use crate::error::SimError;
use crate::squad::{formation_offset, Squad};
use crate::systems::projectile::{queue_volley, ProjectileSpawn};
use crate::systems::spawner::SpawnScheduler;
use crate::systems::{collision, enemy_ai, pickup, spawner};
use crate::weapon::{FireDecision, WeaponInstance};
use crate::world_setup;

const DT: f64 = 1.0 / 60.0;

fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

fn firing_at(x: f64, y: f64) -> InputSnapshot {
    InputSnapshot {
        keys: MoveKeys::default(),
        pointer: PointerState { x, y, pressed: true },
    }
}

fn started(command: SessionCommand) -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(command);
    engine.tick(0.0, &idle());
    engine
}

fn sandbox() -> SimulationEngine {
    started(SessionCommand::StartSandbox)
}

fn count<T: hecs::Component>(world: &World) -> usize {
    world.query::<&T>().iter().count()
}

fn shot(origin: DVec2, damage: f64, owner: Side) -> ProjectileSpawn {
    ProjectileSpawn {
        origin,
        angle: 0.0,
        damage,
        range: 1000.0,
        color: "#ffffff".to_string(),
        owner,
    }
}

fn shots_by(snapshot: &GameStateSnapshot, side: Side) -> usize {
    snapshot
        .audio_events
        .iter()
        .filter(|e| matches!(e, AudioEvent::Shot { side: s, .. } if *s == side))
        .count()
}

fn squad_center() -> DVec2 {
    DVec2::new(SQUAD_START_X, SQUAD_START_Y)
}

// ---- Determinism ----

fn scripted_input(tick: usize) -> InputSnapshot {
    InputSnapshot {
        keys: MoveKeys {
            right: tick < 120,
            down: (120..240).contains(&tick),
            ..Default::default()
        },
        pointer: PointerState {
            x: 200.0,
            y: 200.0,
            pressed: tick % 3 != 0,
        },
    }
}

#[test]
fn test_determinism_same_seed() {
    let config = SimConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut engine_a = SimulationEngine::new(config.clone());
    let mut engine_b = SimulationEngine::new(config);
    engine_a.queue_command(SessionCommand::StartNewGame);
    engine_b.queue_command(SessionCommand::StartNewGame);

    for tick in 0..600 {
        let input = scripted_input(tick);
        let snap_a = engine_a.tick(DT, &input);
        let snap_b = engine_b.tick(DT, &input);

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged with same seed at tick {tick}");
    }
}

// ---- Session lifecycle ----

#[test]
fn test_initial_phase_is_main_menu() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let snapshot = engine.tick(DT, &idle());
    assert_eq!(snapshot.phase, GamePhase::MainMenu);
    assert_eq!(snapshot.time.tick, 0);
    assert!(snapshot.squad.soldiers.is_empty());
}

#[test]
fn test_new_game_opening() {
    let engine = started(SessionCommand::StartNewGame);
    assert_eq!(engine.phase(), GamePhase::Playing);
    assert!(!engine.is_sandbox());

    let squad = engine.squad();
    assert_eq!(squad.len(), 1);
    assert_eq!(squad.position, squad_center());
    assert_eq!(squad.soldiers[0].weapon.key(), STARTING_WEAPON);
    assert_eq!(squad.soldiers[0].hp, SOLDIER_MAX_HP);

    let enemies: Vec<_> = engine
        .world()
        .query::<(&Enemy, &Position)>()
        .iter()
        .map(|(_, (enemy, pos))| (enemy.kind, pos.0))
        .collect();
    assert_eq!(enemies.len(), 1);
    assert_eq!(enemies[0].0, EnemyKind::Light);

    let cages: Vec<DVec2> = engine
        .world()
        .query::<(&Cage, &Position)>()
        .iter()
        .map(|(_, (_, pos))| pos.0)
        .collect();
    assert_eq!(cages, vec![DVec2::new(OPENING_CAGE_X, OPENING_CAGE_Y)]);
}

#[test]
fn test_sandbox_has_no_scripted_or_timed_spawns() {
    let mut engine = sandbox();
    assert!(engine.is_sandbox());
    assert!(!engine.scheduler().enabled);

    for _ in 0..(40 * 10) {
        engine.tick(0.1, &idle());
    }
    assert_eq!(count::<Enemy>(engine.world()), 0);
    assert_eq!(count::<Cage>(engine.world()), 0);
    assert_eq!(count::<WeaponCrate>(engine.world()), 0);
}

#[test]
fn test_manual_spawns_in_sandbox() {
    let mut engine = sandbox();
    engine.queue_commands([
        SessionCommand::SpawnEnemy {
            kind: Some(EnemyKind::Sniper),
            at: Some(DVec2::new(100.0, 100.0)),
        },
        SessionCommand::SpawnEnemy {
            kind: None,
            at: None,
        },
        SessionCommand::SpawnCage { at: None },
        SessionCommand::SpawnCrate {
            at: None,
            weapon: None,
        },
    ]);
    let snapshot = engine.tick(0.0, &idle());

    assert_eq!(snapshot.enemies.len(), 2);
    assert_eq!(snapshot.enemies[0].kind, EnemyKind::Sniper);
    assert_eq!(snapshot.enemies[0].max_hp, SNIPER_MAX_HP);
    assert_eq!(snapshot.cages.len(), 1);
    assert_eq!(snapshot.crates.len(), 1);
    assert_ne!(snapshot.crates[0].weapon_key, STARTING_WEAPON);

    let arena = Arena::default();
    let cage = snapshot.cages[0].position;
    assert!(cage.x >= SPAWN_MARGIN && cage.x <= arena.width - SPAWN_MARGIN);
    assert!(cage.y >= SPAWN_MARGIN && cage.y <= arena.height - SPAWN_MARGIN);

    // Random enemy placement lands just outside an edge.
    let edge = snapshot.enemies[1].position;
    assert!(!arena.contains_with_margin(edge, EDGE_SPAWN_OFFSET - 1.0));
}

#[test]
fn test_clear_field() {
    let mut engine = started(SessionCommand::StartNewGame);
    engine.queue_commands([
        SessionCommand::SpawnCrate {
            at: Some(DVec2::new(100.0, 100.0)),
            weapon: Some("mp".to_string()),
        },
        SessionCommand::ClearField,
    ]);
    let snapshot = engine.tick(0.0, &idle());
    assert!(snapshot.enemies.is_empty());
    assert!(snapshot.cages.is_empty());
    assert!(snapshot.crates.is_empty());
    assert_eq!(snapshot.squad.soldiers.len(), 1);
}

#[test]
fn test_quit_to_menu_drops_session() {
    let mut engine = started(SessionCommand::StartNewGame);
    for _ in 0..30 {
        engine.tick(DT, &idle());
    }
    assert!(engine.scheduler().enemy_timer > 0.0);
    engine.queue_command(SessionCommand::QuitToMenu);
    let snapshot = engine.tick(DT, &idle());
    assert_eq!(snapshot.phase, GamePhase::MainMenu);
    assert!(!snapshot.sandbox);
    assert!(snapshot.squad.soldiers.is_empty());
    assert_eq!(engine.save(0), Err(SimError::NoSession));
    assert_eq!(snapshot.time.tick, 0);
    assert_eq!(snapshot.time.elapsed_secs, 0.0);
    assert_eq!(engine.scheduler().enemy_timer, 0.0);

    // Manual spawns need a session.
    engine.queue_command(SessionCommand::SpawnCage { at: None });
    engine.tick(DT, &idle());
    assert_eq!(count::<Cage>(engine.world()), 0);
}

// ---- Tick timing ----

#[test]
fn test_clock_advances_by_elapsed_time() {
    let mut engine = sandbox();
    let before = engine.time();
    engine.tick(0.25, &idle());
    let after = engine.time();
    assert_eq!(after.tick, before.tick + 1);
    assert!((after.elapsed_secs - before.elapsed_secs - 0.25).abs() < 1e-12);
}

#[test]
fn test_bad_elapsed_time_counts_as_zero() {
    let mut engine = sandbox();
    for dt in [-1.0, f64::NAN, f64::INFINITY] {
        engine.tick(
            dt,
            &InputSnapshot {
                keys: MoveKeys {
                    right: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
    }
    assert_eq!(engine.time().elapsed_secs, 0.0);
    assert_eq!(engine.squad().position, squad_center());
}

// ---- Pause/Resume ----

#[test]
fn test_pause_freezes_gameplay() {
    let mut engine = started(SessionCommand::StartNewGame);
    engine.tick(DT, &idle());
    engine.queue_command(SessionCommand::Pause);
    let frozen = engine.tick(DT, &idle());
    assert_eq!(frozen.phase, GamePhase::Paused);

    let moving = InputSnapshot {
        keys: MoveKeys {
            left: true,
            ..Default::default()
        },
        pointer: PointerState {
            x: 0.0,
            y: 0.0,
            pressed: true,
        },
    };
    for _ in 0..60 {
        let snapshot = engine.tick(DT, &moving);
        assert_eq!(snapshot.time.tick, frozen.time.tick);
        assert_eq!(snapshot.squad.position, frozen.squad.position);
        assert_eq!(snapshot.enemies[0].position, frozen.enemies[0].position);
        assert!(snapshot.projectiles.is_empty());
    }

    engine.queue_command(SessionCommand::TogglePause);
    let resumed = engine.tick(DT, &moving);
    assert_eq!(resumed.phase, GamePhase::Playing);
    assert!(resumed.squad.position.x < frozen.squad.position.x);
}

// ---- Movement and formation ----

#[test]
fn test_squad_moves_and_clamps() {
    let mut engine = sandbox();
    let right = InputSnapshot {
        keys: MoveKeys {
            right: true,
            ..Default::default()
        },
        ..Default::default()
    };
    engine.tick(1.0, &right);
    assert!((engine.squad().position.x - (SQUAD_START_X + SQUAD_SPEED)).abs() < 1e-9);

    for _ in 0..20 {
        engine.tick(1.0, &right);
    }
    assert_eq!(engine.squad().position.x, ARENA_WIDTH - SOLDIER_SIZE);
}

#[test]
fn test_formation_layout() {
    assert_eq!(formation_offset(0, 1), DVec2::ZERO);

    for count in 2..=MAX_SQUAD_SIZE {
        for index in 0..count {
            let offset = formation_offset(index, count);
            assert!((offset.length() - FORMATION_RADIUS).abs() < 1e-9);
        }
    }
    let leader = formation_offset(0, 3);
    assert!((leader - DVec2::new(FORMATION_RADIUS, 0.0)).length() < 1e-9);
}

#[test]
fn test_soldiers_aim_at_pointer() {
    let mut engine = sandbox();
    engine.tick(DT, &firing_at(SQUAD_START_X, 0.0));
    let aim = engine.squad().soldiers[0].aim_angle;
    assert!((aim + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
}

// ---- Weapons in the loop ----

#[test]
fn test_pistol_first_shot_and_interval() {
    let mut engine = sandbox();
    let input = firing_at(900.0, SQUAD_START_Y);

    let first = engine.tick(0.1, &input);
    assert_eq!(shots_by(&first, Side::Player), 1);
    assert_eq!(first.squad.soldiers[0].ammo, 7);

    // 100..300 ms: still inside the 400 ms interval.
    for _ in 0..3 {
        assert_eq!(shots_by(&engine.tick(0.1, &input), Side::Player), 0);
    }
    assert_eq!(shots_by(&engine.tick(0.1, &input), Side::Player), 1);
}

#[test]
fn test_burst_emits_exactly_burst_count() {
    let mut engine = sandbox();
    let carbine = engine.catalog().get("carbine");
    engine.squad_mut().soldiers[0].equip(carbine);

    // 30 ticks of 16 ms stay inside the 500 ms fire interval.
    let input = firing_at(900.0, SQUAD_START_Y);
    let mut shots = 0;
    for _ in 0..30 {
        shots += shots_by(&engine.tick(0.016, &input), Side::Player);
    }
    assert_eq!(shots, 3);
    assert_eq!(engine.squad().soldiers[0].weapon.ammo(), 27);
}

#[test]
fn test_burst_catch_up_after_stall() {
    let mut engine = sandbox();
    let carbine = engine.catalog().get("carbine");
    engine.squad_mut().soldiers[0].equip(carbine);

    let input = firing_at(900.0, SQUAD_START_Y);
    let mut shots = shots_by(&engine.tick(0.3, &input), Side::Player);
    // One slow frame later every pending shot is out at once.
    shots += shots_by(&engine.tick(0.1, &idle()), Side::Player);
    assert_eq!(shots, 3);
}

#[test]
fn test_reload_command_and_completion_event() {
    let mut engine = sandbox();
    engine.tick(0.1, &firing_at(900.0, SQUAD_START_Y));
    engine.queue_command(SessionCommand::Reload);
    let snapshot = engine.tick(0.1, &idle());
    assert_eq!(snapshot.squad.soldiers[0].weapon_state, WeaponState::Reloading);

    let mut completed = false;
    for _ in 0..25 {
        let snapshot = engine.tick(0.1, &idle());
        completed |= snapshot
            .audio_events
            .contains(&AudioEvent::ReloadComplete { soldier_index: 0 });
    }
    assert!(completed);
    assert_eq!(engine.squad().soldiers[0].weapon.ammo(), 8);
}

#[test]
fn test_enemy_fire_respects_entity_cadence() {
    let mut engine = sandbox();
    engine.queue_command(SessionCommand::SpawnEnemy {
        kind: Some(EnemyKind::Light),
        at: Some(DVec2::new(SQUAD_START_X, SQUAD_START_Y - 84.0)),
    });

    // Five seconds: the Light's 2000 ms cadence allows three shots,
    // although its pistol alone would allow far more.
    let mut shots = 0;
    for _ in 0..300 {
        shots += shots_by(&engine.tick(DT, &idle()), Side::Enemy);
    }
    assert_eq!(shots, 3);

    let snapshot = engine.tick(0.0, &idle());
    let enemy = &snapshot.enemies[0];
    assert_eq!(enemy.stance, EnemyStance::Hold);
    assert_eq!(enemy.position, DVec2::new(SQUAD_START_X, SQUAD_START_Y - 84.0));
}

#[test]
fn test_enemy_pursues_from_afar() {
    let mut engine = sandbox();
    engine.queue_command(SessionCommand::SpawnEnemy {
        kind: Some(EnemyKind::Heavy),
        at: Some(DVec2::new(SQUAD_START_X - 400.0, SQUAD_START_Y)),
    });
    engine.tick(0.0, &idle());
    let snapshot = engine.tick(1.0, &idle());
    let enemy = &snapshot.enemies[0];
    assert_eq!(enemy.stance, EnemyStance::Pursue);
    assert!((enemy.position.x - (SQUAD_START_X - 400.0 + ENEMY_SPEED)).abs() < 1e-9);
    assert!(enemy.facing.abs() < 1e-9);
}

#[test]
fn test_enemies_fire_oldest_first_after_despawn() {
    let catalog = WeaponCatalog::builtin();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut world = World::new();
    let mut order = 0;
    let mut spawn_light = |world: &mut World, x: f64| {
        world_setup::spawn_enemy(
            world,
            &mut rng,
            &catalog,
            &mut order,
            EnemyKind::Light,
            DVec2::new(x, 300.0),
            STARTING_WEAPON,
        )
    };
    let oldest = spawn_light(&mut world, 452.0);
    spawn_light(&mut world, 512.0);
    spawn_light(&mut world, 572.0);
    world.despawn(oldest).unwrap();

    let mut fire_rng = ChaCha8Rng::seed_from_u64(6);
    let mut spawns = Vec::new();
    let mut audio = Vec::new();
    enemy_ai::run(
        &mut world,
        DVec2::new(512.0, 384.0),
        0.0,
        1.0,
        &mut fire_rng,
        &mut spawns,
        &mut audio,
    );

    // Middle enemy (second oldest) first, then the newest one.
    assert_eq!(spawns.len(), 2);
    assert!((spawns[0].origin.x - 512.0).abs() < 1e-9);
    assert!(spawns[1].origin.x > 550.0);
}

#[test]
fn test_volley_muzzle_offsets_and_spread() {
    let catalog = WeaponCatalog::builtin();
    let shotgun = catalog.get("shotgun");
    let shooter = DVec2::new(100.0, 200.0);
    let aim = 0.7;
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut spawns = Vec::new();
    let mut audio = Vec::new();

    queue_volley(
        shooter,
        aim,
        0,
        5,
        &shotgun,
        Side::Player,
        &mut rng,
        &mut spawns,
        &mut audio,
    );

    assert_eq!(spawns.len(), 5);
    assert_eq!(audio.len(), 5);
    let half_spread = (shotgun.spread_deg / 2.0).to_radians();
    for (i, spawn) in spawns.iter().enumerate() {
        let offset = MUZZLE_OFFSET + MUZZLE_OFFSET_STEP * i as f64;
        let expected = shooter + heading_vector(aim) * offset;
        assert!((spawn.origin - expected).length() < 1e-9, "shot {i} at {:?}", spawn.origin);
        assert!((spawn.angle - aim).abs() <= half_spread + 1e-12, "shot {i} angle {}", spawn.angle);
    }
}

#[test]
fn test_burst_drain_steps_muzzle_offset() {
    let carbine = WeaponCatalog::builtin().get("carbine");
    let mut weapon = WeaponInstance::new(carbine);
    let shooter = DVec2::new(300.0, 300.0);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut spawns = Vec::new();
    let mut audio = Vec::new();

    assert_eq!(weapon.request_fire(0.0), FireDecision::BurstArmed);
    for now_ms in [0.0, 80.0, 160.0] {
        while let Some(index) = weapon.next_burst_shot(now_ms) {
            queue_volley(
                shooter,
                0.0,
                index,
                1,
                weapon.template(),
                Side::Player,
                &mut rng,
                &mut spawns,
                &mut audio,
            );
        }
    }

    let offsets: Vec<f64> = spawns.iter().map(|s| s.origin.x - shooter.x).collect();
    assert_eq!(offsets.len(), 3);
    for (offset, expected) in offsets.iter().zip([15.0, 21.0, 27.0]) {
        assert!((offset - expected).abs() < 1e-9);
    }
}

// ---- Projectiles ----

#[test]
fn test_projectile_expires_at_range() {
    let mut engine = sandbox();
    let mut order = 1_000;
    world_setup::spawn_projectile(
        engine.world_mut(),
        &mut order,
        ProjectileSpawn {
            range: 128.0,
            ..shot(DVec2::new(100.0, 100.0), 1.0, Side::Player)
        },
    );

    engine.tick(0.1, &idle());
    engine.tick(0.1, &idle());
    let snapshot = engine.tick(0.0, &idle());
    assert_eq!(snapshot.projectiles.len(), 1);
    assert!((snapshot.projectiles[0].position.x - 220.0).abs() < 1e-9);

    engine.tick(0.1, &idle());
    assert_eq!(count::<Projectile>(engine.world()), 0);
}

#[test]
fn test_projectile_expires_outside_margin() {
    let mut engine = sandbox();
    let mut order = 1_000;
    world_setup::spawn_projectile(
        engine.world_mut(),
        &mut order,
        shot(DVec2::new(ARENA_WIDTH + 40.0, 100.0), 1.0, Side::Player),
    );
    engine.tick(0.01, &idle());
    assert_eq!(count::<Projectile>(engine.world()), 1);
    engine.tick(0.01, &idle());
    assert_eq!(count::<Projectile>(engine.world()), 0);
}

// ---- Collision ----

fn world_with_enemies(positions: &[(DVec2, f64)]) -> (World, u64) {
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let catalog = WeaponCatalog::builtin();
    let mut order = 0;
    for &(position, hp) in positions {
        let entity = world_setup::spawn_enemy(
            &mut world,
            &mut rng,
            &catalog,
            &mut order,
            EnemyKind::Light,
            position,
            STARTING_WEAPON,
        );
        world.get::<&mut Enemy>(entity).unwrap().hp = hp;
    }
    (world, order)
}

fn enemy_hp_by_order(world: &World) -> Vec<(u64, f64)> {
    let mut hp: Vec<(u64, f64)> = world
        .query::<(&Enemy, &SpawnOrder)>()
        .iter()
        .map(|(_, (enemy, order))| (order.0, enemy.hp))
        .collect();
    hp.sort_by(|a, b| a.0.cmp(&b.0));
    hp
}

#[test]
fn test_two_damage_projectile_kills_light_enemy() {
    let (mut world, mut order) = world_with_enemies(&[(DVec2::new(300.0, 300.0), LIGHT_MAX_HP)]);
    world_setup::spawn_projectile(
        &mut world,
        &mut order,
        shot(DVec2::new(305.0, 300.0), 2.0, Side::Player),
    );
    let mut squad = Squad::default();
    let mut despawn = Vec::new();
    let mut audio = Vec::new();

    collision::resolve_hits(&mut world, &mut squad, &mut despawn, &mut audio);

    assert_eq!(count::<Enemy>(&world), 0);
    assert_eq!(count::<Projectile>(&world), 0);
    assert_eq!(
        audio,
        vec![AudioEvent::EnemyKilled {
            kind: EnemyKind::Light
        }]
    );
}

#[test]
fn test_projectile_hits_newest_enemy_only() {
    let spot = DVec2::new(300.0, 300.0);
    let (mut world, mut order) = world_with_enemies(&[(spot, 2.0), (spot, 2.0)]);
    world_setup::spawn_projectile(&mut world, &mut order, shot(spot, 1.0, Side::Player));

    collision::resolve_hits(&mut world, &mut Squad::default(), &mut Vec::new(), &mut Vec::new());

    assert_eq!(enemy_hp_by_order(&world), vec![(0, 2.0), (1, 1.0)]);
    assert_eq!(count::<Projectile>(&world), 0);
}

#[test]
fn test_dead_enemy_does_not_absorb_later_projectiles() {
    let spot = DVec2::new(300.0, 300.0);
    let (mut world, mut order) = world_with_enemies(&[(spot, 1.0)]);
    world_setup::spawn_projectile(&mut world, &mut order, shot(spot, 1.0, Side::Player));
    world_setup::spawn_projectile(&mut world, &mut order, shot(spot, 1.0, Side::Player));

    collision::resolve_hits(&mut world, &mut Squad::default(), &mut Vec::new(), &mut Vec::new());

    // The newer projectile kills; the older one finds no live target and flies on.
    assert_eq!(count::<Enemy>(&world), 0);
    let survivors: Vec<u64> = world
        .query::<(&Projectile, &SpawnOrder)>()
        .iter()
        .map(|(_, (_, order))| order.0)
        .collect();
    assert_eq!(survivors, vec![1]);
}

#[test]
fn test_hit_radius_is_strict() {
    let (mut world, mut order) = world_with_enemies(&[(DVec2::new(300.0, 300.0), 2.0)]);
    let reach = ENEMY_SIZE / 2.0 + PROJECTILE_RADIUS;
    world_setup::spawn_projectile(
        &mut world,
        &mut order,
        shot(DVec2::new(300.0 + reach, 300.0), 1.0, Side::Player),
    );
    collision::resolve_hits(&mut world, &mut Squad::default(), &mut Vec::new(), &mut Vec::new());
    assert_eq!(enemy_hp_by_order(&world), vec![(0, 2.0)]);
    assert_eq!(count::<Projectile>(&world), 1);
}

#[test]
fn test_enemy_projectile_hits_last_slot_first() {
    let catalog = WeaponCatalog::builtin();
    let mut squad = Squad::new(DVec2::new(400.0, 400.0));
    squad.add_soldier(catalog.get("pistol"));
    squad.add_soldier(catalog.get("rifle"));
    // Stack both soldiers on one point so the bullet overlaps both.
    for soldier in &mut squad.soldiers {
        soldier.position = squad.position;
    }

    let mut world = World::new();
    let mut order = 0;
    world_setup::spawn_projectile(&mut world, &mut order, shot(squad.position, 1.0, Side::Enemy));
    collision::resolve_hits(&mut world, &mut squad, &mut Vec::new(), &mut Vec::new());

    assert_eq!(squad.soldiers[0].hp, SOLDIER_MAX_HP);
    assert_eq!(squad.soldiers[1].hp, SOLDIER_MAX_HP - 1.0);
    assert_eq!(count::<Projectile>(&world), 0);
}

#[test]
fn test_player_projectiles_ignore_soldiers() {
    let catalog = WeaponCatalog::builtin();
    let mut squad = Squad::new(DVec2::new(400.0, 400.0));
    squad.add_soldier(catalog.get("pistol"));
    let mut world = World::new();
    let mut order = 0;
    world_setup::spawn_projectile(&mut world, &mut order, shot(squad.position, 1.0, Side::Player));
    collision::resolve_hits(&mut world, &mut squad, &mut Vec::new(), &mut Vec::new());
    assert_eq!(squad.soldiers[0].hp, SOLDIER_MAX_HP);
    assert_eq!(count::<Projectile>(&world), 1);
}

#[test]
fn test_separation_never_shrinks_pair_distance() {
    for gap in [1.0, 5.0, 15.0, 29.0] {
        let a = DVec2::new(300.0, 300.0);
        let b = DVec2::new(300.0 + gap, 300.0);
        let (mut world, _) = world_with_enemies(&[(a, 2.0), (b, 2.0)]);

        collision::separate_enemies(&mut world, DT);

        let mut positions: Vec<(u64, DVec2)> = world
            .query::<(&Position, &SpawnOrder)>()
            .iter()
            .map(|(_, (pos, order))| (order.0, pos.0))
            .collect();
        positions.sort_by(|x, y| x.0.cmp(&y.0));
        let after = positions[0].1.distance(positions[1].1);
        assert!(after > gap, "gap {gap} shrank to {after}");

        let expected = gap + (ENEMY_MIN_DIST - gap) * SEPARATION_GAIN * DT;
        assert!((after - expected).abs() < 1e-9);
    }
}

#[test]
fn test_separation_skips_coincident_pair() {
    let spot = DVec2::new(300.0, 300.0);
    let (mut world, _) = world_with_enemies(&[(spot, 2.0), (spot, 2.0)]);
    collision::separate_enemies(&mut world, DT);
    for (_, pos) in world.query::<&Position>().iter() {
        assert_eq!(pos.0, spot);
    }
}

#[test]
fn test_squad_push_is_asymmetric() {
    let center = DVec2::new(500.0, 400.0);
    let (mut world, _) = world_with_enemies(&[(center + DVec2::new(30.0, 0.0), 2.0)]);
    let mut squad = Squad::new(center);

    collision::push_squad(&mut world, &mut squad);

    let overlap = SQUAD_RADIUS + ENEMY_SIZE / 2.0 - 30.0;
    assert!((squad.position.x - (center.x - overlap)).abs() < 1e-9);
    let enemy = world.query::<(&Enemy, &Position)>().iter().next().map(|(_, (_, p))| p.0).unwrap();
    assert!((enemy.x - (center.x + 30.0 + overlap * ENEMY_PUSH_SHARE)).abs() < 1e-9);
}

// ---- Pickups ----

#[test]
fn test_cage_rescue_adds_one_soldier() {
    let mut engine = sandbox();
    engine.queue_command(SessionCommand::SpawnCage {
        at: Some(squad_center() + DVec2::new(25.0, 0.0)),
    });
    let snapshot = engine.tick(DT, &idle());
    assert_eq!(snapshot.squad.soldiers.len(), 2);
    assert!(snapshot.cages.is_empty());
    assert!(snapshot
        .audio_events
        .contains(&AudioEvent::Rescue { squad_size: 2 }));
    assert_eq!(snapshot.squad.soldiers[1].weapon_key, STARTING_WEAPON);
}

#[test]
fn test_full_squad_leaves_cage_closed() {
    let mut engine = sandbox();
    let pistol = engine.catalog().get("pistol");
    while !engine.squad().is_full() {
        engine.squad_mut().add_soldier(pistol.clone());
    }
    engine.queue_command(SessionCommand::SpawnCage {
        at: Some(squad_center()),
    });
    for _ in 0..10 {
        engine.tick(DT, &idle());
    }
    assert_eq!(engine.squad().len(), MAX_SQUAD_SIZE);
    assert_eq!(count::<Cage>(engine.world()), 1);
}

#[test]
fn test_crate_pickup_equips_soldier() {
    let mut engine = sandbox();
    engine.queue_command(SessionCommand::SpawnCrate {
        at: Some(squad_center() + DVec2::new(10.0, 0.0)),
        weapon: Some("rifle".to_string()),
    });
    let snapshot = engine.tick(DT, &idle());
    assert!(snapshot.crates.is_empty());
    assert_eq!(snapshot.squad.soldiers[0].weapon_key, "rifle");
    assert_eq!(snapshot.squad.soldiers[0].ammo, 5);
    assert!(snapshot.audio_events.contains(&AudioEvent::WeaponPickup {
        weapon_key: "rifle".to_string()
    }));
}

#[test]
fn test_crate_consumed_by_empty_squad() {
    let mut world = World::new();
    let mut order = 0;
    let position = DVec2::new(200.0, 200.0);
    world_setup::spawn_crate(&mut world, &mut order, position, "mp".to_string());
    let mut squad = Squad::new(position);
    let mut audio = Vec::new();

    pickup::loot_crates(
        &mut world,
        &mut squad,
        &WeaponCatalog::builtin(),
        &mut ChaCha8Rng::seed_from_u64(3),
        &mut Vec::new(),
        &mut audio,
    );
    assert_eq!(count::<WeaponCrate>(&world), 0);
    assert!(audio.is_empty());
}

// ---- Spawn scheduler ----

fn run_spawner(world: &mut World, scheduler: &mut SpawnScheduler, order: &mut u64, dt: f64) {
    spawner::run(
        world,
        &mut ChaCha8Rng::seed_from_u64(9),
        &WeaponCatalog::builtin(),
        scheduler,
        &Arena::default(),
        STARTING_WEAPON,
        order,
        dt,
    );
}

#[test]
fn test_spawner_tops_up_to_cap() {
    let positions: Vec<(DVec2, f64)> = (0..MAX_ENEMIES - 1)
        .map(|i| (DVec2::new(40.0 * i as f64, 10.0), 2.0))
        .collect();
    let (mut world, mut order) = world_with_enemies(&positions);
    let mut scheduler = SpawnScheduler::new(true);
    scheduler.enemy_timer = 2.99;

    run_spawner(&mut world, &mut scheduler, &mut order, 0.02);
    assert_eq!(count::<Enemy>(&world), MAX_ENEMIES);
    assert_eq!(scheduler.enemy_timer, 0.0);

    scheduler.enemy_timer = 2.99;
    run_spawner(&mut world, &mut scheduler, &mut order, 0.02);
    assert_eq!(count::<Enemy>(&world), MAX_ENEMIES);
    assert_eq!(scheduler.enemy_timer, 0.0, "timer resets even when capped");
}

#[test]
fn test_spawner_cage_and_crate_caps() {
    let mut world = World::new();
    let mut order = 0;
    let mut scheduler = SpawnScheduler::new(true);

    for _ in 0..3 {
        scheduler.cage_timer = CAGE_SPAWN_INTERVAL;
        scheduler.crate_timer = CRATE_SPAWN_INTERVAL;
        run_spawner(&mut world, &mut scheduler, &mut order, 0.01);
    }
    assert_eq!(count::<Cage>(&world), MAX_CAGES);
    assert_eq!(count::<WeaponCrate>(&world), MAX_CRATES);
}

#[test]
fn test_regular_session_spawns_on_timer() {
    let mut engine = started(SessionCommand::StartNewGame);
    for _ in 0..35 {
        engine.tick(0.1, &idle());
    }
    assert_eq!(count::<Enemy>(engine.world()), 2);
}

#[test]
fn test_edge_position_tolerates_degenerate_arena() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let arena = Arena {
        width: 0.0,
        height: -10.0,
    };
    for _ in 0..32 {
        let pos = world_setup::random_edge_position(&mut rng, &arena);
        assert!(pos.is_finite());
    }
}

// ---- Game over ----

#[test]
fn test_last_soldier_down_ends_game() {
    let mut engine = sandbox();
    engine.squad_mut().soldiers[0].hp = 1.0;
    let mut order = 1_000;
    world_setup::spawn_projectile(
        engine.world_mut(),
        &mut order,
        shot(squad_center(), 1.0, Side::Enemy),
    );

    let snapshot = engine.tick(0.0, &idle());
    assert_eq!(snapshot.phase, GamePhase::GameOver);
    assert!(snapshot
        .audio_events
        .contains(&AudioEvent::SoldierDown { remaining: 0 }));
    assert_eq!(snapshot.audio_events.last(), Some(&AudioEvent::GameOver));

    let frozen = engine.time();
    let moving = InputSnapshot {
        keys: MoveKeys {
            up: true,
            ..Default::default()
        },
        pointer: PointerState {
            x: 0.0,
            y: 0.0,
            pressed: true,
        },
    };
    engine.queue_command(SessionCommand::TogglePause);
    for _ in 0..30 {
        let snapshot = engine.tick(DT, &moving);
        assert_eq!(snapshot.phase, GamePhase::GameOver);
        assert!(snapshot.audio_events.is_empty());
    }
    assert_eq!(engine.time().tick, frozen.tick);

    engine.queue_command(SessionCommand::StartNewGame);
    assert_eq!(engine.tick(DT, &idle()).phase, GamePhase::Playing);
}

// ---- Audio ----

struct RecordingAudio(Arc<Mutex<Vec<&'static str>>>);

impl AudioSink for RecordingAudio {
    fn trigger(&mut self, event: &AudioEvent) {
        self.0.lock().unwrap().push(event.name());
    }
}

#[test]
fn test_audio_sink_receives_events() {
    let heard = Arc::new(Mutex::new(Vec::new()));
    let mut engine = SimulationEngine::new(SimConfig::default())
        .with_audio(Box::new(RecordingAudio(heard.clone())));
    engine.queue_command(SessionCommand::StartSandbox);
    let snapshot = engine.tick(0.1, &firing_at(900.0, SQUAD_START_Y));

    assert_eq!(snapshot.audio_events.len(), 1);
    assert_eq!(*heard.lock().unwrap(), vec!["shot"]);
}

// ---- Persistence ----

#[test]
fn test_save_restore_round_trip() {
    let mut engine = started(SessionCommand::StartNewGame);
    engine.queue_command(SessionCommand::SpawnCrate {
        at: Some(DVec2::new(900.0, 600.0)),
        weapon: Some("shotgun".to_string()),
    });
    for tick in 0..30 {
        engine.tick(0.05, &scripted_input(tick));
    }
    let saved = engine.save(1_700_000_000_000).unwrap();
    assert_eq!(saved.weapon_crates.len(), 1);

    let mut restored = SimulationEngine::new(SimConfig {
        seed: 7,
        ..Default::default()
    });
    restored.restore(&saved).unwrap();

    assert_eq!(restored.phase(), GamePhase::Playing);
    assert_eq!(restored.save(1_700_000_000_000).unwrap(), saved);
    assert_eq!(count::<Projectile>(restored.world()), 0);
    let timers = restored.scheduler();
    assert_eq!(
        (timers.enemy_timer, timers.cage_timer, timers.crate_timer),
        (0.0, 0.0, 0.0)
    );
}

#[test]
fn test_restore_rederives_enemy_stats() {
    let snapshot = SaveSnapshot {
        squad: SavedSquad {
            x: 300.0,
            y: 300.0,
            soldiers: vec![SavedSoldier {
                hp: 2.5,
                weapon_type: "mp".to_string(),
            }],
        },
        enemies: vec![SavedEnemy {
            x: 50.0,
            y: 60.0,
            kind: EnemyKind::Heavy,
            hp: 1.5,
        }],
        cages: vec![],
        weapon_crates: vec![],
        timestamp: 0,
    };
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.restore(&snapshot).unwrap();

    let (enemy, weapon_class) = engine
        .world()
        .query::<(&Enemy, &crate::weapon::WeaponInstance)>()
        .iter()
        .map(|(_, (enemy, weapon))| (enemy.clone(), weapon.template().class))
        .next()
        .unwrap();
    assert_eq!(enemy.hp, 1.5);
    assert_eq!(enemy.max_hp, HEAVY_MAX_HP);
    assert_eq!(enemy.fire_rate_ms, HEAVY_FIRE_RATE_MS);
    assert!(matches!(weapon_class, WeaponClass::Mp | WeaponClass::Shotgun));

    let soldier = &engine.squad().soldiers[0];
    assert_eq!(soldier.hp, 2.5);
    assert_eq!(soldier.weapon.key(), "mp");
    assert_eq!(soldier.weapon.ammo(), 30);
}

#[test]
fn test_restore_rejects_broken_squads() {
    let mut engine = started(SessionCommand::StartNewGame);
    let good = engine.save(0).unwrap();

    let mut crowded = good.clone();
    crowded.squad.soldiers = vec![good.squad.soldiers[0].clone(); MAX_SQUAD_SIZE + 1];
    assert_eq!(
        engine.restore(&crowded),
        Err(SimError::SquadOverCapacity {
            count: MAX_SQUAD_SIZE + 1,
            max: MAX_SQUAD_SIZE
        })
    );

    let mut dead = good.clone();
    dead.squad.soldiers[0].hp = 0.0;
    assert!(matches!(
        engine.restore(&dead),
        Err(SimError::DeadSoldier { index: 0, .. })
    ));

    // Nothing was replaced.
    assert_eq!(engine.save(0).unwrap(), good);
}

#[test]
fn test_restore_keeps_unknown_weapon_key() {
    let snapshot = SaveSnapshot {
        squad: SavedSquad {
            x: 300.0,
            y: 300.0,
            soldiers: vec![SavedSoldier {
                hp: 5.0,
                weapon_type: "plasma".to_string(),
            }],
        },
        enemies: vec![],
        cages: vec![],
        weapon_crates: vec![],
        timestamp: 0,
    };
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.restore(&snapshot).unwrap();

    let soldier = &engine.squad().soldiers[0];
    assert!(soldier.weapon.template().is_unarmed());
    assert_eq!(engine.save(0).unwrap().squad.soldiers[0].weapon_type, "plasma");
}
