//! End-to-end persistence: play, save to JSON text, load into a fresh engine.

use fodder_sim::core::commands::SessionCommand;
use fodder_sim::core::enums::GamePhase;
use fodder_sim::core::input::{InputSnapshot, MoveKeys, PointerState};
use fodder_sim::core::save::SaveSnapshot;
use fodder_sim::{SimConfig, SimulationEngine};

fn play(engine: &mut SimulationEngine, ticks: usize) {
    for tick in 0..ticks {
        let input = InputSnapshot {
            keys: MoveKeys {
                left: tick % 200 < 100,
                right: tick % 200 >= 100,
                ..Default::default()
            },
            pointer: PointerState {
                x: 200.0,
                y: 200.0,
                pressed: true,
            },
        };
        engine.tick(1.0 / 30.0, &input);
        if engine.phase() != GamePhase::Playing {
            break;
        }
    }
}

#[test]
fn save_survives_json_text() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(SessionCommand::StartNewGame);
    play(&mut engine, 240);

    let saved = engine.save(1_234).expect("session is running");
    let text = serde_json::to_string_pretty(&saved).unwrap();
    assert!(text.contains("\"weaponCrates\""));
    assert!(text.contains("\"weaponType\""));

    let parsed: SaveSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.timestamp, saved.timestamp);
    assert_eq!(parsed.squad.soldiers, saved.squad.soldiers);
    assert_eq!(parsed.enemies.len(), saved.enemies.len());
    assert_eq!(parsed.weapon_crates, saved.weapon_crates);

    let mut fresh = SimulationEngine::new(SimConfig {
        seed: 99,
        ..Default::default()
    });
    fresh.restore(&parsed).unwrap();
    assert_eq!(fresh.phase(), GamePhase::Playing);
    assert_eq!(fresh.save(1_234).unwrap(), parsed);

    let snapshot = fresh.tick(0.0, &InputSnapshot::default());
    assert!(snapshot.projectiles.is_empty());
    assert_eq!(snapshot.squad.soldiers.len(), saved.squad.soldiers.len());
    assert_eq!(snapshot.enemies.len(), saved.enemies.len());
}

#[test]
fn restored_session_keeps_running() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(SessionCommand::StartNewGame);
    play(&mut engine, 60);
    let saved = engine.save(0).unwrap();

    let mut fresh = SimulationEngine::new(SimConfig::default());
    fresh.restore(&saved).unwrap();
    play(&mut fresh, 60);
    assert!(fresh.time().elapsed_secs > 0.0);
}

#[test]
fn partial_config_uses_defaults() {
    let config: SimConfig = serde_json::from_str(r#"{ "seed": 7 }"#).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.starting_weapon, "pistol");
    assert_eq!(config.arena, SimConfig::default().arena);
}
