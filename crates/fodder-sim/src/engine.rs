//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world and the squad, processes
//! session commands, runs all systems and produces `GameStateSnapshot`s.
//! Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use glam::DVec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use fodder_core::commands::SessionCommand;
use fodder_core::components::{Cage, Enemy, WeaponCrate};
use fodder_core::constants::*;
use fodder_core::enums::GamePhase;
use fodder_core::events::AudioEvent;
use fodder_core::input::InputSnapshot;
use fodder_core::save::SaveSnapshot;
use fodder_core::state::GameStateSnapshot;
use fodder_core::types::{Arena, SimTime};
use fodder_core::weapons::WeaponCatalog;

use crate::audio::{AudioSink, NullAudio};
use crate::error::SimError;
use crate::squad::{Soldier, Squad};
use crate::systems;
use crate::systems::projectile::ProjectileSpawn;
use crate::systems::spawner::SpawnScheduler;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed and inputs = same simulation.
    pub seed: u64,
    pub arena: Arena,
    /// Template key handed to the first soldier and every rescued captive.
    pub starting_weapon: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            arena: Arena::default(),
            starting_weapon: STARTING_WEAPON.to_string(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    squad: Squad,
    time: SimTime,
    phase: GamePhase,
    sandbox: bool,
    config: SimConfig,
    catalog: WeaponCatalog,
    rng: ChaCha8Rng,
    scheduler: SpawnScheduler,
    next_spawn_order: u64,
    command_queue: VecDeque<SessionCommand>,
    despawn_buffer: Vec<Entity>,
    projectile_spawns: Vec<ProjectileSpawn>,
    audio_events: Vec<AudioEvent>,
    audio: Box<dyn AudioSink>,
}

impl SimulationEngine {
    /// Create an engine with the built-in weapon templates.
    pub fn new(config: SimConfig) -> Self {
        Self::with_catalog(config, WeaponCatalog::builtin())
    }

    /// Create an engine backed by a caller-supplied template catalog.
    pub fn with_catalog(config: SimConfig, catalog: WeaponCatalog) -> Self {
        Self {
            world: World::new(),
            squad: Squad::default(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            sandbox: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            catalog,
            scheduler: SpawnScheduler::default(),
            next_spawn_order: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            projectile_spawns: Vec::new(),
            audio_events: Vec::new(),
            audio: Box::new(NullAudio),
        }
    }

    /// Replace the audio sink.
    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = sink;
        self
    }

    /// Queue a session command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SessionCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SessionCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by `elapsed_secs` and return the resulting snapshot.
    ///
    /// Negative or non-finite elapsed time counts as zero. Only a `Playing`
    /// session mutates gameplay state or advances the clock.
    pub fn tick(&mut self, elapsed_secs: f64, input: &InputSnapshot) -> GameStateSnapshot {
        self.process_commands();

        let dt = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
            elapsed_secs
        } else {
            0.0
        };

        if self.phase == GamePhase::Playing {
            self.run_systems(dt, input);
            self.time.advance(dt);
        }

        let audio_events = std::mem::take(&mut self.audio_events);
        for event in &audio_events {
            self.audio.trigger(event);
        }

        systems::snapshot::build_snapshot(
            &self.world,
            &self.squad,
            &self.time,
            self.phase,
            self.sandbox,
            audio_events,
        )
    }

    /// Export the current session. Fails when no session exists.
    pub fn save(&self, timestamp: i64) -> Result<SaveSnapshot, SimError> {
        if self.phase == GamePhase::MainMenu {
            return Err(SimError::NoSession);
        }
        Ok(systems::persistence::export(
            &self.world,
            &self.squad,
            timestamp,
        ))
    }

    /// Replace the session with a saved one.
    ///
    /// Projectiles are dropped, spawn timers restart from zero and enemy
    /// stats other than hp are re-derived from their type. The current state
    /// is left untouched when the snapshot breaks a squad invariant.
    pub fn restore(&mut self, snapshot: &SaveSnapshot) -> Result<(), SimError> {
        let soldiers = &snapshot.squad.soldiers;
        if soldiers.len() > MAX_SQUAD_SIZE {
            return Err(SimError::SquadOverCapacity {
                count: soldiers.len(),
                max: MAX_SQUAD_SIZE,
            });
        }
        if let Some((index, soldier)) = soldiers.iter().enumerate().find(|(_, s)| s.hp <= 0.0) {
            return Err(SimError::DeadSoldier {
                index,
                hp: soldier.hp,
            });
        }

        self.world.clear();
        self.next_spawn_order = 0;
        self.projectile_spawns.clear();
        self.time = SimTime::default();
        self.scheduler = SpawnScheduler::new(!self.sandbox);

        let center = DVec2::new(snapshot.squad.x, snapshot.squad.y);
        self.squad = Squad::new(center);
        for saved in soldiers {
            let mut soldier = Soldier::new(center, self.catalog.get(&saved.weapon_type));
            soldier.hp = saved.hp;
            self.squad.soldiers.push(soldier);
        }
        self.squad.apply_formation();

        for saved in &snapshot.enemies {
            let entity = world_setup::spawn_enemy(
                &mut self.world,
                &mut self.rng,
                &self.catalog,
                &mut self.next_spawn_order,
                saved.kind,
                DVec2::new(saved.x, saved.y),
                &self.config.starting_weapon,
            );
            if let Ok(mut enemy) = self.world.get::<&mut Enemy>(entity) {
                enemy.hp = saved.hp;
            }
        }
        for saved in &snapshot.cages {
            world_setup::spawn_cage(
                &mut self.world,
                &mut self.next_spawn_order,
                DVec2::new(saved.x, saved.y),
            );
        }
        for saved in &snapshot.weapon_crates {
            world_setup::spawn_crate(
                &mut self.world,
                &mut self.next_spawn_order,
                DVec2::new(saved.x, saved.y),
                saved.weapon_type.clone(),
            );
        }

        self.phase = GamePhase::Playing;
        log::info!(
            "restored session: {} soldiers, {} enemies, {} cages, {} crates",
            self.squad.len(),
            snapshot.enemies.len(),
            snapshot.cages.len(),
            snapshot.weapon_crates.len()
        );
        Ok(())
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn squad(&self) -> &Squad {
        &self.squad
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        &self.catalog
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    #[cfg(test)]
    pub(crate) fn squad_mut(&mut self) -> &mut Squad {
        &mut self.squad
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub(crate) fn scheduler_mut(&mut self) -> &mut SpawnScheduler {
        &mut self.scheduler
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Whether a live session accepts manual edits.
    fn has_session(&self) -> bool {
        matches!(self.phase, GamePhase::Playing | GamePhase::Paused)
    }

    /// Handle a single session command.
    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::StartNewGame => {
                self.reset_session(false);
                world_setup::setup_session(
                    &mut self.world,
                    &mut self.rng,
                    &self.catalog,
                    &mut self.next_spawn_order,
                    &self.config.starting_weapon,
                );
                log::info!("new game started");
            }
            SessionCommand::StartSandbox => {
                self.reset_session(true);
                log::info!("sandbox session started");
            }
            SessionCommand::Pause => {
                if self.phase == GamePhase::Playing {
                    self.phase = GamePhase::Paused;
                }
            }
            SessionCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Playing;
                }
            }
            SessionCommand::TogglePause => match self.phase {
                GamePhase::Playing => self.phase = GamePhase::Paused,
                GamePhase::Paused => self.phase = GamePhase::Playing,
                GamePhase::MainMenu | GamePhase::GameOver => {}
            },
            SessionCommand::QuitToMenu => {
                self.world.clear();
                self.squad = Squad::default();
                self.projectile_spawns.clear();
                self.next_spawn_order = 0;
                self.time = SimTime::default();
                self.scheduler = SpawnScheduler::default();
                self.sandbox = false;
                self.phase = GamePhase::MainMenu;
                log::info!("returned to main menu");
            }
            SessionCommand::SpawnEnemy { kind, at } => {
                if !self.has_session() {
                    return;
                }
                let kind = kind.unwrap_or_else(|| world_setup::random_enemy_kind(&mut self.rng));
                let position = at.unwrap_or_else(|| {
                    world_setup::random_edge_position(&mut self.rng, &self.config.arena)
                });
                world_setup::spawn_enemy(
                    &mut self.world,
                    &mut self.rng,
                    &self.catalog,
                    &mut self.next_spawn_order,
                    kind,
                    position,
                    &self.config.starting_weapon,
                );
            }
            SessionCommand::SpawnCage { at } => {
                if !self.has_session() {
                    return;
                }
                let position = at.unwrap_or_else(|| {
                    world_setup::random_field_position(&mut self.rng, &self.config.arena)
                });
                world_setup::spawn_cage(&mut self.world, &mut self.next_spawn_order, position);
            }
            SessionCommand::SpawnCrate { at, weapon } => {
                if !self.has_session() {
                    return;
                }
                let position = at.unwrap_or_else(|| {
                    world_setup::random_field_position(&mut self.rng, &self.config.arena)
                });
                let weapon_key = weapon.unwrap_or_else(|| {
                    world_setup::random_crate_weapon(
                        &self.catalog,
                        &mut self.rng,
                        &self.config.starting_weapon,
                    )
                });
                world_setup::spawn_crate(
                    &mut self.world,
                    &mut self.next_spawn_order,
                    position,
                    weapon_key,
                );
            }
            SessionCommand::ClearField => {
                if !self.has_session() {
                    return;
                }
                self.despawn_buffer.clear();
                collect_entities::<Enemy>(&self.world, &mut self.despawn_buffer);
                collect_entities::<Cage>(&self.world, &mut self.despawn_buffer);
                collect_entities::<WeaponCrate>(&self.world, &mut self.despawn_buffer);
                for entity in self.despawn_buffer.drain(..) {
                    let _ = self.world.despawn(entity);
                }
                log::debug!("field cleared");
            }
            SessionCommand::Reload => {
                if self.phase != GamePhase::Playing {
                    return;
                }
                let now_ms = self.time.now_ms();
                for soldier in &mut self.squad.soldiers {
                    soldier.weapon.start_reload(now_ms);
                }
            }
        }
    }

    /// Drop the current session and start a fresh one.
    fn reset_session(&mut self, sandbox: bool) {
        self.world.clear();
        self.next_spawn_order = 0;
        self.projectile_spawns.clear();
        self.time = SimTime::default();
        self.sandbox = sandbox;
        self.scheduler = SpawnScheduler::new(!sandbox);

        self.squad = Squad::new(DVec2::new(SQUAD_START_X, SQUAD_START_Y));
        self.squad
            .add_soldier(self.catalog.get(&self.config.starting_weapon));
        self.squad.apply_formation();

        self.phase = GamePhase::Playing;
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64, input: &InputSnapshot) {
        let now_ms = self.time.now_ms();

        // 1. Squad movement, formation, soldier fire
        systems::movement::run(
            &mut self.squad,
            input,
            &self.config.arena,
            dt,
            now_ms,
            &mut self.rng,
            &mut self.projectile_spawns,
            &mut self.audio_events,
        );
        // 2. Enemy pursuit and fire
        systems::enemy_ai::run(
            &mut self.world,
            self.squad.position,
            dt,
            now_ms,
            &mut self.rng,
            &mut self.projectile_spawns,
            &mut self.audio_events,
        );
        systems::projectile::spawn_queued(
            &mut self.world,
            &mut self.projectile_spawns,
            &mut self.next_spawn_order,
        );
        // 3. Projectile flight and expiry
        systems::projectile::run(
            &mut self.world,
            &self.config.arena,
            dt,
            &mut self.despawn_buffer,
        );
        // 4. Separation, squad push, hits
        systems::collision::run(
            &mut self.world,
            &mut self.squad,
            dt,
            &mut self.despawn_buffer,
            &mut self.audio_events,
        );
        // 5. Rescues and loot
        systems::pickup::rescue_cages(
            &mut self.world,
            &mut self.squad,
            &self.catalog,
            &self.config.starting_weapon,
            &mut self.despawn_buffer,
            &mut self.audio_events,
        );
        systems::pickup::loot_crates(
            &mut self.world,
            &mut self.squad,
            &self.catalog,
            &mut self.rng,
            &mut self.despawn_buffer,
            &mut self.audio_events,
        );
        // 6. Timed spawns
        systems::spawner::run(
            &mut self.world,
            &mut self.rng,
            &self.catalog,
            &mut self.scheduler,
            &self.config.arena,
            &self.config.starting_weapon,
            &mut self.next_spawn_order,
            dt,
        );
        // 7. Game over
        if self.squad.is_empty() {
            self.phase = GamePhase::GameOver;
            self.audio_events.push(AudioEvent::GameOver);
            log::info!("squad wiped out at t={:.1}s", self.time.elapsed_secs);
        }
    }
}

/// Append every entity carrying component `T` to `out`.
fn collect_entities<T: hecs::Component>(world: &World, out: &mut Vec<Entity>) {
    out.extend(world.query::<&T>().iter().map(|(entity, _)| entity));
}
