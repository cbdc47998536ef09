//! sim-harness: headless driver for the FODDER simulation.
//!
//! Usage:
//!   sim-harness run --ticks 3600 --seed 7 --save out.json
//!   sim-harness run --load out.json --ticks 600
//!   sim-harness validate --save out.json
//!   sim-harness weapons --weapons data/weapons

mod autopilot;
mod catalog_io;
mod save_io;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use fodder_core::commands::SessionCommand;
use fodder_core::enums::GamePhase;
use fodder_core::events::AudioEvent;
use fodder_core::input::InputSnapshot;
use fodder_core::weapons::WeaponCatalog;
use fodder_sim::audio::AudioSink;
use fodder_sim::{SimConfig, SimulationEngine};

const DEFAULT_WEAPONS_DIR: &str = "data/weapons";
const DEFAULT_TICKS: u64 = 3600;
const TICK_SECS: f64 = 1.0 / 60.0;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "validate" => cmd_validate(&args[2..]),
        "weapons" => cmd_weapons(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
}

fn print_usage() {
    eprintln!(
        "sim-harness: FODDER headless simulation driver\n\
         \n\
         Commands:\n\
         \n\
         run       Play a session with the autopilot squad\n\
         \n\
           --ticks <N>        Ticks to simulate at 60 Hz (default: 3600)\n\
           --seed <N>         RNG seed (overrides the config file)\n\
           --config <path>    SimConfig JSON file (optional)\n\
           --weapons <dir>    Weapon template directory (default: data/weapons)\n\
           --sandbox          Start a sandbox session (no automatic spawns)\n\
           --load <path>      Resume from a save file instead of a new session\n\
           --save <path>      Write a save file when the run ends\n\
         \n\
         validate  Check a save file without running it\n\
         \n\
           --save <path>      Save file to check\n\
         \n\
         weapons   List the weapon templates a directory provides\n\
         \n\
           --weapons <dir>    Weapon template directory (default: data/weapons)\n\
         \n\
         Set RUST_LOG=debug to log every audio cue.\n"
    );
}

fn parse_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn parse_number(args: &[String], flag: &str) -> Result<Option<u64>> {
    parse_value(args, flag)
        .map(|v| v.parse::<u64>().with_context(|| format!("{flag} expects a number, got {v:?}")))
        .transpose()
}

fn parse_path(args: &[String], flag: &str) -> Option<PathBuf> {
    parse_value(args, flag).map(PathBuf::from)
}

/// Templates from `--weapons`, or the default directory when it exists.
/// Falls back to the built-in set when nothing loads.
fn load_weapons(args: &[String]) -> Result<WeaponCatalog> {
    let dir = match parse_path(args, "--weapons") {
        Some(dir) => dir,
        None if Path::new(DEFAULT_WEAPONS_DIR).join("index.json").exists() => {
            PathBuf::from(DEFAULT_WEAPONS_DIR)
        }
        None => {
            log::info!("no weapon directory, using built-in templates");
            return Ok(WeaponCatalog::builtin());
        }
    };

    let catalog = catalog_io::load_catalog(&dir)?;
    if catalog.is_empty() {
        log::warn!("{} has no usable templates, using built-ins", dir.display());
        return Ok(WeaponCatalog::builtin());
    }
    Ok(catalog)
}

fn load_config(args: &[String]) -> Result<SimConfig> {
    let mut config = match parse_path(args, "--config") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = parse_number(args, "--seed")? {
        config.seed = seed;
    }
    Ok(config)
}

fn cmd_run(args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let catalog = load_weapons(args)?;
    let ticks = parse_number(args, "--ticks")?.unwrap_or(DEFAULT_TICKS);
    let seed = config.seed;

    let mut engine = SimulationEngine::with_catalog(config, catalog).with_audio(Box::new(LogAudio));

    match parse_path(args, "--load") {
        Some(path) => {
            let save = save_io::read_save(&path)?;
            engine
                .restore(&save)
                .with_context(|| format!("restoring {}", path.display()))?;
            log::info!("resumed {} (saved at {})", path.display(), save.timestamp);
        }
        None if parse_flag(args, "--sandbox") => engine.queue_command(SessionCommand::StartSandbox),
        None => engine.queue_command(SessionCommand::StartNewGame),
    }

    log::info!("running {ticks} ticks, seed {seed}");

    let mut stats = RunStats::default();
    let mut input = InputSnapshot::default();
    for _ in 0..ticks {
        let snapshot = engine.tick(TICK_SECS, &input);
        stats.record(&snapshot.audio_events);
        stats.enemies = snapshot.hud.enemy_count;
        stats.peak_enemies = stats.peak_enemies.max(snapshot.hud.enemy_count);
        stats.peak_squad = stats.peak_squad.max(snapshot.hud.squad_size);

        if snapshot.phase == GamePhase::GameOver {
            break;
        }
        input = autopilot::next_input(&snapshot);
    }

    let time = engine.time();
    println!(
        "{} after {} ticks ({:.1}s)",
        match engine.phase() {
            GamePhase::GameOver => "squad lost",
            _ => "squad alive",
        },
        time.tick,
        time.elapsed_secs
    );
    println!(
        "squad {} (peak {}), enemies on field {} (peak {})",
        engine.squad().len(),
        stats.peak_squad,
        stats.enemies,
        stats.peak_enemies
    );
    for (name, count) in &stats.cues {
        println!("  {name:<14} {count}");
    }

    if let Some(path) = parse_path(args, "--save") {
        let save = engine.save(unix_millis()).context("nothing to save")?;
        save_io::write_save(&path, &save)?;
        log::info!("saved to {}", path.display());
    }

    Ok(())
}

fn cmd_validate(args: &[String]) -> Result<()> {
    let path = parse_path(args, "--save").context("--save <path> is required")?;
    let save = save_io::read_save(&path)?;

    // A throwaway engine applies the semantic checks restore performs.
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.restore(&save).context("save is well-formed but cannot be restored")?;

    println!(
        "{}: {} soldiers, {} enemies, {} cages, {} crates",
        path.display(),
        save.squad.soldiers.len(),
        save.enemies.len(),
        save.cages.len(),
        save.weapon_crates.len()
    );
    Ok(())
}

fn cmd_weapons(args: &[String]) -> Result<()> {
    let catalog = load_weapons(args)?;
    for key in catalog.keys() {
        let Some(t) = catalog.lookup(key) else { continue };
        println!(
            "{key:<10} {:<16} {:?}/{:?} dmg {} x{} every {}ms, mag {}, reload {}ms, range {}",
            t.name,
            t.class,
            t.fire_mode,
            t.damage,
            t.projectile_count,
            t.fire_interval_ms,
            t.magazine_size,
            t.reload_ms,
            t.range
        );
    }
    Ok(())
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Logs each cue instead of playing it.
struct LogAudio;

impl AudioSink for LogAudio {
    fn trigger(&mut self, event: &AudioEvent) {
        log::debug!("audio: {}", event.name());
    }
}

#[derive(Default)]
struct RunStats {
    cues: BTreeMap<&'static str, usize>,
    enemies: usize,
    peak_enemies: usize,
    peak_squad: usize,
}

impl RunStats {
    fn record(&mut self, events: &[AudioEvent]) {
        for event in events {
            *self.cues.entry(event.name()).or_default() += 1;
        }
    }
}
