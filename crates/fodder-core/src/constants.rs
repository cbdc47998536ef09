//! Simulation constants and tuning parameters.
//!
//! Distances are in world units (one unit = one pixel of the reference
//! viewport), times in seconds unless the name says `_MS`.

// --- Arena ---

/// Default playfield width.
pub const ARENA_WIDTH: f64 = 1024.0;

/// Default playfield height.
pub const ARENA_HEIGHT: f64 = 768.0;

/// Size of one map tile; weapon ranges are quoted in tiles.
pub const TILE_SIZE: f64 = 32.0;

// --- Squad ---

/// Squad spawn position for a new session.
pub const SQUAD_START_X: f64 = 512.0;
pub const SQUAD_START_Y: f64 = 384.0;

/// Squad movement speed (units/s).
pub const SQUAD_SPEED: f64 = 150.0;

/// Hard cap on squad members.
pub const MAX_SQUAD_SIZE: usize = 6;

/// Distance of ring slots from the squad center.
pub const FORMATION_RADIUS: f64 = 35.0;

/// Soldier body diameter.
pub const SOLDIER_SIZE: f64 = 20.0;

/// Soldier hit points at full health.
pub const SOLDIER_MAX_HP: f64 = 5.0;

/// Weapon key issued to new soldiers unless configured otherwise.
pub const STARTING_WEAPON: &str = "pistol";

// --- Enemies ---

/// Enemy body diameter.
pub const ENEMY_SIZE: f64 = 20.0;

/// Enemy pursuit speed (units/s).
pub const ENEMY_SPEED: f64 = 40.0;

/// Enemies stop approaching once this close to the squad center.
pub const ENEMY_HOLD_RANGE: f64 = 150.0;

/// Maximum concurrent enemies.
pub const MAX_ENEMIES: usize = 16;

pub const LIGHT_MAX_HP: f64 = 2.0;
pub const HEAVY_MAX_HP: f64 = 4.0;
pub const SNIPER_MAX_HP: f64 = 5.0;

/// Entity-level fire cooldowns per enemy type (ms).
pub const LIGHT_FIRE_RATE_MS: f64 = 2000.0;
pub const HEAVY_FIRE_RATE_MS: f64 = 3000.0;
pub const SNIPER_FIRE_RATE_MS: f64 = 4000.0;

// --- Projectiles ---

/// Muzzle velocity for every projectile (units/s).
pub const PROJECTILE_SPEED: f64 = 600.0;

/// Projectile collision radius.
pub const PROJECTILE_RADIUS: f64 = 3.0;

/// Projectiles beyond the arena by more than this are dropped.
pub const PROJECTILE_BOUNDS_MARGIN: f64 = 50.0;

/// Base muzzle offset from the shooter's center.
pub const MUZZLE_OFFSET: f64 = 15.0;

/// Additional muzzle offset per shot index within one volley.
pub const MUZZLE_OFFSET_STEP: f64 = 6.0;

// --- Collision ---

/// Enemies closer than this are pushed apart.
pub const ENEMY_MIN_DIST: f64 = 30.0;

/// Gain applied to enemy-enemy overlap per second.
pub const SEPARATION_GAIN: f64 = 5.0;

/// Effective squad body radius for enemy pushes.
pub const SQUAD_RADIUS: f64 = 40.0;

/// Share of the squad-enemy overlap applied to the enemy.
pub const ENEMY_PUSH_SHARE: f64 = 0.2;

// --- Spawning ---

pub const ENEMY_SPAWN_INTERVAL: f64 = 3.0;
pub const CAGE_SPAWN_INTERVAL: f64 = 15.0;
pub const CRATE_SPAWN_INTERVAL: f64 = 25.0;

pub const MAX_CAGES: usize = 1;
pub const MAX_CRATES: usize = 2;

/// Enemies appear this far outside the arena edge.
pub const EDGE_SPAWN_OFFSET: f64 = 50.0;

/// In-bounds spawns keep this distance from every edge.
pub const SPAWN_MARGIN: f64 = 50.0;

/// Scripted opening spawns for a non-sandbox session.
pub const OPENING_ENEMY_X: f64 = 200.0;
pub const OPENING_ENEMY_Y: f64 = 200.0;
pub const OPENING_CAGE_X: f64 = 600.0;
pub const OPENING_CAGE_Y: f64 = 300.0;

// --- Pickups ---

/// A soldier this close to a cage frees the captive.
pub const CAGE_RESCUE_RADIUS: f64 = 30.0;

/// The squad center this close to a crate loots it.
pub const CRATE_PICKUP_RADIUS: f64 = 40.0;

// --- Weapons ---

/// Default spacing between burst shots when a template omits it (ms).
pub const DEFAULT_BURST_INTERVAL_MS: f64 = 80.0;

/// Default shots per burst for `3-burst` templates.
pub const DEFAULT_BURST_COUNT: u32 = 3;
