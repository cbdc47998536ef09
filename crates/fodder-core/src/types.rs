//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }

    /// Clock value in milliseconds, the time base of every weapon timer.
    pub fn now_ms(&self) -> f64 {
        self.elapsed_secs * 1000.0
    }
}

/// Rectangular playfield, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: crate::constants::ARENA_WIDTH,
            height: crate::constants::ARENA_HEIGHT,
        }
    }
}

impl Arena {
    /// Clamp a squad center to the viewport minus one entity size.
    pub fn clamp_squad(&self, pos: DVec2) -> DVec2 {
        let size = crate::constants::SOLDIER_SIZE;
        DVec2::new(
            pos.x.clamp(0.0, (self.width - size).max(0.0)),
            pos.y.clamp(0.0, (self.height - size).max(0.0)),
        )
    }

    /// Whether a point lies inside the arena grown by `margin` on every side.
    pub fn contains_with_margin(&self, pos: DVec2, margin: f64) -> bool {
        pos.x >= -margin
            && pos.x <= self.width + margin
            && pos.y >= -margin
            && pos.y <= self.height + margin
    }
}

/// Unit vector for an angle in radians (0 = +x, counter-clockwise toward +y).
pub fn heading_vector(angle: f64) -> DVec2 {
    DVec2::new(angle.cos(), angle.sin())
}

/// Angle in radians of the vector pointing from `from` to `to`.
pub fn angle_between(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    d.y.atan2(d.x)
}
