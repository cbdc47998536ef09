//! Per-tick input snapshot supplied by the input source.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Movement key bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    /// Normalized movement direction, zero when no key (or only opposing keys) is held.
    pub fn direction(&self) -> DVec2 {
        let mut dir = DVec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }
}

/// Mouse / aim target in world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
    pub pressed: bool,
}

impl PointerState {
    pub fn target(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Immutable input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub keys: MoveKeys,
    pub pointer: PointerState,
}
