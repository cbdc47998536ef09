//! The player squad: an ordered list of soldiers around a shared center.
//!
//! Soldier order defines the formation slot; index 0 is the leader.
//! Positions are re-derived from the squad center every tick.

use glam::DVec2;

use fodder_core::constants::{FORMATION_RADIUS, MAX_SQUAD_SIZE, SOLDIER_MAX_HP};
use fodder_core::types::heading_vector;
use fodder_core::weapons::WeaponTemplate;

use crate::weapon::WeaponInstance;

#[derive(Debug, Clone)]
pub struct Soldier {
    /// Center, placed by [`Squad::apply_formation`].
    pub position: DVec2,
    pub hp: f64,
    pub max_hp: f64,
    /// Aim angle in radians toward the pointer.
    pub aim_angle: f64,
    pub weapon: WeaponInstance,
}

impl Soldier {
    pub fn new(position: DVec2, template: WeaponTemplate) -> Self {
        Self {
            position,
            hp: SOLDIER_MAX_HP,
            max_hp: SOLDIER_MAX_HP,
            aim_angle: 0.0,
            weapon: WeaponInstance::new(template),
        }
    }

    /// Apply damage. Returns `true` when this hit killed the soldier.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        self.hp -= amount;
        self.hp <= 0.0
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Replace the current weapon with a fresh instance of `template`.
    pub fn equip(&mut self, template: WeaponTemplate) {
        self.weapon = WeaponInstance::new(template);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Squad {
    pub position: DVec2,
    pub soldiers: Vec<Soldier>,
}

impl Squad {
    pub fn new(position: DVec2) -> Self {
        Self {
            position,
            soldiers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.soldiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.soldiers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.soldiers.len() >= MAX_SQUAD_SIZE
    }

    /// Append a soldier at the squad center. Refused once the squad is full.
    pub fn add_soldier(&mut self, template: WeaponTemplate) -> bool {
        if self.is_full() {
            return false;
        }
        self.soldiers.push(Soldier::new(self.position, template));
        true
    }

    /// Place every soldier on its formation slot.
    pub fn apply_formation(&mut self) {
        let count = self.soldiers.len();
        let center = self.position;
        for (index, soldier) in self.soldiers.iter_mut().enumerate() {
            soldier.position = center + formation_offset(index, count);
        }
    }

    /// Drop dead soldiers, keeping the order of the survivors.
    /// Returns how many were removed.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.soldiers.len();
        self.soldiers.retain(Soldier::is_alive);
        before - self.soldiers.len()
    }
}

/// Offset of slot `index` in a squad of `count`.
///
/// A lone soldier stands on the center; otherwise every slot, the leader
/// included, sits on a ring of [`FORMATION_RADIUS`].
pub fn formation_offset(index: usize, count: usize) -> DVec2 {
    if count <= 1 {
        return DVec2::ZERO;
    }
    let step = std::f64::consts::TAU / count as f64;
    heading_vector(index as f64 * step) * FORMATION_RADIUS
}
