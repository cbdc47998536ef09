//! Weapon state machine: ammo, reload and burst timing for one weapon.
//!
//! Pure state, no knowledge of the world. All times are simulation-clock
//! milliseconds. The owning system turns accepted requests into projectiles.

use fodder_core::enums::{FireMode, WeaponState};
use fodder_core::weapons::WeaponTemplate;

/// Why a fire request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Reloading,
    /// Magazine could not cover the shot; a reload was started.
    Empty,
    /// Fire interval not yet elapsed, or burst shots still pending.
    Cooldown,
}

/// Result of a fire request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// Spawn `count` projectiles now.
    Volley { count: u32 },
    /// Ammo committed; shots drain through [`WeaponInstance::next_burst_shot`].
    BurstArmed,
    Denied(DenyReason),
}

impl FireDecision {
    pub fn authorized(&self) -> bool {
        !matches!(self, FireDecision::Denied(_))
    }
}

/// Runtime state bound to one template.
#[derive(Debug, Clone)]
pub struct WeaponInstance {
    template: WeaponTemplate,
    ammo: u32,
    reloading: bool,
    reload_started_ms: f64,
    last_shot_ms: Option<f64>,
    pending_burst: u32,
    next_burst_shot_ms: f64,
    burst_index: u32,
}

impl WeaponInstance {
    /// A fresh weapon with a full magazine.
    pub fn new(template: WeaponTemplate) -> Self {
        Self {
            ammo: template.magazine_size,
            template,
            reloading: false,
            reload_started_ms: 0.0,
            last_shot_ms: None,
            pending_burst: 0,
            next_burst_shot_ms: 0.0,
            burst_index: 0,
        }
    }

    pub fn template(&self) -> &WeaponTemplate {
        &self.template
    }

    pub fn key(&self) -> &str {
        &self.template.key
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn pending_burst_shots(&self) -> u32 {
        self.pending_burst
    }

    pub fn state(&self, now_ms: f64) -> WeaponState {
        if self.reloading {
            WeaponState::Reloading
        } else if self.pending_burst > 0
            || self
                .last_shot_ms
                .is_some_and(|t| now_ms - t < self.template.fire_interval_ms)
        {
            WeaponState::Firing
        } else {
            WeaponState::Ready
        }
    }

    /// Advance timers. Returns `true` on the call that completes a reload.
    ///
    /// An emptied magazine starts reloading automatically once no burst
    /// shots are pending.
    pub fn update(&mut self, now_ms: f64) -> bool {
        if self.reloading {
            if now_ms - self.reload_started_ms >= self.template.reload_ms {
                self.reloading = false;
                self.ammo = self.template.magazine_size;
                return true;
            }
            return false;
        }

        if self.ammo == 0 && self.pending_burst == 0 && !self.template.is_unarmed() {
            self.begin_reload(now_ms);
        }
        false
    }

    /// Ask for a shot at `now_ms`.
    pub fn request_fire(&mut self, now_ms: f64) -> FireDecision {
        if self.reloading {
            return FireDecision::Denied(DenyReason::Reloading);
        }
        if self.ammo == 0 {
            self.begin_reload(now_ms);
            return FireDecision::Denied(DenyReason::Empty);
        }
        if self.pending_burst > 0 {
            return FireDecision::Denied(DenyReason::Cooldown);
        }
        if let Some(last) = self.last_shot_ms {
            if now_ms - last < self.template.fire_interval_ms {
                return FireDecision::Denied(DenyReason::Cooldown);
            }
        }

        match self.template.fire_mode {
            FireMode::Semi | FireMode::Auto => {
                self.ammo -= 1;
                self.last_shot_ms = Some(now_ms);
                FireDecision::Volley {
                    count: self.template.projectile_count,
                }
            }
            FireMode::Burst => {
                let burst = self.template.burst_count.max(1);
                if self.ammo < burst {
                    self.begin_reload(now_ms);
                    return FireDecision::Denied(DenyReason::Empty);
                }
                self.ammo -= burst;
                self.pending_burst = burst;
                self.next_burst_shot_ms = now_ms;
                self.burst_index = 0;
                self.last_shot_ms = Some(now_ms);
                FireDecision::BurstArmed
            }
        }
    }

    /// Pop the next due burst shot, returning its index within the burst.
    ///
    /// Call in a loop each tick: a slow tick emits every overdue shot, so the
    /// shot count and average cadence hold even when frames stall.
    pub fn next_burst_shot(&mut self, now_ms: f64) -> Option<u32> {
        if self.pending_burst == 0 || now_ms < self.next_burst_shot_ms {
            return None;
        }
        let index = self.burst_index;
        self.pending_burst -= 1;
        self.burst_index += 1;
        self.next_burst_shot_ms += self.template.burst_interval_ms;
        if self.pending_burst == 0 {
            self.burst_index = 0;
        }
        Some(index)
    }

    /// Explicit reload request. Refused while reloading, mid-burst, or with a full magazine.
    pub fn start_reload(&mut self, now_ms: f64) -> bool {
        if self.reloading
            || self.pending_burst > 0
            || self.ammo >= self.template.magazine_size
        {
            return false;
        }
        self.begin_reload(now_ms);
        true
    }

    /// Reload completion in [0, 1]; 0 when not reloading.
    pub fn reload_progress(&self, now_ms: f64) -> f64 {
        if !self.reloading {
            return 0.0;
        }
        if self.template.reload_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.reload_started_ms) / self.template.reload_ms).clamp(0.0, 1.0)
    }

    fn begin_reload(&mut self, now_ms: f64) {
        if !self.reloading {
            self.reloading = true;
            self.reload_started_ms = now_ms;
        }
    }
}
