//! Enemy behaviour decision.
//!
//! Pure functions that compute facing, stance and displacement for one
//! enemy from its position and the squad center. No ECS dependency.

use glam::DVec2;

use fodder_core::constants::ENEMY_HOLD_RANGE;
use fodder_core::enums::EnemyStance;
use fodder_core::types::angle_between;

/// Input to the enemy FSM for a single entity.
pub struct EnemyContext {
    pub position: DVec2,
    pub squad_center: DVec2,
    pub speed: f64,
    pub dt: f64,
}

/// Output from the enemy FSM.
pub struct EnemyUpdate {
    pub stance: EnemyStance,
    /// Angle toward the squad center.
    pub facing: f64,
    pub new_position: DVec2,
}

/// Evaluate pursuit for one enemy: close in until within hold range, then stand.
pub fn evaluate(ctx: &EnemyContext) -> EnemyUpdate {
    let facing = angle_between(ctx.position, ctx.squad_center);
    let distance = ctx.position.distance(ctx.squad_center);

    if distance > ENEMY_HOLD_RANGE {
        let step = DVec2::new(facing.cos(), facing.sin()) * ctx.speed * ctx.dt;
        EnemyUpdate {
            stance: EnemyStance::Pursue,
            facing,
            new_position: ctx.position + step,
        }
    } else {
        EnemyUpdate {
            stance: EnemyStance::Hold,
            facing,
            new_position: ctx.position,
        }
    }
}

/// Entity-level fire gate. Independent of the weapon's own fire interval;
/// both must pass before a shot leaves the barrel.
pub fn may_request_fire(now_ms: f64, next_shot_ms: f64) -> bool {
    now_ms > next_shot_ms
}
