//! Errors surfaced by the simulation engine.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("no session is running")]
    NoSession,

    #[error("saved squad has {count} soldiers, the limit is {max}")]
    SquadOverCapacity { count: usize, max: usize },

    #[error("saved soldier {index} has non-positive hp {hp}")]
    DeadSoldier { index: usize, hp: f64 },
}
