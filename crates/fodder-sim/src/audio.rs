//! Audio sink interface.
//!
//! The engine hands every event of a tick to the sink before building the
//! snapshot. Playback failures are the sink's business and never reach
//! the simulation.

use fodder_core::events::AudioEvent;

pub trait AudioSink: Send {
    fn trigger(&mut self, event: &AudioEvent);
}

/// Sink that drops everything. Used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn trigger(&mut self, _event: &AudioEvent) {}
}
