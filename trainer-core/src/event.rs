//! Performance events delivered by an input transport.

use crate::naming::{MAX_PITCH_CODE, PitchCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A note started sounding (MIDI note-on).
    Onset,
    /// A note stopped sounding (MIDI note-off).
    Release,
}

/// One note event from the MIDI port, microphone or on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceEvent {
    pub pitch: PitchCode,
    /// Velocity-like strength, 0-127.
    pub intensity: u8,
    pub kind: EventKind,
}

impl PerformanceEvent {
    pub fn onset(pitch: PitchCode, intensity: u8) -> Self {
        Self {
            pitch: pitch.min(MAX_PITCH_CODE),
            intensity: intensity.min(127),
            kind: EventKind::Onset,
        }
    }

    pub fn release(pitch: PitchCode, intensity: u8) -> Self {
        Self {
            pitch: pitch.min(MAX_PITCH_CODE),
            intensity: intensity.min(127),
            kind: EventKind::Release,
        }
    }

    /// Whether this event counts as "a note was played".
    ///
    /// An onset needs a positive intensity: a zero-intensity onset is how
    /// many devices signal note-off. A release counts only when
    /// `release_counts_as_onset` is set.
    pub fn qualifies(&self, release_counts_as_onset: bool) -> bool {
        match self.kind {
            EventKind::Onset => self.intensity > 0,
            EventKind::Release => release_counts_as_onset,
        }
    }
}
