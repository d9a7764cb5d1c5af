//! # Error Module
//!
//! Errors surfaced by the trainer core. Most conditions the trainer meets at
//! runtime (empty pools, unreachable spellings) are resolved locally with a
//! deterministic fallback; the variants here are the ones a caller can see.

use thiserror::Error;

use crate::naming::PitchCode;

#[derive(Error, Debug)]
pub enum TrainerError {
    /// A range profile name that is not in the preset table.
    #[error("Unknown range profile: {0}")]
    UnknownRangeProfile(String),

    /// An accidental pitch class was asked for a name without a sharp or flat spelling.
    #[error("Pitch {code} is an accidental and needs a sharp or flat spelling")]
    UnspellableAccidental { code: PitchCode },

    /// The input device backend is missing, refused access, or the port vanished.
    #[error("Input transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Invalid settings file: {0}")]
    Settings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
