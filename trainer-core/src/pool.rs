//! # Pool Builder Module
//!
//! Turns the learner's practice toggles into the set of pitch codes a target
//! may be drawn from.

use serde::{Deserialize, Serialize};

use crate::naming::{self, INSTRUMENT_HIGHEST, INSTRUMENT_LOWEST, PitchCode, REFERENCE_PITCH};
use crate::range::{self, Clef, RangeProfile};

/// Practice toggles chosen in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    pub range_profile: RangeProfile,
    pub include_high_clef: bool,
    pub include_low_clef: bool,
    pub include_sharp_system: bool,
    pub include_flat_system: bool,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            range_profile: RangeProfile::default(),
            include_high_clef: true,
            include_low_clef: true,
            include_sharp_system: false,
            include_flat_system: false,
        }
    }
}

impl PracticeConfig {
    pub fn includes_clef(&self, clef: Clef) -> bool {
        match clef {
            Clef::High => self.include_high_clef,
            Clef::Low => self.include_low_clef,
        }
    }

    /// True when at least one accidental system is switched on.
    pub fn includes_accidentals(&self) -> bool {
        self.include_sharp_system || self.include_flat_system
    }
}

/// Builds the ascending, never-empty list of eligible target pitch codes.
///
/// Walks the profile's range, skipping pitches whose clef is disabled,
/// accidentals when no accidental system is enabled, and anything outside
/// the 88-key instrument range. An empty result falls back to `[60]`.
pub fn build_pool(config: &PracticeConfig) -> Vec<PitchCode> {
    let (low, high) = config.range_profile.bounds();

    let pool: Vec<PitchCode> = (low..=high)
        .filter(|&code| config.includes_clef(range::clef_for(code)))
        .filter(|&code| naming::is_natural(code) || config.includes_accidentals())
        .filter(|&code| (INSTRUMENT_LOWEST..=INSTRUMENT_HIGHEST).contains(&code))
        .collect();

    if pool.is_empty() {
        log::debug!("[POOL] No eligible pitches for {:?}, using fallback", config);
        return vec![REFERENCE_PITCH];
    }
    pool
}
