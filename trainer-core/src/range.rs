//! Practice range presets and clef assignment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrainerError;
use crate::naming::{PitchCode, REFERENCE_PITCH};

/// Named practice range. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeProfile {
    /// C4..C5
    Beginner,
    /// C4..B5
    #[default]
    Treble,
    /// C2..B3
    Bass,
    /// C2..C6
    Wide,
}

impl RangeProfile {
    pub const ALL: [RangeProfile; 4] = [
        RangeProfile::Beginner,
        RangeProfile::Treble,
        RangeProfile::Bass,
        RangeProfile::Wide,
    ];

    /// Inclusive `(low, high)` bounds of the preset.
    pub fn bounds(self) -> (PitchCode, PitchCode) {
        match self {
            RangeProfile::Beginner => (60, 72),
            RangeProfile::Treble => (60, 83),
            RangeProfile::Bass => (36, 59),
            RangeProfile::Wide => (36, 84),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RangeProfile::Beginner => "beginner",
            RangeProfile::Treble => "treble",
            RangeProfile::Bass => "bass",
            RangeProfile::Wide => "wide",
        }
    }
}

impl fmt::Display for RangeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RangeProfile::Beginner => "Beginner (C4-C5)",
            RangeProfile::Treble => "Treble only (C4-B5)",
            RangeProfile::Bass => "Bass only (C2-B3)",
            RangeProfile::Wide => "Wide (C2-C6)",
        };
        f.write_str(label)
    }
}

impl FromStr for RangeProfile {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(RangeProfile::Beginner),
            "treble" | "trebleOnly" => Ok(RangeProfile::Treble),
            "bass" | "bassOnly" => Ok(RangeProfile::Bass),
            "wide" => Ok(RangeProfile::Wide),
            other => Err(TrainerError::UnknownRangeProfile(other.to_string())),
        }
    }
}

/// Looks up the bounds of a profile by name.
pub fn range_for(profile_name: &str) -> Result<(PitchCode, PitchCode), TrainerError> {
    profile_name.parse::<RangeProfile>().map(RangeProfile::bounds)
}

/// Staff a pitch is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clef {
    /// Treble staff.
    High,
    /// Bass staff.
    Low,
}

impl Clef {
    pub fn name(self) -> &'static str {
        match self {
            Clef::High => "treble",
            Clef::Low => "bass",
        }
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Below middle C goes on the bass staff, everything else on treble.
pub fn clef_for(code: PitchCode) -> Clef {
    if code < REFERENCE_PITCH { Clef::Low } else { Clef::High }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clef_boundary() {
        assert_eq!(clef_for(59), Clef::Low);
        assert_eq!(clef_for(60), Clef::High);
        assert_eq!(clef_for(0), Clef::Low);
        assert_eq!(clef_for(127), Clef::High);
    }

    #[test]
    fn test_preset_table() {
        assert_eq!(range_for("beginner").unwrap(), (60, 72));
        assert_eq!(range_for("treble").unwrap(), (60, 83));
        assert_eq!(range_for("trebleOnly").unwrap(), (60, 83));
        assert_eq!(range_for("bassOnly").unwrap(), (36, 59));
        assert_eq!(range_for("wide").unwrap(), (36, 84));
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        let err = range_for("virtuoso").unwrap_err();
        assert!(matches!(err, TrainerError::UnknownRangeProfile(name) if name == "virtuoso"));
    }

    #[test]
    fn test_profile_names_round_trip_through_from_str() {
        for profile in RangeProfile::ALL {
            assert_eq!(profile.name().parse::<RangeProfile>().unwrap(), profile);
        }
    }
}
