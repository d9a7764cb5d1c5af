//! # Pitch Naming Module
//!
//! Converts pitch codes (the 0-127 note numbering, 60 = middle C) into the
//! names shown to the learner and into structured notation keys for the staff
//! renderer.
//!
//! ## Features
//! - Sharp-table plain names (`C#4`) for feedback text
//! - Spelled display names (`C♯4`, `D♭4`) under a chosen [`Spelling`]
//! - Structured [`NotationKey`] (letter + accidental + register)
//! - Equal-tempered frequency table for the acoustic input (A4 = 440 Hz)

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TrainerError};

/// A pitch in the standard 0-127 note numbering.
pub type PitchCode = u8;

/// Middle C. Also the clef boundary and the fallback target.
pub const REFERENCE_PITCH: PitchCode = 60;

/// Highest valid pitch code.
pub const MAX_PITCH_CODE: PitchCode = 127;

/// Lowest key of an 88-key piano (A0).
pub const INSTRUMENT_LOWEST: PitchCode = 21;

/// Highest key of an 88-key piano (C8).
pub const INSTRUMENT_HIGHEST: PitchCode = 108;

const NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch classes without an accidental: C D E F G A B.
const NATURAL_CLASSES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

// Sharps take the lower neighbour's letter (C for C#), flats the upper one (D for Db).
const SHARP_LETTERS: [Letter; 12] = [
    Letter::C, Letter::C, Letter::D, Letter::D, Letter::E, Letter::F,
    Letter::F, Letter::G, Letter::G, Letter::A, Letter::A, Letter::B,
];
const FLAT_LETTERS: [Letter; 12] = [
    Letter::C, Letter::D, Letter::D, Letter::E, Letter::E, Letter::F,
    Letter::G, Letter::G, Letter::A, Letter::A, Letter::B, Letter::B,
];

/// Plain names for every pitch code, computed once.
static NATURAL_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    (0..=MAX_PITCH_CODE)
        .map(|code| format!("{}{}", NAMES_SHARP[pitch_class(code) as usize], register(code)))
        .collect()
});

/// Equal-tempered frequencies for every pitch code.
///
/// f = 440 * 2^((n - 69) / 12), with A4 = 69.
static FREQUENCIES: Lazy<Vec<f32>> = Lazy::new(|| {
    (0..=MAX_PITCH_CODE)
        .map(|code| 440.0 * 2.0_f32.powf((code as f32 - 69.0) / 12.0))
        .collect()
});

/// Which accidental system names an accidental pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spelling {
    Sharp,
    Flat,
    /// No accidental. Only meaningful for natural pitch classes.
    Natural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Sharp,
    Flat,
}

impl Accidental {
    /// Typographic glyph used in display names.
    pub fn glyph(self) -> char {
        match self {
            Accidental::Sharp => '♯',
            Accidental::Flat => '♭',
        }
    }

    /// ASCII form used by notation keys (`#` / `b`).
    pub fn symbol(self) -> char {
        match self {
            Accidental::Sharp => '#',
            Accidental::Flat => 'b',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Position of the letter within an octave counted in staff steps from C.
    pub fn diatonic_index(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }
}

/// What the staff renderer needs to place a note: letter, accidental, register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotationKey {
    pub letter: Letter,
    pub accidental: Option<Accidental>,
    pub register: i8,
}

impl NotationKey {
    /// Absolute diatonic step (C-1 = -7, C4 = 28). Staff lines and ledger
    /// lines are laid out on this scale.
    pub fn staff_step(&self) -> i32 {
        self.register as i32 * 7 + self.letter.diatonic_index()
    }
}

impl fmt::Display for NotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        if let Some(accidental) = self.accidental {
            write!(f, "{}", accidental.glyph())?;
        }
        write!(f, "{}", self.register)
    }
}

pub fn pitch_class(code: PitchCode) -> u8 {
    code % 12
}

pub fn is_natural(code: PitchCode) -> bool {
    NATURAL_CLASSES.contains(&pitch_class(code))
}

/// Register (octave number) of a pitch code: `floor(code / 12) - 1`, so 60 is in register 4.
pub fn register(code: PitchCode) -> i8 {
    (code / 12) as i8 - 1
}

/// Plain sharp-table name, e.g. `C4` or `C#4`. Used for failure feedback.
pub fn natural_name(code: PitchCode) -> String {
    NATURAL_NAMES[code.min(MAX_PITCH_CODE) as usize].clone()
}

/// Spelled name with accidental glyph, e.g. `C♯4` or `D♭4`.
///
/// Natural pitch classes ignore `spelling`. An accidental pitch class with
/// [`Spelling::Natural`] is a contract violation and returns
/// [`TrainerError::UnspellableAccidental`].
pub fn display_name(code: PitchCode, spelling: Spelling) -> Result<String> {
    notation_key(code, spelling).map(|key| key.to_string())
}

/// Structured letter/accidental/register for the renderer.
pub fn notation_key(code: PitchCode, spelling: Spelling) -> Result<NotationKey> {
    let pc = pitch_class(code) as usize;
    let register = register(code);

    if is_natural(code) {
        return Ok(NotationKey {
            letter: SHARP_LETTERS[pc],
            accidental: None,
            register,
        });
    }

    let (letter, accidental) = match spelling {
        Spelling::Sharp => (SHARP_LETTERS[pc], Accidental::Sharp),
        Spelling::Flat => (FLAT_LETTERS[pc], Accidental::Flat),
        Spelling::Natural => return Err(TrainerError::UnspellableAccidental { code }),
    };

    Ok(NotationKey {
        letter,
        accidental: Some(accidental),
        register,
    })
}

/// Equal-tempered frequency of a pitch code in Hz.
pub fn frequency_of(code: PitchCode) -> f32 {
    FREQUENCIES[code.min(MAX_PITCH_CODE) as usize]
}

/// Finds the instrument-range pitch code closest to a frequency.
///
/// Returns `None` for non-finite or non-positive input.
pub fn nearest_pitch_code(freq: f32) -> Option<PitchCode> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    (INSTRUMENT_LOWEST..=INSTRUMENT_HIGHEST).min_by(|&a, &b| {
        let diff_a = (frequency_of(a) - freq).abs();
        let diff_b = (frequency_of(b) - freq).abs();
        diff_a.total_cmp(&diff_b)
    })
}
