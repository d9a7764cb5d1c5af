//! Chooses how an accidental target is spelled.

use rand::Rng;

use crate::naming::{self, PitchCode, Spelling};
use crate::pool::PracticeConfig;

/// Decides the spelling for a target pitch under the enabled accidental systems.
///
/// Naturals are always [`Spelling::Natural`]. With both systems enabled the
/// choice is a fair coin flip on every call. With neither enabled the pool
/// builder never offers an accidental, so `Natural` is returned and callers
/// treat it as "no valid spelling".
pub fn decide_spelling<R: Rng + ?Sized>(
    code: PitchCode,
    config: &PracticeConfig,
    rng: &mut R,
) -> Spelling {
    if naming::is_natural(code) {
        return Spelling::Natural;
    }

    match (config.include_sharp_system, config.include_flat_system) {
        (true, false) => Spelling::Sharp,
        (false, true) => Spelling::Flat,
        (true, true) => {
            if rng.gen_bool(0.5) {
                Spelling::Sharp
            } else {
                Spelling::Flat
            }
        }
        (false, false) => {
            log::warn!("[SPELLING] Pitch {} is an accidental but no accidental system is enabled", code);
            Spelling::Natural
        }
    }
}
