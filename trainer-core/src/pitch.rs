//! # Pitch Detection Module
//!
//! Turns microphone frames into note events for the acoustic input.
//!
//! ## Features
//! - YIN fundamental estimation with an RMS noise gate and clarity check
//! - Parabolic interpolation for sub-sample lag accuracy
//! - [`OnsetTracker`]: per-frame pitches in, onsets out

use crate::event::PerformanceEvent;
use crate::naming::PitchCode;

/// Highest normalized YIN difference accepted as a clear tone.
const CLARITY_THRESHOLD: f32 = 0.1;

/// Frames a pitch must hold before it counts as played.
pub const STABLE_FRAMES: usize = 3;

/// Root-mean-square level of a frame.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|&s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Estimates the fundamental frequency of `signal` with the YIN algorithm.
///
/// Returns `None` for frames quieter than `amplitude_threshold` (RMS), frames
/// without a clear periodic dip, and results below 20 Hz.
pub fn detect_pitch_yin(signal: &[f32], sample_rate: u32, amplitude_threshold: f32) -> Option<f32> {
    let half = signal.len() / 2;
    if half < 3 || rms(signal) < amplitude_threshold {
        return None;
    }

    let yin = cumulative_mean_normalized_difference(signal, half);

    // Anything within 0.05 of the global minimum is a candidate; taking the
    // first such dip avoids octave-down errors.
    let min_val = yin.iter().skip(1).cloned().fold(f32::INFINITY, f32::min);
    let threshold = min_val + 0.05;

    let mut tau = (2..half).find(|&t| yin[t] < threshold && yin[t] < yin[t - 1])?;
    while tau + 1 < half && yin[tau + 1] < yin[tau] {
        tau += 1;
    }

    if yin[tau] > CLARITY_THRESHOLD || tau + 1 >= half {
        return None;
    }

    let period = tau as f32 + parabolic_shift(yin[tau - 1], yin[tau], yin[tau + 1]);
    let frequency = sample_rate as f32 / period;

    if frequency.is_finite() && frequency > 20.0 {
        Some(frequency)
    } else {
        None
    }
}

fn cumulative_mean_normalized_difference(signal: &[f32], half: usize) -> Vec<f32> {
    let mut yin = vec![0.0_f32; half];
    for tau in 1..half {
        yin[tau] = (0..half)
            .map(|i| {
                let delta = signal[i] - signal[i + tau];
                delta * delta
            })
            .sum();
    }

    yin[0] = 1.0;
    let mut running_sum = 0.0;
    for tau in 1..half {
        running_sum += yin[tau];
        yin[tau] = if running_sum != 0.0 {
            yin[tau] * tau as f32 / running_sum
        } else {
            1.0
        };
    }
    yin
}

/// Offset of the vertex of the parabola through three neighbouring points.
fn parabolic_shift(y1: f32, y2: f32, y3: f32) -> f32 {
    let denominator = y1 - 2.0 * y2 + y3;
    if denominator.abs() < f32::EPSILON {
        0.0
    } else {
        (y1 - y3) / (2.0 * denominator)
    }
}

/// Maps a frame RMS level onto a 1-127 intensity.
pub fn intensity_from_rms(level: f32) -> u8 {
    let scaled = (level / 0.5).clamp(0.0, 1.0) * 126.0;
    scaled as u8 + 1
}

/// Debounces per-frame pitch estimates into onsets.
///
/// A pitch must be detected for [`STABLE_FRAMES`] consecutive frames before
/// an onset is emitted. Leaving a held pitch takes the same number of frames,
/// whether the frames carry another pitch or silence, so a single misread
/// frame inside a sustained note is absorbed. No release events are produced:
/// the end of a sounding note is not a played note.
#[derive(Debug, Clone, Default)]
pub struct OnsetTracker {
    candidate: Option<(Option<PitchCode>, usize)>,
    sounding: Option<PitchCode>,
}

impl OnsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one frame's estimate; returns an onset once a new pitch settles.
    pub fn update(&mut self, detected: Option<PitchCode>, intensity: u8) -> Option<PerformanceEvent> {
        if detected == self.sounding {
            self.candidate = None;
            return None;
        }

        let count = match self.candidate {
            Some((candidate, count)) if candidate == detected => count + 1,
            _ => 1,
        };

        if count < STABLE_FRAMES {
            self.candidate = Some((detected, count));
            return None;
        }

        self.candidate = None;
        self.sounding = detected;
        detected.map(|pitch| PerformanceEvent::onset(pitch, intensity.max(1)))
    }
}
