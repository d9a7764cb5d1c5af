//! # Settings Module
//!
//! User settings saved as JSON between runs: practice toggles, input source
//! and a few tuning knobs. Scores are never saved.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::acoustic::DEFAULT_AMPLITUDE_THRESHOLD;
use crate::error::{Result, TrainerError};
use crate::pool::PracticeConfig;
use crate::session::DEFAULT_ADVANCE_DELAY;

/// Where performance events come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Midi,
    Microphone,
    /// Only the on-screen keyboard.
    OnScreen,
}

impl InputSource {
    pub const ALL: [InputSource; 3] = [InputSource::Midi, InputSource::Microphone, InputSource::OnScreen];
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InputSource::Midi => "MIDI device",
            InputSource::Microphone => "Microphone",
            InputSource::OnScreen => "On-screen keyboard",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub practice: PracticeConfig,
    /// Pause after a correct answer before the next target, in milliseconds.
    pub advance_delay_ms: u64,
    /// Accept note-off as "a note was played".
    pub release_counts_as_onset: bool,
    /// Draw a staff; `false` shows the text-only fallback.
    pub staff_rendering: bool,
    pub input_source: InputSource,
    /// Preferred MIDI port. The first port is used when unset or missing.
    pub midi_port: Option<String>,
    /// Microphone RMS noise gate.
    pub amplitude_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            practice: PracticeConfig::default(),
            advance_delay_ms: DEFAULT_ADVANCE_DELAY.as_millis() as u64,
            release_counts_as_onset: true,
            staff_rendering: true,
            input_source: InputSource::default(),
            midi_port: None,
            amplitude_threshold: DEFAULT_AMPLITUDE_THRESHOLD,
        }
    }
}

impl Settings {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        serde_json::from_str(&data).map_err(|e| TrainerError::Settings(e.to_string()))
    }

    /// Loads settings, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("[SETTINGS] Loaded {}", path.display());
                settings
            }
            Err(TrainerError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[SETTINGS] No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("[SETTINGS] Could not load {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Writes settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json_string =
            serde_json::to_string_pretty(self).map_err(|e| TrainerError::Settings(e.to_string()))?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}
