//! # Note Trainer - Sight-Reading GUI
//!
//! Shows a random note on a staff and waits for the learner to play it on a
//! MIDI keyboard, an acoustic instrument (microphone) or the on-screen
//! keyboard.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application owning the [`TrainerSession`]
//! - **Input Threads**: MIDI callback / acoustic tracker send note events
//! - **Communication**: one crossbeam channel carries every note event
//! - **Updates**: a 16 ms tick drains the channel and fires the pending
//!   advance, so all session changes run on the update loop, one at a time

mod ui;

use crossbeam_channel::{Receiver, Sender};
use iced::{self, Element, Subscription, Theme};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use trainer_core::acoustic::AcousticInput;
use trainer_core::midi::MidiInputManager;
use trainer_core::{
    Evaluation, Feedback, InputSource, PerformanceEvent, PitchCode, PracticeConfig, RangeProfile,
    Settings, Target, TrainerSession,
};
use ui::main_display::create_main_view;
use ui::piano_keyboard::PlayedKey;
use ui::staff::TargetNotation;

const DEFAULT_SETTINGS_PATH: &str = "trainer_settings.json";

/// Intensity of a click on the on-screen keyboard.
const ON_SCREEN_INTENSITY: u8 = 100;

pub fn main() -> iced::Result {
    env_logger::init();
    log::info!("[MAIN] Starting note trainer...");
    let result = iced::application("Note Trainer", TrainerApp::update, TrainerApp::view)
        .subscription(TrainerApp::subscription)
        .theme(TrainerApp::theme)
        .run();
    log::info!("[MAIN] Application finished with result: {:?}", result);
    result
}

#[derive(Debug, Clone)]
pub enum Message {
    // Practice settings; every change picks a new target
    RangeSelected(RangeProfile),
    ToggleTrebleClef(bool),
    ToggleBassClef(bool),
    ToggleSharps(bool),
    ToggleFlats(bool),

    // Display
    ToggleStaff(bool),

    // Input transport
    InputSourceSelected(InputSource),
    MidiPortSelected(String),
    Connect,

    NewNote,
    KeyPressed(PitchCode), // On-screen keyboard click

    Tick,         // Drain note events, fire the pending advance
    RefreshPorts, // Re-read MIDI ports to notice devices coming and going
}

/// Everything the view needs, copied out of the app state.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub practice: PracticeConfig,
    pub staff_rendering: bool,
    pub input_source: InputSource,
    pub midi_ports: Vec<String>,
    pub selected_port: Option<String>,
    pub target: Option<Target>,
    pub notation_text: Option<String>,
    pub score: u32,
    pub last_performed: Option<String>,
    pub feedback: Feedback,
    pub status: Feedback,
    pub played: Option<PlayedKey>,
}

struct TrainerApp {
    session: TrainerSession<Pcg32>,
    settings: Settings,
    settings_path: PathBuf,
    notation: TargetNotation,

    // Every transport sends here; only `Tick` reads.
    events_tx: Sender<PerformanceEvent>,
    events_rx: Receiver<PerformanceEvent>,

    midi: MidiInputManager,
    selected_port: Option<String>,
    acoustic: Option<AcousticInput>,

    /// Transport status line (connected, unavailable, ...).
    status: Feedback,
    played: Option<PlayedKey>,
}

impl Default for TrainerApp {
    fn default() -> Self {
        let settings_path = PathBuf::from(DEFAULT_SETTINGS_PATH);
        let settings = Settings::load_or_default(&settings_path);
        let (events_tx, events_rx) = crossbeam_channel::unbounded();

        let session = TrainerSession::new(Pcg32::from_entropy())
            .with_advance_delay(settings.advance_delay())
            .with_release_counts_as_onset(settings.release_counts_as_onset);

        let mut app = Self {
            session,
            selected_port: settings.midi_port.clone(),
            settings,
            settings_path,
            notation: TargetNotation::default(),
            events_tx,
            events_rx,
            midi: MidiInputManager::new(),
            acoustic: None,
            status: Feedback::default(),
            played: None,
        };

        app.midi.refresh_ports();
        app.apply_input_source();
        // Start with a target even before any device is connected.
        app.next_target();
        app
    }
}

impl TrainerApp {
    fn next_target(&mut self) {
        self.session.pick_new_target(&self.settings.practice, &mut self.notation);
        self.played = None;
    }

    /// Applies a practice-settings change: new target, settings saved.
    fn practice_changed(&mut self) {
        self.next_target();
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            log::warn!("[MAIN] Error saving settings: {}", e);
        }
    }

    /// Tears down the current transport and starts the selected one.
    fn apply_input_source(&mut self) {
        self.midi.disconnect();
        if let Some(acoustic) = self.acoustic.take() {
            acoustic.stop();
        }

        match self.settings.input_source {
            InputSource::Midi => self.connect_midi(),
            InputSource::Microphone => {
                match AcousticInput::start(self.events_tx.clone(), self.settings.amplitude_threshold) {
                    Ok(input) => {
                        self.acoustic = Some(input);
                        self.status = Feedback::neutral("Listening on the default microphone.");
                    }
                    Err(e) => {
                        log::error!("[MAIN] {}", e);
                        self.status = Feedback::failure("Could not open the microphone.");
                    }
                }
            }
            InputSource::OnScreen => {
                self.status = Feedback::neutral("Click the keys below to answer.");
            }
        }
    }

    fn connect_midi(&mut self) {
        if !self.midi.is_available() {
            self.status = Feedback::failure("MIDI is not supported on this system.");
            return;
        }

        let ports: Vec<String> = self.midi.list_ports().iter().map(|p| p.name.clone()).collect();
        let Some(port) = self
            .selected_port
            .clone()
            .filter(|name| ports.contains(name))
            .or_else(|| ports.first().cloned())
        else {
            self.status = Feedback::failure("No MIDI inputs found.");
            return;
        };

        match self.midi.connect_by_name(&port, self.events_tx.clone()) {
            Ok(name) => {
                self.status = Feedback::neutral(format!("Connected to {}.", name));
                self.selected_port = Some(name.clone());
                if self.settings.midi_port.as_deref() != Some(name.as_str()) {
                    self.settings.midi_port = Some(name);
                    self.save_settings();
                }
            }
            Err(e) => {
                log::error!("[MAIN] {}", e);
                self.status = Feedback::failure("Could not connect to the selected MIDI input.");
            }
        }
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::RangeSelected(profile) => {
                self.settings.practice.range_profile = profile;
                self.practice_changed();
            }
            Message::ToggleTrebleClef(on) => {
                self.settings.practice.include_high_clef = on;
                self.practice_changed();
            }
            Message::ToggleBassClef(on) => {
                self.settings.practice.include_low_clef = on;
                self.practice_changed();
            }
            Message::ToggleSharps(on) => {
                self.settings.practice.include_sharp_system = on;
                self.practice_changed();
            }
            Message::ToggleFlats(on) => {
                self.settings.practice.include_flat_system = on;
                self.practice_changed();
            }
            Message::ToggleStaff(on) => {
                self.settings.staff_rendering = on;
                self.save_settings();
            }
            Message::InputSourceSelected(source) => {
                log::info!("[MAIN] Input source: {:?} -> {:?}", self.settings.input_source, source);
                self.settings.input_source = source;
                self.save_settings();
                self.apply_input_source();
            }
            Message::MidiPortSelected(name) => {
                self.selected_port = Some(name);
                if self.settings.input_source == InputSource::Midi {
                    self.connect_midi();
                }
            }
            Message::Connect => self.apply_input_source(),
            Message::NewNote => self.next_target(),
            Message::KeyPressed(pitch) => {
                // Same queue as the device transports.
                let _ = self.events_tx.send(PerformanceEvent::onset(pitch, ON_SCREEN_INTENSITY));
            }
            Message::Tick => self.drain_events(Instant::now()),
            Message::RefreshPorts => {
                if self.midi.refresh_ports()
                    && self.settings.input_source == InputSource::Midi
                    && !self.port_still_present()
                {
                    log::info!("[MAIN] Connected MIDI port went away, reconnecting");
                    self.connect_midi();
                }
            }
        }
    }

    fn port_still_present(&self) -> bool {
        match self.midi.connected_port_name() {
            Some(name) => self.midi.list_ports().iter().any(|p| p.name == name),
            None => false,
        }
    }

    /// Judges every queued note event, then fires the advance if it is due.
    fn drain_events(&mut self, now: Instant) {
        let events: Vec<PerformanceEvent> = self.events_rx.try_iter().collect();
        for event in events {
            match self.session.evaluate(&event, now) {
                Evaluation::Match { .. } => {
                    self.played = Some(PlayedKey { pitch: event.pitch, correct: true });
                }
                Evaluation::Mismatch { .. } => {
                    self.played = Some(PlayedKey { pitch: event.pitch, correct: false });
                }
                Evaluation::Ignored => {}
            }
        }

        if self.session.poll(now, &self.settings.practice, &mut self.notation).is_some() {
            self.played = None;
        }
    }

    fn display_data(&self) -> AppDisplayData {
        AppDisplayData {
            practice: self.settings.practice,
            staff_rendering: self.settings.staff_rendering,
            input_source: self.settings.input_source,
            midi_ports: self.midi.list_ports().iter().map(|p| p.name.clone()).collect(),
            selected_port: self.selected_port.clone(),
            target: self.session.target().copied(),
            notation_text: self.notation.fallback_text().map(str::to_string),
            score: self.session.score(),
            last_performed: self.session.last_performed().map(str::to_string),
            feedback: self.session.feedback().clone(),
            status: self.status.clone(),
            played: self.played,
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data(), self.notation.current())
    }

    /// A fast tick for note events and the advance timer, a slow one for MIDI ports.
    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(Duration::from_millis(16)).map(|_| Message::Tick),
            iced::time::every(Duration::from_secs(2)).map(|_| Message::RefreshPorts),
        ])
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_pcg::Pcg32;
    use tempfile::TempDir;
    use trainer_core::{Clef, FeedbackKind};

    fn middle_c_only() -> PracticeConfig {
        PracticeConfig {
            include_high_clef: false,
            include_low_clef: false,
            ..PracticeConfig::default()
        }
    }

    /// App without devices or entropy; settings go to a temp dir.
    fn offline_app(practice: PracticeConfig) -> (TrainerApp, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let settings = Settings {
            practice,
            input_source: InputSource::OnScreen,
            ..Settings::default()
        };
        let mut app = TrainerApp {
            session: TrainerSession::new(Pcg32::seed_from_u64(1)),
            settings,
            settings_path: dir.path().join("settings.json"),
            notation: TargetNotation::default(),
            events_tx,
            events_rx,
            midi: MidiInputManager::new(),
            selected_port: None,
            acoustic: None,
            status: Feedback::default(),
            played: None,
        };
        app.next_target();
        (app, dir)
    }

    #[test]
    fn test_on_screen_key_goes_through_the_event_queue() {
        let (mut app, _dir) = offline_app(middle_c_only());
        app.update(Message::KeyPressed(62));
        assert_eq!(app.session.feedback(), &Feedback::default());

        app.drain_events(Instant::now());
        assert_eq!(app.session.feedback().kind, FeedbackKind::Failure);
        assert_eq!(app.played, Some(PlayedKey { pitch: 62, correct: false }));
    }

    #[test]
    fn test_correct_key_advances_after_delay() {
        let (mut app, _dir) = offline_app(middle_c_only());
        let now = Instant::now();
        app.update(Message::KeyPressed(60));
        app.drain_events(now);
        assert_eq!(app.session.score(), 1);
        assert_eq!(app.played, Some(PlayedKey { pitch: 60, correct: true }));

        app.drain_events(now + Duration::from_secs(1));
        assert!(app.session.pending_advance().is_none());
        assert_eq!(app.played, None);
        assert_eq!(app.session.feedback(), &Feedback::default());
    }

    #[test]
    fn test_target_is_rendered_on_start() {
        let (app, _dir) = offline_app(middle_c_only());
        let (key, clef) = app.notation.current().unwrap();
        assert_eq!(key.to_string(), "C4");
        assert_eq!(clef, Clef::High);
        assert_eq!(app.notation.fallback_text(), Some("Note: C4 (text-only mode)"));
    }

    #[test]
    fn test_every_practice_change_picks_and_renders_a_new_target() {
        let (mut app, dir) = offline_app(middle_c_only());

        // Bass range with only the bass clef: the new target sits below C4.
        app.update(Message::RangeSelected(RangeProfile::Bass));
        app.update(Message::ToggleBassClef(true));
        let (key, clef) = app.notation.current().unwrap();
        assert_eq!(clef, Clef::Low);
        assert!(app.session.target().unwrap().pitch < 60);
        assert_eq!(Some(key), app.session.target().map(|t| t.key));

        // A failed answer is cleared by the next toggle.
        let wrong = app.session.target().unwrap().pitch + 1;
        app.update(Message::KeyPressed(wrong));
        app.drain_events(Instant::now());
        assert_eq!(app.session.feedback().kind, FeedbackKind::Failure);

        app.update(Message::ToggleSharps(true));
        assert_eq!(app.session.feedback(), &Feedback::default());
        assert_eq!(app.played, None);
        assert_eq!(
            app.notation.current(),
            app.session.target().map(|t| (t.key, t.clef))
        );

        let saved = Settings::load(dir.path().join("settings.json")).unwrap();
        assert_eq!(saved.practice.range_profile, RangeProfile::Bass);
        assert!(saved.practice.include_low_clef);
        assert!(saved.practice.include_sharp_system);
    }
}
