//! # Trainer Session Module
//!
//! Owns the exercise state: the current target, its spelling, the score and
//! the feedback line. Targets are drawn from the pool builder, spelled by the
//! spelling policy and handed to a [`NotationRenderer`]. Performance events
//! are judged against the target.
//!
//! ## States
//! - `Idle` until the first target is picked
//! - `AwaitingAnswer` while a target is shown
//! - `Correct` after a match, until the pending advance fires
//!
//! The advance to the next target after a match is an explicit
//! [`PendingAdvance`] that the host fires through [`TrainerSession::poll`].

use rand::Rng;
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};

use crate::event::PerformanceEvent;
use crate::naming::{self, NotationKey, PitchCode, REFERENCE_PITCH, Spelling};
use crate::pool::{self, PracticeConfig};
use crate::range::{self, Clef};
use crate::render::NotationRenderer;
use crate::spelling;

/// Pause between a correct answer and the next target.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackKind {
    #[default]
    Neutral,
    Success,
    Failure,
}

/// The message line shown under the staff.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedback {
    pub text: String,
    pub kind: FeedbackKind,
}

impl Feedback {
    pub fn neutral(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: FeedbackKind::Neutral }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: FeedbackKind::Success }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: FeedbackKind::Failure }
    }
}

/// The pitch the learner is asked to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub pitch: PitchCode,
    pub spelling: Spelling,
    pub clef: Clef,
    pub key: NotationKey,
}

impl Target {
    /// Spelled name, e.g. `E♭4`.
    pub fn display_name(&self) -> String {
        self.key.to_string()
    }
}

/// A scheduled move to the next target after a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    pub due: Instant,
    /// Matches scored while this advance was pending. More than one means a
    /// duplicate onset arrived inside the delay window and scored again.
    pub matches: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingAnswer,
    Correct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TooHigh,
    TooLow,
}

impl Direction {
    fn describe(self) -> &'static str {
        match self {
            Direction::TooHigh => "too high",
            Direction::TooLow => "too low",
        }
    }
}

/// Outcome of judging one performance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Not a "note played" event, or no target yet.
    Ignored,
    Match { score: u32 },
    Mismatch { direction: Direction },
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub target: Option<Target>,
    pub score: u32,
    pub feedback: Feedback,
    /// Name of the most recently played pitch.
    pub last_performed: Option<String>,
    pub pending: Option<PendingAdvance>,
}

pub struct TrainerSession<R> {
    state: SessionState,
    rng: R,
    advance_delay: Duration,
    release_counts_as_onset: bool,
}

impl<R: Rng> TrainerSession<R> {
    pub fn new(rng: R) -> Self {
        Self {
            state: SessionState::default(),
            rng,
            advance_delay: DEFAULT_ADVANCE_DELAY,
            release_counts_as_onset: true,
        }
    }

    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn with_release_counts_as_onset(mut self, enabled: bool) -> Self {
        self.release_counts_as_onset = enabled;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn target(&self) -> Option<&Target> {
        self.state.target.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn feedback(&self) -> &Feedback {
        &self.state.feedback
    }

    pub fn last_performed(&self) -> Option<&str> {
        self.state.last_performed.as_deref()
    }

    pub fn pending_advance(&self) -> Option<&PendingAdvance> {
        self.state.pending.as_ref()
    }

    pub fn phase(&self) -> Phase {
        match (&self.state.target, &self.state.pending) {
            (None, _) => Phase::Idle,
            (Some(_), Some(_)) => Phase::Correct,
            (Some(_), None) => Phase::AwaitingAnswer,
        }
    }

    /// Draws a new target from the pool for `config`, spells it and renders it.
    ///
    /// Clears the feedback line. A pending advance is left alone and still
    /// fires at its due time.
    pub fn pick_new_target(
        &mut self,
        config: &PracticeConfig,
        renderer: &mut dyn NotationRenderer,
    ) -> Target {
        let pool = pool::build_pool(config);
        let pitch = pool.choose(&mut self.rng).copied().unwrap_or(REFERENCE_PITCH);
        let spelling = spelling::decide_spelling(pitch, config, &mut self.rng);

        let (spelling, key) = match naming::notation_key(pitch, spelling) {
            Ok(key) => (spelling, key),
            Err(e) => {
                // Only reachable if the pool let through an accidental with no system enabled.
                log::error!("[SESSION] {}; spelling with sharps instead", e);
                let key = naming::notation_key(pitch, Spelling::Sharp)
                    .unwrap_or(NotationKey {
                        letter: naming::Letter::C,
                        accidental: None,
                        register: naming::register(pitch),
                    });
                (Spelling::Sharp, key)
            }
        };

        let target = Target {
            pitch,
            spelling,
            clef: range::clef_for(pitch),
            key,
        };
        log::info!(
            "[SESSION] New target {} (pitch {}, {:?}, {} clef) from a pool of {}",
            target.display_name(),
            pitch,
            spelling,
            target.clef,
            pool.len()
        );

        self.state.target = Some(target);
        self.state.feedback = Feedback::default();
        renderer.render(&target.key, target.clef);
        target
    }

    /// Judges a performance event against the current target.
    ///
    /// A match scores one point and schedules the advance to the next target
    /// `advance_delay` after `now`. A second match before the advance fires
    /// scores again but does not reschedule it. A mismatch only updates the
    /// feedback line.
    pub fn evaluate(&mut self, event: &PerformanceEvent, now: Instant) -> Evaluation {
        if !event.qualifies(self.release_counts_as_onset) {
            return Evaluation::Ignored;
        }
        let Some(target) = self.state.target else {
            log::debug!("[SESSION] Pitch {} played before any target was set", event.pitch);
            return Evaluation::Ignored;
        };

        self.state.last_performed = Some(performed_name(event.pitch, target.spelling));

        if event.pitch == target.pitch {
            self.state.score += 1;
            self.state.feedback = Feedback::success(format!("Correct! {}", target.display_name()));
            match self.state.pending.as_mut() {
                Some(pending) => {
                    pending.matches += 1;
                    log::warn!(
                        "[SESSION] Duplicate match on {} while advance pending ({} matches)",
                        target.display_name(),
                        pending.matches
                    );
                }
                None => {
                    self.state.pending = Some(PendingAdvance {
                        due: now + self.advance_delay,
                        matches: 1,
                    });
                }
            }
            log::info!("[SESSION] Correct: {} (score {})", target.display_name(), self.state.score);
            return Evaluation::Match { score: self.state.score };
        }

        let direction = if event.pitch > target.pitch {
            Direction::TooHigh
        } else {
            Direction::TooLow
        };
        self.state.feedback = Feedback::failure(format!(
            "{} is {}. Try again!",
            naming::natural_name(event.pitch),
            direction.describe()
        ));
        log::info!(
            "[SESSION] Miss: played {} for target {} ({})",
            event.pitch,
            target.pitch,
            direction.describe()
        );
        Evaluation::Mismatch { direction }
    }

    /// Fires the pending advance if it is due, picking the next target with
    /// whatever `config` is current now.
    pub fn poll(
        &mut self,
        now: Instant,
        config: &PracticeConfig,
        renderer: &mut dyn NotationRenderer,
    ) -> Option<Target> {
        let pending = self.state.pending?;
        if now < pending.due {
            return None;
        }
        self.state.pending = None;
        log::debug!("[SESSION] Advancing after {} match(es)", pending.matches);
        Some(self.pick_new_target(config, renderer))
    }
}

/// Name shown for a played pitch: accidentals borrow the target's spelling,
/// or sharps when the target is a natural.
fn performed_name(pitch: PitchCode, target_spelling: Spelling) -> String {
    let spelling = match target_spelling {
        Spelling::Natural => Spelling::Sharp,
        other => other,
    };
    naming::display_name(pitch, spelling).unwrap_or_else(|_| naming::natural_name(pitch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::RangeProfile;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<(NotationKey, Clef)>,
    }

    impl NotationRenderer for RecordingRenderer {
        fn render(&mut self, key: &NotationKey, clef: Clef) {
            self.calls.push((*key, clef));
        }
    }

    fn session() -> TrainerSession<Pcg32> {
        TrainerSession::new(Pcg32::seed_from_u64(11))
    }

    /// A config whose pool is exactly `{60}`.
    fn middle_c_only() -> PracticeConfig {
        PracticeConfig {
            range_profile: RangeProfile::Beginner,
            include_high_clef: false,
            include_low_clef: false,
            include_sharp_system: false,
            include_flat_system: false,
        }
    }

    #[test]
    fn test_starts_idle() {
        let session = session();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.score(), 0);
        assert!(session.target().is_none());
    }

    #[test]
    fn test_pick_renders_and_awaits_answer() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        let target = session.pick_new_target(&PracticeConfig::default(), &mut renderer);

        assert_eq!(session.phase(), Phase::AwaitingAnswer);
        assert!(build_pool_contains(&PracticeConfig::default(), target.pitch));
        assert_eq!(renderer.calls, vec![(target.key, target.clef)]);
        assert_eq!(session.feedback(), &Feedback::default());
    }

    fn build_pool_contains(config: &PracticeConfig, pitch: PitchCode) -> bool {
        pool::build_pool(config).contains(&pitch)
    }

    #[test]
    fn test_match_scores_once_and_schedules_advance() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        session.pick_new_target(&middle_c_only(), &mut renderer);

        let now = Instant::now();
        let result = session.evaluate(&PerformanceEvent::onset(60, 90), now);

        assert_eq!(result, Evaluation::Match { score: 1 });
        assert_eq!(session.score(), 1);
        assert_eq!(session.phase(), Phase::Correct);
        assert_eq!(session.feedback(), &Feedback::success("Correct! C4"));
        let pending = session.pending_advance().unwrap();
        assert_eq!(pending.due, now + DEFAULT_ADVANCE_DELAY);
        assert_eq!(pending.matches, 1);
    }

    #[test]
    fn test_mismatch_keeps_score_and_target() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        let target = session.pick_new_target(&middle_c_only(), &mut renderer);

        let result = session.evaluate(&PerformanceEvent::onset(64, 90), Instant::now());
        assert_eq!(result, Evaluation::Mismatch { direction: Direction::TooHigh });
        assert_eq!(session.feedback(), &Feedback::failure("E4 is too high. Try again!"));

        let result = session.evaluate(&PerformanceEvent::onset(59, 90), Instant::now());
        assert_eq!(result, Evaluation::Mismatch { direction: Direction::TooLow });

        assert_eq!(session.score(), 0);
        assert_eq!(session.target(), Some(&target));
        assert_eq!(session.phase(), Phase::AwaitingAnswer);
        assert!(session.pending_advance().is_none());
    }

    #[test]
    fn test_non_qualifying_events_are_silent() {
        let mut session = session().with_release_counts_as_onset(false);
        let mut renderer = RecordingRenderer::default();
        session.pick_new_target(&middle_c_only(), &mut renderer);

        assert_eq!(session.evaluate(&PerformanceEvent::onset(60, 0), Instant::now()), Evaluation::Ignored);
        assert_eq!(session.evaluate(&PerformanceEvent::release(60, 0), Instant::now()), Evaluation::Ignored);
        assert_eq!(session.score(), 0);
        assert_eq!(session.feedback(), &Feedback::default());
        assert_eq!(session.last_performed(), None);
    }

    #[test]
    fn test_release_scores_when_enabled() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        session.pick_new_target(&middle_c_only(), &mut renderer);

        let result = session.evaluate(&PerformanceEvent::release(60, 0), Instant::now());
        assert_eq!(result, Evaluation::Match { score: 1 });
    }

    #[test]
    fn test_events_before_first_target_are_ignored() {
        let mut session = session();
        assert_eq!(session.evaluate(&PerformanceEvent::onset(60, 90), Instant::now()), Evaluation::Ignored);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_poll_fires_once_when_due() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        let config = middle_c_only();
        session.pick_new_target(&config, &mut renderer);

        let now = Instant::now();
        session.evaluate(&PerformanceEvent::onset(60, 90), now);

        assert!(session.poll(now, &config, &mut renderer).is_none());
        assert_eq!(renderer.calls.len(), 1);

        let later = now + DEFAULT_ADVANCE_DELAY;
        assert!(session.poll(later, &config, &mut renderer).is_some());
        assert_eq!(renderer.calls.len(), 2);
        assert_eq!(session.phase(), Phase::AwaitingAnswer);
        assert_eq!(session.feedback(), &Feedback::default());

        assert!(session.poll(later + DEFAULT_ADVANCE_DELAY, &config, &mut renderer).is_none());
        assert_eq!(renderer.calls.len(), 2);
    }

    #[test]
    fn test_duplicate_match_in_delay_window_double_scores() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        let config = middle_c_only();
        session.pick_new_target(&config, &mut renderer);

        let now = Instant::now();
        session.evaluate(&PerformanceEvent::onset(60, 90), now);
        let result = session.evaluate(
            &PerformanceEvent::onset(60, 90),
            now + Duration::from_millis(100),
        );

        assert_eq!(result, Evaluation::Match { score: 2 });
        let pending = session.pending_advance().unwrap();
        assert_eq!(pending.matches, 2);
        assert_eq!(pending.due, now + DEFAULT_ADVANCE_DELAY);

        session.poll(now + DEFAULT_ADVANCE_DELAY, &config, &mut renderer);
        assert_eq!(renderer.calls.len(), 2);
        assert!(session.pending_advance().is_none());
    }

    #[test]
    fn test_advance_uses_config_current_at_fire_time() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        session.pick_new_target(&middle_c_only(), &mut renderer);

        let now = Instant::now();
        session.evaluate(&PerformanceEvent::onset(60, 90), now);

        let bass = PracticeConfig {
            range_profile: RangeProfile::Bass,
            include_low_clef: true,
            ..PracticeConfig::default()
        };
        let next = session.poll(now + DEFAULT_ADVANCE_DELAY, &bass, &mut renderer).unwrap();
        assert!(next.pitch < 60);
        assert_eq!(next.clef, Clef::Low);
    }

    #[test]
    fn test_manual_pick_keeps_pending_advance() {
        let mut session = session();
        let mut renderer = RecordingRenderer::default();
        let config = middle_c_only();
        session.pick_new_target(&config, &mut renderer);

        let now = Instant::now();
        session.evaluate(&PerformanceEvent::onset(60, 90), now);
        session.pick_new_target(&config, &mut renderer);

        assert!(session.pending_advance().is_some());
        assert_eq!(session.feedback(), &Feedback::default());
    }

    #[test]
    fn test_custom_advance_delay() {
        let delay = Duration::from_millis(50);
        let mut session = session().with_advance_delay(delay);
        let mut renderer = RecordingRenderer::default();
        session.pick_new_target(&middle_c_only(), &mut renderer);

        let now = Instant::now();
        session.evaluate(&PerformanceEvent::onset(60, 90), now);
        assert_eq!(session.pending_advance().unwrap().due, now + delay);
    }

    #[test]
    fn test_performed_name_borrows_target_spelling() {
        assert_eq!(performed_name(61, Spelling::Flat), "D♭4");
        assert_eq!(performed_name(61, Spelling::Sharp), "C♯4");
        assert_eq!(performed_name(61, Spelling::Natural), "C♯4");
        assert_eq!(performed_name(64, Spelling::Flat), "E4");
    }
}
