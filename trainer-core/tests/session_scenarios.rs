use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::time::{Duration, Instant};

use trainer_core::midi::parse_midi_message;
use trainer_core::pitch::{OnsetTracker, STABLE_FRAMES};
use trainer_core::naming::{self, NotationKey, PitchCode};
use trainer_core::session::{DEFAULT_ADVANCE_DELAY, Direction};
use trainer_core::{
    Clef, Evaluation, FeedbackKind, NotationRenderer, PerformanceEvent, Phase, PracticeConfig,
    RangeProfile, Spelling, TextRenderer, TrainerSession, build_pool,
};

#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<(NotationKey, Clef)>,
}

impl NotationRenderer for RecordingRenderer {
    fn render(&mut self, key: &NotationKey, clef: Clef) {
        self.calls.push((*key, clef));
    }
}

fn treble_naturals() -> PracticeConfig {
    PracticeConfig {
        range_profile: RangeProfile::Treble,
        include_high_clef: true,
        include_low_clef: false,
        include_sharp_system: false,
        include_flat_system: false,
    }
}

#[test]
fn test_treble_only_pool_is_the_fourteen_naturals() {
    let pool = build_pool(&treble_naturals());
    assert_eq!(pool, vec![60, 62, 64, 65, 67, 69, 71, 72, 74, 76, 77, 79, 81, 83]);
    assert!(pool.iter().all(|&code| naming::is_natural(code)));
}

#[test]
fn test_targets_always_come_from_the_pool() {
    let config = PracticeConfig {
        range_profile: RangeProfile::Wide,
        include_sharp_system: true,
        include_flat_system: true,
        ..PracticeConfig::default()
    };
    let pool = build_pool(&config);
    let mut session = TrainerSession::new(Pcg32::seed_from_u64(3));
    let mut renderer = RecordingRenderer::default();

    for _ in 0..200 {
        let target = session.pick_new_target(&config, &mut renderer);
        assert!(pool.contains(&target.pitch));
        assert_eq!(target.clef, trainer_core::range::clef_for(target.pitch));
        if naming::is_natural(target.pitch) {
            assert_eq!(target.spelling, Spelling::Natural);
        } else {
            assert_ne!(target.spelling, Spelling::Natural);
        }
    }
    assert_eq!(renderer.calls.len(), 200);
}

#[test]
fn test_sharp_only_spells_c_sharp() {
    // Default treble range with sharps: draw until 61 comes up.
    let config = PracticeConfig {
        include_sharp_system: true,
        ..PracticeConfig::default()
    };
    let mut session = TrainerSession::new(Pcg32::seed_from_u64(5));
    let mut renderer = TextRenderer::new();

    let target = (0..500)
        .map(|_| session.pick_new_target(&config, &mut renderer))
        .find(|t| t.pitch == 61)
        .expect("61 should be drawn within 500 picks");

    assert_eq!(target.display_name(), "C♯4");
    assert_eq!(renderer.text(), Some("Note: C♯4 (text-only mode)"));
}

#[test]
fn test_played_too_high_against_middle_c() {
    let degenerate = PracticeConfig {
        include_high_clef: false,
        include_low_clef: false,
        ..PracticeConfig::default()
    };
    let mut session = TrainerSession::new(Pcg32::seed_from_u64(9));
    let mut renderer = RecordingRenderer::default();
    let target = session.pick_new_target(&degenerate, &mut renderer);
    assert_eq!(target.pitch, 60);

    let result = session.evaluate(&PerformanceEvent::onset(64, 100), Instant::now());
    assert_eq!(result, Evaluation::Mismatch { direction: Direction::TooHigh });
    assert_eq!(session.feedback().kind, FeedbackKind::Failure);
    assert!(session.feedback().text.contains("too high"));
    assert_eq!(session.last_performed(), Some("E4"));
}

#[test]
fn test_full_round_from_midi_bytes() {
    let config = treble_naturals();
    let mut session = TrainerSession::new(Pcg32::seed_from_u64(21))
        .with_advance_delay(Duration::from_millis(500));
    let mut renderer = RecordingRenderer::default();
    let start = Instant::now();

    let first = session.pick_new_target(&config, &mut renderer);
    let wrong = if first.pitch == 83 { 81 } else { first.pitch + 1 };

    // A wrong key, then the right one, then its note-off inside the delay window.
    let miss = parse_midi_message(&[0x90, wrong, 100]).unwrap();
    assert!(matches!(session.evaluate(&miss, start), Evaluation::Mismatch { .. }));
    assert_eq!(session.score(), 0);

    let hit = parse_midi_message(&[0x90, first.pitch, 100]).unwrap();
    assert_eq!(session.evaluate(&hit, start), Evaluation::Match { score: 1 });
    assert_eq!(session.phase(), Phase::Correct);

    let release = parse_midi_message(&[0x80, first.pitch, 0]).unwrap();
    session.evaluate(&release, start + Duration::from_millis(120));
    assert_eq!(session.score(), 2);
    assert_eq!(session.pending_advance().map(|p| p.matches), Some(2));

    assert!(session.poll(start + Duration::from_millis(499), &config, &mut renderer).is_none());
    let next = session.poll(start + DEFAULT_ADVANCE_DELAY, &config, &mut renderer).unwrap();
    assert_eq!(session.target(), Some(&next));
    assert_eq!(session.phase(), Phase::AwaitingAnswer);
    assert_eq!(renderer.calls.len(), 2);
}

/// Runs microphone frames through a tracker into the session, one frame per 20 ms.
fn play_frames<R: rand::Rng>(
    session: &mut TrainerSession<R>,
    tracker: &mut OnsetTracker,
    frames: &[Option<PitchCode>],
    start: Instant,
) -> Vec<Evaluation> {
    frames
        .iter()
        .enumerate()
        .filter_map(|(i, &frame)| {
            let at = start + Duration::from_millis(20 * i as u64);
            tracker.update(frame, 90).map(|event| session.evaluate(&event, at))
        })
        .collect()
}

#[test]
fn test_sustained_microphone_note_scores_once_across_the_advance() {
    let config = treble_naturals();
    let mut session = TrainerSession::new(Pcg32::seed_from_u64(21));
    let mut renderer = RecordingRenderer::default();
    let mut tracker = OnsetTracker::new();
    let start = Instant::now();

    let first = session.pick_new_target(&config, &mut renderer);
    let results = play_frames(&mut session, &mut tracker, &[Some(first.pitch); STABLE_FRAMES], start);
    assert_eq!(results, vec![Evaluation::Match { score: 1 }]);

    let next = session.poll(start + DEFAULT_ADVANCE_DELAY, &config, &mut renderer).unwrap();

    // The learner keeps the note ringing, then lets it die away.
    let mut tail = vec![Some(first.pitch); 10];
    tail.extend([None; 6]);
    let later = start + DEFAULT_ADVANCE_DELAY;
    assert!(play_frames(&mut session, &mut tracker, &tail, later).is_empty());

    assert_eq!(session.score(), 1);
    assert_eq!(session.target(), Some(&next));
    assert_eq!(session.feedback().kind, FeedbackKind::Neutral);
}

#[test]
fn test_misread_frame_does_not_score_a_held_note_twice() {
    let config = treble_naturals();
    let mut session = TrainerSession::new(Pcg32::seed_from_u64(21));
    let mut renderer = RecordingRenderer::default();
    let mut tracker = OnsetTracker::new();

    let target = session.pick_new_target(&config, &mut renderer).pitch;
    let neighbour = if target == 83 { 81 } else { target + 1 };
    let frames = [
        Some(target),
        Some(target),
        Some(target),
        Some(neighbour),
        Some(target),
        Some(target),
        Some(target),
    ];
    play_frames(&mut session, &mut tracker, &frames, Instant::now());

    assert_eq!(session.score(), 1);
    assert_eq!(session.pending_advance().map(|p| p.matches), Some(1));
}
