// trainer-core/src/lib.rs

//! The core logic for the sight-reading note trainer.
//! This crate picks target pitches from the learner's practice settings,
//! names and spells them, and judges incoming note events. It also owns the
//! input transports (MIDI, microphone). It is completely headless
//! and contains no GUI code.

pub mod acoustic;
pub mod audio;
pub mod error;
pub mod event;
pub mod midi;
pub mod naming;
pub mod pitch;
pub mod pool;
pub mod range;
pub mod render;
pub mod session;
pub mod settings;
pub mod spelling;

pub use error::TrainerError;
pub use event::{EventKind, PerformanceEvent};
pub use naming::{NotationKey, PitchCode, Spelling};
pub use pool::{PracticeConfig, build_pool};
pub use range::{Clef, RangeProfile};
pub use render::{NotationRenderer, TextRenderer};
pub use session::{Evaluation, Feedback, FeedbackKind, Phase, Target, TrainerSession};
pub use settings::{InputSource, Settings};
