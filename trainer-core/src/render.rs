//! # Notation Rendering Seam
//!
//! The session hands each new target to a [`NotationRenderer`]. The desktop
//! app draws a staff; [`TextRenderer`] is the fallback when no staff drawing
//! is available and still conveys the target's name.

use crate::naming::NotationKey;
use crate::range::Clef;

/// Receives the target to draw. Fire-and-forget: nothing flows back.
pub trait NotationRenderer {
    fn render(&mut self, key: &NotationKey, clef: Clef);
}

/// Text-only fallback renderer.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    text: Option<String>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered line, e.g. `Note: D♭4 (text-only mode)`.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl NotationRenderer for TextRenderer {
    fn render(&mut self, key: &NotationKey, clef: Clef) {
        log::debug!("[RENDER] Text fallback for {} on {} staff", key, clef);
        self.text = Some(format!("Note: {} (text-only mode)", key));
    }
}
