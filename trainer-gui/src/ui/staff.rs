//! # Staff Widget
//!
//! Draws the current target on a five-line staff: clef letter, staff lines,
//! ledger lines, accidental and note head. [`TargetNotation`] is the
//! session's renderer; it keeps what the canvas needs plus the text-only
//! fallback line.

use iced::alignment;
use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Pixels, Point, Rectangle, Renderer, Theme, mouse};

use trainer_core::naming::NotationKey;
use trainer_core::{Clef, NotationRenderer, TextRenderer};

/// Vertical distance between two staff lines.
const LINE_GAP: f32 = 12.0;
const STAFF_WIDTH: f32 = 320.0;
const STAFF_HEIGHT: f32 = 200.0;

const INK: Color = Color::from_rgb(0.1, 0.1, 0.12);
const PAPER: Color = Color::from_rgb(0.89, 0.89, 0.89);

/// Renderer handed to the session. Remembers the last target for drawing.
#[derive(Debug, Clone, Default)]
pub struct TargetNotation {
    current: Option<(NotationKey, Clef)>,
    fallback: TextRenderer,
}

impl TargetNotation {
    pub fn current(&self) -> Option<(NotationKey, Clef)> {
        self.current
    }

    pub fn fallback_text(&self) -> Option<&str> {
        self.fallback.text()
    }
}

impl NotationRenderer for TargetNotation {
    fn render(&mut self, key: &NotationKey, clef: Clef) {
        self.current = Some((*key, clef));
        self.fallback.render(key, clef);
    }
}

/// Diatonic step of the bottom staff line (E4 treble, G2 bass).
fn bottom_line_step(clef: Clef) -> i32 {
    match clef {
        Clef::High => 4 * 7 + 2,
        Clef::Low => 2 * 7 + 4,
    }
}

/// Staff steps that need a ledger line for a note at `step`.
fn ledger_steps(step: i32, clef: Clef) -> Vec<i32> {
    let bottom = bottom_line_step(clef);
    let top = bottom + 8;
    if step < bottom {
        (step..bottom).filter(|s| (bottom - s) % 2 == 0).collect()
    } else if step > top {
        (top + 1..=step).filter(|s| (s - top) % 2 == 0).collect()
    } else {
        Vec::new()
    }
}

pub struct Staff {
    key: NotationKey,
    clef: Clef,
}

impl Staff {
    pub fn new(key: NotationKey, clef: Clef) -> Self {
        Self { key, clef }
    }

    pub fn view<'a, Message: 'a>(self) -> Element<'a, Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(STAFF_HEIGHT)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for Staff {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        frame.fill(&Path::rectangle(Point::ORIGIN, bounds.size()), PAPER);

        let bottom = bottom_line_step(self.clef);
        let middle_y = bounds.height / 2.0;
        // Middle line is four steps above the bottom line.
        let y_of = |step: i32| middle_y - (step - (bottom + 4)) as f32 * LINE_GAP / 2.0;

        let left = ((bounds.width - STAFF_WIDTH) / 2.0).max(10.0);
        let right = left + STAFF_WIDTH.min(bounds.width - 20.0);
        let line = Stroke::default().with_width(1.5).with_color(INK);

        for i in 0..5 {
            let y = y_of(bottom + i * 2);
            frame.stroke(&Path::line(Point::new(left, y), Point::new(right, y)), line.clone());
        }

        // Clef: its letter sits on the line it names (G4 treble, F3 bass).
        let (clef_letter, clef_step) = match self.clef {
            Clef::High => ("G", 4 * 7 + 4),
            Clef::Low => ("F", 3 * 7 + 3),
        };
        frame.fill_text(canvas::Text {
            content: clef_letter.to_string(),
            position: Point::new(left + 18.0, y_of(clef_step)),
            color: INK,
            size: Pixels(LINE_GAP * 3.0),
            horizontal_alignment: alignment::Horizontal::Center,
            vertical_alignment: alignment::Vertical::Center,
            ..canvas::Text::default()
        });

        let step = self.key.staff_step();
        let note_x = (left + right) / 2.0;
        let note_y = y_of(step);

        for ledger in ledger_steps(step, self.clef) {
            let y = y_of(ledger);
            frame.stroke(
                &Path::line(Point::new(note_x - LINE_GAP, y), Point::new(note_x + LINE_GAP, y)),
                line.clone(),
            );
        }

        if let Some(accidental) = self.key.accidental {
            frame.fill_text(canvas::Text {
                content: accidental.symbol().to_string(),
                position: Point::new(note_x - LINE_GAP * 1.8, note_y),
                color: INK,
                size: Pixels(LINE_GAP * 2.2),
                horizontal_alignment: alignment::Horizontal::Center,
                vertical_alignment: alignment::Vertical::Center,
                ..canvas::Text::default()
            });
        }

        let radius = LINE_GAP / 2.0;
        frame.fill(&Path::circle(Point::new(note_x, note_y), radius), INK);

        // Stems point down from the middle line up.
        let stem = if step >= bottom + 4 {
            Path::line(
                Point::new(note_x - radius, note_y),
                Point::new(note_x - radius, note_y + LINE_GAP * 3.5),
            )
        } else {
            Path::line(
                Point::new(note_x + radius, note_y),
                Point::new(note_x + radius, note_y - LINE_GAP * 3.5),
            )
        };
        frame.stroke(&stem, line);

        vec![frame.into_geometry()]
    }
}
