//! # Piano Keyboard Widget
//!
//! An 88-key keyboard (A0 to C8). Clicking a key plays that pitch into the
//! session, so the trainer works without any input device. The last played
//! key is lit green for a hit and red for a miss.

use iced::widget::canvas::{self, Event, Fill, Geometry, Path, Stroke, event};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme, mouse};

use trainer_core::PitchCode;
use trainer_core::naming::{self, INSTRUMENT_HIGHEST, INSTRUMENT_LOWEST};

const WHITE_KEY_COUNT: usize = 52;
const KEYBOARD_HEIGHT: f32 = 120.0;
const BLACK_KEY_RATIO: f32 = 0.6;

const HIT: Color = Color::from_rgb(0.20, 0.86, 0.60);
const MISS: Color = Color::from_rgb(1.0, 0.42, 0.42);

/// Last key played and whether it matched the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedKey {
    pub pitch: PitchCode,
    pub correct: bool,
}

#[derive(Debug, Clone)]
pub struct PianoKeyboard {
    played: Option<PlayedKey>,
}

fn keys() -> impl Iterator<Item = PitchCode> {
    INSTRUMENT_LOWEST..=INSTRUMENT_HIGHEST
}

/// Left edge, in white-key widths, of every key.
fn key_offset(pitch: PitchCode) -> f32 {
    let whites_before = keys()
        .take_while(|&p| p < pitch)
        .filter(|&p| naming::is_natural(p))
        .count() as f32;
    if naming::is_natural(pitch) {
        whites_before
    } else {
        whites_before - BLACK_KEY_RATIO / 2.0
    }
}

impl PianoKeyboard {
    pub fn new(played: Option<PlayedKey>) -> Self {
        Self { played }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(KEYBOARD_HEIGHT)),
        )
        .into()
    }

    fn key_color(&self, pitch: PitchCode, idle: Color) -> Color {
        match self.played {
            Some(PlayedKey { pitch: p, correct: true }) if p == pitch => HIT,
            Some(PlayedKey { pitch: p, correct: false }) if p == pitch => MISS,
            _ => idle,
        }
    }
}

/// Finds the key under `pos`. Black keys sit on top, so they are checked first.
fn pitch_at(bounds: Size, pos: Point) -> Option<PitchCode> {
    let white_key_width = bounds.width / WHITE_KEY_COUNT as f32;
    let black_key_height = bounds.height * BLACK_KEY_RATIO;

    if pos.y <= black_key_height {
        let black = keys().filter(|&p| !naming::is_natural(p)).find(|&p| {
            let x = key_offset(p) * white_key_width;
            pos.x >= x && pos.x <= x + white_key_width * BLACK_KEY_RATIO
        });
        if black.is_some() {
            return black;
        }
    }

    let white_index = (pos.x / white_key_width).floor() as usize;
    keys().filter(|&p| naming::is_natural(p)).nth(white_index)
}

impl canvas::Program<crate::Message> for PianoKeyboard {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<crate::Message>) {
        if let Some(position) = cursor.position_in(bounds) {
            if let Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
                if let Some(pitch) = pitch_at(bounds.size(), position) {
                    return (event::Status::Captured, Some(crate::Message::KeyPressed(pitch)));
                }
            }
        }
        (event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let white_key_width = bounds.width / WHITE_KEY_COUNT as f32;
        let black_key_width = white_key_width * BLACK_KEY_RATIO;
        let black_key_height = bounds.height * BLACK_KEY_RATIO;

        for pitch in keys().filter(|&p| naming::is_natural(p)) {
            let x = key_offset(pitch) * white_key_width;
            let size = Size::new(white_key_width, bounds.height);
            frame.fill_rectangle(Point::new(x, 0.0), size, Fill::from(self.key_color(pitch, Color::WHITE)));
            frame.stroke(
                &Path::rectangle(Point::new(x, 0.0), size),
                Stroke::default().with_color(Color::BLACK),
            );
        }

        for pitch in keys().filter(|&p| !naming::is_natural(p)) {
            let x = key_offset(pitch) * white_key_width;
            frame.fill_rectangle(
                Point::new(x, 0.0),
                Size::new(black_key_width, black_key_height),
                Fill::from(self.key_color(pitch, Color::BLACK)),
            );
        }

        vec![frame.into_geometry()]
    }
}
