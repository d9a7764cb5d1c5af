//! # Main Display Module
//!
//! This module contains the main display components and layout logic
//! for the note trainer.

use iced::widget::{Space, button, checkbox, column, container, horizontal_space, pick_list, row, text};
use iced::{Alignment, Color, Element, Length};

use trainer_core::naming::NotationKey;
use trainer_core::{Clef, FeedbackKind, InputSource, RangeProfile};

use super::piano_keyboard::PianoKeyboard;
use super::staff::Staff;
use crate::{AppDisplayData, Message};

const MUTED: Color = Color::from_rgb(0.60, 0.64, 0.70);
const GOOD: Color = Color::from_rgb(0.18, 0.80, 0.44);
const BAD: Color = Color::from_rgb(1.0, 0.42, 0.42);

/// Creates the complete main application view
pub fn create_main_view(
    data: &AppDisplayData,
    notation: Option<(NotationKey, Clef)>,
) -> Element<'static, Message> {
    let header = column![
        text("Note Trainer").size(28),
        text("Read the note on the staff, then play it on your instrument.")
            .size(14)
            .color(MUTED),
    ]
    .spacing(6)
    .align_x(Alignment::Center)
    .width(Length::Fill);

    let content = column![
        header,
        create_practice_panel(data),
        create_input_panel(data),
        row![
            create_target_panel(data, notation),
            Space::with_width(16),
            create_status_panel(data),
        ]
        .align_y(Alignment::Start),
        feedback_line(&data.feedback.text, data.feedback.kind, 20.0),
        PianoKeyboard::new(data.played).view(),
    ]
    .spacing(16)
    .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Range, clef and accidental toggles.
fn create_practice_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let practice = data.practice;

    let range = column![
        text("Range").size(13).color(MUTED),
        pick_list(RangeProfile::ALL, Some(practice.range_profile), Message::RangeSelected),
    ]
    .spacing(4);

    let clefs = column![
        text("Clefs").size(13).color(MUTED),
        checkbox("Treble", practice.include_high_clef).on_toggle(Message::ToggleTrebleClef),
        checkbox("Bass", practice.include_low_clef).on_toggle(Message::ToggleBassClef),
    ]
    .spacing(4);

    let accidentals = column![
        text("Accidentals").size(13).color(MUTED),
        checkbox("Sharps (♯)", practice.include_sharp_system).on_toggle(Message::ToggleSharps),
        checkbox("Flats (♭)", practice.include_flat_system).on_toggle(Message::ToggleFlats),
    ]
    .spacing(4);

    let display = column![
        text("Display").size(13).color(MUTED),
        checkbox("Draw staff", data.staff_rendering).on_toggle(Message::ToggleStaff),
    ]
    .spacing(4);

    row![range, clefs, accidentals, display]
        .spacing(24)
        .align_y(Alignment::Start)
        .into()
}

/// Input source, MIDI port, Connect and New note.
fn create_input_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let source = pick_list(InputSource::ALL, Some(data.input_source), Message::InputSourceSelected);

    let port_placeholder = if data.midi_ports.is_empty() {
        "No MIDI inputs found"
    } else {
        "Choose a MIDI input"
    };
    let ports = pick_list(
        data.midi_ports.clone(),
        data.selected_port.clone(),
        Message::MidiPortSelected,
    )
    .placeholder(port_placeholder);

    row![
        source,
        ports,
        button(text("Connect")).padding([8, 14]).on_press(Message::Connect),
        horizontal_space(),
        button(text("New note")).padding([8, 14]).on_press(Message::NewNote),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

/// Staff drawing, or the text-only line when the staff is switched off.
fn create_target_panel(
    data: &AppDisplayData,
    notation: Option<(NotationKey, Clef)>,
) -> Element<'static, Message> {
    let body: Element<'static, Message> = match notation {
        Some((key, clef)) if data.staff_rendering => Staff::new(key, clef).view(),
        _ => {
            let line = data
                .notation_text
                .clone()
                .unwrap_or_else(|| "No target yet".to_string());
            container(text(line).size(22))
                .padding(12)
                .center_y(Length::Fixed(200.0))
                .into()
        }
    };

    container(body).width(Length::FillPortion(3)).into()
}

/// Target name, clef, last played note, score and transport status.
fn create_status_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let (target_name, clef_label) = match &data.target {
        Some(target) => (target.display_name(), format!("{} clef", target.clef)),
        None => ("--".to_string(), String::new()),
    };
    let played = data.last_performed.clone().unwrap_or_else(|| "--".to_string());

    column![
        pill("Target", format!("{}  {}", target_name, clef_label)),
        pill("Played", played),
        pill("Score", data.score.to_string()),
        feedback_line(&data.status.text, data.status.kind, 14.0),
    ]
    .spacing(10)
    .width(Length::FillPortion(2))
    .into()
}

fn pill(label: &'static str, value: String) -> Element<'static, Message> {
    container(
        row![text(label).size(13).color(MUTED), horizontal_space(), text(value).size(16)]
            .align_y(Alignment::Center),
    )
    .padding([8, 12])
    .style(container::rounded_box)
    .into()
}

fn feedback_line(message: &str, kind: FeedbackKind, size: f32) -> Element<'static, Message> {
    let line = text(message.to_string()).size(size);
    match kind {
        FeedbackKind::Neutral => line.into(),
        FeedbackKind::Success => line.color(GOOD).into(),
        FeedbackKind::Failure => line.color(BAD).into(),
    }
}
