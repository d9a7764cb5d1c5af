//! # MIDI Input Module
//!
//! Connects to a MIDI input port with `midir` and forwards note events to the
//! session as [`PerformanceEvent`]s over a crossbeam channel.
//!
//! ## Features
//! - Port listing with change detection (device plugged in or removed)
//! - Connect by index or by port name
//! - Note-on / note-off decoding; everything else is dropped

use crossbeam_channel::Sender;
use midir::{MidiInput, MidiInputConnection};

use crate::error::{Result, TrainerError};
use crate::event::PerformanceEvent;

const CLIENT_NAME: &str = "note-trainer";

/// An available MIDI input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiPortInfo {
    pub index: usize,
    pub name: String,
}

/// MIDI input manager.
///
/// When the platform has no MIDI backend the manager still constructs, lists
/// no ports, and reports [`TrainerError::TransportUnavailable`] on connect.
pub struct MidiInputManager {
    midi_in: Option<MidiInput>,
    connection: Option<MidiInputConnection<()>>,
    connected_port_name: Option<String>,
    available_ports: Vec<MidiPortInfo>,
}

impl MidiInputManager {
    pub fn new() -> Self {
        let midi_in = match MidiInput::new(CLIENT_NAME) {
            Ok(midi_in) => Some(midi_in),
            Err(e) => {
                log::warn!("[MIDI] MIDI backend unavailable: {}", e);
                None
            }
        };
        Self {
            midi_in,
            connection: None,
            connected_port_name: None,
            available_ports: Vec::new(),
        }
    }

    /// Whether a MIDI backend could be opened at all.
    pub fn is_available(&self) -> bool {
        self.midi_in.is_some()
    }

    /// Re-reads the port list. Returns `true` when it changed.
    pub fn refresh_ports(&mut self) -> bool {
        let mut ports = Vec::new();
        if let Some(ref midi_in) = self.midi_in {
            for (index, port) in midi_in.ports().iter().enumerate() {
                if let Ok(name) = midi_in.port_name(port) {
                    ports.push(MidiPortInfo { index, name });
                }
            }
        }

        if ports == self.available_ports {
            return false;
        }
        log::info!("[MIDI] Input ports changed: {:?}", ports.iter().map(|p| &p.name).collect::<Vec<_>>());
        self.available_ports = ports;
        true
    }

    pub fn list_ports(&self) -> &[MidiPortInfo] {
        &self.available_ports
    }

    pub fn connected_port_name(&self) -> Option<&str> {
        self.connected_port_name.as_deref()
    }

    /// Connects to the port at `port_index`, replacing any existing connection.
    ///
    /// Note events are decoded on the MIDI callback thread and sent on `sender`.
    pub fn connect(&mut self, port_index: usize, sender: Sender<PerformanceEvent>) -> Result<String> {
        self.disconnect();

        // `connect` consumes the MidiInput, so open a fresh client for it.
        let midi_in = MidiInput::new(CLIENT_NAME)
            .map_err(|e| TrainerError::TransportUnavailable(e.to_string()))?;
        let ports = midi_in.ports();
        let port = ports.get(port_index).ok_or_else(|| {
            TrainerError::TransportUnavailable(format!("Invalid port index: {}", port_index))
        })?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "MIDI input".to_string());

        let connection = midi_in
            .connect(
                port,
                "note-trainer-input",
                move |_timestamp, message, _| {
                    if let Some(event) = parse_midi_message(message) {
                        let _ = sender.send(event);
                    }
                },
                (),
            )
            .map_err(|e| TrainerError::TransportUnavailable(e.to_string()))?;

        log::info!("[MIDI] Connected to {}", port_name);
        self.connection = Some(connection);
        self.connected_port_name = Some(port_name.clone());
        Ok(port_name)
    }

    /// Connects to the first port whose name matches `name`.
    pub fn connect_by_name(&mut self, name: &str, sender: Sender<PerformanceEvent>) -> Result<String> {
        let index = self
            .available_ports
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.index)
            .ok_or_else(|| TrainerError::TransportUnavailable(format!("No MIDI input named {}", name)))?;
        self.connect(index, sender)
    }

    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            log::info!("[MIDI] Disconnected from {}", self.connected_port_name.as_deref().unwrap_or("input"));
        }
        self.connected_port_name = None;
    }
}

impl Default for MidiInputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MidiInputManager {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Decodes a raw MIDI message into a performance event.
///
/// `0x9n` is an onset carrying its velocity (zero velocity is kept and left
/// for the session to ignore), `0x8n` is a release. Other messages are dropped.
pub fn parse_midi_message(data: &[u8]) -> Option<PerformanceEvent> {
    if data.len() < 3 {
        return None;
    }

    let note = data[1] & 0x7F;
    let velocity = data[2] & 0x7F;

    match data[0] & 0xF0 {
        0x90 => Some(PerformanceEvent::onset(note, velocity)),
        0x80 => Some(PerformanceEvent::release(note, velocity)),
        _ => None,
    }
}
