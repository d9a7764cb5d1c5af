//! # Acoustic Input Module
//!
//! Runs microphone capture and pitch tracking on a dedicated thread and sends
//! the resulting [`PerformanceEvent`]s to the session's event channel.
//!
//! ## Architecture
//! - CPAL callback thread: fills frames, sends them on a bounded channel
//! - Tracker thread: YIN per frame, [`OnsetTracker`], forwards events
//! - Shutdown: a one-slot channel checked alongside the frame channel

use crossbeam_channel::{Receiver, Sender};
use cpal::traits::StreamTrait;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::audio;
use crate::error::{Result, TrainerError};
use crate::event::PerformanceEvent;
use crate::naming;
use crate::pitch::{self, OnsetTracker};

/// Default RMS noise gate for the microphone.
pub const DEFAULT_AMPLITUDE_THRESHOLD: f32 = 0.01;

/// Handle to the running acoustic input thread.
#[derive(Debug)]
pub struct AcousticInput {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AcousticInput {
    /// Opens the default microphone and starts tracking.
    ///
    /// Fails with [`TrainerError::TransportUnavailable`] when no input device
    /// can be opened.
    pub fn start(events: Sender<PerformanceEvent>, amplitude_threshold: f32) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<std::result::Result<(), String>>(1);

        // The CPAL stream is not Send on every platform, so it is created and
        // dropped on the worker thread.
        let thread_handle = thread::Builder::new()
            .name("acoustic-input".into())
            .spawn(move || {
                log::info!("[AUDIO-THREAD] Starting audio thread...");
                let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Vec<f32>>(8);

                let (stream, sample_rate) = match audio::start_audio_capture(frame_tx) {
                    Ok(tuple) => {
                        let _ = ready_tx.send(Ok(()));
                        tuple
                    }
                    Err(e) => {
                        log::error!("[AUDIO-THREAD] Error starting audio: {}", e);
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                run_tracker(&frame_rx, &shutdown_rx, &events, sample_rate, amplitude_threshold);

                log::info!("[AUDIO-THREAD] Stopping stream and exiting...");
                if let Err(e) = stream.pause() {
                    log::warn!("[AUDIO-THREAD] Error pausing stream: {}", e);
                }
                drop(stream);
            })?;

        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                shutdown_tx,
                thread_handle: Some(thread_handle),
            }),
            Ok(Err(message)) => {
                let _ = thread_handle.join();
                Err(TrainerError::TransportUnavailable(message))
            }
            Err(_) => {
                stop_worker(&shutdown_tx, thread_handle);
                Err(TrainerError::TransportUnavailable(
                    "Microphone did not start in time".to_string(),
                ))
            }
        }
    }

    /// Signals the thread to stop and waits for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            stop_worker(&self.shutdown_tx, handle);
        }
    }
}

/// Signals the worker to stop and waits for it to exit.
fn stop_worker(shutdown_tx: &Sender<()>, handle: JoinHandle<()>) {
    let _ = shutdown_tx.try_send(());
    if handle.join().is_err() {
        log::error!("[AUDIO-THREAD] Acoustic input thread panicked");
    }
}

impl Drop for AcousticInput {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_tracker(
    frame_rx: &Receiver<Vec<f32>>,
    shutdown_rx: &Receiver<()>,
    events: &Sender<PerformanceEvent>,
    sample_rate: u32,
    amplitude_threshold: f32,
) {
    let mut tracker = OnsetTracker::new();

    loop {
        crossbeam_channel::select! {
            recv(frame_rx) -> msg => match msg {
                Ok(frame) => {
                    let detected = pitch::detect_pitch_yin(&frame, sample_rate, amplitude_threshold)
                        .and_then(naming::nearest_pitch_code);
                    let intensity = pitch::intensity_from_rms(pitch::rms(&frame));
                    if let Some(event) = tracker.update(detected, intensity) {
                        log::debug!("[AUDIO-THREAD] {:?}", event);
                        if events.send(event).is_err() {
                            log::info!("[AUDIO-THREAD] Event receiver dropped");
                            return;
                        }
                    }
                }
                Err(_) => {
                    log::warn!("[AUDIO-THREAD] Audio channel closed");
                    return;
                }
            },
            recv(shutdown_rx) -> _ => {
                log::info!("[AUDIO-THREAD] Received shutdown signal");
                return;
            },
        }
    }
}
