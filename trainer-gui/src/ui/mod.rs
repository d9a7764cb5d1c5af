//! # UI Module
//!
//! This module contains all UI components for the note trainer.

pub mod main_display;
pub mod piano_keyboard;
pub mod staff;
