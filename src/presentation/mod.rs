//! Presentation layer handling the terminal UI and user input.
//!
//! This module renders the form wizard with ratatui and turns keyboard
//! and mouse events into application calls.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
