//! Audio Engine Module
//!
//! Offline plumbing around the effects:
//! - Mono audio buffer
//! - WAV file I/O

pub mod buffer;
pub mod io;

pub use buffer::{linear_to_db, AudioBuffer, LevelStats};
pub use io::{export_audio, generate_test_tone, import_audio, ExportFormat};
