//! rtap-dsp - Real-Time Distortion and Filter Effects
//!
//! Mono block processors for a small distortion toolkit:
//! 1. Filters - Linkwitz-Riley highpass/lowpass biquads and a resonant
//!    state-variable bandpass with constant peak gain
//! 2. Waveshapers - a bank of 16 transfer functions with per-algorithm
//!    output scaling, blended against the dry signal
//!
//! # Architecture
//!
//! - `dsp`: coefficient math, filter state machines, and the `Effect`
//!   processors (`Crossover`, `Distortion`, `Level`) plus `EffectChain`
//! - `engine`: offline mono buffer and WAV I/O
//! - `cli`: the `rtap-cli` offline renderer
//!
//! Block processing never allocates, locks, logs, or fails. Parameters are
//! shared with control threads through lock-free atomics.

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;

pub use dsp::{Algorithm, Distortion, DistortionParams, DistortionSettings, Effect};
pub use error::{Result, RtapError};
