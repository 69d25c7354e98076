//! DSP Effects Library
//!
//! Filter building blocks, the waveshaper bank, and the block processors
//! built from them. All processors implement the `Effect` trait for uniform
//! processing.

pub mod bandpass;
pub mod biquad;
mod chain;
pub mod coefficients;
mod crossover;
mod distortion;
mod effect;
mod level;
pub mod mix;
mod params;
pub mod waveshaper;

pub use bandpass::{gain_compensation, ResonantBandpass};
pub use biquad::{Biquad, DelayLine, StateVariableFilter};
pub use chain::{EffectChain, EffectPosition};
pub use coefficients::{BiquadCoefficients, FilterKind, SvfCoefficients};
pub use crossover::{Crossover, DEFAULT_HIGHPASS_HZ, DEFAULT_LOWPASS_HZ};
pub use distortion::Distortion;
pub use effect::{Effect, EffectParams, DEFAULT_SAMPLE_RATE};
pub use level::{Level, DEFAULT_LEVEL};
pub use params::{DistortionParams, DistortionSettings};
pub use waveshaper::{shape, sgn, Algorithm, NUM_ALGORITHMS};

/// Range constants of the distortion parameters
pub mod ranges {
    pub use super::params::{
        DEFAULT_ALGORITHM, DEFAULT_FREQUENCY_HZ, DEFAULT_GAIN_DB, DEFAULT_MIX, DEFAULT_QUALITY,
        DEFAULT_SATURATION, MAX_FREQUENCY_HZ, MAX_GAIN_DB, MAX_MIX, MAX_QUALITY, MAX_SATURATION,
        MIN_FREQUENCY_HZ, MIN_GAIN_DB, MIN_MIX, MIN_QUALITY, MIN_SATURATION,
    };
}
