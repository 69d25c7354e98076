//! Distortion parameters
//!
//! [`DistortionParams`] is the lock-free parameter block shared between the
//! control thread and the audio thread. [`DistortionSettings`] is a plain
//! copy of it: the per-block snapshot the processor works from, and the
//! on-disk preset format.

use atomic_float::AtomicF32;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use super::waveshaper::{Algorithm, NUM_ALGORITHMS};

// ============================================================================
// Ranges and defaults
// ============================================================================

pub const MIN_MIX: f32 = 0.0;
pub const MAX_MIX: f32 = 1.0;

pub const MIN_SATURATION: f32 = 1.0;
pub const MAX_SATURATION: f32 = 10.0;

pub const MIN_FREQUENCY_HZ: f32 = 50.0;
pub const MAX_FREQUENCY_HZ: f32 = 20000.0;

/// Quality must stay positive; the lower bound keeps `1/q` finite
pub const MIN_QUALITY: f32 = 0.01;
pub const MAX_QUALITY: f32 = 16.0;

/// Bound on the compensation gain so `10^(dB/40)` never overflows
pub const MIN_GAIN_DB: f32 = -120.0;
pub const MAX_GAIN_DB: f32 = 120.0;

pub const DEFAULT_MIX: f32 = 0.0;
pub const DEFAULT_ALGORITHM: i32 = 0;
pub const DEFAULT_SATURATION: f32 = 1.0;
pub const DEFAULT_FREQUENCY_HZ: f32 = 1000.0;
pub const DEFAULT_QUALITY: f32 = 1.0;
pub const DEFAULT_GAIN_DB: f32 = 20.0;

/// Clamp, replacing NaN with a fallback
#[inline]
fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

// ============================================================================
// Settings snapshot
// ============================================================================

/// Plain copy of every distortion parameter
///
/// Deserializing fills missing fields with defaults, so a preset file may
/// name only the values it changes. Unknown keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistortionSettings {
    /// Dry/wet balance, 0 = dry
    pub mix: f32,
    /// Waveshaper index; values outside 0..16 select dry pass-through
    pub algorithm: i32,
    /// Drive for the saturation-aware shapes
    pub saturation: f32,
    /// Bandpass center frequency in Hz
    pub frequency: f32,
    /// Bandpass quality
    pub quality: f32,
    /// Pre-shaper gain in dB
    #[serde(alias = "gain")]
    pub gain_db: f32,
    /// Route the input through the resonant bandpass before shaping
    pub bandpass: bool,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self {
            mix: DEFAULT_MIX,
            algorithm: DEFAULT_ALGORITHM,
            saturation: DEFAULT_SATURATION,
            frequency: DEFAULT_FREQUENCY_HZ,
            quality: DEFAULT_QUALITY,
            gain_db: DEFAULT_GAIN_DB,
            bandpass: true,
        }
    }
}

impl DistortionSettings {
    /// Copy with every continuous value inside its valid range
    ///
    /// NaN fields fall back to their defaults. The algorithm index is kept
    /// as is.
    pub fn clamped(&self) -> Self {
        Self {
            mix: clamp_or(self.mix, MIN_MIX, MAX_MIX, DEFAULT_MIX),
            algorithm: self.algorithm,
            saturation: clamp_or(
                self.saturation,
                MIN_SATURATION,
                MAX_SATURATION,
                DEFAULT_SATURATION,
            ),
            frequency: clamp_or(
                self.frequency,
                MIN_FREQUENCY_HZ,
                MAX_FREQUENCY_HZ,
                DEFAULT_FREQUENCY_HZ,
            ),
            quality: clamp_or(self.quality, MIN_QUALITY, MAX_QUALITY, DEFAULT_QUALITY),
            gain_db: clamp_or(self.gain_db, MIN_GAIN_DB, MAX_GAIN_DB, DEFAULT_GAIN_DB),
            bandpass: self.bandpass,
        }
    }

    /// The selected waveshaper, if the index is valid
    pub fn algorithm(&self) -> Option<Algorithm> {
        Algorithm::from_index(self.algorithm)
    }
}

// ============================================================================
// Shared parameter block
// ============================================================================

/// Lock-free parameters shared between threads
///
/// Every field is an independent atomic accessed with `Relaxed` ordering:
/// writes are last-write-wins and a write may land in the middle of a block.
/// The processor reads them once per block through [`snapshot`](Self::snapshot).
///
/// Setters never fail. Out-of-range values are clamped and NaN is ignored.
#[derive(Debug)]
pub struct DistortionParams {
    mix: AtomicF32,
    algorithm: AtomicI32,
    saturation: AtomicF32,
    frequency: AtomicF32,
    quality: AtomicF32,
    gain_db: AtomicF32,
    bandpass: AtomicBool,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self::new(DistortionSettings::default())
    }
}

impl DistortionParams {
    /// Create a parameter block from (clamped) settings
    pub fn new(settings: DistortionSettings) -> Self {
        let s = settings.clamped();
        Self {
            mix: AtomicF32::new(s.mix),
            algorithm: AtomicI32::new(s.algorithm),
            saturation: AtomicF32::new(s.saturation),
            frequency: AtomicF32::new(s.frequency),
            quality: AtomicF32::new(s.quality),
            gain_db: AtomicF32::new(s.gain_db),
            bandpass: AtomicBool::new(s.bandpass),
        }
    }

    /// Store a clamped value unless it is NaN; returns the stored value
    fn store_clamped(slot: &AtomicF32, value: f32, min: f32, max: f32) -> Option<f32> {
        if value.is_nan() {
            return None;
        }
        let clamped = value.clamp(min, max);
        slot.store(clamped, Ordering::Relaxed);
        Some(clamped)
    }

    pub fn set_mix(&self, mix: f32) -> Option<f32> {
        Self::store_clamped(&self.mix, mix, MIN_MIX, MAX_MIX)
    }

    pub fn set_saturation(&self, saturation: f32) -> Option<f32> {
        Self::store_clamped(&self.saturation, saturation, MIN_SATURATION, MAX_SATURATION)
    }

    pub fn set_frequency(&self, frequency: f32) -> Option<f32> {
        Self::store_clamped(&self.frequency, frequency, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
    }

    pub fn set_quality(&self, quality: f32) -> Option<f32> {
        Self::store_clamped(&self.quality, quality, MIN_QUALITY, MAX_QUALITY)
    }

    pub fn set_gain_db(&self, gain_db: f32) -> Option<f32> {
        Self::store_clamped(&self.gain_db, gain_db, MIN_GAIN_DB, MAX_GAIN_DB)
    }

    /// Select the waveshaper from a float control value
    ///
    /// The value is truncated toward zero. Indices outside 0..16 are stored
    /// as is and make the processor pass the dry signal through.
    pub fn set_algorithm(&self, algorithm: f32) -> Option<i32> {
        if !algorithm.is_finite() {
            return None;
        }
        // `as` saturates at the i32 bounds
        let index = algorithm.trunc() as i32;
        self.set_algorithm_index(index);
        Some(index)
    }

    pub fn set_algorithm_index(&self, index: i32) {
        self.algorithm.store(index, Ordering::Relaxed);
    }

    pub fn set_bandpass(&self, enabled: bool) {
        self.bandpass.store(enabled, Ordering::Relaxed);
    }

    pub fn mix(&self) -> f32 {
        self.mix.load(Ordering::Relaxed)
    }

    pub fn algorithm(&self) -> i32 {
        self.algorithm.load(Ordering::Relaxed)
    }

    pub fn saturation(&self) -> f32 {
        self.saturation.load(Ordering::Relaxed)
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.load(Ordering::Relaxed)
    }

    pub fn quality(&self) -> f32 {
        self.quality.load(Ordering::Relaxed)
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db.load(Ordering::Relaxed)
    }

    pub fn bandpass(&self) -> bool {
        self.bandpass.load(Ordering::Relaxed)
    }

    /// Whether the stored index names a waveshaper
    pub fn has_valid_algorithm(&self) -> bool {
        (0..NUM_ALGORITHMS as i32).contains(&self.algorithm())
    }

    /// Read every parameter once
    pub fn snapshot(&self) -> DistortionSettings {
        DistortionSettings {
            mix: self.mix(),
            algorithm: self.algorithm(),
            saturation: self.saturation(),
            frequency: self.frequency(),
            quality: self.quality(),
            gain_db: self.gain_db(),
            bandpass: self.bandpass(),
        }
    }

    /// Store every field of `settings` (clamped)
    pub fn apply(&self, settings: &DistortionSettings) {
        let s = settings.clamped();
        self.mix.store(s.mix, Ordering::Relaxed);
        self.algorithm.store(s.algorithm, Ordering::Relaxed);
        self.saturation.store(s.saturation, Ordering::Relaxed);
        self.frequency.store(s.frequency, Ordering::Relaxed);
        self.quality.store(s.quality, Ordering::Relaxed);
        self.gain_db.store(s.gain_db, Ordering::Relaxed);
        self.bandpass.store(s.bandpass, Ordering::Relaxed);
    }
}
