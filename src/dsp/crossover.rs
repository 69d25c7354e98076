//! Linkwitz-Riley band limiter
//!
//! A highpass section followed by a lowpass section, both second-order
//! Linkwitz-Riley biquads. With the defaults (30 Hz / 22 kHz) it strips DC
//! and subsonic rumble ahead of the distortion stage and tames content near
//! Nyquist.

use log::{debug, warn};
use serde_json::{json, Value};

use crate::dsp::biquad::Biquad;
use crate::dsp::coefficients::BiquadCoefficients;
use crate::dsp::effect::{
    expect_bool, expect_f32, restore_common, Effect, EffectParams, DEFAULT_SAMPLE_RATE,
};
use crate::error::{RtapError, Result};
use crate::impl_effect_common;

// ============================================================================
// Constants
// ============================================================================

pub const DEFAULT_HIGHPASS_HZ: f32 = 30.0;
pub const DEFAULT_LOWPASS_HZ: f32 = 22000.0;

/// Setter range; the design additionally keeps cutoffs below Nyquist
const MIN_CUTOFF_HZ: f32 = 1.0;
const MAX_CUTOFF_HZ: f32 = 96000.0;

// ============================================================================
// Crossover
// ============================================================================

/// Highpass → lowpass Linkwitz-Riley band limiter
///
/// Each instance owns both delay lines. Coefficients are recomputed at the
/// start of the next block after a cutoff or sample-rate change.
#[derive(Debug, Clone)]
pub struct Crossover {
    params: EffectParams,
    highpass_hz: f32,
    lowpass_hz: f32,
    sample_rate: f32,
    highpass: Biquad,
    lowpass: Biquad,
    coeffs_dirty: bool,
}

impl Default for Crossover {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHPASS_HZ, DEFAULT_LOWPASS_HZ)
    }
}

impl Crossover {
    /// Create a band limiter with the given cutoffs
    pub fn new(highpass_hz: f32, lowpass_hz: f32) -> Self {
        let mut crossover = Self {
            params: EffectParams::default(),
            highpass_hz: DEFAULT_HIGHPASS_HZ,
            lowpass_hz: DEFAULT_LOWPASS_HZ,
            sample_rate: DEFAULT_SAMPLE_RATE,
            highpass: Biquad::default(),
            lowpass: Biquad::default(),
            coeffs_dirty: true,
        };
        crossover.set_highpass(highpass_hz);
        crossover.set_lowpass(lowpass_hz);
        crossover
    }

    /// Set the highpass cutoff in Hz; NaN is ignored
    pub fn set_highpass(&mut self, cutoff_hz: f32) {
        if cutoff_hz.is_nan() {
            return;
        }
        self.highpass_hz = cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        self.coeffs_dirty = true;
    }

    /// Set the lowpass cutoff in Hz; NaN is ignored
    pub fn set_lowpass(&mut self, cutoff_hz: f32) {
        if cutoff_hz.is_nan() {
            return;
        }
        self.lowpass_hz = cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        self.coeffs_dirty = true;
    }

    pub fn highpass_hz(&self) -> f32 {
        self.highpass_hz
    }

    pub fn lowpass_hz(&self) -> f32 {
        self.lowpass_hz
    }

    /// Coefficients of the `(highpass, lowpass)` sections
    pub fn coefficients(&self) -> (&BiquadCoefficients, &BiquadCoefficients) {
        (self.highpass.coefficients(), self.lowpass.coefficients())
    }

    /// Recalculate coefficients if needed
    fn update_coefficients(&mut self) {
        if !self.coeffs_dirty {
            return;
        }

        let sample_rate = self.sample_rate as f64;
        self.highpass.set_coefficients(BiquadCoefficients::highpass(
            self.highpass_hz as f64,
            sample_rate,
        ));
        self.lowpass.set_coefficients(BiquadCoefficients::lowpass(
            self.lowpass_hz as f64,
            sample_rate,
        ));
        self.coeffs_dirty = false;
    }
}

impl Effect for Crossover {
    impl_effect_common!("crossover", "Linkwitz-Riley Crossover");

    fn process_in_place(&mut self, buffer: &mut [f32]) {
        if !self.params.enabled {
            return;
        }
        self.update_coefficients();

        for sample in buffer.iter_mut() {
            let high_passed = self.highpass.process_sample(*sample);
            *sample = self.lowpass.process_sample(high_passed);
        }
    }

    fn prepare(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            warn!("crossover: ignoring invalid sample rate {}", sample_rate);
            return;
        }
        debug!("crossover: prepare at {} Hz", sample_rate);
        self.sample_rate = sample_rate;
        self.coeffs_dirty = true;
    }

    fn reset(&mut self) {
        self.highpass.reset();
        self.lowpass.reset();
    }

    fn to_json(&self) -> Result<Value> {
        Ok(json!({
            "type": self.effect_type(),
            "params": serde_json::to_value(&self.params)?,
            "highpass": self.highpass_hz,
            "lowpass": self.lowpass_hz,
        }))
    }

    fn from_json(&mut self, json: &Value) -> Result<()> {
        restore_common(&mut self.params, json);
        if let Some(hz) = json.get("highpass").and_then(|v| v.as_f64()) {
            self.set_highpass(hz as f32);
        }
        if let Some(hz) = json.get("lowpass").and_then(|v| v.as_f64()) {
            self.set_lowpass(hz as f32);
        }
        Ok(())
    }

    fn get_params(&self) -> Value {
        json!({
            "highpass": self.highpass_hz,
            "lowpass": self.lowpass_hz,
            "enabled": self.params.enabled,
            "sample_rate": self.sample_rate,
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "highpass" => self.set_highpass(expect_f32(name, value)?),
            "lowpass" => self.set_lowpass(expect_f32(name, value)?),
            "enabled" => self.params.enabled = expect_bool(name, value)?,
            _ => {
                return Err(RtapError::UnknownParameter {
                    effect_type: self.effect_type().to_string(),
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}
