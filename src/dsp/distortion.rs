//! Distortion Processor
//!
//! Per block: snapshot the shared parameters, refresh the bandpass
//! coefficients if anything changed, then for every sample
//!
//! 1. optionally run the resonant bandpass (with its gain compensation)
//! 2. shape through the selected waveshaper and apply its output scale
//! 3. blend against the original, unfiltered input sample
//!
//! An algorithm index outside the bank passes the dry signal through. The
//! bandpass keeps running in that case so its state stays continuous when a
//! valid index comes back.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::{json, Value};

use crate::dsp::bandpass::ResonantBandpass;
use crate::dsp::effect::{
    expect_bool, expect_f32, restore_common, Effect, EffectParams, DEFAULT_SAMPLE_RATE,
};
use crate::dsp::mix::mix;
use crate::dsp::params::{DistortionParams, DistortionSettings};
use crate::error::{RtapError, Result};
use crate::impl_effect_common;

/// Bandpass → waveshaper → dry/wet distortion
///
/// Parameters live in an [`Arc<DistortionParams>`]; clone the handle from
/// [`params`](Self::params) to drive them from another thread while this
/// processor runs on the audio thread.
///
/// # Example
/// ```
/// use rtap_dsp::dsp::{Distortion, Effect};
///
/// let mut dist = Distortion::new();
/// dist.set_algorithm(3.0); // tanh
/// dist.set_mix(1.0);
///
/// let input = vec![0.25_f32; 64];
/// let mut output = vec![0.0_f32; 64];
/// dist.process(&input, &mut output);
/// ```
#[derive(Debug)]
pub struct Distortion {
    params: EffectParams,
    shared: Arc<DistortionParams>,
    sample_rate: f32,
    bandpass: ResonantBandpass,
}

impl Default for Distortion {
    fn default() -> Self {
        Self::new()
    }
}

impl Distortion {
    /// Create a processor with default parameters at 44.1 kHz
    pub fn new() -> Self {
        Self::with_settings(DistortionSettings::default())
    }

    /// Create a processor from preset settings
    pub fn with_settings(settings: DistortionSettings) -> Self {
        Self::with_params(Arc::new(DistortionParams::new(settings)))
    }

    /// Create a processor driven by an existing parameter block
    pub fn with_params(shared: Arc<DistortionParams>) -> Self {
        Self {
            params: EffectParams::default(),
            shared,
            sample_rate: DEFAULT_SAMPLE_RATE,
            bandpass: ResonantBandpass::new(),
        }
    }

    /// Shared parameter handle
    pub fn params(&self) -> Arc<DistortionParams> {
        Arc::clone(&self.shared)
    }

    /// Current parameter values
    pub fn settings(&self) -> DistortionSettings {
        self.shared.snapshot()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Pre-filter stage, for inspection
    pub fn bandpass(&self) -> &ResonantBandpass {
        &self.bandpass
    }

    pub fn set_mix(&self, mix: f32) {
        self.shared.set_mix(mix);
    }

    /// Select the waveshaper; the value is truncated to an index
    pub fn set_algorithm(&self, algorithm: f32) {
        self.shared.set_algorithm(algorithm);
    }

    pub fn set_saturation(&self, saturation: f32) {
        self.shared.set_saturation(saturation);
    }

    pub fn set_frequency(&self, frequency: f32) {
        self.shared.set_frequency(frequency);
    }

    pub fn set_quality(&self, quality: f32) {
        self.shared.set_quality(quality);
    }

    pub fn set_gain_db(&self, gain_db: f32) {
        self.shared.set_gain_db(gain_db);
    }

    pub fn set_bandpass(&self, enabled: bool) {
        self.shared.set_bandpass(enabled);
    }

    /// Run one block against a parameter snapshot
    fn run_block(&mut self, settings: &DistortionSettings, buffer: &mut [f32]) {
        if settings.bandpass {
            self.bandpass.configure(
                settings.frequency,
                settings.quality,
                settings.gain_db,
                self.sample_rate,
            );
        }
        let algorithm = settings.algorithm();

        for sample in buffer.iter_mut() {
            let dry = *sample;
            let filtered = if settings.bandpass {
                self.bandpass.process_sample(dry)
            } else {
                dry
            };

            let Some(algorithm) = algorithm else {
                continue;
            };
            let mut wet = algorithm.process(filtered, settings.saturation);
            if !wet.is_finite() {
                wet = 0.0;
            }
            *sample = mix(dry, wet, settings.mix);
        }
    }

    /// Log a JSON-set value that was clamped on the way in
    fn note_clamped(name: &str, requested: f32, stored: Option<f32>) {
        match stored {
            Some(stored) if stored != requested => {
                debug!("distortion: {} {} clamped to {}", name, requested, stored)
            }
            Some(_) => {}
            None => warn!("distortion: ignoring non-finite {}", name),
        }
    }
}

impl Effect for Distortion {
    impl_effect_common!("distortion", "Distortion");

    fn process_in_place(&mut self, buffer: &mut [f32]) {
        if !self.params.enabled {
            return;
        }
        let settings = self.shared.snapshot();
        self.run_block(&settings, buffer);
    }

    fn prepare(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            warn!("distortion: ignoring invalid sample rate {}", sample_rate);
            return;
        }
        debug!("distortion: prepare at {} Hz", sample_rate);
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        debug!("distortion: reset");
        self.bandpass.reset();
    }

    fn to_json(&self) -> Result<Value> {
        Ok(json!({
            "type": self.effect_type(),
            "params": serde_json::to_value(&self.params)?,
            "settings": serde_json::to_value(self.settings())?,
        }))
    }

    fn from_json(&mut self, json: &Value) -> Result<()> {
        restore_common(&mut self.params, json);
        if let Some(settings) = json.get("settings") {
            let settings: DistortionSettings = serde_json::from_value(settings.clone())?;
            self.shared.apply(&settings);
        }
        Ok(())
    }

    fn get_params(&self) -> Value {
        let s = self.settings();
        json!({
            "mix": s.mix,
            "algorithm": s.algorithm,
            "algorithm_name": s.algorithm().map(|a| a.display_name()),
            "saturation": s.saturation,
            "frequency": s.frequency,
            "quality": s.quality,
            "gain": s.gain_db,
            "bandpass": s.bandpass,
            "enabled": self.params.enabled,
            "sample_rate": self.sample_rate,
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "mix" => {
                let v = expect_f32(name, value)?;
                Self::note_clamped(name, v, self.shared.set_mix(v));
            }
            "algorithm" => {
                let v = expect_f32(name, value)?;
                match self.shared.set_algorithm(v) {
                    Some(index) if !self.shared.has_valid_algorithm() => {
                        warn!("distortion: algorithm {} out of range, passing dry", index)
                    }
                    Some(_) => {}
                    None => warn!("distortion: ignoring non-finite algorithm"),
                }
            }
            "saturation" => {
                let v = expect_f32(name, value)?;
                Self::note_clamped(name, v, self.shared.set_saturation(v));
            }
            "frequency" => {
                let v = expect_f32(name, value)?;
                Self::note_clamped(name, v, self.shared.set_frequency(v));
            }
            "quality" => {
                let v = expect_f32(name, value)?;
                Self::note_clamped(name, v, self.shared.set_quality(v));
            }
            "gain" | "gain_db" => {
                let v = expect_f32(name, value)?;
                Self::note_clamped(name, v, self.shared.set_gain_db(v));
            }
            "bandpass" => self.shared.set_bandpass(expect_bool(name, value)?),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::waveshaper::Algorithm;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;
    use test_case::test_case;

    fn sine(frequency: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.8 * (2.0 * PI * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    fn run(dist: &mut Distortion, input: &[f32], block: usize) -> Vec<f32> {
        let mut output = vec![0.0; input.len()];
        for (i, o) in input.chunks(block).zip(output.chunks_mut(block)) {
            dist.process(i, o);
        }
        output
    }

    #[test]
    fn test_defaults() {
        let dist = Distortion::new();
        assert_eq!(dist.settings(), DistortionSettings::default());
        assert_eq!(dist.sample_rate(), 44100.0);
        assert_eq!(dist.effect_type(), "distortion");
        assert!(dist.is_enabled());
    }

    #[test]
    fn test_dry_mix_is_exact_for_every_algorithm() {
        let input = sine(220.0, 44100.0, 512);
        for algorithm in Algorithm::ALL {
            let mut dist = Distortion::new();
            dist.set_algorithm(algorithm.index() as f32);
            dist.set_saturation(7.0);
            dist.set_mix(0.0);
            assert_eq!(run(&mut dist, &input, 64), input, "{:?}", algorithm);
        }
    }

    #[test_case(Algorithm::Tanh, true ; "tanh with bandpass")]
    #[test_case(Algorithm::Cube, true ; "cube with bandpass")]
    #[test_case(Algorithm::FuzzExp1, false ; "fuzz without bandpass")]
    #[test_case(Algorithm::AbsSqrt, false ; "abs sqrt without bandpass")]
    fn test_wet_mix_has_no_dry_leakage(algorithm: Algorithm, bandpass: bool) {
        let input = sine(440.0, 44100.0, 256);
        let mut dist = Distortion::new();
        dist.set_algorithm(algorithm.index() as f32);
        dist.set_saturation(3.0);
        dist.set_bandpass(bandpass);
        dist.set_mix(1.0);
        let output = run(&mut dist, &input, 32);

        let mut reference = ResonantBandpass::new();
        reference.configure(1000.0, 1.0, 20.0, 44100.0);
        for (x, y) in input.iter().zip(&output) {
            let filtered = if bandpass {
                reference.process_sample(*x)
            } else {
                *x
            };
            assert_eq!(*y, algorithm.process(filtered, 3.0));
        }
    }

    #[test]
    fn test_fuzz_alternating_input() {
        // Alternating ±2, length 64, vector size 32, FuzzExp1 at saturation 8
        let input: Vec<f32> = (0..64)
            .map(|i| if i % 2 == 0 { -2.0 } else { 2.0 })
            .collect();
        let mut dist = Distortion::new();
        dist.set_bandpass(false);
        dist.set_mix(1.0);
        dist.set_algorithm(5.0);
        dist.set_saturation(8.0);
        let output = run(&mut dist, &input, 32);

        let magnitude = 0.3 * (1.0 - (-16.0_f32).exp()) / (1.0 - (-8.0_f32).exp());
        for (x, y) in input.iter().zip(&output) {
            assert_relative_eq!(*y, x.signum() * magnitude, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_in_place_matches_out_of_place() {
        let input = sine(330.0, 48000.0, 300);
        let settings = DistortionSettings {
            mix: 0.6,
            algorithm: Algorithm::Atan.index(),
            saturation: 5.0,
            quality: 4.0,
            ..Default::default()
        };

        let mut a = Distortion::with_settings(settings);
        let mut b = Distortion::with_settings(settings);
        let out_of_place = run(&mut a, &input, 100);

        let mut in_place = input.clone();
        for block in in_place.chunks_mut(100) {
            b.process_in_place(block);
        }
        assert_eq!(in_place, out_of_place);
    }

    #[test]
    fn test_block_size_does_not_change_output() {
        let input = sine(1000.0, 44100.0, 1024);
        let settings = DistortionSettings {
            mix: 1.0,
            algorithm: Algorithm::Sigmoid.index(),
            saturation: 4.0,
            quality: 8.0,
            ..Default::default()
        };

        let reference = run(&mut Distortion::with_settings(settings), &input, 1024);
        for block in [1, 17, 32, 64, 500] {
            let output = run(&mut Distortion::with_settings(settings), &input, block);
            assert_eq!(output, reference, "block size {}", block);
        }
    }

    #[test]
    fn test_instances_are_independent() {
        let input = sine(700.0, 44100.0, 128);
        let settings = DistortionSettings {
            mix: 1.0,
            algorithm: Algorithm::Tanh.index(),
            ..Default::default()
        };
        let mut a = Distortion::with_settings(settings);
        let mut b = Distortion::with_settings(settings);

        // Feed `a` something else first; `b` must not notice
        run(&mut a, &[0.9; 512], 64);
        let fresh = run(&mut Distortion::with_settings(settings), &input, 64);
        assert_eq!(run(&mut b, &input, 64), fresh);
    }

    #[test]
    fn test_invalid_algorithm_passes_dry() {
        let input = sine(500.0, 44100.0, 128);
        for index in [-1.0, 16.0, 99.0] {
            let mut dist = Distortion::new();
            dist.set_mix(1.0);
            dist.set_algorithm(index);
            assert_eq!(run(&mut dist, &input, 64), input);
        }
    }

    #[test]
    fn test_filter_keeps_running_through_invalid_algorithm() {
        let first = sine(500.0, 44100.0, 128);
        let second = sine(800.0, 44100.0, 128);

        let mut a = Distortion::new();
        a.set_mix(1.0);
        a.set_algorithm(42.0);
        run(&mut a, &first, 64);
        a.set_algorithm(3.0);

        let mut b = Distortion::new();
        b.set_mix(1.0);
        b.set_algorithm(3.0);
        run(&mut b, &first, 64);

        assert_eq!(run(&mut a, &second, 64), run(&mut b, &second, 64));
    }

    #[test]
    fn test_extreme_settings_stay_finite() {
        let input = sine(1000.0, 44100.0, 2048);
        for algorithm in Algorithm::ALL {
            let mut dist = Distortion::with_settings(DistortionSettings {
                mix: 1.0,
                algorithm: algorithm.index(),
                saturation: 10.0,
                frequency: 1000.0,
                quality: 16.0,
                gain_db: 120.0,
                bandpass: true,
            });
            let output = run(&mut dist, &input, 64);
            assert!(
                output.iter().all(|s| s.is_finite()),
                "{:?} produced a non-finite sample",
                algorithm
            );
        }
    }

    #[test]
    fn test_disabled_copies_input() {
        let input = sine(300.0, 44100.0, 64);
        let mut dist = Distortion::new();
        dist.set_mix(1.0);
        dist.set_algorithm(10.0);
        dist.set_enabled(false);
        assert_eq!(run(&mut dist, &input, 64), input);
    }

    #[test]
    fn test_length_mismatch_touches_common_prefix() {
        let mut dist = Distortion::new();
        dist.set_mix(1.0);
        dist.set_bandpass(false);
        dist.set_algorithm(Algorithm::HardClip.index() as f32);

        let input = [2.0_f32; 4];
        let mut output = [7.0_f32; 6];
        dist.process(&input, &mut output);
        assert_eq!(output, [0.5, 0.5, 0.5, 0.5, 7.0, 7.0]);
    }

    #[test]
    fn test_handle_updates_apply_next_block() {
        let mut dist = Distortion::new();
        dist.set_bandpass(false);
        let handle = dist.params();

        let mut block = [1.0_f32; 8];
        dist.process_in_place(&mut block);
        assert_eq!(block, [1.0; 8]);

        handle.set_mix(1.0);
        handle.set_algorithm_index(Algorithm::HardClip.index());
        let mut block = [1.0_f32; 8];
        dist.process_in_place(&mut block);
        assert_eq!(block, [0.5; 8]);
    }

    #[test]
    fn test_prepare_changes_coefficients() {
        let input = sine(1000.0, 44100.0, 64);
        let mut dist = Distortion::new();
        dist.set_mix(1.0);
        run(&mut dist, &input, 64);
        let at_44k = *dist.bandpass().coefficients();

        dist.prepare(96000.0);
        run(&mut dist, &input, 64);
        assert_eq!(dist.sample_rate(), 96000.0);
        assert_ne!(*dist.bandpass().coefficients(), at_44k);

        dist.prepare(0.0);
        assert_eq!(dist.sample_rate(), 96000.0);
    }

    #[test]
    fn test_reset_restores_fresh_response() {
        let input = sine(900.0, 44100.0, 64);
        let mut dist = Distortion::new();
        dist.set_mix(1.0);
        let first = run(&mut dist, &input, 64);
        dist.reset();
        assert_eq!(run(&mut dist, &input, 64), first);
    }

    #[test]
    fn test_set_param_by_name() {
        let mut dist = Distortion::new();
        dist.set_param("mix", &json!(0.25)).unwrap();
        dist.set_param("algorithm", &json!(4)).unwrap();
        dist.set_param("saturation", &json!(12.0)).unwrap();
        dist.set_param("frequency", &json!(2000)).unwrap();
        dist.set_param("quality", &json!(2.5)).unwrap();
        dist.set_param("gain", &json!(-6.0)).unwrap();
        dist.set_param("bandpass", &json!(false)).unwrap();

        let params = dist.get_params();
        assert_eq!(params["mix"], json!(0.25));
        assert_eq!(params["algorithm"], json!(4));
        assert_eq!(params["algorithm_name"], json!("Arctangent"));
        assert_eq!(params["saturation"], json!(10.0));
        assert_eq!(params["frequency"], json!(2000.0));
        assert_eq!(params["quality"], json!(2.5));
        assert_eq!(params["gain"], json!(-6.0));
        assert_eq!(params["bandpass"], json!(false));
    }

    #[test]
    fn test_set_param_errors() {
        let mut dist = Distortion::new();
        assert!(matches!(
            dist.set_param("mix", &json!("wet")),
            Err(RtapError::InvalidParameter { .. })
        ));
        assert!(matches!(
            dist.set_param("drive", &json!(1.0)),
            Err(RtapError::UnknownParameter { .. })
        ));
        // Out-of-range algorithm is accepted and reported as null name
        dist.set_param("algorithm", &json!(20)).unwrap();
        assert_eq!(dist.get_params()["algorithm_name"], Value::Null);
    }

    #[test]
    fn test_to_from_json() {
        let original = Distortion::with_settings(DistortionSettings {
            mix: 0.4,
            algorithm: 8,
            quality: 2.0,
            ..Default::default()
        });
        let json = original.to_json().unwrap();

        let mut restored = Distortion::new();
        restored.from_json(&json).unwrap();
        assert_eq!(restored.settings(), original.settings());
        assert_eq!(restored.id(), original.id());
    }
}
