//! Resonant bandpass pre-filter
//!
//! A state-variable bandpass followed by a gain stage that holds the peak
//! gain at the center frequency constant across quality settings:
//! the bandpass tap peaks at `q`, and the compensation factor
//! `(A² − 1) / (q·A)` with `A = 10^(gain_db/40)` turns that into `A − 1/A`.

use super::biquad::StateVariableFilter;
use super::coefficients::SvfCoefficients;

/// Gain compensation applied to the bandpass output
#[inline]
pub fn gain_compensation(quality: f32, gain_db: f32) -> f64 {
    let a = 10.0_f64.powf(gain_db as f64 / 40.0);
    1.0 / (quality as f64 * a) * (a * a - 1.0)
}

/// Key of the values the coefficients were derived from
#[derive(Debug, Clone, Copy, PartialEq)]
struct Design {
    frequency: f32,
    quality: f32,
    gain_db: f32,
    sample_rate: f32,
}

/// Resonant bandpass with constant peak gain
///
/// Call [`configure`](Self::configure) once per block with the current
/// parameters, then [`process_sample`](Self::process_sample) per sample.
#[derive(Debug, Clone)]
pub struct ResonantBandpass {
    filter: StateVariableFilter,
    compensation: f64,
    design: Option<Design>,
}

impl Default for ResonantBandpass {
    fn default() -> Self {
        Self::new()
    }
}

impl ResonantBandpass {
    /// Create an unconfigured bandpass with a silent state
    pub fn new() -> Self {
        Self {
            filter: StateVariableFilter::default(),
            compensation: 1.0,
            design: None,
        }
    }

    /// Update coefficients for this block
    ///
    /// Recomputes only when an input changed since the last call; the
    /// integrator state is never touched. Returns whether a recomputation
    /// happened.
    pub fn configure(
        &mut self,
        frequency: f32,
        quality: f32,
        gain_db: f32,
        sample_rate: f32,
    ) -> bool {
        let design = Design {
            frequency,
            quality,
            gain_db,
            sample_rate,
        };
        if self.design == Some(design) {
            return false;
        }

        self.filter.set_coefficients(SvfCoefficients::resonant_bandpass(
            frequency as f64,
            quality as f64,
            sample_rate as f64,
        ));
        self.compensation = gain_compensation(quality, gain_db);
        self.design = Some(design);
        true
    }

    /// Current filter coefficients
    pub fn coefficients(&self) -> &SvfCoefficients {
        self.filter.coefficients()
    }

    /// Current compensation factor
    pub fn compensation(&self) -> f64 {
        self.compensation
    }

    /// Filter one sample and apply the compensation gain
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        (self.filter.process_sample(input) as f64 * self.compensation) as f32
    }

    /// Clear the integrator state (coefficients are kept)
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn steady_peak(bp: &mut ResonantBandpass, frequency: f32, sample_rate: f32) -> f32 {
        let n = (sample_rate * 0.2) as usize;
        (0..n)
            .map(|i| bp.process_sample((2.0 * PI * frequency * i as f32 / sample_rate).sin()))
            .skip(n / 2)
            .fold(0.0_f32, |m, y| m.max(y.abs()))
    }

    #[test]
    fn test_compensation_formula() {
        // 20 dB: A = sqrt(10)
        let a = 10.0_f64.sqrt();
        assert_relative_eq!(
            gain_compensation(1.0, 20.0),
            (a * a - 1.0) / a,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            gain_compensation(2.0, 20.0),
            (a * a - 1.0) / (2.0 * a),
            max_relative = 1e-6
        );
        // 0 dB cancels the wet path entirely
        assert_eq!(gain_compensation(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_constant_peak_gain_across_quality() {
        let expected = {
            let a = 10.0_f32.sqrt();
            a - 1.0 / a
        };
        for q in [0.7, 1.0, 3.0, 8.0] {
            let mut bp = ResonantBandpass::new();
            bp.configure(1000.0, q, 20.0, 48000.0);
            let peak = steady_peak(&mut bp, 1000.0, 48000.0);
            assert_relative_eq!(peak, expected, max_relative = 0.03);
        }
    }

    #[test]
    fn test_configure_is_cached() {
        let mut bp = ResonantBandpass::new();
        assert!(bp.configure(1000.0, 1.0, 20.0, 44100.0));
        let coeffs = *bp.coefficients();
        assert!(!bp.configure(1000.0, 1.0, 20.0, 44100.0));
        assert_eq!(*bp.coefficients(), coeffs);
        assert!(bp.configure(1200.0, 1.0, 20.0, 44100.0));
        assert!(bp.configure(1200.0, 1.0, 20.0, 48000.0));
    }

    #[test]
    fn test_independent_instances() {
        let mut a = ResonantBandpass::new();
        let mut b = ResonantBandpass::new();
        a.configure(500.0, 1.0, 20.0, 44100.0);
        b.configure(500.0, 1.0, 20.0, 44100.0);

        // Drive only `a`; `b` must still answer like a fresh filter
        for _ in 0..64 {
            a.process_sample(0.8);
        }
        let mut fresh = ResonantBandpass::new();
        fresh.configure(500.0, 1.0, 20.0, 44100.0);
        assert_eq!(b.process_sample(0.5), fresh.process_sample(0.5));
    }
}
