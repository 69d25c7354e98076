//! Filter coefficient calculation
//!
//! Second-order Linkwitz-Riley lowpass/highpass sections derived from the
//! analog prototype `ω² / (s + ω)²` via the bilinear transform, and the
//! coefficients of the trapezoidal state-variable bandpass.
//!
//! Coefficients are plain values: computing them twice from the same inputs
//! yields bitwise-identical results, so callers may cache them freely.

use std::f64::consts::PI;

// ============================================================================
// Constants
// ============================================================================

/// Lowest cutoff accepted by the calculator
pub const MIN_CUTOFF_HZ: f64 = 1.0;

/// Highest cutoff as a fraction of the sample rate (just below Nyquist)
pub const MAX_CUTOFF_RATIO: f64 = 0.499;

/// Clamp a cutoff frequency into the open interval (0, Nyquist)
///
/// The bilinear design variables are singular at Nyquist and negative
/// above it, so every caller routes user-facing frequencies through here.
#[inline]
pub fn clamp_cutoff(cutoff_hz: f64, sample_rate: f64) -> f64 {
    let max = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
    if cutoff_hz.is_nan() {
        return max;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, max)
}

// ============================================================================
// Filter Kind
// ============================================================================

/// Response of a direct-form section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Remove above the cutoff
    #[default]
    Lowpass,
    /// Remove below the cutoff
    Highpass,
}

// ============================================================================
// Design Variables
// ============================================================================

/// Intermediate quantities of the bilinear design
///
/// Only needed while deriving coefficients; exposed for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignVariables {
    /// Normalized cutoff `π·f_c / F_S`
    pub theta_c: f64,
    /// Analog cutoff `π·f_c`
    pub omega_c: f64,
    /// Bilinear warping constant `ω_c / tan(θ_c)`
    pub kappa: f64,
    /// Common denominator `κ² + ω_c² + 2κω_c`, positive for any valid cutoff
    pub delta: f64,
}

impl DesignVariables {
    /// Derive the design variables for a cutoff already inside (0, Nyquist)
    pub fn new(cutoff_hz: f64, sample_rate: f64) -> Self {
        let theta_c = PI * cutoff_hz / sample_rate;
        let omega_c = PI * cutoff_hz;
        let kappa = omega_c / theta_c.tan();
        let delta = kappa * kappa + omega_c * omega_c + 2.0 * kappa * omega_c;

        Self {
            theta_c,
            omega_c,
            kappa,
            delta,
        }
    }

    /// Shared feedback taps `(b1, b2)`, identical for lowpass and highpass
    fn feedback(&self) -> (f64, f64) {
        let k2 = self.kappa * self.kappa;
        let w2 = self.omega_c * self.omega_c;
        (
            (-2.0 * k2 + 2.0 * w2) / self.delta,
            (-2.0 * self.kappa * self.omega_c + k2 + w2) / self.delta,
        )
    }
}

// ============================================================================
// Biquad Coefficients
// ============================================================================

/// Direct-form biquad coefficients
///
/// Transfer function: `H(z) = (a0 + a1·z⁻¹ + a2·z⁻²) / (1 + b1·z⁻¹ + b2·z⁻²)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward taps
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    /// Feedback taps
    pub b1: f64,
    pub b2: f64,
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BiquadCoefficients {
    /// Unity pass-through
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
    };

    /// Calculate coefficients for the given response
    ///
    /// The cutoff is clamped into (0, Nyquist) first.
    pub fn calculate(kind: FilterKind, cutoff_hz: f64, sample_rate: f64) -> Self {
        let cutoff = clamp_cutoff(cutoff_hz, sample_rate);
        let vars = DesignVariables::new(cutoff, sample_rate);
        let (b1, b2) = vars.feedback();

        match kind {
            FilterKind::Lowpass => {
                let w2 = vars.omega_c * vars.omega_c / vars.delta;
                Self {
                    a0: w2,
                    a1: 2.0 * w2,
                    a2: w2,
                    b1,
                    b2,
                }
            }
            FilterKind::Highpass => {
                let k2 = vars.kappa * vars.kappa / vars.delta;
                Self {
                    a0: k2,
                    a1: -2.0 * k2,
                    a2: k2,
                    b1,
                    b2,
                }
            }
        }
    }

    /// Lowpass coefficients
    pub fn lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        Self::calculate(FilterKind::Lowpass, cutoff_hz, sample_rate)
    }

    /// Highpass coefficients
    pub fn highpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        Self::calculate(FilterKind::Highpass, cutoff_hz, sample_rate)
    }

    /// Gain at DC (z = 1)
    pub fn dc_gain(&self) -> f64 {
        (self.a0 + self.a1 + self.a2) / (1.0 + self.b1 + self.b2)
    }

    /// Gain at Nyquist (z = -1)
    pub fn nyquist_gain(&self) -> f64 {
        (self.a0 - self.a1 + self.a2) / (1.0 - self.b1 + self.b2)
    }
}

// ============================================================================
// State-Variable Coefficients
// ============================================================================

/// Coefficients of the trapezoidal state-variable bandpass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvfCoefficients {
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
}

impl Default for SvfCoefficients {
    fn default() -> Self {
        Self::resonant_bandpass(1000.0, 1.0, 44100.0)
    }
}

impl SvfCoefficients {
    /// Calculate resonant bandpass coefficients
    ///
    /// `quality` must be positive; the resulting damping `k` equals `1/q`,
    /// so the bandpass tap peaks at gain `q` on the center frequency.
    pub fn resonant_bandpass(frequency_hz: f64, quality: f64, sample_rate: f64) -> Self {
        let frequency = clamp_cutoff(frequency_hz, sample_rate);
        let factor = (PI * frequency / sample_rate).tan();
        let res = 1.0 - 1.0 / (2.0 * quality);
        let k = 2.0 - 2.0 * res;

        let c0 = 1.0 / (1.0 + factor * (factor + k));
        let c1 = factor * c0;
        let c2 = factor * c1;

        Self { c0, c1, c2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_delta_positive_across_range() {
        for cutoff in [1.0, 30.0, 1000.0, 10000.0, 22000.0] {
            let vars = DesignVariables::new(cutoff, 44100.0);
            assert!(vars.delta > 0.0, "delta must be positive at {} Hz", cutoff);
        }
    }

    #[test]
    fn test_lowpass_unity_dc_gain() {
        let c = BiquadCoefficients::lowpass(1000.0, 44100.0);
        assert_relative_eq!(c.dc_gain(), 1.0, epsilon = 1e-9);
        assert!(c.nyquist_gain().abs() < 1e-9);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let c = BiquadCoefficients::highpass(1000.0, 44100.0);
        assert!(c.dc_gain().abs() < 1e-9);
        assert_relative_eq!(c.nyquist_gain(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_feedforward_shapes() {
        let lp = BiquadCoefficients::lowpass(500.0, 48000.0);
        assert_eq!(lp.a0, lp.a2);
        assert_relative_eq!(lp.a1, 2.0 * lp.a0);

        let hp = BiquadCoefficients::highpass(500.0, 48000.0);
        assert_eq!(hp.a0, hp.a2);
        assert_relative_eq!(hp.a1, -2.0 * hp.a0);

        // Same pole pair for both responses
        assert_eq!(lp.b1, hp.b1);
        assert_eq!(lp.b2, hp.b2);
    }

    #[test]
    fn test_matches_closed_form() {
        let fc = 1000.0;
        let fs = 44100.0;
        let omega = PI * fc;
        let kappa = omega / (PI * fc / fs).tan();
        let delta = kappa.powi(2) + omega.powi(2) + 2.0 * kappa * omega;

        let lp = BiquadCoefficients::lowpass(fc, fs);
        assert_relative_eq!(lp.a0, omega.powi(2) / delta, max_relative = 1e-12);
        assert_relative_eq!(
            lp.b1,
            (-2.0 * kappa.powi(2) + 2.0 * omega.powi(2)) / delta,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            lp.b2,
            (-2.0 * kappa * omega + kappa.powi(2) + omega.powi(2)) / delta,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_recalculation_is_bitwise_identical() {
        let a = BiquadCoefficients::highpass(30.0, 44100.0);
        let b = BiquadCoefficients::highpass(30.0, 44100.0);
        assert_eq!(a.a0.to_bits(), b.a0.to_bits());
        assert_eq!(a.a1.to_bits(), b.a1.to_bits());
        assert_eq!(a.b1.to_bits(), b.b1.to_bits());
        assert_eq!(a.b2.to_bits(), b.b2.to_bits());

        let s1 = SvfCoefficients::resonant_bandpass(1000.0, 1.0, 44100.0);
        let s2 = SvfCoefficients::resonant_bandpass(1000.0, 1.0, 44100.0);
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_cutoff_clamped_below_nyquist() {
        assert_relative_eq!(clamp_cutoff(30000.0, 44100.0), 44100.0 * MAX_CUTOFF_RATIO);
        assert_eq!(clamp_cutoff(-5.0, 44100.0), MIN_CUTOFF_HZ);
        assert_eq!(clamp_cutoff(22000.0, 44100.0), 22000.0);

        // Coefficients stay finite even when asked for an impossible cutoff
        let c = BiquadCoefficients::lowpass(1.0e9, 44100.0);
        assert!(c.a0.is_finite() && c.b1.is_finite() && c.b2.is_finite());
    }

    #[test]
    fn test_svf_coefficient_chain() {
        let s = SvfCoefficients::resonant_bandpass(2000.0, 2.0, 48000.0);
        let g = (PI * 2000.0 / 48000.0).tan();
        assert_relative_eq!(s.c1, g * s.c0, max_relative = 1e-12);
        assert_relative_eq!(s.c2, g * s.c1, max_relative = 1e-12);
        // k = 1/q
        assert_relative_eq!(s.c0, 1.0 / (1.0 + g * (g + 0.5)), max_relative = 1e-12);
    }
}
