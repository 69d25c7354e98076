//! Recursive filter state machines
//!
//! Two second-order topologies share this module:
//! - [`Biquad`]: direct-form section driven by [`BiquadCoefficients`]
//! - [`StateVariableFilter`]: trapezoidal SVF producing the bandpass tap
//!
//! Each instance owns its delay line. State persists across blocks and is
//! cleared only by `reset()` or construction; changing coefficients keeps it.

use super::coefficients::{BiquadCoefficients, SvfCoefficients};

// ============================================================================
// Delay Line
// ============================================================================

/// Two retained samples of recursive filter state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DelayLine {
    z1: f64,
    z2: f64,
}

impl DelayLine {
    /// Most recent retained value
    #[inline]
    pub fn z1(&self) -> f64 {
        self.z1
    }

    /// Oldest retained value
    #[inline]
    pub fn z2(&self) -> f64 {
        self.z2
    }

    /// Shift a new value in: `z2 ← z1, z1 ← z0`
    #[inline]
    pub fn push(&mut self, z0: f64) {
        self.z2 = self.z1;
        self.z1 = z0;
    }

    /// Clear to silence
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

// ============================================================================
// Direct-Form Biquad
// ============================================================================

/// Direct-form II biquad section
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    delay: DelayLine,
}

impl Biquad {
    /// Create a section with the given coefficients and a silent delay line
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            delay: DelayLine::default(),
        }
    }

    /// Replace the coefficients without touching the delay line
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }

    /// Current recursive state
    pub fn delay_line(&self) -> &DelayLine {
        &self.delay
    }

    /// Process a single sample
    ///
    /// `z0 = x − b1·z1 − b2·z2`, `y = a0·z0 + a1·z1 + a2·z2`
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let z1 = self.delay.z1();
        let z2 = self.delay.z2();

        let z0 = input as f64 - c.b1 * z1 - c.b2 * z2;
        let output = c.a0 * z0 + c.a1 * z1 + c.a2 * z2;

        self.delay.push(z0);
        output as f32
    }

    /// Clear filter state
    pub fn reset(&mut self) {
        self.delay.reset();
    }
}

// ============================================================================
// State-Variable Filter
// ============================================================================

/// Trapezoidal state-variable filter, bandpass output
#[derive(Debug, Clone, Default)]
pub struct StateVariableFilter {
    coeffs: SvfCoefficients,
    s1: f64,
    s2: f64,
}

impl StateVariableFilter {
    pub fn new(coeffs: SvfCoefficients) -> Self {
        Self {
            coeffs,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Replace the coefficients without touching the integrator state
    pub fn set_coefficients(&mut self, coeffs: SvfCoefficients) {
        self.coeffs = coeffs;
    }

    pub fn coefficients(&self) -> &SvfCoefficients {
        &self.coeffs
    }

    /// Process a single sample and return the bandpass tap
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;

        let hp = input as f64 - self.s2;
        let bp = self.s1 * c.c0 + hp * c.c1;
        let lp = self.s2 + self.s1 * c.c1 + hp * c.c2;

        self.s1 = 2.0 * bp - self.s1;
        self.s2 = 2.0 * lp - self.s2;

        bp as f32
    }

    /// Clear integrator state
    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}
