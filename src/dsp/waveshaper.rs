//! Waveshaper Bank
//!
//! Sixteen stateless transfer functions selected by a flat index. Each one
//! carries an output scale calibrated so a full-scale sinusoid comes out at
//! a comparable perceived loudness across the bank.
//!
//! Only [`Algorithm::Sigmoid`], [`Algorithm::Tanh`], [`Algorithm::Atan`] and
//! [`Algorithm::FuzzExp1`] read the saturation amount.

use std::f32::consts::E;

/// Number of algorithms in the bank
pub const NUM_ALGORITHMS: usize = 16;

/// Sign function with an explicit zero branch
///
/// Returns `-1`, `0` or `1`. The division form `x / |x|` is NaN at zero.
#[inline]
pub fn sgn(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ============================================================================
// Algorithm
// ============================================================================

/// Waveshaping transfer function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// `(3x/2)(1 − x²/3)`
    #[default]
    Arraya = 0,
    /// `2 / (1 + e^(−s·x)) − 1`
    Sigmoid = 1,
    /// `(e^x − 1)(e + 1) / ((e^x + 1)(e − 1))`
    Sigmoid2 = 2,
    /// `tanh(s·x) / tanh(s)`, good for diode simulation
    Tanh = 3,
    /// `atan(s·x) / atan(s)`
    Atan = 4,
    /// `sgn(x)·(1 − e^(−s·|x|)) / (1 − e^(−s))`
    FuzzExp1 = 5,
    /// `sgn(−x)·(1 − e^|x|) / (e − 1)`
    FuzzExp2 = 6,
    /// `(e − e^(1−x)) / (e − 1)`
    Exp2 = 7,
    /// `2.5·atan(0.9x) + 2.5·sqrt(1 − (0.9x)²) − 2.5`
    Atsr = 8,
    /// `x²·sgn(x)`
    SquareSign = 9,
    /// `x³`
    Cube = 10,
    /// `clamp(x, −0.5, 0.5)`
    HardClip = 11,
    /// `0.5(x + |x|)`
    HalfRect = 12,
    /// `|x|`
    FullRect = 13,
    /// `x²`
    SquareLaw = 14,
    /// `sqrt(|x|)`
    AbsSqrt = 15,
}

impl Algorithm {
    /// Every algorithm in index order
    pub const ALL: [Algorithm; NUM_ALGORITHMS] = [
        Algorithm::Arraya,
        Algorithm::Sigmoid,
        Algorithm::Sigmoid2,
        Algorithm::Tanh,
        Algorithm::Atan,
        Algorithm::FuzzExp1,
        Algorithm::FuzzExp2,
        Algorithm::Exp2,
        Algorithm::Atsr,
        Algorithm::SquareSign,
        Algorithm::Cube,
        Algorithm::HardClip,
        Algorithm::HalfRect,
        Algorithm::FullRect,
        Algorithm::SquareLaw,
        Algorithm::AbsSqrt,
    ];

    /// Look up an algorithm by its flat index
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Flat index of this algorithm
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Get display name
    pub fn display_name(self) -> &'static str {
        match self {
            Algorithm::Arraya => "Arraya",
            Algorithm::Sigmoid => "Sigmoid",
            Algorithm::Sigmoid2 => "Sigmoid 2",
            Algorithm::Tanh => "Hyperbolic Tangent",
            Algorithm::Atan => "Arctangent",
            Algorithm::FuzzExp1 => "Fuzz Exponential 1",
            Algorithm::FuzzExp2 => "Fuzz Exponential 2",
            Algorithm::Exp2 => "Exponential 2",
            Algorithm::Atsr => "Arctangent Square Root",
            Algorithm::SquareSign => "Square Sign",
            Algorithm::Cube => "Cube",
            Algorithm::HardClip => "Hard Clipper",
            Algorithm::HalfRect => "Half Wave Rectifier",
            Algorithm::FullRect => "Full Wave Rectifier",
            Algorithm::SquareLaw => "Square Law",
            Algorithm::AbsSqrt => "Absolute Square Root",
        }
    }

    /// Short panel label
    pub fn short_name(self) -> &'static str {
        match self {
            Algorithm::Arraya => "ARRY",
            Algorithm::Sigmoid => "SIG",
            Algorithm::Sigmoid2 => "SIG2",
            Algorithm::Tanh => "TANH",
            Algorithm::Atan => "ATAN",
            Algorithm::FuzzExp1 => "FEXP1",
            Algorithm::FuzzExp2 => "FEXP2",
            Algorithm::Exp2 => "EXP2",
            Algorithm::Atsr => "ATSR",
            Algorithm::SquareSign => "SQS",
            Algorithm::Cube => "CUBE",
            Algorithm::HardClip => "HCLIP",
            Algorithm::HalfRect => "HWR",
            Algorithm::FullRect => "FWR",
            Algorithm::SquareLaw => "SQR",
            Algorithm::AbsSqrt => "ASQRT",
        }
    }

    /// Post-scaling constant applied after the transfer function
    pub fn output_scale(self) -> f32 {
        match self {
            Algorithm::Arraya => 2.5,
            Algorithm::Sigmoid => 0.7,
            Algorithm::Sigmoid2 => 3.0,
            Algorithm::Tanh => 0.3,
            Algorithm::Atan => 0.4,
            Algorithm::FuzzExp1 => 0.3,
            // Fuzz is super loud
            Algorithm::FuzzExp2 => 0.03,
            Algorithm::Exp2 => 1.0,
            Algorithm::Atsr => 4.0,
            Algorithm::SquareSign => 0.05,
            // Cube is super quiet
            Algorithm::Cube => 30.0,
            Algorithm::HardClip => 1.0,
            Algorithm::HalfRect => 4.0,
            Algorithm::FullRect => 3.8,
            Algorithm::SquareLaw => 3.8,
            Algorithm::AbsSqrt => 2.2,
        }
    }

    /// Whether the transfer function reads the saturation amount
    pub fn uses_saturation(self) -> bool {
        matches!(
            self,
            Algorithm::Sigmoid | Algorithm::Tanh | Algorithm::Atan | Algorithm::FuzzExp1
        )
    }

    /// Whether `transfer(0) == 0`
    ///
    /// True for the odd (or near-odd) limiters; the rectifiers and square
    /// law map zero to zero as well but are even functions.
    pub fn is_odd_symmetric(self) -> bool {
        !matches!(
            self,
            Algorithm::HalfRect | Algorithm::FullRect | Algorithm::SquareLaw | Algorithm::AbsSqrt
        )
    }

    /// Apply the raw transfer function (no output scaling)
    #[inline]
    pub fn transfer(self, x: f32, saturation: f32) -> f32 {
        let s = saturation;
        match self {
            Algorithm::Arraya => (3.0 * x) / 2.0 * (1.0 - x * x / 3.0),
            Algorithm::Sigmoid => 2.0 / (1.0 + (-s * x).exp()) - 1.0,
            // (e^x - 1)/(e^x + 1) == tanh(x/2), which does not overflow
            Algorithm::Sigmoid2 => (x / 2.0).tanh() * (E + 1.0) / (E - 1.0),
            Algorithm::Tanh => (s * x).tanh() / s.tanh(),
            Algorithm::Atan => (s * x).atan() / s.atan(),
            Algorithm::FuzzExp1 => sgn(x) * ((1.0 - (-s * x.abs()).exp()) / (1.0 - (-s).exp())),
            Algorithm::FuzzExp2 => sgn(-x) * (-x.abs().exp_m1() / (E - 1.0)),
            // e - e^(1-x) == -e·(e^(-x) - 1), exact zero at the origin
            Algorithm::Exp2 => -E * (-x).exp_m1() / (E - 1.0),
            Algorithm::Atsr => {
                let v = 0.9 * x;
                // sqrt is only real on |0.9x| <= 1
                2.5 * v.atan() + 2.5 * (1.0 - v * v).max(0.0).sqrt() - 2.5
            }
            Algorithm::SquareSign => x * x * sgn(x),
            Algorithm::Cube => x * x * x,
            Algorithm::HardClip => x.clamp(-0.5, 0.5),
            Algorithm::HalfRect => 0.5 * (x + x.abs()),
            Algorithm::FullRect => x.abs(),
            Algorithm::SquareLaw => x * x,
            Algorithm::AbsSqrt => x.abs().sqrt(),
        }
    }

    /// Apply the transfer function and the output scale
    #[inline]
    pub fn process(self, x: f32, saturation: f32) -> f32 {
        self.transfer(x, saturation) * self.output_scale()
    }
}

/// Shape one sample with the algorithm at `index`
///
/// Returns `None` for an index outside the bank.
#[inline]
pub fn shape(x: f32, index: i32, saturation: f32) -> Option<f32> {
    Algorithm::from_index(index).map(|algorithm| algorithm.process(x, saturation))
}
