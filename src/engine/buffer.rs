//! Mono audio buffer
//!
//! Offline container for a whole signal plus its sample rate. The effects
//! themselves work on plain `&mut [f32]` blocks; this type is only the
//! hand-off between file I/O and the renderer.

use serde::Serialize;

/// Convert linear amplitude to decibels (-inf for silence)
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Level summary of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelStats {
    pub peak: f32,
    pub rms: f32,
}

impl LevelStats {
    pub fn peak_db(&self) -> f32 {
        linear_to_db(self.peak)
    }

    pub fn rms_db(&self) -> f32 {
        linear_to_db(self.rms)
    }
}

/// Mono 32-bit float audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples, nominally in [-1, 1]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer
    pub fn new(num_samples: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; num_samples],
            sample_rate,
        }
    }

    /// Wrap existing samples
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Mutable host-sized blocks; the last one may be shorter
    pub fn blocks_mut(&mut self, block_size: usize) -> std::slice::ChunksMut<'_, f32> {
        self.samples.chunks_mut(block_size.max(1))
    }

    /// Peak absolute sample
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()))
    }

    /// Root mean square level
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum / self.samples.len() as f64).sqrt() as f32
    }

    pub fn stats(&self) -> LevelStats {
        LevelStats {
            peak: self.peak(),
            rms: self.rms(),
        }
    }

    /// Check every sample is finite
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_buffer_new() {
        let buffer = AudioBuffer::new(480, 48000);
        assert_eq!(buffer.len(), 480);
        assert!(!buffer.is_empty());
        assert_relative_eq!(buffer.duration_secs(), 0.01);
        assert_eq!(buffer.peak(), 0.0);
    }

    #[test]
    fn test_levels() {
        let buffer = AudioBuffer::from_samples(vec![1.0, -1.0, 1.0, -1.0], 44100);
        assert_eq!(buffer.peak(), 1.0);
        assert_relative_eq!(buffer.rms(), 1.0);
        assert_relative_eq!(buffer.stats().peak_db(), 0.0);

        let silent = AudioBuffer::new(0, 44100);
        assert_eq!(silent.rms(), 0.0);
        assert_eq!(silent.stats().rms_db(), f32::NEG_INFINITY);
    }

    #[test]
    fn test_blocks_mut() {
        let mut buffer = AudioBuffer::new(100, 44100);
        let sizes: Vec<usize> = buffer.blocks_mut(32).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![32, 32, 32, 4]);
        // Zero block size is treated as one
        assert_eq!(buffer.blocks_mut(0).count(), 100);
    }

    #[test]
    fn test_is_finite() {
        let mut buffer = AudioBuffer::new(4, 44100);
        assert!(buffer.is_finite());
        buffer.samples[2] = f32::NAN;
        assert!(!buffer.is_finite());
    }
}
