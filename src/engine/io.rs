//! Audio file I/O
//!
//! Mono WAV import and export. Integer PCM is converted to 32-bit float on
//! import; export writes 16/24-bit integer or 32-bit float. The sample rate
//! is carried through unchanged.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::buffer::AudioBuffer;
use crate::error::{Result, RtapError};

/// Export format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// Bit depth: 16, 24, or 32 (float)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat { bit_depth: 24 }
    }
}

impl ExportFormat {
    pub fn new(bit_depth: u16) -> Self {
        ExportFormat { bit_depth }
    }

    /// 32-bit float, lossless for processed output
    pub fn float() -> Self {
        ExportFormat { bit_depth: 32 }
    }
}

fn wav_error(e: hound::Error) -> RtapError {
    match e {
        hound::Error::IoError(io) => RtapError::Io(io),
        other => RtapError::InvalidAudio {
            reason: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

/// Import a mono WAV file
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the file has more than one channel
/// * `EmptyAudio` - If the file holds no samples
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(RtapError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| RtapError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(RtapError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono supported)", spec.channels),
        });
    }

    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    if samples.is_empty() {
        return Err(RtapError::EmptyAudio);
    }

    debug!(
        "imported {} samples at {} Hz ({}-bit {:?}) from {}",
        samples.len(),
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format,
        path.display()
    );
    Ok(AudioBuffer::from_samples(samples, spec.sample_rate))
}

/// Export a buffer to a mono WAV file
///
/// Integer formats clamp to full scale.
pub fn export_audio(buffer: &AudioBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    let sample_format = match format.bit_depth {
        16 | 24 => SampleFormat::Int,
        32 => SampleFormat::Float,
        other => {
            return Err(RtapError::UnsupportedFormat {
                format: format!("{}-bit audio (only 16, 24, 32 supported)", other),
            })
        }
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: format.bit_depth,
        sample_format,
    };
    let mut writer = WavWriter::create(path, spec).map_err(wav_error)?;

    match format.bit_depth {
        16 => {
            for &sample in &buffer.samples {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(wav_error)?;
            }
        }
        24 => {
            for &sample in &buffer.samples {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(wav_error)?;
            }
        }
        _ => {
            for &sample in &buffer.samples {
                writer.write_sample(sample).map_err(wav_error)?;
            }
        }
    }

    writer.finalize().map_err(wav_error)?;
    debug!(
        "exported {} samples ({}-bit) to {}",
        buffer.len(),
        format.bit_depth,
        path.display()
    );
    Ok(())
}

/// Generate a mono sine wave
pub fn generate_test_tone(
    frequency: f32,
    amplitude: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let samples = (0..num_samples)
        .map(|i| amplitude * (angular_freq * i as f32).sin())
        .collect();
    AudioBuffer::from_samples(samples, sample_rate)
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let scale = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => {
            return reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| RtapError::InvalidAudio {
                    reason: format!("Failed to read float samples: {}", e),
                    source: Some(Box::new(e)),
                })
        }
        (SampleFormat::Int, 8) => 128.0,
        (SampleFormat::Int, 16) => 32768.0,
        (SampleFormat::Int, 24) => 8388608.0,
        (SampleFormat::Int, 32) => 2147483648.0,
        (SampleFormat::Int, bits) => {
            return Err(RtapError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits),
            })
        }
    };

    reader
        .samples::<i32>()
        .map(|s| s.map(|v| (v as f64 / scale) as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| RtapError::InvalidAudio {
            reason: format!("Failed to read {}-bit samples: {}", bits_per_sample, e),
            source: Some(Box::new(e)),
        })
}
