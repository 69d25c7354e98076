//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::dsp::{Algorithm, Crossover, Distortion, DistortionSettings, EffectChain, Level};
use crate::engine::{export_audio, import_audio, AudioBuffer, ExportFormat, LevelStats};
use crate::error::Result;

/// Everything the renderer needs besides the file paths
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub settings: DistortionSettings,
    /// `(highpass, lowpass)` cutoffs when the crossover is enabled
    pub crossover: Option<(f32, f32)>,
    /// Output level stage, when present
    pub level: Option<f32>,
    pub block_size: usize,
    pub format: ExportFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            settings: DistortionSettings::default(),
            crossover: None,
            level: None,
            block_size: 64,
            format: ExportFormat::float(),
        }
    }
}

/// Summary written next to a render
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub created_at: DateTime<Utc>,
    pub input: String,
    pub output: String,
    pub sample_rate: u32,
    pub samples: usize,
    pub block_size: usize,
    pub settings: DistortionSettings,
    pub chain: serde_json::Value,
    pub input_levels: LevelStats,
    pub output_levels: LevelStats,
    pub output_sha256: String,
}

/// Load distortion settings from a JSON preset
pub fn load_preset(path: &Path) -> Result<DistortionSettings> {
    let content = fs::read_to_string(path)?;
    let settings: DistortionSettings = serde_json::from_str(&content)?;
    Ok(settings)
}

/// Write distortion settings as a JSON preset
pub fn write_preset(path: &Path, settings: &DistortionSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content)?;
    println!("Preset written: {}", path.display());
    Ok(())
}

/// Build the crossover → distortion → level chain
pub fn build_chain(options: &RenderOptions, sample_rate: f32) -> EffectChain {
    let mut chain = EffectChain::new();
    chain.prepare(sample_rate);

    if let Some((highpass, lowpass)) = options.crossover {
        chain.add(Box::new(Crossover::new(highpass, lowpass)));
    }
    chain.add(Box::new(Distortion::with_settings(options.settings)));
    if let Some(level) = options.level {
        chain.add(Box::new(Level::new(level)));
    }
    chain
}

/// Process a whole buffer through the chain in host-sized blocks
pub fn render_buffer(chain: &mut EffectChain, buffer: &mut AudioBuffer, block_size: usize) {
    for block in buffer.blocks_mut(block_size) {
        chain.process_in_place(block);
    }
}

/// Render `input` into `output`, optionally writing a JSON report
pub fn render(
    input: &Path,
    output: &Path,
    options: &RenderOptions,
    report_path: Option<&Path>,
) -> Result<RenderReport> {
    info!("Rendering {} -> {}", input.display(), output.display());

    let mut buffer = import_audio(input)?;
    let input_levels = buffer.stats();

    let mut chain = build_chain(options, buffer.sample_rate as f32);
    render_buffer(&mut chain, &mut buffer, options.block_size);

    let output_levels = buffer.stats();
    if output_levels.peak > 1.0 && options.format.bit_depth != 32 {
        warn!(
            "Output peaks at {:.1} dBFS and will clip at {}-bit",
            output_levels.peak_db(),
            options.format.bit_depth
        );
    }
    export_audio(&buffer, output, options.format)?;

    let output_sha256 = format!("{:x}", Sha256::digest(fs::read(output)?));
    let report = RenderReport {
        created_at: Utc::now(),
        input: input.display().to_string(),
        output: output.display().to_string(),
        sample_rate: buffer.sample_rate,
        samples: buffer.len(),
        block_size: options.block_size,
        settings: options.settings.clamped(),
        chain: chain.to_json()?,
        input_levels,
        output_levels,
        output_sha256,
    };

    if let Some(path) = report_path {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("Report written: {}", path.display());
    }

    println!(
        "Rendered {} samples at {} Hz: peak {:.1} dBFS, rms {:.1} dBFS",
        report.samples,
        report.sample_rate,
        output_levels.peak_db(),
        output_levels.rms_db()
    );
    Ok(report)
}

/// Print the waveshaper bank
pub fn list_algorithms() -> Result<()> {
    println!("{:>3}  {:<6} {:<24} {:>6}  saturation", "idx", "short", "name", "scale");
    for algorithm in Algorithm::ALL {
        println!(
            "{:>3}  {:<6} {:<24} {:>6}  {}",
            algorithm.index(),
            algorithm.short_name(),
            algorithm.display_name(),
            algorithm.output_scale(),
            if algorithm.uses_saturation() { "yes" } else { "-" }
        );
    }
    Ok(())
}
