//! CLI Module
//!
//! Command-line interface for offline rendering through the distortion chain.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::dsp::DistortionSettings;
use crate::engine::ExportFormat;
use crate::error::Result;
use commands::RenderOptions;

/// RTAP Distortion 9000 - filters and waveshaping distortion
#[derive(Parser, Debug)]
#[command(name = "rtap-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a mono WAV file through the effect chain
    #[command(name = "render", allow_negative_numbers = true)]
    Render(RenderArgs),

    /// List the waveshaper algorithms
    #[command(name = "algorithms")]
    Algorithms,

    /// Write a preset file with the default settings
    #[command(name = "init-preset")]
    InitPreset {
        /// Path of the preset to create
        path: PathBuf,
    },
}

/// Arguments of the `render` command
///
/// Flags override the values loaded from `--preset`.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Input mono WAV file
    pub input: PathBuf,

    /// Output WAV file
    pub output: PathBuf,

    /// JSON preset with distortion settings
    #[arg(short, long)]
    pub preset: Option<PathBuf>,

    /// Dry/wet mix (0 = dry, 1 = wet)
    #[arg(long)]
    pub mix: Option<f32>,

    /// Waveshaper index (0-15, see `algorithms`)
    #[arg(short, long)]
    pub algorithm: Option<f32>,

    /// Saturation (1-10)
    #[arg(short, long)]
    pub saturation: Option<f32>,

    /// Bandpass center frequency in Hz (50-20000)
    #[arg(short, long)]
    pub frequency: Option<f32>,

    /// Bandpass quality (0-16]
    #[arg(short, long)]
    pub quality: Option<f32>,

    /// Bandpass gain in dB
    #[arg(short, long)]
    pub gain: Option<f32>,

    /// Skip the bandpass pre-filter
    #[arg(long)]
    pub no_bandpass: bool,

    /// Band-limit the input with the Linkwitz-Riley crossover
    #[arg(long)]
    pub crossover: bool,

    /// Crossover highpass cutoff in Hz
    #[arg(long, default_value_t = crate::dsp::DEFAULT_HIGHPASS_HZ)]
    pub highpass: f32,

    /// Crossover lowpass cutoff in Hz
    #[arg(long, default_value_t = crate::dsp::DEFAULT_LOWPASS_HZ)]
    pub lowpass: f32,

    /// Linear output level applied after the distortion
    #[arg(short, long)]
    pub level: Option<f32>,

    /// Samples per processing block
    #[arg(short, long, default_value_t = 64)]
    pub block_size: usize,

    /// Output bit depth (16, 24, or 32 float)
    #[arg(long, default_value_t = 32)]
    pub bit_depth: u16,

    /// Write a JSON render report here
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RenderArgs {
    /// Merge preset and flags into render options
    pub fn to_options(&self) -> Result<RenderOptions> {
        let mut settings = match &self.preset {
            Some(path) => commands::load_preset(path)?,
            None => DistortionSettings::default(),
        };

        if let Some(mix) = self.mix {
            settings.mix = mix;
        }
        if let Some(algorithm) = self.algorithm {
            settings.algorithm = algorithm.trunc() as i32;
        }
        if let Some(saturation) = self.saturation {
            settings.saturation = saturation;
        }
        if let Some(frequency) = self.frequency {
            settings.frequency = frequency;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(gain) = self.gain {
            settings.gain_db = gain;
        }
        if self.no_bandpass {
            settings.bandpass = false;
        }

        Ok(RenderOptions {
            settings,
            crossover: self.crossover.then_some((self.highpass, self.lowpass)),
            level: self.level,
            block_size: self.block_size.max(1),
            format: ExportFormat::new(self.bit_depth),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "rtap-cli",
            "render",
            "in.wav",
            "out.wav",
            "--mix",
            "0.5",
            "-a",
            "3",
            "--gain",
            "-6",
            "--no-bandpass",
            "--crossover",
            "--lowpass",
            "8000",
        ]);
        let Some(Commands::Render(args)) = cli.command else {
            panic!("expected render command");
        };
        let options = args.to_options().unwrap();

        assert_eq!(options.settings.mix, 0.5);
        assert_eq!(options.settings.algorithm, 3);
        assert_eq!(options.settings.gain_db, -6.0);
        assert!(!options.settings.bandpass);
        assert_eq!(options.settings.quality, 1.0);
        assert_eq!(options.crossover, Some((30.0, 8000.0)));
        assert_eq!(options.level, None);
        assert_eq!(options.block_size, 64);
    }

    #[test]
    fn test_negative_values_parse() {
        let cli = Cli::try_parse_from([
            "rtap-cli", "render", "in.wav", "out.wav", "-a", "-1", "--mix", "-0.2", "-f",
            "-5",
        ])
        .unwrap();
        let Some(Commands::Render(args)) = cli.command else {
            panic!("expected render command");
        };
        let options = args.to_options().unwrap();

        // Out-of-range index is kept and selects dry pass-through
        assert_eq!(options.settings.algorithm, -1);
        assert_eq!(options.settings.mix, -0.2);
        assert_eq!(options.settings.frequency, -5.0);
        assert!(options.settings.algorithm().is_none());
    }
}
