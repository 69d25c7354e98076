//! rtap-cli - offline renderer
//!
//! Command-line interface for the rtap-dsp effect chain.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use rtap_dsp::cli::{commands, Cli, Commands};
use rtap_dsp::dsp::DistortionSettings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("RTAP Distortion 9000 v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("rtap-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Render(args) => {
            let options = args.to_options().with_context(|| match &args.preset {
                Some(path) => format!("failed to load preset {}", path.display()),
                None => "invalid render options".to_string(),
            })?;
            commands::render(&args.input, &args.output, &options, args.report.as_deref())
                .with_context(|| format!("failed to render {}", args.input.display()))?;
            Ok(())
        }
        Commands::Algorithms => Ok(commands::list_algorithms()?),
        Commands::InitPreset { path } => {
            commands::write_preset(&path, &DistortionSettings::default())
                .with_context(|| format!("failed to write preset {}", path.display()))
        }
    }
}
