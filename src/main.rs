//! Command-line front end: render presets to WAV impulses and inspect
//! their mixing EQ.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use cabforge::eq::EqProcessor;
use cabforge::io::preset::{load_preset, to_json};
use cabforge::{ImpulseConfig, ImpulsePreset, IrError};

#[derive(Parser)]
#[command(name = "cabforge", version, about = "Spectral cabinet impulse builder")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a preset to a stereo WAV plus -L / -R mono companions
    Render {
        /// Preset JSON file
        preset: PathBuf,
        /// Output WAV path
        output: PathBuf,
    },
    /// Print the mixing EQ magnitude response of a preset as JSON
    EqResponse {
        /// Preset JSON file
        preset: PathBuf,
    },
    /// Print a default single-impulse preset as JSON
    DefaultPreset,
}

fn run(cli: Cli) -> Result<(), IrError> {
    match cli.command {
        Command::Render { preset, output } => {
            for path in cabforge::render_preset_file(&preset, &output)? {
                println!("{}", path.display());
            }
        }
        Command::EqResponse { preset } => {
            let preset = load_preset(&preset)?;
            let eq = EqProcessor::new(&preset.mixing_config, preset.samplerate_transformed() as f64);
            println!("{}", serde_json::to_string_pretty(&eq.frequency_response())?);
        }
        Command::DefaultPreset => {
            let mut preset = ImpulsePreset::default();
            preset.add_impulse(ImpulseConfig::named("Impulse 1"));
            println!("{}", to_json(&preset)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    cabforge::init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
