// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::PathBuf;
use std::process;

use clap::{crate_version, Parser};
use keyclack::config::{self, Config};
use keyclack::error::Error;
use keyclack::listener::Listener;
use keyclack::volume::Volume;
use keyclack::{audio, input};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Plays mechanical keyboard sounds as you type.",
    after_help = "Installing the global keyboard hook may require elevated permissions \
                  (root or membership in the input group on Linux, accessibility access on macOS)."
)]
struct Cli {
    /// The sound set to play, a directory under the sounds root.
    #[arg(required_unless_present = "list_devices")]
    sound_set: Option<String>,

    /// Playback volume as an integer percentage. Defaults to 100.
    volume: Option<String>,

    /// Path to a YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The directory holding the sound sets. Defaults to ./sounds.
    #[arg(short, long)]
    sounds: Option<PathBuf>,

    /// The audio output device. Names starting with "mock" play nothing.
    #[arg(short, long)]
    device: Option<String>,

    /// Lists the available audio output devices and exits.
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Help and version go to stdout and are not failures.
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // The keyboard hook runs on a blocking thread that never returns, so exit
    // explicitly rather than waiting for the runtime to shut down.
    match run(cli).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            error!(err = %e, "keyclack stopped");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    if cli.list_devices {
        let devices = audio::list_devices().map_err(|e| Error::Audio(e.to_string()))?;
        if devices.is_empty() {
            println!("No devices found.");
            return Ok(());
        }

        println!("Devices:");
        for device in devices {
            println!("- {}", device);
        }
        return Ok(());
    }

    let sound_set = cli.sound_set.ok_or(Error::MissingSoundSet)?;
    let volume = match cli.volume {
        Some(volume) => volume.parse::<Volume>()?,
        None => Volume::default(),
    };

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(sounds) = cli.sounds {
        config = config.with_sounds_root(sounds);
    }
    if let Some(device) = cli.device {
        config = config.with_device(&device);
    }

    let dispatcher = config::init_dispatcher(&config, &sound_set, volume)?;
    let driver = input::hook_driver()?;
    let mut listener = Listener::new(dispatcher, driver);
    info!(sound_set, "Press keys to play sounds, Ctrl-C to exit.");

    tokio::select! {
        result = listener.join() => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Interrupted, shutting down.");
            Ok(())
        }
    }
}
