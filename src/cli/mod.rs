use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::domain::{time::format_time, track::FileId, track::TrackRef};
use crate::http::{ProgressClient, urls::Endpoints};
use crate::player::rate::{RATE_STORAGE_KEY, RateControl};
use crate::storage::{LocalStorage, db::i64_seconds_to_local_time};

mod session;

#[derive(Parser)]
#[command(name = "progressdeck")]
#[command(version = "0.1")]
#[command(about = "Playback client that keeps listening progress in sync with a progress service")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a file headlessly, resuming from and saving to the progress service
    Play {
        /// File identifier as known to the service, e.g. podcasts/ep1.mp3
        file: String,
        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,
        /// Display name, defaults to the file name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show stored progress of a file
    Status { file: String },
    /// Show or set the persisted playback rate
    Rate { value: Option<String> },
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::Config::load(&cli.config.to_string_lossy())?;

    match cli.command {
        Commands::Play {
            file,
            duration,
            name,
        } => {
            let track = match name {
                Some(name) => TrackRef::new(file, name),
                None => TrackRef::from_file(file),
            };
            session::play(&cfg, track, duration)
        }

        Commands::Status { file } => {
            let endpoints = Endpoints::new(&cfg.server.base_url);
            let client = ProgressClient::new(
                endpoints,
                cfg.server.session_cookie.as_deref(),
                cfg.server.timeout(),
            )?;
            let record = client
                .get_progress(&FileId::new(&file))
                .with_context(|| format!("Failed to fetch progress for {file}"))?;

            println!("{file}");
            match record.known_duration() {
                Some(duration) => println!(
                    "  position: {} of {}",
                    format_time(record.resume_position()),
                    format_time(duration)
                ),
                None => println!("  position: {}", format_time(record.resume_position())),
            }
            if record.played {
                println!("  played");
            }
            Ok(())
        }

        Commands::Rate { value } => {
            let storage = LocalStorage::new(&cfg.storage)?;
            let updated_at = storage.updated_at(RATE_STORAGE_KEY)?;
            let mut rate = RateControl::init(Box::new(storage), cfg.playback.rate_options);

            match value {
                None => {
                    println!("Playback rate: {}", rate.current());
                    if let Some(updated_at) = updated_at {
                        println!("  set {}", i64_seconds_to_local_time(updated_at)?);
                    }
                    let options = rate
                        .options()
                        .iter()
                        .enumerate()
                        .map(|(i, option)| {
                            if Some(i) == rate.active_option() {
                                format!("[{option}]")
                            } else {
                                option.to_string()
                            }
                        })
                        .collect::<Vec<_>>();
                    println!("  options: {}", options.join(" "));
                }
                Some(value) => {
                    let parsed = value.trim().parse::<f64>().unwrap_or(f64::NAN);
                    match rate.set_rate(parsed, true) {
                        Some(applied) => println!("Playback rate set to {applied}"),
                        None => println!(
                            "Invalid playback rate {value:?}, keeping {}",
                            rate.current()
                        ),
                    }
                }
            }
            Ok(())
        }
    }
}
