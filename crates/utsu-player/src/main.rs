//! Utsu Player - console front-end for the 4-stem mixer
//!
//! This is the main entry point. It:
//! 1. Loads the player config and the track catalog
//! 2. Builds the mixer over the headless audio graph
//! 3. Reads commands from stdin on a background thread while the main
//!    thread ticks the mixer's event pump
//!
//! ## Command line flags
//!
//! - `--config <path>`: Use a config file other than ~/.config/utsu/config.yaml
//! - `--write-config`: Write the default config to the config path and exit

mod config;
mod console;
mod view;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError};

use config::PlayerConfig;
use console::ConsoleCommand;
use utsu_core::catalog::TrackCatalog;
use utsu_core::config::{default_config_path, save_config};
use utsu_core::events::{FanoutSink, LogSink, MemorySink};
use utsu_core::graph::HeadlessGraph;
use utsu_core::mixer::MixerController;

/// Event pump interval while waiting for input
const TICK: Duration = Duration::from_millis(20);

/// Number of recent events kept for the `events` command
const EVENT_HISTORY: usize = 20;

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    write_config: bool,
}

impl Args {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().context("--config needs a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--write-config" => parsed.write_config = true,
                other => bail!("unknown argument: {}", other),
            }
        }
        Ok(parsed)
    }
}

fn main() -> Result<()> {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config_path = args
        .config
        .unwrap_or_else(|| default_config_path("config.yaml"));

    if args.write_config {
        save_config(&PlayerConfig::default(), &config_path)?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    log::info!("utsu-player starting up");
    let config = PlayerConfig::load(&config_path);

    let catalog = match &config.catalog_path {
        Some(path) => TrackCatalog::load(path)
            .with_context(|| format!("Failed to load track catalog {:?}", path))?,
        None => {
            log::info!("No catalog configured, using the reference tracks");
            TrackCatalog::reference()
        }
    };

    let graph = HeadlessGraph::new().with_locator_check(config.locator_check());
    let history = MemorySink::bounded(EVENT_HISTORY);
    let sink = FanoutSink::new()
        .with(Arc::new(LogSink))
        .with(Arc::new(history.clone()));
    let mut mixer = MixerController::new(graph, catalog, &config.mixer, Arc::new(sink))
        .context("Failed to build mixer")?;

    println!("UTSU - 4-stem mixer");
    println!("{}", view::render_tracks(mixer.catalog(), 0));
    println!("{}", view::render_state(&mixer.state(), mixer.catalog()));
    println!("Type 'help' for commands.");

    let lines = spawn_stdin_reader();
    loop {
        match lines.recv_timeout(TICK) {
            Ok(line) => {
                mixer.poll();
                match console::parse(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => run_command(&mut mixer, &history, command),
                    Err(e) => println!("error: {:#}", e),
                }
            }
            Err(RecvTimeoutError::Timeout) => mixer.poll(),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::info!("utsu-player stopped");
    Ok(())
}

fn run_command(
    mixer: &mut MixerController<HeadlessGraph>,
    history: &MemorySink,
    command: ConsoleCommand,
) {
    match command {
        ConsoleCommand::Mixer(command) => match mixer.apply(command) {
            Ok(()) => print!("{}", view::render_state(&mixer.state(), mixer.catalog())),
            Err(e) => println!("error: {}", e),
        },
        ConsoleCommand::State => {
            print!("{}", view::render_state(&mixer.state(), mixer.catalog()))
        }
        ConsoleCommand::Tracks => print!(
            "{}",
            view::render_tracks(mixer.catalog(), mixer.state().selected_track)
        ),
        ConsoleCommand::Events => {
            for event in history.events() {
                println!("  {}", event);
            }
        }
        ConsoleCommand::Help => println!("{}", console::HELP),
        ConsoleCommand::Quit | ConsoleCommand::Empty => {}
    }
}

/// Forward stdin lines to the main loop; the channel closes on EOF
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
        })
        .map(|_| ())
        .unwrap_or_else(|e| log::error!("Failed to spawn stdin reader: {}", e));
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(args(&[]).unwrap(), Args::default());
        assert_eq!(
            args(&["--config", "/tmp/utsu.yaml", "--write-config"]).unwrap(),
            Args {
                config: Some(PathBuf::from("/tmp/utsu.yaml")),
                write_config: true,
            }
        );
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--midi-learn"]).is_err());
    }

    #[test]
    fn test_run_command_drives_mixer() {
        let history = MemorySink::bounded(EVENT_HISTORY);
        let mut mixer = MixerController::new(
            HeadlessGraph::new(),
            TrackCatalog::reference(),
            &Default::default(),
            Arc::new(history.clone()),
        )
        .unwrap();

        for line in ["play", "master 40", "eq 2 high 100", "track 2"] {
            let command = console::parse(line).unwrap();
            run_command(&mut mixer, &history, command);
        }
        mixer.poll();

        let state = mixer.state();
        assert!(state.is_playing);
        assert_eq!(state.master_volume, 40.0);
        assert_eq!(state.channels[2].eq_high, 100.0);
        assert_eq!(state.selected_track, 1);
        assert!(!mixer.has_pending_plays());
        assert!(mixer.graph().sources().iter().all(|s| s.playing));
        assert!(history.events().len() <= EVENT_HISTORY);
    }
}
