//! Console command parsing
//!
//! One command per line. Channels can be given by index (0-3) or stem
//! name; tracks are numbered from 1 as shown in the track list.

use anyhow::{anyhow, bail, Context, Result};
use utsu_core::mixer::MixerCommand;
use utsu_core::types::{EqBand, Stem, NUM_STEMS};

pub const HELP: &str = "\
commands:
  play                      toggle play / stop
  vol <channel> <0-100>     channel volume (channel: 0-3 or drums|bass|melody|vocals)
  master <0-100>            master volume
  eq <channel> <low|mid|high> <0-100>
                            channel EQ band (50 = flat)
  pitch <-50..50>           master pitch / playback rate offset
  track <n>                 switch to track n (1-based)
  state                     show mixer state
  tracks                    list tracks
  events                    show recent mixer events
  help                      this help
  quit                      exit";

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Mixer(MixerCommand),
    State,
    Tracks,
    Events,
    Help,
    Quit,
    /// Blank line
    Empty,
}

/// Parse a single console line
pub fn parse(line: &str) -> Result<ConsoleCommand> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Ok(ConsoleCommand::Empty);
    };

    let command = match (verb.to_ascii_lowercase().as_str(), args) {
        ("play" | "stop" | "p", []) => ConsoleCommand::Mixer(MixerCommand::ToggleTransport),
        ("vol" | "volume", [channel, value]) => {
            ConsoleCommand::Mixer(MixerCommand::SetChannelVolume {
                channel: parse_channel(channel)?,
                value: parse_value(value)?,
            })
        }
        ("master", [value]) => ConsoleCommand::Mixer(MixerCommand::SetMasterVolume {
            value: parse_value(value)?,
        }),
        ("eq", [channel, band, value]) => ConsoleCommand::Mixer(MixerCommand::SetChannelEq {
            channel: parse_channel(channel)?,
            band: EqBand::from_name(band).ok_or_else(|| anyhow!("unknown EQ band '{}'", band))?,
            value: parse_value(value)?,
        }),
        ("pitch", [value]) => ConsoleCommand::Mixer(MixerCommand::SetMasterPitch {
            value: parse_value(value)?,
        }),
        ("track", [number]) => {
            let number: usize = number
                .parse()
                .with_context(|| format!("invalid track number '{}'", number))?;
            if number == 0 {
                bail!("tracks are numbered from 1");
            }
            ConsoleCommand::Mixer(MixerCommand::SelectTrack { index: number - 1 })
        }
        ("state" | "s", []) => ConsoleCommand::State,
        ("tracks", []) => ConsoleCommand::Tracks,
        ("events", []) => ConsoleCommand::Events,
        ("help" | "?", []) => ConsoleCommand::Help,
        ("quit" | "exit" | "q", []) => ConsoleCommand::Quit,
        (other, _) => bail!("unknown command or wrong arguments: '{}' (try 'help')", other),
    };
    Ok(command)
}

fn parse_channel(word: &str) -> Result<usize> {
    if let Some(stem) = Stem::from_name(word) {
        return Ok(stem.index());
    }
    let index: usize = word
        .parse()
        .with_context(|| format!("invalid channel '{}'", word))?;
    if index >= NUM_STEMS {
        bail!("channel {} out of range (0-{})", index, NUM_STEMS - 1);
    }
    Ok(index)
}

fn parse_value(word: &str) -> Result<f32> {
    let value: f32 = word
        .parse()
        .with_context(|| format!("invalid value '{}'", word))?;
    if !value.is_finite() {
        bail!("value must be a finite number");
    }
    Ok(value)
}
