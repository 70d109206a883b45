//! Mixer commands
//!
//! Every state change the UI can request, as a value. Front-ends parse
//! their input into a [`MixerCommand`] and hand it to
//! [`MixerController::apply`](super::MixerController::apply).

use crate::types::EqBand;

/// Operations the UI may perform on the mixer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixerCommand {
    /// Flip between playing and stopped
    ToggleTransport,
    /// Set one channel's volume (0-100)
    SetChannelVolume { channel: usize, value: f32 },
    /// Set the master volume (0-100)
    SetMasterVolume { value: f32 },
    /// Set one EQ band of one channel (0-100, 50 = flat)
    SetChannelEq { channel: usize, band: EqBand, value: f32 },
    /// Set the master pitch offset (-50..50)
    SetMasterPitch { value: f32 },
    /// Switch every channel to another track's stems
    SelectTrack { index: usize },
}
