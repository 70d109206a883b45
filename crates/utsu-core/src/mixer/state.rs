//! UI-facing mixer state

use crate::types::{EqBand, Stem, EQ_FLAT, NUM_STEMS};

/// Slider state of one channel strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelState {
    /// Channel volume (0-100)
    pub volume: f32,
    /// Low band position (0-100, 50 = flat)
    pub eq_low: f32,
    /// Mid band position (0-100, 50 = flat)
    pub eq_mid: f32,
    /// High band position (0-100, 50 = flat)
    pub eq_high: f32,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new(75.0, EQ_FLAT)
    }
}

impl ChannelState {
    /// Channel with the given volume and every band at `eq`
    pub fn new(volume: f32, eq: f32) -> Self {
        Self {
            volume,
            eq_low: eq,
            eq_mid: eq,
            eq_high: eq,
        }
    }

    /// Position of one EQ band
    pub fn eq(&self, band: EqBand) -> f32 {
        match band {
            EqBand::Low => self.eq_low,
            EqBand::Mid => self.eq_mid,
            EqBand::High => self.eq_high,
        }
    }

    pub(crate) fn set_eq(&mut self, band: EqBand, value: f32) {
        match band {
            EqBand::Low => self.eq_low = value,
            EqBand::Mid => self.eq_mid = value,
            EqBand::High => self.eq_high = value,
        }
    }
}

/// Snapshot of the whole session for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Master volume (0-100)
    pub master_volume: f32,
    /// Master pitch offset (-50..50 percent of playback rate)
    pub master_pitch: f32,
    pub is_playing: bool,
    /// Index into the track catalog
    pub selected_track: usize,
    /// Channel strips in stem order
    pub channels: [ChannelState; NUM_STEMS],
}

impl SessionState {
    pub fn channel(&self, stem: Stem) -> &ChannelState {
        &self.channels[stem.index()]
    }
}
