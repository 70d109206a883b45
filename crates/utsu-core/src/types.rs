//! Common types for Utsu
//!
//! Stems, EQ bands and the pure value mappings that turn slider positions
//! into audio-graph parameters. Every parameter the mixer writes to the
//! graph goes through one of the functions in this module.

use serde::{Deserialize, Serialize};

/// Number of stems per track (and channel strips in the mixer)
pub const NUM_STEMS: usize = 4;

/// Lowest channel/master volume (percent)
pub const VOLUME_MIN: f32 = 0.0;
/// Highest channel/master volume (percent)
pub const VOLUME_MAX: f32 = 100.0;

/// Lowest EQ slider position
pub const EQ_MIN: f32 = 0.0;
/// Highest EQ slider position
pub const EQ_MAX: f32 = 100.0;
/// EQ slider position that maps to 0 dB
pub const EQ_FLAT: f32 = 50.0;
/// Slider units per dB of filter gain
const EQ_UNITS_PER_DB: f32 = 5.0;

/// Lowest master pitch offset (percent of playback rate)
pub const PITCH_MIN: f32 = -50.0;
/// Highest master pitch offset (percent of playback rate)
pub const PITCH_MAX: f32 = 50.0;

/// Stem identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum Stem {
    Drums = 0,
    Bass = 1,
    Melody = 2,
    Vocals = 3,
}

impl Stem {
    /// Get all stems in channel order
    pub const ALL: [Stem; NUM_STEMS] = [Stem::Drums, Stem::Bass, Stem::Melody, Stem::Vocals];

    /// Convert from channel index (0-3) to Stem
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Channel index of this stem
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the name of this stem
    pub fn name(&self) -> &'static str {
        match self {
            Stem::Drums => "drums",
            Stem::Bass => "bass",
            Stem::Melody => "melody",
            Stem::Vocals => "vocals",
        }
    }

    /// Parse a lowercase stem name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|stem| stem.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Frequency response of an EQ filter stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowShelf,
    Peaking,
    HighShelf,
}

/// EQ bands of a channel strip, in signal-chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EqBand {
    Low,
    Mid,
    High,
}

impl EqBand {
    /// All bands in chain order (source → low → mid → high → gain)
    pub const ALL: [EqBand; 3] = [EqBand::Low, EqBand::Mid, EqBand::High];

    /// Filter response used for this band
    pub fn filter_kind(self) -> FilterKind {
        match self {
            EqBand::Low => FilterKind::LowShelf,
            EqBand::Mid => FilterKind::Peaking,
            EqBand::High => FilterKind::HighShelf,
        }
    }

    /// Characteristic frequency in Hz
    pub fn frequency(self) -> f32 {
        match self {
            EqBand::Low => 200.0,
            EqBand::Mid => 1000.0,
            EqBand::High => 3000.0,
        }
    }

    /// Filter Q (only meaningful for the peaking band)
    pub fn q(self) -> f32 {
        1.0
    }

    pub fn name(self) -> &'static str {
        match self {
            EqBand::Low => "low",
            EqBand::Mid => "mid",
            EqBand::High => "high",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|band| band.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for EqBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Clamp a volume slider value into 0..=100
#[inline]
pub fn clamp_volume(value: f32) -> f32 {
    value.clamp(VOLUME_MIN, VOLUME_MAX)
}

/// Clamp an EQ slider value into 0..=100
#[inline]
pub fn clamp_eq(value: f32) -> f32 {
    value.clamp(EQ_MIN, EQ_MAX)
}

/// Clamp a pitch slider value into -50..=50
#[inline]
pub fn clamp_pitch(value: f32) -> f32 {
    value.clamp(PITCH_MIN, PITCH_MAX)
}

/// Linear gain-stage level for a channel: `(volume/100) * (master/100)`
#[inline]
pub fn channel_gain(volume: f32, master: f32) -> f32 {
    (volume / VOLUME_MAX) * (master / VOLUME_MAX)
}

/// Filter gain in dB for an EQ slider position
///
/// 0 → -10 dB, 50 → 0 dB, 100 → +10 dB, linear in between.
#[inline]
pub fn eq_gain_db(value: f32) -> f32 {
    (value - EQ_FLAT) / EQ_UNITS_PER_DB
}

/// Playback-rate multiplier for a master pitch offset
///
/// Rate and pitch move together: there is no independent time-stretch.
#[inline]
pub fn playback_rate(pitch: f32) -> f32 {
    1.0 + pitch / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_stem_order_and_names() {
        assert_eq!(Stem::ALL.len(), NUM_STEMS);
        for (idx, stem) in Stem::ALL.iter().enumerate() {
            assert_eq!(stem.index(), idx);
            assert_eq!(Stem::from_index(idx), Some(*stem));
            assert_eq!(Stem::from_name(stem.name()), Some(*stem));
        }
        assert_eq!(Stem::from_index(4), None);
        assert_eq!(Stem::from_name("Vocals"), Some(Stem::Vocals));
        assert_eq!(Stem::from_name("other"), None);
    }

    #[test]
    fn test_channel_gain() {
        assert!(approx(channel_gain(75.0, 80.0), 0.6));
        assert!(approx(channel_gain(75.0, 40.0), 0.3));
        assert!(approx(channel_gain(0.0, 100.0), 0.0));
        assert!(approx(channel_gain(100.0, 100.0), 1.0));
    }

    #[test]
    fn test_eq_mapping_is_affine() {
        assert!(approx(eq_gain_db(0.0), -10.0));
        assert!(approx(eq_gain_db(50.0), 0.0));
        assert!(approx(eq_gain_db(100.0), 10.0));
        assert!(approx(eq_gain_db(75.0), 5.0));
        assert!(approx(eq_gain_db(25.0), -5.0));
    }

    #[test]
    fn test_playback_rate() {
        assert!(approx(playback_rate(0.0), 1.0));
        assert!(approx(playback_rate(50.0), 1.5));
        assert!(approx(playback_rate(-50.0), 0.5));
    }

    #[test]
    fn test_band_characteristics() {
        assert_eq!(EqBand::Low.filter_kind(), FilterKind::LowShelf);
        assert_eq!(EqBand::Mid.filter_kind(), FilterKind::Peaking);
        assert_eq!(EqBand::High.filter_kind(), FilterKind::HighShelf);
        assert_eq!(EqBand::Low.frequency(), 200.0);
        assert_eq!(EqBand::Mid.frequency(), 1000.0);
        assert_eq!(EqBand::High.frequency(), 3000.0);
        assert_eq!(EqBand::Mid.q(), 1.0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(clamp_volume(120.0), 100.0);
        assert_eq!(clamp_volume(-3.0), 0.0);
        assert_eq!(clamp_eq(101.0), 100.0);
        assert_eq!(clamp_pitch(-80.0), -50.0);
        assert_eq!(clamp_pitch(12.0), 12.0);
    }
}
