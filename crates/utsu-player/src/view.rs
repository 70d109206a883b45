//! Text rendering of the mixer state

use std::fmt::Write;

use utsu_core::catalog::TrackCatalog;
use utsu_core::mixer::SessionState;
use utsu_core::types::Stem;

/// Render the session as a small text panel
pub fn render_state(state: &SessionState, catalog: &TrackCatalog) -> String {
    let mut out = String::new();
    let track = catalog
        .get(state.selected_track)
        .map(|t| t.name.as_str())
        .unwrap_or("?");

    let _ = writeln!(
        out,
        "{}  track {} ({})  MASTER_VOL {:>3.0}  PITCH_BEND {:+.0}%",
        if state.is_playing { "▶ PLAYING" } else { "■ STOPPED" },
        state.selected_track + 1,
        track,
        state.master_volume,
        state.master_pitch,
    );
    for (channel, stem) in Stem::ALL.iter().enumerate() {
        let strip = state.channel(*stem);
        let _ = writeln!(
            out,
            "  {} {:<7} vol {:>3.0}  eq {:>3.0} / {:>3.0} / {:>3.0}",
            channel, stem, strip.volume, strip.eq_low, strip.eq_mid, strip.eq_high,
        );
    }
    out
}

/// Render the track list, marking the selected track
pub fn render_tracks(catalog: &TrackCatalog, selected: usize) -> String {
    let mut out = String::new();
    for (index, track) in catalog.iter().enumerate() {
        let marker = if index == selected { '*' } else { ' ' };
        let _ = writeln!(out, "{} {:>2}. {}", marker, index + 1, track.name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use utsu_core::mixer::ChannelState;

    fn state() -> SessionState {
        SessionState {
            master_volume: 80.0,
            master_pitch: 10.0,
            is_playing: true,
            selected_track: 1,
            channels: [ChannelState::default(); 4],
        }
    }

    #[test]
    fn test_render_state() {
        let text = render_state(&state(), &TrackCatalog::reference());
        assert!(text.contains("PLAYING"));
        assert!(text.contains("TRACK_02"));
        assert!(text.contains("PITCH_BEND +10%"));
        assert!(text.contains("vocals"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_render_tracks_marks_selection() {
        let text = render_tracks(&TrackCatalog::reference(), 2);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with('*'));
        assert!(lines[0].starts_with(' '));
    }
}
