//! Mixer controller
//!
//! Owns the audio graph, the per-channel handle table and the UI-facing
//! state. All calls happen on the UI thread; nothing here blocks.
//!
//! # Deferred play after a track change
//!
//! Rebinding a source is not instantaneous, so a play request issued right
//! after a track change may be ineffective. Channels rebound while the
//! session is playing therefore wait in a pending state:
//!
//! - If the graph signals readiness, play is issued on the source's
//!   [`SourceEvent::Ready`], or after `ready_timeout` at the latest.
//! - Otherwise play is issued once `retry_delay` has elapsed.
//!
//! Pending plays are resolved by [`MixerController::poll`], which the UI
//! calls from its tick. Stopping the transport or switching tracks again
//! drops them. Notifications are matched against each channel's latest
//! [`LoadId`]; late events from an earlier binding are ignored.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::chain::ChannelChain;
use super::command::MixerCommand;
use super::error::{MixerError, MixerResult};
use super::state::{ChannelState, SessionState};
use crate::catalog::{Track, TrackCatalog};
use crate::config::MixerConfig;
use crate::events::{EventKind, EventSink, MixerEvent};
use crate::graph::{AudioGraph, ContextState, LoadId, SourceEvent, SourceId};
use crate::types::{
    channel_gain, clamp_eq, clamp_pitch, clamp_volume, eq_gain_db, playback_rate, EqBand, Stem,
    NUM_STEMS,
};

/// A play request waiting for its source to become ready
#[derive(Debug, Clone, Copy)]
struct PendingPlay {
    load: LoadId,
    deadline: Instant,
}

/// Live 4-stem mixer over an [`AudioGraph`]
pub struct MixerController<G: AudioGraph> {
    graph: G,
    catalog: TrackCatalog,
    sink: Arc<dyn EventSink>,

    /// Handle table: channel index → owned nodes
    chains: [ChannelChain; NUM_STEMS],
    /// Latest successful binding per channel
    bindings: [Option<LoadId>; NUM_STEMS],
    channels: [ChannelState; NUM_STEMS],
    pending: [Option<PendingPlay>; NUM_STEMS],

    master_volume: f32,
    master_pitch: f32,
    is_playing: bool,
    selected_track: usize,

    retry_delay: Duration,
    ready_timeout: Duration,
}

impl<G: AudioGraph> MixerController<G> {
    /// Build the graph and bind every channel to the first track's stems
    ///
    /// A stem that fails to load is reported and leaves its channel silent;
    /// the other channels are unaffected. Only a failure to wire the graph
    /// itself is returned as an error.
    pub fn new(
        mut graph: G,
        catalog: TrackCatalog,
        config: &MixerConfig,
        sink: Arc<dyn EventSink>,
    ) -> MixerResult<Self> {
        let config = config.sanitized();
        let channel = ChannelState::new(config.channel_volume, config.eq);
        let level = channel_gain(channel.volume, config.master_volume);
        let eq_db = eq_gain_db(config.eq);

        let mut built = Vec::with_capacity(NUM_STEMS);
        for _ in Stem::ALL {
            let chain = ChannelChain::build(&mut graph, level, eq_db)?;
            graph.set_playback_rate(chain.source, playback_rate(0.0));
            built.push(chain);
        }
        let chains: [ChannelChain; NUM_STEMS] = std::array::from_fn(|i| built[i]);

        let mut mixer = Self {
            graph,
            catalog,
            sink,
            chains,
            bindings: [None; NUM_STEMS],
            channels: [channel; NUM_STEMS],
            pending: [None; NUM_STEMS],
            master_volume: config.master_volume,
            master_pitch: 0.0,
            is_playing: false,
            selected_track: 0,
            retry_delay: config.retry_delay(),
            ready_timeout: config.ready_timeout(),
        };

        let locators = mixer.track_locators(0)?;
        for (channel, locator) in locators.iter().enumerate() {
            mixer.bind_source(channel, locator);
        }

        log::info!(
            "MixerController: {} channels ready, {} tracks in catalog",
            NUM_STEMS,
            mixer.catalog.len()
        );
        Ok(mixer)
    }

    // ─────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────

    /// Flip between playing and stopped
    ///
    /// A suspended context is resumed first. Each channel's play request
    /// succeeds or fails on its own; failures are reported, not rolled back.
    pub fn toggle_transport(&mut self) {
        self.is_playing = !self.is_playing;
        self.pending = [None; NUM_STEMS];

        self.ensure_context_running();

        if self.is_playing {
            for channel in 0..NUM_STEMS {
                self.play_channel(channel);
            }
        } else {
            for chain in &self.chains {
                self.graph.pause(chain.source);
            }
        }

        let detail = if self.is_playing { "playing" } else { "stopped" };
        self.emit(MixerEvent::session(EventKind::TransportChanged, detail));
    }

    // ─────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────

    /// Set one channel's volume and update only that channel's gain stage
    pub fn set_channel_volume(&mut self, channel: usize, value: f32) -> MixerResult<()> {
        self.check_channel(channel)?;
        check_finite(value)?;
        self.channels[channel].volume = clamp_volume(value);
        self.apply_channel_gain(channel);
        Ok(())
    }

    /// Set the master volume and recompute every channel's gain stage
    pub fn set_master_volume(&mut self, value: f32) -> MixerResult<()> {
        check_finite(value)?;
        self.master_volume = clamp_volume(value);
        for channel in 0..NUM_STEMS {
            self.apply_channel_gain(channel);
        }
        Ok(())
    }

    /// Set one EQ band of one channel
    pub fn set_channel_eq(&mut self, channel: usize, band: EqBand, value: f32) -> MixerResult<()> {
        self.check_channel(channel)?;
        check_finite(value)?;
        let value = clamp_eq(value);
        self.channels[channel].set_eq(band, value);
        let filter = self.chains[channel].filter(band);
        self.graph.set_filter_gain(filter, eq_gain_db(value));
        Ok(())
    }

    /// Set the master pitch; every source gets the same playback rate
    pub fn set_master_pitch(&mut self, value: f32) -> MixerResult<()> {
        check_finite(value)?;
        self.master_pitch = clamp_pitch(value);
        let rate = playback_rate(self.master_pitch);
        for chain in &self.chains {
            self.graph.set_playback_rate(chain.source, rate);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Track selection
    // ─────────────────────────────────────────────────────────────

    /// Rebind every channel to another track's stems
    ///
    /// Each old source is stopped before it is rebound, so the previous
    /// track never keeps sounding. Volume, EQ and pitch carry over. When
    /// the session was playing, play is re-issued per channel once the new
    /// source is ready (see module docs). Selecting the current track is a
    /// no-op.
    pub fn select_track(&mut self, index: usize) -> MixerResult<()> {
        let locators = self.track_locators(index)?;
        if index == self.selected_track {
            log::debug!("select_track: track {} already selected", index);
            return Ok(());
        }

        // Supersede pending plays, then flush notifications that belong to
        // the old bindings so they can't trigger plays on the new ones
        self.pending = [None; NUM_STEMS];
        self.drain_events();

        self.selected_track = index;
        let resume = self.is_playing;
        let wait = if self.graph.emits_ready_events() {
            self.ready_timeout
        } else {
            self.retry_delay
        };
        let deadline = Instant::now() + wait;
        let rate = playback_rate(self.master_pitch);

        for (channel, locator) in locators.iter().enumerate() {
            let source = self.chains[channel].source;
            self.graph.stop(source);
            let bound = self.bind_source(channel, locator);
            self.graph.set_playback_rate(source, rate);

            if let (true, Some(load)) = (resume, bound) {
                self.pending[channel] = Some(PendingPlay { load, deadline });
            }
        }

        let name = self.current_track().name.clone();
        self.emit(MixerEvent::session(
            EventKind::TrackSelected,
            format!("{} (index {})", name, index),
        ));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Event pump
    // ─────────────────────────────────────────────────────────────

    /// Process source notifications and due deferred plays
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    /// [`poll`](Self::poll) with an explicit current time
    pub fn poll_at(&mut self, now: Instant) {
        self.drain_events();

        for channel in 0..NUM_STEMS {
            let due = self.pending[channel].is_some_and(|p| now >= p.deadline);
            if due {
                self.pending[channel] = None;
                self.emit(MixerEvent::channel(
                    channel,
                    EventKind::DeferredPlay,
                    "no readiness signal, playing after delay",
                ));
                self.play_channel(channel);
            }
        }
    }

    /// Whether any channel is still waiting to resume after a track change
    pub fn has_pending_plays(&self) -> bool {
        self.pending.iter().any(Option::is_some)
    }

    // ─────────────────────────────────────────────────────────────
    // Dispatch and state
    // ─────────────────────────────────────────────────────────────

    /// Apply a UI command
    pub fn apply(&mut self, command: MixerCommand) -> MixerResult<()> {
        match command {
            MixerCommand::ToggleTransport => self.toggle_transport(),
            MixerCommand::SetChannelVolume { channel, value } => {
                self.set_channel_volume(channel, value)?
            }
            MixerCommand::SetMasterVolume { value } => self.set_master_volume(value)?,
            MixerCommand::SetChannelEq {
                channel,
                band,
                value,
            } => self.set_channel_eq(channel, band, value)?,
            MixerCommand::SetMasterPitch { value } => self.set_master_pitch(value)?,
            MixerCommand::SelectTrack { index } => self.select_track(index)?,
        }
        Ok(())
    }

    /// Snapshot of the session for rendering
    pub fn state(&self) -> SessionState {
        SessionState {
            master_volume: self.master_volume,
            master_pitch: self.master_pitch,
            is_playing: self.is_playing,
            selected_track: self.selected_track,
            channels: self.channels,
        }
    }

    pub fn channel(&self, channel: usize) -> Option<&ChannelState> {
        self.channels.get(channel)
    }

    pub fn chain(&self, channel: usize) -> Option<&ChannelChain> {
        self.chains.get(channel)
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    pub fn current_track(&self) -> &Track {
        // selected_track is only ever set to a validated index
        &self.catalog.tracks()[self.selected_track]
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    // ─────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────

    fn emit(&self, event: MixerEvent) {
        self.sink.emit(event);
    }

    fn check_channel(&self, channel: usize) -> MixerResult<()> {
        if channel < NUM_STEMS {
            Ok(())
        } else {
            Err(MixerError::InvalidChannel(channel))
        }
    }

    fn track_locators(&self, index: usize) -> MixerResult<[String; NUM_STEMS]> {
        let track = self.catalog.get(index).ok_or(MixerError::InvalidTrack {
            index,
            count: self.catalog.len(),
        })?;
        Ok(Stem::ALL.map(|stem| track.source(stem).to_string()))
    }

    fn apply_channel_gain(&mut self, channel: usize) {
        let level = channel_gain(self.channels[channel].volume, self.master_volume);
        self.graph.set_gain(self.chains[channel].gain, level);
    }

    /// Bind a channel's source, reporting failures
    fn bind_source(&mut self, channel: usize, locator: &str) -> Option<LoadId> {
        let bound = match self.graph.load(self.chains[channel].source, locator) {
            Ok(load) => Some(load),
            Err(e) => {
                self.emit(MixerEvent::channel(
                    channel,
                    EventKind::SourceLoadFailed,
                    e.to_string(),
                ));
                None
            }
        };
        self.bindings[channel] = bound;
        bound
    }

    fn play_channel(&mut self, channel: usize) {
        if let Err(e) = self.graph.play(self.chains[channel].source) {
            self.emit(MixerEvent::channel(channel, EventKind::PlayFailed, e.to_string()));
        }
    }

    fn ensure_context_running(&mut self) {
        if self.graph.context_state() != ContextState::Suspended {
            return;
        }
        match self.graph.resume() {
            Ok(()) => self.emit(MixerEvent::session(
                EventKind::ContextResumed,
                "audio context resumed",
            )),
            Err(e) => self.emit(MixerEvent::session(
                EventKind::ContextResumeFailed,
                e.to_string(),
            )),
        }
    }

    /// Channel whose latest binding produced this notification
    fn current_channel(&self, source: SourceId, load: LoadId) -> Option<usize> {
        let channel = self.chains.iter().position(|chain| chain.source == source)?;
        if self.bindings[channel] == Some(load) {
            Some(channel)
        } else {
            log::debug!(
                "drain_events: ignoring stale notification for channel {} ({:?})",
                channel,
                load
            );
            None
        }
    }

    fn drain_events(&mut self) {
        while let Some(event) = self.graph.poll_event() {
            match event {
                SourceEvent::Ready { source, load } => {
                    let Some(channel) = self.current_channel(source, load) else {
                        continue;
                    };
                    self.emit(MixerEvent::channel(
                        channel,
                        EventKind::SourceReady,
                        "source ready",
                    ));
                    if self.pending[channel].is_some_and(|p| p.load == load) {
                        self.pending[channel] = None;
                        self.emit(MixerEvent::channel(
                            channel,
                            EventKind::DeferredPlay,
                            "source ready, playing",
                        ));
                        self.play_channel(channel);
                    }
                }
                SourceEvent::Failed {
                    source,
                    load,
                    reason,
                } => {
                    let Some(channel) = self.current_channel(source, load) else {
                        continue;
                    };
                    self.pending[channel] = None;
                    self.emit(MixerEvent::channel(
                        channel,
                        EventKind::SourceLoadFailed,
                        reason,
                    ));
                }
            }
        }
    }
}

fn check_finite(value: f32) -> MixerResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MixerError::NonFiniteValue(value))
    }
}
