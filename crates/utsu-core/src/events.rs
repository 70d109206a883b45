//! Mixer observability
//!
//! The controller reports everything noteworthy (failed loads, rejected play
//! requests, context resumes, transport and track changes) as structured
//! [`MixerEvent`]s through an [`EventSink`] handed to it at construction.
//!
//! - [`LogSink`]: forwards to the `log` facade under the `utsu::mixer` target
//! - [`MemorySink`]: keeps events in memory, optionally only the most recent
//!   ones (tests, console `events` command)
//! - [`FanoutSink`]: duplicates events to several sinks

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Log target used by [`LogSink`]
pub const LOG_TARGET: &str = "utsu::mixer";

/// Kinds of mixer events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A stem could not be bound, resolved or decoded
    SourceLoadFailed,
    /// A play request was rejected
    PlayFailed,
    /// The suspended audio context was resumed
    ContextResumed,
    /// The audio context could not be resumed
    ContextResumeFailed,
    /// A source signalled it is ready to play
    SourceReady,
    /// Transport switched between playing and stopped
    TransportChanged,
    /// A new track was selected
    TrackSelected,
    /// A play request deferred by a track change was issued
    DeferredPlay,
}

impl EventKind {
    /// Failures that leave a channel silent
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            EventKind::SourceLoadFailed | EventKind::PlayFailed | EventKind::ContextResumeFailed
        )
    }
}

/// A single structured mixer event
#[derive(Debug, Clone, PartialEq)]
pub struct MixerEvent {
    /// Affected channel, `None` for session-wide events
    pub channel: Option<usize>,
    pub kind: EventKind,
    pub detail: String,
}

impl MixerEvent {
    pub fn channel(channel: usize, kind: EventKind, detail: impl Into<String>) -> Self {
        Self {
            channel: Some(channel),
            kind,
            detail: detail.into(),
        }
    }

    pub fn session(kind: EventKind, detail: impl Into<String>) -> Self {
        Self {
            channel: None,
            kind,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for MixerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.channel {
            Some(ch) => write!(f, "[ch{}] {:?}: {}", ch, self.kind, self.detail),
            None => write!(f, "{:?}: {}", self.kind, self.detail),
        }
    }
}

/// Destination for mixer events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: MixerEvent);
}

/// Sink that writes events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: MixerEvent) {
        let level = if event.kind.is_failure() {
            log::Level::Error
        } else {
            match event.kind {
                EventKind::SourceReady | EventKind::DeferredPlay => log::Level::Debug,
                _ => log::Level::Info,
            }
        };
        log::log!(target: LOG_TARGET, level, "{}", event);
    }
}

/// Sink that records events in memory
///
/// Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<VecDeque<MixerEvent>>>,
    /// Oldest events are dropped beyond this many
    capacity: Option<usize>,
}

impl MemorySink {
    /// Unbounded sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that keeps only the `capacity` most recent events
    pub fn bounded(capacity: usize) -> Self {
        Self {
            events: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Snapshot of all recorded events, oldest first
    pub fn events(&self) -> Vec<MixerEvent> {
        self.lock().iter().cloned().collect()
    }

    /// Remove and return all recorded events
    pub fn take(&self) -> Vec<MixerEvent> {
        self.lock().drain(..).collect()
    }

    /// Recorded events of one kind
    pub fn of_kind(&self, kind: EventKind) -> Vec<MixerEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.kind == kind)
            .collect()
    }
}

impl MemorySink {
    fn lock(&self) -> MutexGuard<'_, VecDeque<MixerEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: MixerEvent) {
        let mut events = self.lock();
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while events.len() >= capacity {
                events.pop_front();
            }
        }
        events.push_back(event);
    }
}

/// Sink that forwards every event to each inner sink
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: MixerEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_and_takes() {
        let sink = MemorySink::new();
        sink.emit(MixerEvent::channel(2, EventKind::PlayFailed, "blocked"));
        sink.emit(MixerEvent::session(EventKind::ContextResumed, "running"));

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.of_kind(EventKind::PlayFailed)[0].channel, Some(2));
        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_bounded_sink_keeps_latest() {
        let sink = MemorySink::bounded(3);
        for channel in 0..5 {
            sink.emit(MixerEvent::channel(channel, EventKind::SourceReady, "ready"));
        }

        let channels: Vec<_> = sink.events().into_iter().map(|e| e.channel).collect();
        assert_eq!(channels, [Some(2), Some(3), Some(4)]);

        let shared = sink.clone();
        shared.emit(MixerEvent::session(EventKind::TrackSelected, "TRACK_03"));
        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.events()[2].kind, EventKind::TrackSelected);
    }

    #[test]
    fn test_fanout_duplicates_events() {
        let a = MemorySink::new();
        let b = MemorySink::new();
        let fanout = FanoutSink::new()
            .with(Arc::new(a.clone()))
            .with(Arc::new(b.clone()));

        fanout.emit(MixerEvent::session(EventKind::TrackSelected, "TRACK_02"));
        assert_eq!(a.events(), b.events());
        assert_eq!(a.events().len(), 1);
    }

    #[test]
    fn test_event_display() {
        let event = MixerEvent::channel(1, EventKind::SourceLoadFailed, "404");
        assert_eq!(event.to_string(), "[ch1] SourceLoadFailed: 404");
        assert!(event.kind.is_failure());
        assert!(!EventKind::SourceReady.is_failure());
    }
}
