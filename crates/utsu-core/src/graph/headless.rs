//! Headless audio graph
//!
//! An in-process model of the platform audio graph. It keeps every node's
//! parameters and the connection list so callers can inspect exactly what
//! the mixer configured, and it reproduces the platform behaviours the mixer
//! has to cope with:
//!
//! - The context starts suspended and rejects play requests until resumed
//! - Locators are resolved through a [`LocatorCheck`]
//! - Readiness is signalled asynchronously through a crossbeam channel
//! - Decode failures and play rejections can be injected per locator

use std::collections::HashSet;
use std::path::PathBuf;

use crossbeam::channel::{unbounded, Receiver, Sender};

use super::{
    AudioGraph, ContextState, FilterId, FilterKind, GainId, GraphError, GraphResult, LoadId,
    NodeRef, SourceEvent, SourceId,
};

/// How locators are resolved when a source is bound
#[derive(Debug, Clone, Default)]
pub enum LocatorCheck {
    /// Every locator resolves
    #[default]
    AcceptAll,
    /// Local locators must name an existing file below `root`
    ///
    /// Remote locators (`http://`, `https://`) are accepted as-is.
    Filesystem { root: PathBuf },
}

impl LocatorCheck {
    fn resolve(&self, locator: &str) -> Result<(), String> {
        match self {
            LocatorCheck::AcceptAll => Ok(()),
            LocatorCheck::Filesystem { root } => {
                if locator.starts_with("http://") || locator.starts_with("https://") {
                    return Ok(());
                }
                let path = root.join(locator.trim_start_matches('/'));
                if path.is_file() {
                    Ok(())
                } else {
                    Err(format!("no such file: {}", path.display()))
                }
            }
        }
    }
}

/// Media source state
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    /// Currently bound locator
    pub locator: Option<String>,
    /// Latest binding, `None` until the first successful load
    pub binding: Option<LoadId>,
    pub looping: bool,
    /// Intrinsic level (0.0-1.0)
    pub level: f32,
    pub playback_rate: f32,
    pub playing: bool,
    /// Set when the bound locator failed to decode
    pub failed: bool,
    /// Number of `load` calls
    pub loads: usize,
    /// Number of `play` calls, successful or not
    pub play_requests: usize,
}

impl Default for SourceNode {
    fn default() -> Self {
        Self {
            locator: None,
            binding: None,
            looping: false,
            level: 1.0,
            playback_rate: 1.0,
            playing: false,
            failed: false,
            loads: 0,
            play_requests: 0,
        }
    }
}

/// Filter stage state
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    pub kind: FilterKind,
    pub frequency: f32,
    pub q: f32,
    pub gain_db: f32,
}

/// Gain stage state
#[derive(Debug, Clone, PartialEq)]
pub struct GainNode {
    pub level: f32,
}

/// In-process audio graph
pub struct HeadlessGraph {
    state: ContextState,
    sources: Vec<SourceNode>,
    filters: Vec<FilterNode>,
    gains: Vec<GainNode>,
    connections: Vec<(NodeRef, NodeRef)>,
    check: LocatorCheck,
    ready_events: bool,
    next_load: u64,
    resume_error: Option<String>,
    failing_locators: HashSet<String>,
    rejecting_locators: HashSet<String>,
    event_tx: Sender<SourceEvent>,
    event_rx: Receiver<SourceEvent>,
}

impl HeadlessGraph {
    /// Create a suspended graph that accepts every locator
    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            state: ContextState::Suspended,
            sources: Vec::new(),
            filters: Vec::new(),
            gains: Vec::new(),
            connections: Vec::new(),
            check: LocatorCheck::default(),
            ready_events: true,
            next_load: 0,
            resume_error: None,
            failing_locators: HashSet::new(),
            rejecting_locators: HashSet::new(),
            event_tx,
            event_rx,
        }
    }

    /// Use a different locator resolution strategy
    pub fn with_locator_check(mut self, check: LocatorCheck) -> Self {
        self.check = check;
        self
    }

    /// Enable or disable readiness notifications
    pub fn with_ready_events(mut self, enabled: bool) -> Self {
        self.ready_events = enabled;
        self
    }

    /// Sender for delivering source events from other threads
    pub fn notifier(&self) -> Sender<SourceEvent> {
        self.event_tx.clone()
    }

    /// Make loads of `locator` fail asynchronously with a decode error
    pub fn fail_decode(&mut self, locator: impl Into<String>) {
        self.failing_locators.insert(locator.into());
    }

    /// Make play requests on sources bound to `locator` fail
    pub fn reject_play(&mut self, locator: impl Into<String>) {
        self.rejecting_locators.insert(locator.into());
    }

    /// Make the next `resume` calls fail with `reason`
    pub fn fail_resume(&mut self, reason: impl Into<String>) {
        self.resume_error = Some(reason.into());
    }

    /// Suspend the context (power saving)
    pub fn suspend(&mut self) {
        self.state = ContextState::Suspended;
    }

    pub fn source(&self, id: SourceId) -> Option<&SourceNode> {
        self.sources.get(id.0)
    }

    pub fn filter(&self, id: FilterId) -> Option<&FilterNode> {
        self.filters.get(id.0)
    }

    pub fn gain(&self, id: GainId) -> Option<&GainNode> {
        self.gains.get(id.0)
    }

    pub fn sources(&self) -> &[SourceNode] {
        &self.sources
    }

    pub fn connections(&self) -> &[(NodeRef, NodeRef)] {
        &self.connections
    }

    /// Follow connections from `start` until a node with no outgoing edge
    ///
    /// Each node in the mixer's graph has a single downstream connection, so
    /// this yields the full chain a source's signal takes.
    pub fn path_from(&self, start: NodeRef) -> Vec<NodeRef> {
        let mut path = vec![start];
        let mut current = start;
        while let Some(&(_, next)) = self.connections.iter().find(|(from, _)| *from == current) {
            if path.contains(&next) {
                break;
            }
            path.push(next);
            current = next;
        }
        path
    }

    fn exists(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Source(id) => id.0 < self.sources.len(),
            NodeRef::Filter(id) => id.0 < self.filters.len(),
            NodeRef::Gain(id) => id.0 < self.gains.len(),
            NodeRef::Output => true,
        }
    }

    fn source_mut(&mut self, id: SourceId) -> Option<&mut SourceNode> {
        let node = self.sources.get_mut(id.0);
        if node.is_none() {
            log::warn!("HeadlessGraph: unknown source {:?}", id);
        }
        node
    }
}

impl Default for HeadlessGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioGraph for HeadlessGraph {
    fn context_state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> GraphResult<()> {
        if let Some(reason) = &self.resume_error {
            return Err(GraphError::ResumeFailed(reason.clone()));
        }
        self.state = ContextState::Running;
        Ok(())
    }

    fn create_source(&mut self) -> SourceId {
        self.sources.push(SourceNode::default());
        SourceId(self.sources.len() - 1)
    }

    fn set_looping(&mut self, source: SourceId, looping: bool) {
        if let Some(node) = self.source_mut(source) {
            node.looping = looping;
        }
    }

    fn set_source_level(&mut self, source: SourceId, level: f32) {
        if let Some(node) = self.source_mut(source) {
            node.level = level.clamp(0.0, 1.0);
        }
    }

    fn set_playback_rate(&mut self, source: SourceId, rate: f32) {
        if let Some(node) = self.source_mut(source) {
            node.playback_rate = rate;
        }
    }

    fn load(&mut self, source: SourceId, locator: &str) -> GraphResult<LoadId> {
        let resolved = self.check.resolve(locator);
        let decode_fails = self.failing_locators.contains(locator);
        let ready_events = self.ready_events;
        let load = LoadId(self.next_load);

        let node = self
            .sources
            .get_mut(source.0)
            .ok_or(GraphError::UnknownNode(NodeRef::Source(source)))?;

        // Rebinding always drops the previous media
        node.locator = Some(locator.to_string());
        node.binding = None;
        node.playing = false;
        node.failed = false;
        node.loads += 1;

        if let Err(reason) = resolved {
            node.failed = true;
            return Err(GraphError::LoadFailed {
                locator: locator.to_string(),
                reason,
            });
        }

        node.binding = Some(load);
        self.next_load += 1;

        let event = if decode_fails {
            node.failed = true;
            Some(SourceEvent::Failed {
                source,
                load,
                reason: format!("could not decode {}", locator),
            })
        } else if ready_events {
            Some(SourceEvent::Ready { source, load })
        } else {
            None
        };

        if let Some(event) = event {
            // The receiver lives as long as self, so this cannot fail
            let _ = self.event_tx.send(event);
        }
        Ok(load)
    }

    fn play(&mut self, source: SourceId) -> GraphResult<()> {
        let suspended = self.state == ContextState::Suspended;
        let node = self
            .sources
            .get_mut(source.0)
            .ok_or(GraphError::UnknownNode(NodeRef::Source(source)))?;
        node.play_requests += 1;

        if suspended {
            return Err(GraphError::ContextSuspended);
        }
        let locator = node.locator.as_deref().ok_or(GraphError::Unbound)?;
        if node.failed {
            return Err(GraphError::LoadFailed {
                locator: locator.to_string(),
                reason: "source is not playable".to_string(),
            });
        }
        if self.rejecting_locators.contains(locator) {
            return Err(GraphError::PlayRejected(format!(
                "playback of {} not allowed",
                locator
            )));
        }

        node.playing = true;
        Ok(())
    }

    fn pause(&mut self, source: SourceId) {
        if let Some(node) = self.source_mut(source) {
            node.playing = false;
        }
    }

    fn stop(&mut self, source: SourceId) {
        // No playhead is modelled, so rewinding is the same as pausing
        self.pause(source);
    }

    fn create_filter(&mut self, kind: FilterKind, frequency: f32, q: f32) -> FilterId {
        self.filters.push(FilterNode {
            kind,
            frequency,
            q,
            gain_db: 0.0,
        });
        FilterId(self.filters.len() - 1)
    }

    fn set_filter_gain(&mut self, filter: FilterId, gain_db: f32) {
        match self.filters.get_mut(filter.0) {
            Some(node) => node.gain_db = gain_db,
            None => log::warn!("HeadlessGraph: unknown filter {:?}", filter),
        }
    }

    fn create_gain(&mut self, level: f32) -> GainId {
        self.gains.push(GainNode { level });
        GainId(self.gains.len() - 1)
    }

    fn set_gain(&mut self, gain: GainId, level: f32) {
        match self.gains.get_mut(gain.0) {
            Some(node) => node.level = level,
            None => log::warn!("HeadlessGraph: unknown gain {:?}", gain),
        }
    }

    fn connect(&mut self, from: NodeRef, to: NodeRef) -> GraphResult<()> {
        for node in [from, to] {
            if !self.exists(node) {
                return Err(GraphError::UnknownNode(node));
            }
        }
        self.connections.push((from, to));
        Ok(())
    }

    fn poll_event(&mut self) -> Option<SourceEvent> {
        self.event_rx.try_recv().ok()
    }

    fn emits_ready_events(&self) -> bool {
        self.ready_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_suspended_and_blocks_play() {
        let mut graph = HeadlessGraph::new();
        let source = graph.create_source();
        graph.load(source, "a.mp3").unwrap();

        assert_eq!(graph.context_state(), ContextState::Suspended);
        assert_eq!(graph.play(source), Err(GraphError::ContextSuspended));
        assert!(!graph.source(source).unwrap().playing);

        graph.resume().unwrap();
        graph.play(source).unwrap();
        let node = graph.source(source).unwrap();
        assert!(node.playing);
        assert_eq!(node.play_requests, 2);
    }

    #[test]
    fn test_load_emits_ready_event() {
        let mut graph = HeadlessGraph::new();
        let source = graph.create_source();
        let load = graph.load(source, "a.mp3").unwrap();
        assert_eq!(graph.poll_event(), Some(SourceEvent::Ready { source, load }));
        assert_eq!(graph.poll_event(), None);
        assert_eq!(graph.source(source).unwrap().binding, Some(load));
    }

    #[test]
    fn test_each_load_gets_a_new_binding() {
        let mut graph = HeadlessGraph::new();
        let source = graph.create_source();
        let first = graph.load(source, "a.mp3").unwrap();
        let second = graph.load(source, "a.mp3").unwrap();
        assert_ne!(first, second);
        assert_eq!(graph.source(source).unwrap().binding, Some(second));

        let events: Vec<_> = std::iter::from_fn(|| graph.poll_event()).collect();
        assert_eq!(
            events,
            [
                SourceEvent::Ready { source, load: first },
                SourceEvent::Ready { source, load: second },
            ]
        );
    }

    #[test]
    fn test_ready_events_can_be_disabled() {
        let mut graph = HeadlessGraph::new().with_ready_events(false);
        let source = graph.create_source();
        graph.load(source, "a.mp3").unwrap();
        assert!(!graph.emits_ready_events());
        assert_eq!(graph.poll_event(), None);
    }

    #[test]
    fn test_decode_failure_is_reported_asynchronously() {
        let mut graph = HeadlessGraph::new();
        graph.fail_decode("bad.mp3");
        graph.resume().unwrap();
        let source = graph.create_source();

        assert!(graph.load(source, "bad.mp3").is_ok());
        assert!(matches!(
            graph.poll_event(),
            Some(SourceEvent::Failed { source: s, .. }) if s == source
        ));
        assert!(matches!(graph.play(source), Err(GraphError::LoadFailed { .. })));
    }

    #[test]
    fn test_filesystem_check() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("drums.mp3"), b"stub").unwrap();
        let mut graph = HeadlessGraph::new().with_locator_check(LocatorCheck::Filesystem {
            root: dir.path().to_path_buf(),
        });
        let source = graph.create_source();

        assert!(graph.load(source, "/drums.mp3").is_ok());
        assert!(graph.load(source, "https://cdn.example.com/x.mp3").is_ok());
        let err = graph.load(source, "missing.mp3").unwrap_err();
        assert!(matches!(err, GraphError::LoadFailed { .. }));
        let node = graph.source(source).unwrap();
        assert!(node.failed);
        assert_eq!(node.binding, None);
    }

    #[test]
    fn test_rejected_play() {
        let mut graph = HeadlessGraph::new();
        graph.reject_play("locked.mp3");
        graph.resume().unwrap();
        let source = graph.create_source();
        graph.load(source, "locked.mp3").unwrap();
        assert!(matches!(graph.play(source), Err(GraphError::PlayRejected(_))));
    }

    #[test]
    fn test_resume_failure() {
        let mut graph = HeadlessGraph::new();
        graph.fail_resume("no device");
        assert!(matches!(graph.resume(), Err(GraphError::ResumeFailed(_))));
        assert_eq!(graph.context_state(), ContextState::Suspended);
    }

    #[test]
    fn test_connections_and_path() {
        let mut graph = HeadlessGraph::new();
        let source = graph.create_source();
        let filter = graph.create_filter(FilterKind::Peaking, 1000.0, 1.0);
        let gain = graph.create_gain(0.5);

        graph.connect(source.into(), filter.into()).unwrap();
        graph.connect(filter.into(), gain.into()).unwrap();
        graph.connect(gain.into(), NodeRef::Output).unwrap();

        assert_eq!(
            graph.path_from(source.into()),
            vec![source.into(), filter.into(), gain.into(), NodeRef::Output]
        );

        let bogus = GainId(42);
        assert_eq!(
            graph.connect(bogus.into(), NodeRef::Output),
            Err(GraphError::UnknownNode(NodeRef::Gain(bogus)))
        );
    }

    #[test]
    fn test_notifier_delivers_external_events() {
        let mut graph = HeadlessGraph::new().with_ready_events(false);
        let source = graph.create_source();
        let load = graph.load(source, "a.mp3").unwrap();
        let notifier = graph.notifier();

        std::thread::spawn(move || {
            notifier.send(SourceEvent::Ready { source, load }).unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(graph.poll_event(), Some(SourceEvent::Ready { source, load }));
    }
}
