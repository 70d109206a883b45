//! Platform audio graph
//!
//! The mixer never renders audio itself. Decoding, filtering, gain and
//! playback-rate changes are all capabilities of the platform's audio graph;
//! the mixer only creates nodes, wires them and sets their parameters.
//!
//! # Architecture
//!
//! - **Context**: one shared processing context with a single output sink.
//!   It may start suspended (autoplay / power-saving policy) and must be
//!   resumed before playback is requested.
//! - **Sources**: looping media players bound to a locator. Binding is
//!   asynchronous; readiness and late decode failures arrive as
//!   [`SourceEvent`]s.
//! - **Filters / gains**: parameterised processing stages.
//!
//! Implementations:
//! - [`HeadlessGraph`]: in-process graph model that tracks every node's
//!   parameters. Used by the console player and by tests.

mod error;
mod headless;

pub use error::{GraphError, GraphResult};
pub use headless::{FilterNode, GainNode, HeadlessGraph, LocatorCheck, SourceNode};

pub use crate::types::FilterKind;

/// Handle to a media source node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) usize);

/// Handle to a filter stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(pub(crate) usize);

/// Handle to a gain stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GainId(pub(crate) usize);

/// Identifies one binding of a source to a locator
///
/// Every successful [`AudioGraph::load`] returns a fresh id, and the
/// notifications for that binding carry it. Events whose id is not the
/// source's latest binding are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadId(pub(crate) u64);

/// Any connectable endpoint in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Source(SourceId),
    Filter(FilterId),
    Gain(GainId),
    /// The context's shared output sink
    Output,
}

impl From<SourceId> for NodeRef {
    fn from(id: SourceId) -> Self {
        NodeRef::Source(id)
    }
}

impl From<FilterId> for NodeRef {
    fn from(id: FilterId) -> Self {
        NodeRef::Filter(id)
    }
}

impl From<GainId> for NodeRef {
    fn from(id: GainId) -> Self {
        NodeRef::Gain(id)
    }
}

/// Processing-context run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
}

/// Asynchronous notifications from source nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// The source has buffered enough to start playing
    Ready { source: SourceId, load: LoadId },
    /// The bound locator could not be resolved or decoded
    Failed {
        source: SourceId,
        load: LoadId,
        reason: String,
    },
}

/// The platform audio-graph capability the mixer configures
///
/// Parameter setters are fire-and-forget, like the platform parameters they
/// model. Only context resume, source binding and play requests can fail.
pub trait AudioGraph {
    /// Current context run state
    fn context_state(&self) -> ContextState;

    /// Resume a suspended context (no-op when already running)
    fn resume(&mut self) -> GraphResult<()>;

    /// Create an unbound media source
    fn create_source(&mut self) -> SourceId;

    /// Enable or disable whole-file looping
    fn set_looping(&mut self, source: SourceId, looping: bool);

    /// Intrinsic (pre-graph) level of the source, 0.0-1.0
    fn set_source_level(&mut self, source: SourceId, level: f32);

    /// Playback-rate multiplier (changes pitch and tempo together)
    fn set_playback_rate(&mut self, source: SourceId, rate: f32);

    /// Bind the source to a locator and start (re)loading it
    ///
    /// Errors returned here are synchronous resolution failures. Decode
    /// failures discovered later arrive as [`SourceEvent::Failed`] tagged
    /// with the returned [`LoadId`].
    fn load(&mut self, source: SourceId, locator: &str) -> GraphResult<LoadId>;

    /// Request playback
    fn play(&mut self, source: SourceId) -> GraphResult<()>;

    /// Pause playback, keeping position
    fn pause(&mut self, source: SourceId);

    /// Pause playback and rewind to the start
    fn stop(&mut self, source: SourceId);

    /// Create a filter stage with fixed characteristic frequency and Q
    fn create_filter(&mut self, kind: FilterKind, frequency: f32, q: f32) -> FilterId;

    /// Filter gain in dB
    fn set_filter_gain(&mut self, filter: FilterId, gain_db: f32);

    /// Create a gain stage with an initial linear level
    fn create_gain(&mut self, level: f32) -> GainId;

    /// Linear gain level
    fn set_gain(&mut self, gain: GainId, level: f32);

    /// Connect the output of `from` to the input of `to`
    fn connect(&mut self, from: NodeRef, to: NodeRef) -> GraphResult<()>;

    /// Next pending source notification, if any (never blocks)
    fn poll_event(&mut self) -> Option<SourceEvent>;

    /// Whether this platform signals [`SourceEvent::Ready`] at all
    fn emits_ready_events(&self) -> bool;
}
