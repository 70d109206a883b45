//! Per-channel node chain

use crate::graph::{AudioGraph, FilterId, GainId, GraphResult, NodeRef, SourceId};
use crate::types::EqBand;

/// Graph handles owned by one channel strip
///
/// The handle table replaces per-node callbacks: every parameter update
/// looks up the target node here by channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelChain {
    pub source: SourceId,
    pub low: FilterId,
    pub mid: FilterId,
    pub high: FilterId,
    pub gain: GainId,
}

impl ChannelChain {
    /// Create and wire one channel's nodes
    ///
    /// The source is created looping at unity level but left unbound.
    pub(crate) fn build<G: AudioGraph>(graph: &mut G, level: f32, eq_db: f32) -> GraphResult<Self> {
        let source = graph.create_source();
        graph.set_looping(source, true);
        graph.set_source_level(source, 1.0);

        let [low, mid, high] = EqBand::ALL.map(|band| {
            let filter = graph.create_filter(band.filter_kind(), band.frequency(), band.q());
            graph.set_filter_gain(filter, eq_db);
            filter
        });
        let gain = graph.create_gain(level);

        let chain = Self {
            source,
            low,
            mid,
            high,
            gain,
        };

        let nodes = chain.nodes();
        for pair in nodes.windows(2) {
            graph.connect(pair[0], pair[1])?;
        }
        graph.connect(gain.into(), NodeRef::Output)?;

        Ok(chain)
    }

    /// Filter stage for an EQ band
    pub fn filter(&self, band: EqBand) -> FilterId {
        match band {
            EqBand::Low => self.low,
            EqBand::Mid => self.mid,
            EqBand::High => self.high,
        }
    }

    /// Nodes in signal order, excluding the shared output
    pub fn nodes(&self) -> [NodeRef; 5] {
        [
            self.source.into(),
            self.low.into(),
            self.mid.into(),
            self.high.into(),
            self.gain.into(),
        ]
    }
}
