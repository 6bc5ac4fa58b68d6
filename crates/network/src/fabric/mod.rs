//! Sub-fabric trait and behavioral topology models.
//!
//! This module defines the fixed capability set the composite network
//! consumes from each of its two sub-fabrics. It provides:
//! 1. **Trait:** [`Fabric`] — flit/credit injection and ejection plus the
//!    three unconditional per-cycle phases and the node count.
//! 2. **Models:** [`FlatFly`] and [`FatTree`] — behavioral latency models of
//!    the two topologies (no internal router state; out of scope here).
//! 3. **Transit core:** the shared queue/pipeline machinery both models are
//!    built on.
//!
//! The per-cycle phases (`read_inputs`, `evaluate`, `write_outputs`) are an
//! explicit contract: the composite calls them every cycle on both fabrics,
//! whether or not real payload flows, so the fabrics' internal clocks never
//! drift relative to each other.

/// Fat-tree behavioral model.
pub mod fattree;

/// Flattened-butterfly behavioral model.
pub mod flatfly;

use std::collections::VecDeque;

use crate::common::{Cycle, NodeId};
use crate::flit::{Credit, Flit};

pub use fattree::FatTree;
pub use flatfly::FlatFly;

/// Capability set of one sub-fabric, as consumed by the composite network.
///
/// Implementors are opaque, symmetric peers addressed by the same global
/// node-id space. The composite never looks inside a fabric; it only writes
/// flits and credits in, reads flits and credits out, and advances the three
/// cycle phases unconditionally.
pub trait Fabric: Send + Sync {
    /// Returns a short name for this fabric (e.g., `"flatfly"`).
    fn name(&self) -> &str;

    /// Returns the number of endpoint nodes this fabric serves.
    fn num_nodes(&self) -> usize;

    /// Injects a flit at `source`, or performs a null write.
    ///
    /// A `None` write advances the fabric's per-cycle injection accounting
    /// without transporting payload; the composite issues one for every real
    /// flit it routes to the *other* fabric so that occupancy bookkeeping on
    /// both sides stays aligned with the cycle stream.
    fn write_flit(&mut self, flit: Option<Flit>, source: NodeId);

    /// Removes and returns the next flit ejected at `dest`, if any.
    fn read_flit(&mut self, dest: NodeId) -> Option<Flit>;

    /// Accepts a credit returned by the consumer at `dest`.
    fn write_credit(&mut self, credit: Credit, dest: NodeId);

    /// Removes and returns the next credit owed to `source`, if any.
    fn read_credit(&mut self, source: NodeId) -> Option<Credit>;

    /// Phase 1: latch this cycle's injected flits into the fabric.
    fn read_inputs(&mut self);

    /// Phase 2: advance internal state by one cycle.
    fn evaluate(&mut self);

    /// Phase 3: surface flits that completed transit this cycle.
    fn write_outputs(&mut self);
}

/// Shared queue machinery for the behavioral topology models.
///
/// Models a fabric as a fixed-latency transit pipe: flits written at a source
/// wait in an injection buffer, enter transit at `read_inputs`, mature after
/// the model's hop latency, and appear in the destination's ejection buffer
/// at `write_outputs`. A credit for the flit's VC is returned to the source
/// when the flit leaves its injection buffer, closing the credit loop.
///
/// Because the latency is uniform, the global transit queue stays sorted by
/// maturity time and per-(destination, VC) FIFO order is preserved
/// end-to-end.
#[derive(Debug)]
pub(crate) struct TransitCore {
    num_nodes: usize,
    latency: Cycle,
    cycle: Cycle,
    inject: Vec<VecDeque<Flit>>,
    transit: VecDeque<(Cycle, Flit)>,
    eject: Vec<VecDeque<Flit>>,
    credits: Vec<VecDeque<Credit>>,
    /// Credits absorbed from consumers, per destination. Tracked so the
    /// occupancy books balance; the behavioral model has no finite buffers
    /// to release.
    absorbed: Vec<u64>,
    null_writes: u64,
}

impl TransitCore {
    pub(crate) fn new(num_nodes: usize, latency: Cycle) -> Self {
        Self {
            num_nodes,
            latency,
            cycle: 0,
            inject: vec![VecDeque::new(); num_nodes],
            transit: VecDeque::new(),
            eject: vec![VecDeque::new(); num_nodes],
            credits: vec![VecDeque::new(); num_nodes],
            absorbed: vec![0; num_nodes],
            null_writes: 0,
        }
    }

    pub(crate) const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub(crate) const fn null_writes(&self) -> u64 {
        self.null_writes
    }

    pub(crate) fn absorbed(&self, dest: NodeId) -> u64 {
        self.absorbed[dest]
    }

    pub(crate) fn write_flit(&mut self, flit: Option<Flit>, source: NodeId) {
        match flit {
            Some(flit) => self.inject[source].push_back(flit),
            None => self.null_writes += 1,
        }
    }

    pub(crate) fn read_flit(&mut self, dest: NodeId) -> Option<Flit> {
        self.eject[dest].pop_front()
    }

    pub(crate) fn write_credit(&mut self, credit: Credit, dest: NodeId) {
        self.absorbed[dest] += credit.vcs.len() as u64;
    }

    pub(crate) fn read_credit(&mut self, source: NodeId) -> Option<Credit> {
        self.credits[source].pop_front()
    }

    /// Latches injected flits into transit and returns their buffer credits.
    pub(crate) fn read_inputs(&mut self) {
        for source in 0..self.num_nodes {
            while let Some(flit) = self.inject[source].pop_front() {
                self.credits[source].push_back(Credit::one(flit.vc));
                self.transit.push_back((self.cycle + self.latency, flit));
            }
        }
    }

    pub(crate) fn evaluate(&mut self) {
        self.cycle += 1;
    }

    /// Moves matured flits into their destinations' ejection buffers.
    pub(crate) fn write_outputs(&mut self) {
        while let Some((ready, _)) = self.transit.front() {
            if *ready > self.cycle {
                break;
            }
            // Uniform latency keeps the queue sorted, so popping the front
            // until it is immature drains exactly this cycle's flits.
            if let Some((_, flit)) = self.transit.pop_front() {
                self.eject[flit.dest].push_back(flit);
            }
        }
    }
}
