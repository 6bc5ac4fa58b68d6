//! Credit return and load estimation.
//!
//! The tracker owns three pieces of state the other composite components
//! depend on:
//! 1. **Pending credits:** a per-source FIFO of credits read back from the
//!    two fabrics, surfaced to the traffic source one per cycle.
//! 2. **Delivery record:** which fabric most recently delivered a flit to
//!    each destination, so a consumer's returned credit can be forwarded to
//!    the fabric that earned it. Forwarding to the wrong fabric would corrupt
//!    that fabric's VC accounting.
//! 3. **Load estimates:** per (fabric, source, VC) signed counters —
//!    incremented once per VC id when a credit returns (space freed),
//!    decremented exactly once per injected flit at injection time,
//!    regardless of head/body/tail. Read only by the adaptive policy.

use std::collections::VecDeque;

use tracing::trace;

use crate::common::{FabricId, NetworkError, NodeId, VcId};
use crate::flit::Credit;

/// Per-endpoint credit bookkeeping and adaptive load signal.
#[derive(Debug)]
pub struct CreditTracker {
    /// Credits awaiting `read_credit`, per source.
    pending: Vec<VecDeque<Credit>>,
    /// Fabric that most recently delivered a flit, per destination.
    last_delivery: Vec<Option<FabricId>>,
    /// Signed load counters: `[fabric][source][vc]`, credits minus
    /// injections (so more negative means more flits outstanding).
    loads: [Vec<Vec<i64>>; 2],
}

impl CreditTracker {
    /// Creates a tracker for `num_nodes` endpoints and `num_vcs` VCs.
    pub fn new(num_nodes: usize, num_vcs: usize) -> Self {
        Self {
            pending: vec![VecDeque::new(); num_nodes],
            last_delivery: vec![None; num_nodes],
            loads: [
                vec![vec![0; num_vcs]; num_nodes],
                vec![vec![0; num_vcs]; num_nodes],
            ],
        }
    }

    /// Queues a credit read back from `fabric` for `source` and credits the
    /// load estimate of every VC the credit names.
    pub fn on_credit_return(&mut self, source: NodeId, fabric: FabricId, credit: Credit) {
        for &vc in &credit.vcs {
            self.loads[fabric.index()][source][vc] += 1;
        }
        trace!(source, %fabric, %credit, "credit returned");
        self.pending[source].push_back(credit);
    }

    /// Surfaces at most one pending credit for `source`.
    ///
    /// Credits that arrived from both fabrics in the same cycle stay queued
    /// and are surfaced one at a time across cycles.
    pub fn pop_credit(&mut self, source: NodeId) -> Option<Credit> {
        self.pending[source].pop_front()
    }

    /// Records that `fabric` delivered the flit ejected at `dest` this cycle.
    pub fn record_delivery(&mut self, dest: NodeId, fabric: FabricId) {
        self.last_delivery[dest] = Some(fabric);
    }

    /// Returns the fabric that most recently delivered to `dest`, if any.
    pub fn last_delivery(&self, dest: NodeId) -> Option<FabricId> {
        self.last_delivery[dest]
    }

    /// Resolves which fabric a consumer-returned credit belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::CreditWithoutDelivery`] if nothing was ever
    /// delivered to `dest` — a credit with no matching delivery is a
    /// protocol violation in the surrounding traffic manager.
    pub fn on_credit_consumed(&self, dest: NodeId) -> Result<FabricId, NetworkError> {
        self.last_delivery[dest].ok_or(NetworkError::CreditWithoutDelivery { dest })
    }

    /// Debits the load estimate for one injected flit on `(source, vc)`.
    ///
    /// Called exactly once per flit at injection time, for head, body and
    /// tail flits alike.
    pub fn on_injection(&mut self, fabric: FabricId, source: NodeId, vc: VcId) {
        self.loads[fabric.index()][source][vc] -= 1;
    }

    /// Approximate number of flits currently in flight on `(source, vc)`
    /// through `fabric` (injections not yet answered by credits).
    pub fn outstanding(&self, fabric: FabricId, source: NodeId, vc: VcId) -> i64 {
        -self.loads[fabric.index()][source][vc]
    }

    /// Presets the outstanding count for `(fabric, source, vc)`.
    ///
    /// Warm-start hook for studies and test scenarios that need a known
    /// load imbalance without replaying the traffic that would create it.
    pub fn preset_outstanding(
        &mut self,
        fabric: FabricId,
        source: NodeId,
        vc: VcId,
        outstanding: i64,
    ) {
        self.loads[fabric.index()][source][vc] = -outstanding;
    }
}
