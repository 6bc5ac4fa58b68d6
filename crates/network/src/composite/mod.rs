//! The composite dual-fabric network.
//!
//! This module wires the policy, arbiter and tracker around the two
//! sub-fabrics. It provides:
//! 1. **Lifecycle:** construction from a validated [`Config`] (or from
//!    caller-supplied fabrics), with the node-count consistency check.
//! 2. **Injection path:** routing policy → chosen fabric, with the explicit
//!    null write to the non-chosen fabric and the per-flit load debit.
//! 3. **Ejection path:** per-cycle polls of both fabrics merged by the
//!    per-destination arbiter, recording the delivering fabric.
//! 4. **Credit path:** consumer credits forwarded to the fabric that earned
//!    them; fabric credits queued and surfaced one per cycle per source.
//! 5. **Cycle phases:** `read_inputs`/`evaluate`/`write_outputs` forwarded
//!    to both fabrics unconditionally so their clocks never drift.

/// Per-destination ejection arbitration.
pub mod arbiter;

/// Per-packet fabric selection.
pub mod policy;

/// Credit return and load estimation.
pub mod tracker;

use tracing::{debug, trace};

use crate::common::{FabricId, NetworkError, NodeId};
use crate::config::Config;
use crate::fabric::{Fabric, FatTree, FlatFly};
use crate::flit::{Credit, Flit};

pub use arbiter::{ArbState, DestArbiter, EjectArbiter};
pub use policy::RoutingPolicy;
pub use tracker::CreditTracker;

/// Two sub-fabrics behind one external interface.
///
/// The surrounding traffic manager drives this exactly like a single
/// network: inject flits at sources, advance the three phases each cycle,
/// read at most one flit per destination and one credit per source per
/// cycle, and return consumer credits as ejected flits are drained.
pub struct CompositeNetwork {
    num_nodes: usize,
    num_vcs: usize,
    fabrics: [Box<dyn Fabric>; 2],
    /// Per-packet fabric selection and the live decision table.
    pub policy: RoutingPolicy,
    /// Per-destination ejection arbiters.
    pub arbiter: EjectArbiter,
    /// Credit queues, delivery records and load estimates.
    pub tracker: CreditTracker,
}

impl std::fmt::Debug for CompositeNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeNetwork")
            .field("num_nodes", &self.num_nodes)
            .field("num_vcs", &self.num_vcs)
            .field("mode", &self.policy.mode())
            .finish_non_exhaustive()
    }
}

impl CompositeNetwork {
    /// Builds the composite network described by `config`.
    ///
    /// The routing mode also selects the routing-function names the two
    /// sub-fabrics are configured with.
    ///
    /// # Errors
    ///
    /// Returns a configuration-inconsistency error if validation fails, a
    /// fabric rejects its routing function, or the fabrics disagree on the
    /// node count.
    pub fn new(config: &Config) -> Result<Self, NetworkError> {
        config.validate()?;
        let (fly_fn, tree_fn) = config.routing.fabric_functions();
        let fly = FlatFly::new(&config.flatfly, fly_fn)?;
        let tree = FatTree::new(&config.fattree, tree_fn)?;
        Self::with_fabrics(Box::new(fly), Box::new(tree), config)
    }

    /// Builds the composite around caller-supplied fabrics.
    ///
    /// Used by tests to substitute scripted fabric doubles; the shape
    /// sections of `config` are ignored in favor of the fabrics' own node
    /// counts.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidVcCount`] for a zero VC count and
    /// [`NetworkError::NodeCountMismatch`] if the fabrics disagree on the
    /// node count.
    pub fn with_fabrics(
        fly: Box<dyn Fabric>,
        tree: Box<dyn Fabric>,
        config: &Config,
    ) -> Result<Self, NetworkError> {
        if config.num_vcs == 0 {
            return Err(NetworkError::InvalidVcCount(0));
        }
        if fly.num_nodes() != tree.num_nodes() {
            return Err(NetworkError::NodeCountMismatch {
                flatfly: fly.num_nodes(),
                fattree: tree.num_nodes(),
            });
        }
        let num_nodes = fly.num_nodes();
        let num_vcs = config.num_vcs;
        debug!(
            num_nodes,
            num_vcs,
            mode = ?config.routing,
            "composite network constructed"
        );
        Ok(Self {
            num_nodes,
            num_vcs,
            fabrics: [fly, tree],
            policy: RoutingPolicy::new(config.routing, config.seed),
            arbiter: EjectArbiter::new(num_nodes, num_vcs),
            tracker: CreditTracker::new(num_nodes, num_vcs),
        })
    }

    /// Number of endpoint nodes (equal on both sub-fabrics by construction).
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Virtual channels per port.
    pub const fn num_vcs(&self) -> usize {
        self.num_vcs
    }

    /// Injects one flit at `source`.
    ///
    /// The routing policy picks (or replays) the packet's fabric; the
    /// chosen fabric receives the flit and the other fabric receives a null
    /// write for this cycle, keeping its injection accounting aligned with
    /// the cycle stream it is not carrying. The load estimate for
    /// `(source, vc)` on the chosen fabric is debited once per flit.
    ///
    /// # Errors
    ///
    /// Propagates routing-table protocol violations
    /// ([`NetworkError::MissingRouteEntry`],
    /// [`NetworkError::DuplicateRouteEntry`]).
    pub fn write_flit(&mut self, flit: Flit, source: NodeId) -> Result<(), NetworkError> {
        let fabric = self.policy.route(&flit, source, &self.tracker)?;
        self.tracker.on_injection(fabric, source, flit.vc);
        trace!(source, %fabric, %flit, "inject");
        self.fabrics[fabric.index()].write_flit(Some(flit), source);
        self.fabrics[fabric.other().index()].write_flit(None, source);
        Ok(())
    }

    /// Reads at most one flit ejected at `dest` this cycle.
    ///
    /// Polls both fabrics' ejection ports, feeds the per-destination
    /// arbiter (a fully-null poll records an idle slot), and returns the
    /// arbiter's grant. The delivering fabric is recorded for later credit
    /// forwarding.
    ///
    /// # Errors
    ///
    /// Propagates [`NetworkError::LockNotHeld`] from the arbiter.
    pub fn read_flit(&mut self, dest: NodeId) -> Result<Option<Flit>, NetworkError> {
        let fly = self.fabrics[FabricId::FlatFly.index()].read_flit(dest);
        let tree = self.fabrics[FabricId::FatTree.index()].read_flit(dest);
        match self.arbiter.arbitrate(dest, fly, tree)? {
            Some((flit, fabric)) => {
                self.tracker.record_delivery(dest, fabric);
                Ok(Some(flit))
            }
            None => Ok(None),
        }
    }

    /// Accepts a credit the consumer returns for `dest`.
    ///
    /// The credit is forwarded to whichever fabric most recently delivered
    /// a flit to this destination; forwarding anywhere else would corrupt
    /// that fabric's VC accounting.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::CreditWithoutDelivery`] if nothing was ever
    /// delivered to `dest`.
    pub fn write_credit(&mut self, credit: Credit, dest: NodeId) -> Result<(), NetworkError> {
        let fabric = self.tracker.on_credit_consumed(dest)?;
        trace!(dest, %fabric, %credit, "credit forwarded");
        self.fabrics[fabric.index()].write_credit(credit, dest);
        Ok(())
    }

    /// Surfaces at most one credit owed to `source` this cycle.
    ///
    /// Both fabrics are polled every cycle; each returned credit raises the
    /// load estimate of the VCs it names, then joins the per-source FIFO
    /// from which one credit per cycle is surfaced.
    pub fn read_credit(&mut self, source: NodeId) -> Option<Credit> {
        for fabric in FabricId::ALL {
            if let Some(credit) = self.fabrics[fabric.index()].read_credit(source) {
                self.tracker.on_credit_return(source, fabric, credit);
            }
        }
        self.tracker.pop_credit(source)
    }

    /// Phase 1: both fabrics latch their inputs. Always called on both.
    pub fn read_inputs(&mut self) {
        for fabric in &mut self.fabrics {
            fabric.read_inputs();
        }
    }

    /// Phase 2: both fabrics advance one cycle. Always called on both.
    pub fn evaluate(&mut self) {
        for fabric in &mut self.fabrics {
            fabric.evaluate();
        }
    }

    /// Phase 3: both fabrics surface their outputs. Always called on both.
    pub fn write_outputs(&mut self) {
        for fabric in &mut self.fabrics {
            fabric.write_outputs();
        }
    }
}
