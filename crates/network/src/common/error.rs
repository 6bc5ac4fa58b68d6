//! Error definitions for the composite network.
//!
//! Two fatal classes exist at this layer:
//! 1. **Configuration inconsistency:** detected at construction; the network
//!    must refuse to build rather than silently default.
//! 2. **Protocol violation:** detected mid-simulation; indicates a bug in the
//!    surrounding traffic manager or in this component and must never be
//!    masked.
//!
//! Transient emptiness (no flit or credit available this cycle) is *not* an
//! error; it is the ordinary `Ok(None)` result of a read.

use thiserror::Error;

use super::types::{FabricId, NodeId, PacketId, VcId};

/// Fatal errors raised by the composite network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The two sub-fabrics disagree on the size of the node-id space.
    ///
    /// The composite presents a single endpoint space, so the fabrics must
    /// be configured to the same node count.
    #[error("sub-fabric node counts differ: flatfly has {flatfly}, fattree has {fattree}")]
    NodeCountMismatch {
        /// Node count reported by the flattened butterfly.
        flatfly: usize,
        /// Node count reported by the fat tree.
        fattree: usize,
    },

    /// The configured virtual-channel count is unusable (zero).
    #[error("invalid virtual-channel count: {0} (must be at least 1)")]
    InvalidVcCount(usize),

    /// A sub-fabric topology parameter is degenerate (zero radix/dimension).
    #[error("invalid {fabric} topology: {reason}")]
    InvalidTopology {
        /// Which fabric the bad parameter belongs to.
        fabric: FabricId,
        /// Human-readable description of the offending parameter.
        reason: String,
    },

    /// A traffic parameter is outside its usable range.
    #[error("invalid traffic parameters: {reason}")]
    InvalidTraffic {
        /// Human-readable description of the offending parameter.
        reason: String,
    },

    /// A routing-function name is not recognized by the target fabric.
    #[error("fabric {fabric} does not implement routing function `{name}`")]
    UnknownRoutingFunction {
        /// The fabric the name was offered to.
        fabric: FabricId,
        /// The rejected routing-function name.
        name: String,
    },

    /// A body or tail flit arrived with no live routing-table entry.
    ///
    /// Every non-head flit must find the decision recorded at its packet's
    /// head; a miss means the head was never injected or the entry was
    /// removed early.
    #[error("no routing decision recorded for packet {packet} (non-head flit from node {node})")]
    MissingRouteEntry {
        /// The orphaned packet id.
        packet: PacketId,
        /// The node that injected the flit.
        node: NodeId,
    },

    /// A head flit arrived while its packet id still has a live mapping.
    ///
    /// Packet ids may be reused, but only after the previous packet's tail
    /// has retired its entry.
    #[error("packet {packet} already has a live routing decision ({fabric}); head flit rejected")]
    DuplicateRouteEntry {
        /// The colliding packet id.
        packet: PacketId,
        /// The fabric recorded by the stale entry.
        fabric: FabricId,
    },

    /// A credit was returned for a destination that never received a flit.
    ///
    /// Credits are earned by deliveries; with no recorded delivering fabric
    /// there is nowhere correct to forward the credit.
    #[error("credit returned for destination {dest}, but no flit was ever delivered there")]
    CreditWithoutDelivery {
        /// The destination the consumer returned a credit for.
        dest: NodeId,
    },

    /// A virtual-channel lock was released without having been acquired.
    #[error("VC {vc} at destination {dest} released a fabric lock it never held")]
    LockNotHeld {
        /// Destination whose arbiter detected the violation.
        dest: NodeId,
        /// The virtual channel in question.
        vc: VcId,
    },
}
