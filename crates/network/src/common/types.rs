//! Dense index types shared across the composite network.
//!
//! Nodes, virtual channels and packets are all addressed by dense integer
//! indices known at construction time, so the hot cycle loop can use plain
//! array indexing instead of hashed lookups.

use std::fmt;

/// Global node identifier; both sub-fabrics share one node-id space.
pub type NodeId = usize;

/// Virtual-channel identifier, in `0..num_vcs`.
pub type VcId = usize;

/// Packet identifier; the traffic source allocates these densely.
pub type PacketId = usize;

/// Simulated clock cycle count.
pub type Cycle = u64;

/// Identifies one of the two composed sub-fabrics.
///
/// The flattened butterfly is fabric A in arbitration and tie-breaking; the
/// fat tree is fabric B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FabricId {
    /// The flattened-butterfly sub-fabric (fabric A).
    FlatFly,
    /// The fat-tree sub-fabric (fabric B).
    FatTree,
}

impl FabricId {
    /// Both fabrics, in fixed arbitration order (A first).
    pub const ALL: [Self; 2] = [Self::FlatFly, Self::FatTree];

    /// Returns the dense index (0 or 1) used to key two-entry arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::FlatFly => 0,
            Self::FatTree => 1,
        }
    }

    /// Returns the other fabric.
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Self::FlatFly => Self::FatTree,
            Self::FatTree => Self::FlatFly,
        }
    }
}

impl fmt::Display for FabricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlatFly => write!(f, "flatfly"),
            Self::FatTree => write!(f, "fattree"),
        }
    }
}
