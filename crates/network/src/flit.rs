//! Flit and credit data types.
//!
//! The flit is the atomic transport unit: packets are fragmented into a head
//! flit, zero or more body flits, and a tail flit (a single-flit packet is
//! both head and tail). Credits flow the opposite way and report freed
//! downstream buffer space per virtual channel.

use std::fmt;

use crate::common::{NodeId, PacketId, VcId};

/// Smallest transport unit of a packet.
///
/// Exactly one component owns a flit at any time: the traffic source until
/// injection, then whichever queue currently holds it, until it is delivered
/// to the consumer or explicitly dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flit {
    /// Packet this flit belongs to.
    pub packet: PacketId,
    /// Virtual channel the flit travels on.
    pub vc: VcId,
    /// `true` for the first flit of a packet; routing decisions happen here.
    pub head: bool,
    /// `true` for the last flit of a packet; retires the routing decision.
    pub tail: bool,
    /// Injecting node.
    pub src: NodeId,
    /// Ejecting node.
    pub dest: NodeId,
    /// Position of this flit within its packet, starting at 0 for the head.
    pub seq: u64,
}

impl Flit {
    /// Creates the head flit of a packet.
    pub const fn head(packet: PacketId, vc: VcId, src: NodeId, dest: NodeId) -> Self {
        Self {
            packet,
            vc,
            head: true,
            tail: false,
            src,
            dest,
            seq: 0,
        }
    }

    /// Creates a body flit (neither head nor tail).
    pub const fn body(packet: PacketId, vc: VcId, src: NodeId, dest: NodeId, seq: u64) -> Self {
        Self {
            packet,
            vc,
            head: false,
            tail: false,
            src,
            dest,
            seq,
        }
    }

    /// Creates the tail flit of a packet.
    pub const fn tail(packet: PacketId, vc: VcId, src: NodeId, dest: NodeId, seq: u64) -> Self {
        Self {
            packet,
            vc,
            head: false,
            tail: true,
            src,
            dest,
            seq,
        }
    }

    /// Creates a single-flit packet (head and tail at once).
    pub const fn single(packet: PacketId, vc: VcId, src: NodeId, dest: NodeId) -> Self {
        Self {
            packet,
            vc,
            head: true,
            tail: true,
            src,
            dest,
            seq: 0,
        }
    }
}

impl fmt::Display for Flit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (self.head, self.tail) {
            (true, true) => "HT",
            (true, false) => "H",
            (false, true) => "T",
            (false, false) => "B",
        };
        write!(
            f,
            "flit[p{} {} vc{} {}->{} #{}]",
            self.packet, kind, self.vc, self.src, self.dest, self.seq
        )
    }
}

/// Backpressure notification: one or more VCs freed a buffer slot downstream.
///
/// Created by a sub-fabric when a flit leaves it, queued by the credit
/// tracker, and consumed exactly once when written back to the matching
/// fabric.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credit {
    /// Virtual channels that freed space; one increment per entry.
    pub vcs: Vec<VcId>,
}

impl Credit {
    /// Creates a credit covering a single virtual channel.
    pub fn one(vc: VcId) -> Self {
        Self { vcs: vec![vc] }
    }
}

impl fmt::Display for Credit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "credit{:?}", self.vcs)
    }
}
