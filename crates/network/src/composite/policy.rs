//! Per-packet fabric selection.
//!
//! The policy runs exactly once per packet, at its head flit; body and tail
//! flits replay the recorded decision so every flit of a packet traverses
//! the same fabric. The decision lives in a dense table indexed by packet
//! id (packet ids are allocated densely by the traffic source, so the table
//! is a grow-on-demand array rather than a hash map — no hashed lookups in
//! the cycle loop).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::common::{FabricId, NetworkError, NodeId, PacketId};
use crate::config::RoutingMode;
use crate::flit::Flit;

use super::tracker::CreditTracker;

/// Routing decision state: the mode, its RNG, and the live decision table.
#[derive(Debug)]
pub struct RoutingPolicy {
    mode: RoutingMode,
    rng: StdRng,
    /// Packet id → chosen fabric, for packets between head and tail.
    table: Vec<Option<FabricId>>,
}

impl RoutingPolicy {
    /// Creates a policy in the given mode with a seeded RNG.
    ///
    /// Seeding keeps oblivious runs reproducible; deterministic and adaptive
    /// modes never draw from the RNG.
    pub fn new(mode: RoutingMode, seed: u64) -> Self {
        Self {
            mode,
            rng: StdRng::seed_from_u64(seed),
            table: Vec::new(),
        }
    }

    /// Returns the mode this policy was built with.
    pub const fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// Returns the live decision for `packet`, if one exists.
    pub fn live_entry(&self, packet: PacketId) -> Option<FabricId> {
        self.table.get(packet).copied().flatten()
    }

    /// Routes one flit: decides at the head, replays the recorded decision
    /// for bodies, and retires the entry at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DuplicateRouteEntry`] if a head flit arrives
    /// while its packet id still has a live mapping, and
    /// [`NetworkError::MissingRouteEntry`] if a body or tail flit has no
    /// recorded decision. Both indicate a protocol bug, not a recoverable
    /// condition.
    pub fn route(
        &mut self,
        flit: &Flit,
        source: NodeId,
        tracker: &CreditTracker,
    ) -> Result<FabricId, NetworkError> {
        let fabric = if flit.head {
            if let Some(stale) = self.live_entry(flit.packet) {
                return Err(NetworkError::DuplicateRouteEntry {
                    packet: flit.packet,
                    fabric: stale,
                });
            }
            let chosen = self.decide(flit, source, tracker);
            trace!(packet = flit.packet, %chosen, mode = ?self.mode, "routing decision");
            self.record(flit.packet, chosen);
            chosen
        } else {
            self.live_entry(flit.packet)
                .ok_or(NetworkError::MissingRouteEntry {
                    packet: flit.packet,
                    node: source,
                })?
        };
        if flit.tail {
            self.table[flit.packet] = None;
        }
        Ok(fabric)
    }

    /// The once-per-packet decision. Only ever sees head flits.
    fn decide(&mut self, flit: &Flit, source: NodeId, tracker: &CreditTracker) -> FabricId {
        match self.mode {
            RoutingMode::Deterministic => FabricId::FlatFly,
            RoutingMode::Oblivious => {
                if self.rng.gen_bool(0.5) {
                    FabricId::FlatFly
                } else {
                    FabricId::FatTree
                }
            }
            RoutingMode::Adaptive => {
                let fly = tracker.outstanding(FabricId::FlatFly, source, flit.vc);
                let tree = tracker.outstanding(FabricId::FatTree, source, flit.vc);
                // Ties break toward the flattened butterfly.
                if tree < fly {
                    FabricId::FatTree
                } else {
                    FabricId::FlatFly
                }
            }
        }
    }

    fn record(&mut self, packet: PacketId, fabric: FabricId) {
        if packet >= self.table.len() {
            self.table.resize(packet + 1, None);
        }
        self.table[packet] = Some(fabric);
    }
}
