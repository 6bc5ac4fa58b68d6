//! Per-destination ejection arbitration.
//!
//! Each destination merges up to two simultaneous egress flits per cycle
//! (one polled from each fabric) into at most one flit delivered to the
//! consumer, without starving either fabric and without reordering within a
//! VC. The state machine provides:
//! 1. **Buffers:** one FIFO per (fabric, VC), filled by the per-cycle polls.
//! 2. **Idle slots:** a cycle in which both fabrics were silent enqueues one
//!    idle token; the token is later consumed by a `read_flit` that returns
//!    nothing, so idle cycles and real flits are never double-counted.
//! 3. **Cursor:** a three-state cursor (drain A, drain B, idle) advanced
//!    once per cycle; a delivered flit always flips the cursor to the other
//!    fabric, making fairness cycle-granular rather than burst-granular.
//! 4. **VC locks:** a multi-flit packet locks its VC to the delivering
//!    fabric from head to tail, so the other fabric cannot interleave a
//!    competing packet into the same VC's ejection stream. Packets from the
//!    same fabric legally overlap on one VC (two sources, one destination),
//!    so the lock counts open packets and holds until the last tail.

use std::collections::VecDeque;

use tracing::trace;

use crate::common::{FabricId, NetworkError, NodeId, VcId};
use crate::flit::Flit;

/// Arbitration cursor for one destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArbState {
    /// Draining the given fabric's VC buffers.
    Drain(FabricId),
    /// Replaying a recorded idle cycle.
    Idle,
}

/// Reference-counted VC lock: `depth` open multi-flit packets from `fabric`
/// are mid-drain on this VC.
#[derive(Clone, Copy, Debug)]
struct VcLock {
    fabric: FabricId,
    depth: usize,
}

/// Arbitration state machine for a single destination.
#[derive(Debug)]
pub struct DestArbiter {
    state: ArbState,
    /// Per-(fabric, VC) ejection buffers.
    bufs: [Vec<VecDeque<Flit>>; 2],
    /// Queued idle tokens; unit tokens, so a count is the queue.
    idle_slots: usize,
    /// VC → lock held by the fabric currently draining multi-flit packets
    /// on that VC.
    locks: Vec<Option<VcLock>>,
}

impl DestArbiter {
    fn new(num_vcs: usize) -> Self {
        Self {
            state: ArbState::Idle,
            bufs: [
                vec![VecDeque::new(); num_vcs],
                vec![VecDeque::new(); num_vcs],
            ],
            idle_slots: 0,
            locks: vec![None; num_vcs],
        }
    }

    /// Current cursor position.
    pub const fn state(&self) -> ArbState {
        self.state
    }

    /// Number of queued idle tokens.
    pub const fn idle_slots(&self) -> usize {
        self.idle_slots
    }

    /// Fabric holding the lock on `vc`, if any.
    pub fn lock(&self, vc: VcId) -> Option<FabricId> {
        self.locks[vc].map(|lock| lock.fabric)
    }

    /// Buffered flit count for `(fabric, vc)`.
    pub fn depth(&self, fabric: FabricId, vc: VcId) -> usize {
        self.bufs[fabric.index()][vc].len()
    }

    /// Enqueues a flit polled from `fabric`, keyed by the flit's VC.
    fn enqueue(&mut self, fabric: FabricId, flit: Flit) {
        self.bufs[fabric.index()][flit.vc].push_back(flit);
    }

    /// Records a cycle in which both fabrics were silent.
    fn push_idle(&mut self) {
        self.idle_slots += 1;
    }

    fn is_empty(&self, fabric: FabricId) -> bool {
        self.bufs[fabric.index()].iter().all(VecDeque::is_empty)
    }

    /// Advances the cursor once, per the post-poll transition rules.
    ///
    /// Buffered payload always outranks idle replay: the cursor only rests
    /// in `Idle` while both fabrics' buffers are empty, so queued idle
    /// tokens defer a waiting flit by at most nothing — they replay once the
    /// backlog is gone.
    fn transition(&mut self) {
        let all_empty = self.is_empty(FabricId::FlatFly) && self.is_empty(FabricId::FatTree);
        self.state = match self.state {
            ArbState::Idle if self.idle_slots == 0 || !all_empty => {
                ArbState::Drain(FabricId::FlatFly)
            }
            ArbState::Drain(FabricId::FlatFly) if self.is_empty(FabricId::FlatFly) => {
                ArbState::Drain(FabricId::FatTree)
            }
            ArbState::Drain(FabricId::FatTree) if self.is_empty(FabricId::FatTree) => {
                if !self.is_empty(FabricId::FlatFly) {
                    ArbState::Drain(FabricId::FlatFly)
                } else if self.idle_slots > 0 {
                    ArbState::Idle
                } else {
                    ArbState::Drain(FabricId::FatTree)
                }
            }
            state => state,
        };
    }

    /// Runs one arbitration cycle and returns the granted flit, if any.
    fn service(&mut self, dest: NodeId) -> Result<Option<(Flit, FabricId)>, NetworkError> {
        self.transition();
        let primary = match self.state {
            ArbState::Idle => {
                // One token per read_flit that returns nothing.
                self.idle_slots -= 1;
                return Ok(None);
            }
            ArbState::Drain(fabric) => fabric,
        };

        // If every flit on the cursor's side sits on a VC locked to the
        // other fabric, fall through to the other side this cycle; the
        // locked packet must keep draining or both sides stall.
        for fabric in [primary, primary.other()] {
            if let Some(flit) = self.try_grant(dest, fabric)? {
                // One flit per cycle, then control passes to the other fabric.
                self.state = ArbState::Drain(fabric.other());
                return Ok(Some((flit, fabric)));
            }
        }
        Ok(None)
    }

    /// Fixed-order VC scan over one fabric's buffers; a VC locked to the
    /// other fabric is mid-packet there and must not be interleaved here.
    fn try_grant(
        &mut self,
        dest: NodeId,
        fabric: FabricId,
    ) -> Result<Option<Flit>, NetworkError> {
        for vc in 0..self.locks.len() {
            if self.bufs[fabric.index()][vc].is_empty() {
                continue;
            }
            if matches!(self.locks[vc], Some(lock) if lock.fabric == fabric.other()) {
                continue;
            }
            let Some(flit) = self.bufs[fabric.index()][vc].pop_front() else {
                continue;
            };
            if flit.head && !flit.tail {
                self.locks[vc] = Some(match self.locks[vc] {
                    Some(lock) => VcLock {
                        fabric,
                        depth: lock.depth + 1,
                    },
                    None => VcLock { fabric, depth: 1 },
                });
            } else if flit.tail && !flit.head {
                match self.locks[vc] {
                    Some(lock) if lock.fabric == fabric => {
                        self.locks[vc] = (lock.depth > 1).then_some(VcLock {
                            fabric,
                            depth: lock.depth - 1,
                        });
                    }
                    _ => return Err(NetworkError::LockNotHeld { dest, vc }),
                }
            }
            return Ok(Some(flit));
        }
        Ok(None)
    }
}

/// All destinations' arbiters, indexed by node id.
#[derive(Debug)]
pub struct EjectArbiter {
    dests: Vec<DestArbiter>,
}

impl EjectArbiter {
    /// Creates one arbiter per destination.
    pub fn new(num_nodes: usize, num_vcs: usize) -> Self {
        Self {
            dests: (0..num_nodes).map(|_| DestArbiter::new(num_vcs)).collect(),
        }
    }

    /// Read-only view of one destination's arbiter (inspection/tests).
    pub fn dest(&self, dest: NodeId) -> &DestArbiter {
        &self.dests[dest]
    }

    /// Absorbs this cycle's polls for `dest` and arbitrates one grant.
    ///
    /// `fly` and `tree` are the results of reading both fabrics' ejection
    /// ports this cycle; a fully-null poll records an idle slot instead.
    ///
    /// # Errors
    ///
    /// Propagates [`NetworkError::LockNotHeld`] if a tail flit is granted on
    /// a VC whose lock is not held by the delivering fabric.
    pub fn arbitrate(
        &mut self,
        dest: NodeId,
        fly: Option<Flit>,
        tree: Option<Flit>,
    ) -> Result<Option<(Flit, FabricId)>, NetworkError> {
        let arb = &mut self.dests[dest];
        if fly.is_none() && tree.is_none() {
            arb.push_idle();
        } else {
            if let Some(flit) = fly {
                arb.enqueue(FabricId::FlatFly, flit);
            }
            if let Some(flit) = tree {
                arb.enqueue(FabricId::FatTree, flit);
            }
        }
        let granted = arb.service(dest)?;
        if let Some((flit, fabric)) = &granted {
            trace!(dest, %fabric, %flit, "ejection grant");
        }
        Ok(granted)
    }
}
