//! Per-cycle synthetic traffic driver.
//!
//! Drives the composite network the way the surrounding system would:
//! 1. **Injection:** each source starts a new packet with the configured
//!    Bernoulli probability (uniform random destination and VC) and feeds
//!    the network one flit per cycle from its pending queue.
//! 2. **Phases:** `read_inputs` → `evaluate` → `write_outputs`, every cycle,
//!    whether or not traffic flowed.
//! 3. **Ejection:** one `read_flit` per destination per cycle; each drained
//!    flit's credit is echoed back via `write_credit` on the next cycle.
//! 4. **Credits:** one `read_credit` per source per cycle.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{Cycle, NetworkError, NodeId, PacketId};
use crate::composite::CompositeNetwork;
use crate::config::Config;
use crate::flit::{Credit, Flit};
use crate::stats::SimStats;

/// Synthetic traffic generator and consumer for one composite network.
#[derive(Debug)]
pub struct TrafficManager {
    net: CompositeNetwork,
    rng: StdRng,
    cycle: Cycle,
    next_packet: PacketId,
    injection_rate: f64,
    packet_length: usize,
    /// Flits of each source's in-progress packet, injected one per cycle.
    pending: Vec<VecDeque<Flit>>,
    /// Credits owed back to the network per destination, echoed one per
    /// cycle starting the cycle after the flit was drained.
    echo: Vec<VecDeque<Credit>>,
    /// Head-flit injection cycle per in-flight packet, for latency.
    inject_time: HashMap<PacketId, Cycle>,
    /// Accumulated run counters.
    pub stats: SimStats,
}

impl TrafficManager {
    /// Creates a driver around a freshly built network.
    ///
    /// The driver RNG runs on an offset of the config seed so it draws a
    /// stream independent from the oblivious policy's.
    ///
    /// # Errors
    ///
    /// Propagates construction errors from [`CompositeNetwork::new`].
    pub fn new(config: &Config) -> Result<Self, NetworkError> {
        let net = CompositeNetwork::new(config)?;
        Ok(Self::with_network(net, config))
    }

    /// Creates a driver around an existing network (e.g., one built with
    /// test-double fabrics).
    pub fn with_network(net: CompositeNetwork, config: &Config) -> Self {
        let num_nodes = net.num_nodes();
        Self {
            net,
            rng: StdRng::seed_from_u64(config.seed.wrapping_add(1)),
            cycle: 0,
            next_packet: 0,
            injection_rate: config.traffic.injection_rate,
            packet_length: config.traffic.packet_length.max(1),
            pending: vec![VecDeque::new(); num_nodes],
            echo: vec![VecDeque::new(); num_nodes],
            inject_time: HashMap::new(),
            stats: SimStats::default(),
        }
    }

    /// The driven network.
    pub const fn network(&self) -> &CompositeNetwork {
        &self.net
    }

    /// Mutable access to the driven network (warm-start setup in studies).
    pub fn network_mut(&mut self) -> &mut CompositeNetwork {
        &mut self.net
    }

    /// Current simulated cycle.
    pub const fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Advances the whole system by one cycle.
    ///
    /// # Errors
    ///
    /// Propagates any protocol violation surfaced by the network; the run
    /// must halt rather than continue on corrupted state.
    pub fn tick(&mut self) -> Result<(), NetworkError> {
        self.inject()?;

        self.net.read_inputs();
        self.net.evaluate();
        self.net.write_outputs();

        self.drain()?;

        for source in 0..self.net.num_nodes() {
            if self.net.read_credit(source).is_some() {
                self.stats.credits_returned += 1;
            }
        }

        self.cycle += 1;
        self.stats.cycles += 1;
        Ok(())
    }

    /// Runs for `cycles` ticks.
    ///
    /// # Errors
    ///
    /// Stops at the first protocol violation and returns it.
    pub fn run(&mut self, cycles: u64) -> Result<(), NetworkError> {
        for _ in 0..cycles {
            self.tick()?;
        }
        Ok(())
    }

    /// Generates new packets and injects one pending flit per source.
    fn inject(&mut self) -> Result<(), NetworkError> {
        for source in 0..self.net.num_nodes() {
            if self.pending[source].is_empty() && self.rng.gen_bool(self.injection_rate) {
                self.generate_packet(source);
            }
            if let Some(flit) = self.pending[source].pop_front() {
                if flit.head {
                    let _ = self.inject_time.insert(flit.packet, self.cycle);
                }
                self.net.write_flit(flit, source)?;
                self.stats.flits_injected += 1;
            }
        }
        Ok(())
    }

    /// Queues the flits of one new packet at `source`.
    fn generate_packet(&mut self, source: NodeId) {
        let dest = self.rng.gen_range(0..self.net.num_nodes());
        let vc = self.rng.gen_range(0..self.net.num_vcs());
        let packet = self.next_packet;
        self.next_packet += 1;

        if self.packet_length == 1 {
            self.pending[source].push_back(Flit::single(packet, vc, source, dest));
        } else {
            self.pending[source].push_back(Flit::head(packet, vc, source, dest));
            for seq in 1..self.packet_length - 1 {
                self.pending[source].push_back(Flit::body(packet, vc, source, dest, seq as u64));
            }
            self.pending[source].push_back(Flit::tail(
                packet,
                vc,
                source,
                dest,
                self.packet_length as u64 - 1,
            ));
        }
        self.stats.packets_injected += 1;
    }

    /// Returns due credits and reads at most one flit per destination.
    fn drain(&mut self) -> Result<(), NetworkError> {
        for dest in 0..self.net.num_nodes() {
            if let Some(credit) = self.echo[dest].pop_front() {
                self.net.write_credit(credit, dest)?;
            }
            if let Some(flit) = self.net.read_flit(dest)? {
                self.stats.flits_delivered += 1;
                if let Some(fabric) = self.net.tracker.last_delivery(dest) {
                    self.stats.delivered_by[fabric.index()] += 1;
                }
                self.echo[dest].push_back(Credit::one(flit.vc));
                if flit.tail {
                    self.stats.packets_delivered += 1;
                    if let Some(start) = self.inject_time.remove(&flit.packet) {
                        self.stats.latency_sum += self.cycle - start;
                    }
                }
            }
        }
        Ok(())
    }
}
