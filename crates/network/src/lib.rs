//! Composite-topology interconnection network simulator library.
//!
//! This crate implements a cycle-accurate composite network: two
//! independently routed sub-fabrics (a flattened butterfly and a fat tree)
//! behind one external interface. It provides:
//! 1. **Fabrics:** The sub-fabric trait and behavioral topology models.
//! 2. **Routing:** Per-packet fabric selection (deterministic, oblivious,
//!    load-adaptive) with a head-to-tail decision table.
//! 3. **Arbitration:** Per-destination merging of both fabrics' egress
//!    streams with cycle-granular fairness, per-VC ordering and idle-slot
//!    accounting.
//! 4. **Credits:** Credit-return plumbing back to the delivering fabric and
//!    the per-(source, VC) load estimates feeding the adaptive policy.
//! 5. **Simulation:** A synthetic traffic driver, configuration, and run
//!    statistics.

/// Common types and constants (indices, fabric identity, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// The composite network (wiring, policy, arbiter, tracker).
pub mod composite;
/// Sub-fabric trait and behavioral topology models.
pub mod fabric;
/// Flit and credit data types.
pub mod flit;
/// Synthetic traffic driving.
pub mod sim;
/// Run statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main network type; holds both fabrics, policy, arbiter, and tracker.
pub use crate::composite::CompositeNetwork;
/// Error taxonomy (configuration inconsistency vs. protocol violation).
pub use crate::common::NetworkError;
/// Atomic transport unit of a packet.
pub use crate::flit::Flit;
/// Backpressure notification carrying freed VC ids.
pub use crate::flit::Credit;
