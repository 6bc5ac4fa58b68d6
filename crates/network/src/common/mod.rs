//! Common types shared throughout the composite network simulator.
//!
//! This module provides the fundamental building blocks used by every
//! component. It includes:
//! 1. **Index Types:** Dense integer identifiers for nodes, VCs and packets.
//! 2. **Fabric Identity:** The two-valued [`FabricId`] keying all per-fabric state.
//! 3. **Error Handling:** The [`NetworkError`] taxonomy (configuration vs. protocol).

/// Error types for configuration and protocol violations.
pub mod error;

/// Dense index type definitions.
pub mod types;

pub use error::NetworkError;
pub use types::{Cycle, FabricId, NodeId, PacketId, VcId};
