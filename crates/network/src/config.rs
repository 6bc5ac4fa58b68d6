//! Configuration system for the composite network simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline topology shapes chosen so both fabrics expose
//!    the same node count.
//! 2. **Structures:** Hierarchical config for the two sub-fabric shapes, the
//!    virtual-channel count, the routing policy, and the traffic driver.
//! 3. **Validation:** Construction-time rejection of degenerate shapes and
//!    mismatched node counts.
//!
//! Configuration is supplied as JSON (use `serde_json` on a config file) or
//! via `Config::default()` for the CLI.

use serde::Deserialize;

use crate::common::{FabricId, NetworkError};

/// Default configuration constants for the simulator.
///
/// The two topology shapes are chosen so both fabrics report 64 endpoints;
/// the composite refuses to build if the shapes disagree.
mod defaults {
    /// Flattened-butterfly router radix (nodes per dimension).
    pub const FLATFLY_RADIX: usize = 8;

    /// Flattened-butterfly dimension count (8^2 = 64 endpoints).
    pub const FLATFLY_DIMS: usize = 2;

    /// Fat-tree switch radix.
    pub const FATTREE_RADIX: usize = 4;

    /// Fat-tree level count (4^3 = 64 endpoints).
    pub const FATTREE_LEVELS: usize = 3;

    /// Virtual channels per physical port.
    pub const NUM_VCS: usize = 4;

    /// RNG seed shared by the oblivious policy and the traffic driver.
    pub const SEED: u64 = 0x5eed_1c5_1;

    /// Per-source, per-cycle injection probability for synthetic traffic.
    pub const INJECTION_RATE: f64 = 0.1;

    /// Flits per generated packet (head + bodies + tail).
    pub const PACKET_LENGTH: usize = 3;
}

/// Routing policy selecting a sub-fabric once per packet, at its head flit.
///
/// Each mode also names the routing functions the two sub-fabrics themselves
/// are configured with, via [`RoutingMode::fabric_functions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Every packet takes the flattened butterfly.
    #[default]
    Deterministic,
    /// Unweighted random choice per packet; load-independent 50/50 split.
    Oblivious,
    /// Route to the fabric with the fewer outstanding flits for the
    /// packet's (source, VC); ties go to the flattened butterfly.
    Adaptive,
}

impl RoutingMode {
    /// Returns the routing-function names `(flatfly, fattree)` the two
    /// sub-fabrics must be configured with under this policy.
    pub const fn fabric_functions(self) -> (&'static str, &'static str) {
        match self {
            Self::Deterministic => ("xyyx", "nca"),
            Self::Oblivious => ("ran_min", "nca"),
            Self::Adaptive => ("ugal", "anca"),
        }
    }
}

/// Shape of the flattened-butterfly sub-fabric.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FlatFlyConfig {
    /// Router radix: endpoints per dimension.
    pub radix: usize,
    /// Number of dimensions.
    pub dims: usize,
}

impl Default for FlatFlyConfig {
    fn default() -> Self {
        Self {
            radix: defaults::FLATFLY_RADIX,
            dims: defaults::FLATFLY_DIMS,
        }
    }
}

impl FlatFlyConfig {
    /// Endpoint count implied by the shape (`radix ^ dims`).
    pub const fn num_nodes(&self) -> usize {
        self.radix.pow(self.dims as u32)
    }
}

/// Shape of the fat-tree sub-fabric.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FatTreeConfig {
    /// Switch radix.
    pub radix: usize,
    /// Number of tree levels.
    pub levels: usize,
}

impl Default for FatTreeConfig {
    fn default() -> Self {
        Self {
            radix: defaults::FATTREE_RADIX,
            levels: defaults::FATTREE_LEVELS,
        }
    }
}

impl FatTreeConfig {
    /// Endpoint count implied by the shape (`radix ^ levels`).
    pub const fn num_nodes(&self) -> usize {
        self.radix.pow(self.levels as u32)
    }
}

/// Synthetic traffic parameters consumed by the driver, not the network.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Per-source, per-cycle probability of starting a new packet.
    pub injection_rate: f64,
    /// Flits per packet (minimum 1; 1 means head+tail in one flit).
    pub packet_length: usize,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            injection_rate: defaults::INJECTION_RATE,
            packet_length: defaults::PACKET_LENGTH,
        }
    }
}

/// Root configuration for the composite network and its traffic driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flattened-butterfly shape.
    pub flatfly: FlatFlyConfig,
    /// Fat-tree shape.
    pub fattree: FatTreeConfig,
    /// Virtual channels per port (shared by both fabrics and the arbiter).
    pub num_vcs: usize,
    /// Routing policy selector.
    pub routing: RoutingMode,
    /// Seed for the oblivious policy RNG and the traffic driver.
    pub seed: u64,
    /// Synthetic traffic parameters.
    pub traffic: TrafficConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flatfly: FlatFlyConfig::default(),
            fattree: FatTreeConfig::default(),
            num_vcs: defaults::NUM_VCS,
            routing: RoutingMode::default(),
            seed: defaults::SEED,
            traffic: TrafficConfig::default(),
        }
    }
}

impl Config {
    /// Checks the configuration for inconsistencies that must abort
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidVcCount`] for a zero VC count,
    /// [`NetworkError::InvalidTopology`] for degenerate shapes,
    /// [`NetworkError::InvalidTraffic`] for an injection rate outside
    /// `0.0..=1.0` or a zero packet length, and
    /// [`NetworkError::NodeCountMismatch`] if the two shapes disagree on the
    /// endpoint count.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.num_vcs == 0 {
            return Err(NetworkError::InvalidVcCount(0));
        }
        if self.flatfly.radix < 2 || self.flatfly.dims == 0 {
            return Err(NetworkError::InvalidTopology {
                fabric: FabricId::FlatFly,
                reason: format!(
                    "radix {} dims {} (radix must be >= 2, dims >= 1)",
                    self.flatfly.radix, self.flatfly.dims
                ),
            });
        }
        if self.fattree.radix < 2 || self.fattree.levels == 0 {
            return Err(NetworkError::InvalidTopology {
                fabric: FabricId::FatTree,
                reason: format!(
                    "radix {} levels {} (radix must be >= 2, levels >= 1)",
                    self.fattree.radix, self.fattree.levels
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.traffic.injection_rate) {
            return Err(NetworkError::InvalidTraffic {
                reason: format!(
                    "injection rate {} (must be a probability within 0.0..=1.0)",
                    self.traffic.injection_rate
                ),
            });
        }
        if self.traffic.packet_length == 0 {
            return Err(NetworkError::InvalidTraffic {
                reason: "packet length 0 (every packet needs at least one flit)".to_string(),
            });
        }
        if self.flatfly.num_nodes() != self.fattree.num_nodes() {
            return Err(NetworkError::NodeCountMismatch {
                flatfly: self.flatfly.num_nodes(),
                fattree: self.fattree.num_nodes(),
            });
        }
        Ok(())
    }
}
