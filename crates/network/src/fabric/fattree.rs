//! Fat-tree sub-fabric (fabric B).
//!
//! Behavioral model only, like its sibling: shape-derived node count, a
//! representative up/down transit latency, and faithful edge semantics.

use crate::common::{FabricId, NetworkError, NodeId};
use crate::config::FatTreeConfig;
use crate::flit::{Credit, Flit};

use super::{Fabric, TransitCore};

/// Routing functions the fat tree implements.
///
/// `nca` routes through the nearest common ancestor; `anca` adaptively picks
/// among the equivalent upward paths.
const ROUTE_FUNCTIONS: [&str; 2] = ["nca", "anca"];

/// Fat-tree behavioral model.
///
/// The worst-case route climbs to the root and back down, so the model
/// charges `2 * levels` cycles per traversal.
#[derive(Debug)]
pub struct FatTree {
    core: TransitCore,
    route_fn: &'static str,
}

impl FatTree {
    /// Builds a fat tree with the given shape and routing function.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownRoutingFunction`] if `route_fn` is not
    /// one of the functions this topology implements.
    pub fn new(config: &FatTreeConfig, route_fn: &str) -> Result<Self, NetworkError> {
        let known = ROUTE_FUNCTIONS
            .iter()
            .copied()
            .find(|name| *name == route_fn)
            .ok_or_else(|| NetworkError::UnknownRoutingFunction {
                fabric: FabricId::FatTree,
                name: route_fn.to_string(),
            })?;
        Ok(Self {
            core: TransitCore::new(config.num_nodes(), 2 * config.levels as u64),
            route_fn: known,
        })
    }

    /// Returns the routing function this instance was configured with.
    pub const fn route_fn(&self) -> &'static str {
        self.route_fn
    }

    /// Number of null writes absorbed so far.
    pub const fn null_writes(&self) -> u64 {
        self.core.null_writes()
    }

    /// Consumer credits absorbed at `dest`, counted per freed VC slot.
    pub fn absorbed(&self, dest: NodeId) -> u64 {
        self.core.absorbed(dest)
    }
}

impl Fabric for FatTree {
    fn name(&self) -> &str {
        "fattree"
    }

    fn num_nodes(&self) -> usize {
        self.core.num_nodes()
    }

    fn write_flit(&mut self, flit: Option<Flit>, source: NodeId) {
        self.core.write_flit(flit, source);
    }

    fn read_flit(&mut self, dest: NodeId) -> Option<Flit> {
        self.core.read_flit(dest)
    }

    fn write_credit(&mut self, credit: Credit, dest: NodeId) {
        self.core.write_credit(credit, dest);
    }

    fn read_credit(&mut self, source: NodeId) -> Option<Credit> {
        self.core.read_credit(source)
    }

    fn read_inputs(&mut self) {
        self.core.read_inputs();
    }

    fn evaluate(&mut self) {
        self.core.evaluate();
    }

    fn write_outputs(&mut self) {
        self.core.write_outputs();
    }
}
