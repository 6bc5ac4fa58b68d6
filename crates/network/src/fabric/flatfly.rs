//! Flattened-butterfly sub-fabric (fabric A).
//!
//! Behavioral model only: the real topology's internal routers, crossbars
//! and VC allocators are out of scope at this layer. What the composite
//! relies on is the shape-derived node count, a representative transit
//! latency, and faithful queue/credit semantics at the edges.

use crate::common::{FabricId, NetworkError, NodeId};
use crate::config::FlatFlyConfig;
use crate::flit::{Credit, Flit};

use super::{Fabric, TransitCore};

/// Routing functions the flattened butterfly implements.
///
/// `xyyx` is dimension-ordered (deterministic), `ran_min` picks a random
/// minimal route (oblivious), `ugal` is threshold-adaptive.
const ROUTE_FUNCTIONS: [&str; 3] = ["xyyx", "ran_min", "ugal"];

/// Flattened-butterfly behavioral model.
///
/// A k-ary n-flat reaches any destination in at most one hop per dimension;
/// the model charges `dims + 1` cycles (one per dimension plus ejection) for
/// every traversal.
#[derive(Debug)]
pub struct FlatFly {
    core: TransitCore,
    route_fn: &'static str,
}

impl FlatFly {
    /// Builds a flattened butterfly with the given shape and routing
    /// function.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownRoutingFunction`] if `route_fn` is not
    /// one of the functions this topology implements.
    pub fn new(config: &FlatFlyConfig, route_fn: &str) -> Result<Self, NetworkError> {
        let known = ROUTE_FUNCTIONS
            .iter()
            .copied()
            .find(|name| *name == route_fn)
            .ok_or_else(|| NetworkError::UnknownRoutingFunction {
                fabric: FabricId::FlatFly,
                name: route_fn.to_string(),
            })?;
        Ok(Self {
            core: TransitCore::new(config.num_nodes(), config.dims as u64 + 1),
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

impl Fabric for FlatFly {
    fn name(&self) -> &str {
        "flatfly"
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
