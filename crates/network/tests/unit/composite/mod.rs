//! Tests for the composite-network components.


/// Per-VC ordering property checks.
pub mod ordering_properties;
