//! Synthetic traffic driving for the composite network.
//!
//! The driver is the minimal traffic-manager collaborator: it generates
//! packets, obeys the one-call-per-cycle discipline of every interface
//! operation, echoes consumer credits back as ejected flits are drained,
//! and accumulates [`crate::stats::SimStats`].

/// The per-cycle traffic driver.
pub mod driver;

pub use driver::TrafficManager;
