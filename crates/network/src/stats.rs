//! Run statistics for the traffic driver.
//!
//! Minimal accounting only: the full performance-counter subsystem lives
//! outside this layer. These counters exist so a run can report whether
//! traffic actually moved and how it split across the two fabrics.

use std::fmt;

/// Counters accumulated over one simulation run.
#[derive(Clone, Debug, Default)]
pub struct SimStats {
    /// Simulated cycles elapsed.
    pub cycles: u64,
    /// Packets generated by the traffic driver.
    pub packets_injected: u64,
    /// Packets whose tail flit reached the consumer.
    pub packets_delivered: u64,
    /// Flits injected into the composite.
    pub flits_injected: u64,
    /// Flits delivered to consumers.
    pub flits_delivered: u64,
    /// Flits delivered via the flattened butterfly / fat tree.
    pub delivered_by: [u64; 2],
    /// Credits surfaced back to the sources.
    pub credits_returned: u64,
    /// Sum over delivered packets of (tail delivery cycle − head injection
    /// cycle); divide by `packets_delivered` for the mean.
    pub latency_sum: u64,
}

impl SimStats {
    /// Mean packet latency in cycles, or 0.0 if nothing was delivered.
    pub const fn avg_packet_latency(&self) -> f64 {
        if self.packets_delivered == 0 {
            0.0
        } else {
            self.latency_sum as f64 / self.packets_delivered as f64
        }
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cycles:            {}", self.cycles)?;
        writeln!(
            f,
            "packets:           {} injected, {} delivered",
            self.packets_injected, self.packets_delivered
        )?;
        writeln!(
            f,
            "flits:             {} injected, {} delivered",
            self.flits_injected, self.flits_delivered
        )?;
        writeln!(
            f,
            "fabric split:      {} flatfly, {} fattree",
            self.delivered_by[0], self.delivered_by[1]
        )?;
        writeln!(f, "credits returned:  {}", self.credits_returned)?;
        write!(f, "avg latency:       {:.2} cycles", self.avg_packet_latency())
    }
}
