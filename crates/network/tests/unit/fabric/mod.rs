//! Behavioral fabric model tests.


/// Transit latency, ordering and credit-loop behavior.
pub mod transit;
