pub mod dwell_gate;
pub mod dwell_policy;
pub mod dwell_state;
