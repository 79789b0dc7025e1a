// Domain layer: tabular model, per-file session state and ports.

pub mod model;
pub mod ports;
pub mod session;
