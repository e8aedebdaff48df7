// Domain layer: canonical models and ports (interfaces). No I/O here.

pub mod bundle;
pub mod model;
pub mod ports;
