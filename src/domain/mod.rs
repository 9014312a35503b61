// Domain layer: core models and ports (interfaces). No HTTP or cache details here.

pub mod model;
pub mod ports;
