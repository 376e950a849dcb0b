// Domain layer: payload/row models and the ports the pipeline talks to.

pub mod model;
pub mod ports;
