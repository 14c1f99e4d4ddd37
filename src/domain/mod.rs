// Domain layer: service records and the ports the site build talks through.

pub mod model;
pub mod ports;
