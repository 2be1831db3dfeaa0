// Domain layer: report model and ports (interfaces) for the external collaborators.

pub mod model;
pub mod ports;
