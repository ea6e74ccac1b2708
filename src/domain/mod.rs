// Domain layer: source document model, display rows and ports (interfaces).

pub mod lenient;
pub mod model;
pub mod ports;
