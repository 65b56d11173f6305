// Domain layer: record types and ports (interfaces) for storage, warehouse and batch execution.

pub mod model;
pub mod ports;
