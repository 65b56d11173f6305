// Adapters layer: concrete implementations for external systems (storage, traveler input, batch execution, warehouse).

pub mod csv_source;
pub mod executor;
pub mod storage;

#[cfg(feature = "s3")]
pub mod s3;

#[cfg(feature = "redshift")]
pub mod redshift;
