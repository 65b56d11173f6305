pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::executor::{ParallelExecutor, SequentialExecutor};
pub use adapters::storage::LocalStorage;
pub use config::EtlConfig;
pub use core::etl::{PrepEngine, PrepReport};
pub use core::loader::{LoadPlan, LoadReport, Loader};
pub use utils::error::{EtlError, Result};
