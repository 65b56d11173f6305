pub mod etl;
pub mod loader;
pub mod normalize;
pub mod schema;
pub mod upload;

pub use crate::domain::ports::{BatchExecutor, Storage, TravelerSource, Warehouse};
pub use crate::utils::error::Result;
