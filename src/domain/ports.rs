use crate::domain::model::{Normalized, RawTravelerRow, TravelerRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Object storage keyed by path (local directory or S3 bucket).
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 資料倉儲連線：每個語句為獨立的外部操作，交易邊界由實作決定
pub trait Warehouse: Send + Sync {
    fn execute(&self, statement: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Runs a `select count(*)` style query and returns the single value.
    fn count(&self, query: &str) -> impl std::future::Future<Output = Result<i64>> + Send;
}

/// Partitionable traveler input. Partitions are opaque identifiers.
pub trait TravelerSource: Send + Sync {
    fn partitions(&self) -> Result<Vec<String>>;
    fn read_partition(&self, partition: &str) -> Result<Vec<RawTravelerRow>>;
}

pub type PartitionTransform = fn(Vec<RawTravelerRow>) -> Normalized<TravelerRecord>;

/// Bulk tabular transform over partitionable input. Results are returned in
/// partition order regardless of how the work was scheduled.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    async fn execute(
        &self,
        source: Arc<dyn TravelerSource>,
        transform: PartitionTransform,
    ) -> Result<Vec<Normalized<TravelerRecord>>>;
}
