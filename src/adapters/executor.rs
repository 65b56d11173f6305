use crate::domain::model::{Normalized, TravelerRecord};
use crate::domain::ports::{BatchExecutor, PartitionTransform, TravelerSource};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs partitions one after another on the current task.
#[derive(Debug, Clone, Default)]
pub struct SequentialExecutor;

#[async_trait]
impl BatchExecutor for SequentialExecutor {
    async fn execute(
        &self,
        source: Arc<dyn TravelerSource>,
        transform: PartitionTransform,
    ) -> Result<Vec<Normalized<TravelerRecord>>> {
        let mut outputs = Vec::new();
        for partition in source.partitions()? {
            let rows = source.read_partition(&partition)?;
            outputs.push(transform(rows));
        }
        Ok(outputs)
    }
}

/// Reads and transforms partitions on the blocking pool, at most `workers`
/// at a time.
#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    workers: usize,
}

impl ParallelExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

#[async_trait]
impl BatchExecutor for ParallelExecutor {
    async fn execute(
        &self,
        source: Arc<dyn TravelerSource>,
        transform: PartitionTransform,
    ) -> Result<Vec<Normalized<TravelerRecord>>> {
        let partitions = source.partitions()?;
        let total = partitions.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        tracing::debug!("Processing {} traveler partitions with {} workers", total, self.workers);

        for (index, partition) in partitions.into_iter().enumerate() {
            let source = Arc::clone(&source);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| EtlError::ProcessingError {
                    message: format!("worker pool closed: {}", e),
                })?;
                let output = tokio::task::spawn_blocking(move || {
                    source.read_partition(&partition).map(transform)
                })
                .await
                .map_err(|e| EtlError::ProcessingError {
                    message: format!("partition task failed: {}", e),
                })??;
                Ok::<_, EtlError>((index, output))
            });
        }

        let mut slots: Vec<Option<Normalized<TravelerRecord>>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, output) = joined.map_err(|e| EtlError::ProcessingError {
                message: format!("partition task failed: {}", e),
            })??;
            slots[index] = Some(output);
        }

        // 依分片順序回傳
        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize_travelers;
    use crate::domain::model::RawTravelerRow;

    struct MemorySource {
        partitions: Vec<Vec<RawTravelerRow>>,
    }

    impl TravelerSource for MemorySource {
        fn partitions(&self) -> Result<Vec<String>> {
            Ok((0..self.partitions.len()).map(|i| i.to_string()).collect())
        }

        fn read_partition(&self, partition: &str) -> Result<Vec<RawTravelerRow>> {
            let index: usize = partition.parse().map_err(|_| EtlError::input("travelers", "bad partition"))?;
            Ok(self.partitions[index].clone())
        }
    }

    fn row(port: &str) -> RawTravelerRow {
        RawTravelerRow {
            i94port: Some(port.to_string()),
            arrdate: Some(20545.0),
            gender: Some("M".to_string()),
            ..Default::default()
        }
    }

    fn source() -> Arc<dyn TravelerSource> {
        Arc::new(MemorySource {
            partitions: (0..8)
                .map(|p| (0..5).map(|i| if i == 0 { row("XXX") } else { row(&format!("P{}", p)) }).collect())
                .collect(),
        })
    }

    #[tokio::test]
    async fn test_sequential_and_parallel_agree() {
        let sequential = SequentialExecutor.execute(source(), normalize_travelers).await.unwrap();
        let parallel = ParallelExecutor::new(3).execute(source(), normalize_travelers).await.unwrap();

        assert_eq!(sequential.len(), 8);
        assert_eq!(sequential, parallel);
        for (index, partition) in parallel.iter().enumerate() {
            assert_eq!(partition.records.len(), 4);
            assert_eq!(partition.dropped_rows, 1);
            assert_eq!(partition.records[0].iata_code, format!("P{}", index));
        }
    }

    #[tokio::test]
    async fn test_partition_read_error_propagates() {
        struct Broken;

        impl TravelerSource for Broken {
            fn partitions(&self) -> Result<Vec<String>> {
                Ok(vec!["a".to_string()])
            }

            fn read_partition(&self, _partition: &str) -> Result<Vec<RawTravelerRow>> {
                Err(EtlError::input("travelers", "truncated file"))
            }
        }

        let err = ParallelExecutor::new(2)
            .execute(Arc::new(Broken), normalize_travelers)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("truncated file"));
    }
}
