use crate::config::toml_config::EtlConfig;
use crate::core::normalize::{normalize_airports, normalize_cities, normalize_temperatures, normalize_travelers};
use crate::core::upload::{UploadSummary, Uploader};
use crate::domain::model::{Dataset, Normalized, RawAirportRow, RawCityRow, RawTemperatureRow};
use crate::domain::ports::{BatchExecutor, Storage, TravelerSource};
use crate::utils::csv_io::{read_records, write_records};
use crate::utils::error::{EtlError, Result};
use crate::utils::monitor::SystemMonitor;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// 單一資料集處理結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub dataset: Dataset,
    pub input_rows: usize,
    pub output_rows: usize,
    pub dropped_rows: usize,
    pub output_path: String,
    pub duration_ms: u128,
}

/// Outcome of a `prep` run. Every stage is reported, even after a failure.
#[derive(Debug)]
pub struct PrepReport {
    pub stages: Vec<(Dataset, Result<DatasetSummary>)>,
    /// `None` when upload was not requested or a stage failed.
    pub upload: Option<Result<UploadSummary>>,
}

#[derive(Debug, Serialize)]
pub struct StageStatus {
    pub dataset: Dataset,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DatasetSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrepReportView {
    pub succeeded: bool,
    pub stages: Vec<StageStatus>,
    pub upload: Option<StageUpload>,
}

#[derive(Debug, Serialize)]
pub struct StageUpload {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<UploadSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PrepReport {
    pub fn stages_succeeded(&self) -> bool {
        self.stages.iter().all(|(_, result)| result.is_ok())
    }

    pub fn is_success(&self) -> bool {
        self.stages_succeeded() && !matches!(self.upload, Some(Err(_)))
    }

    pub fn failures(&self) -> Vec<(Dataset, &EtlError)> {
        self.stages
            .iter()
            .filter_map(|(dataset, result)| result.as_ref().err().map(|e| (*dataset, e)))
            .collect()
    }

    /// 可序列化的報告（寫入 --report 檔案）
    pub fn view(&self) -> PrepReportView {
        let stages = self
            .stages
            .iter()
            .map(|(dataset, result)| StageStatus {
                dataset: *dataset,
                succeeded: result.is_ok(),
                summary: result.as_ref().ok().cloned(),
                error: result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        let upload = self.upload.as_ref().map(|result| StageUpload {
            succeeded: result.is_ok(),
            summary: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });

        PrepReportView {
            succeeded: self.is_success(),
            stages,
            upload,
        }
    }
}

/// Runs the four normalizer stages in order and stages the results.
pub struct PrepEngine<S: Storage, E: BatchExecutor> {
    config: EtlConfig,
    executor: E,
    traveler_source: Arc<dyn TravelerSource>,
    uploader: Option<Uploader<S>>,
    monitor: SystemMonitor,
}

impl<S: Storage, E: BatchExecutor> PrepEngine<S, E> {
    pub fn new(config: EtlConfig, executor: E, traveler_source: Arc<dyn TravelerSource>) -> Self {
        Self {
            config,
            executor,
            traveler_source,
            uploader: None,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_uploader(mut self, uploader: Uploader<S>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub async fn run(&self) -> PrepReport {
        tracing::info!("🚀 Starting data preparation");
        let mut stages = Vec::with_capacity(Dataset::ALL.len());

        for (index, dataset) in Dataset::ALL.into_iter().enumerate() {
            tracing::info!("📥 Stage {}/{}: processing {}", index + 1, Dataset::ALL.len(), dataset);
            let started = Instant::now();

            let result = match dataset {
                Dataset::Cities => self.prep_cities(),
                Dataset::Airports => self.prep_airports(),
                Dataset::Temperatures => self.prep_temperatures(),
                Dataset::Travelers => self.prep_travelers().await,
            }
            .map(|mut summary| {
                summary.duration_ms = started.elapsed().as_millis();
                summary
            });

            match &result {
                Ok(summary) => tracing::info!(
                    "✅ {}: {} rows in, {} written, {} dropped -> {}",
                    dataset,
                    summary.input_rows,
                    summary.output_rows,
                    summary.dropped_rows,
                    summary.output_path
                ),
                Err(e) => tracing::error!("❌ {} failed ({:?}): {}", dataset, e.category(), e),
            }
            self.monitor.log_stage(dataset.name());
            stages.push((dataset, result));
        }

        let mut report = PrepReport { stages, upload: None };

        if let Some(uploader) = &self.uploader {
            if report.stages_succeeded() {
                tracing::info!("☁️ Uploading staged files");
                let output_folder = Path::new(&self.config.output.folder);
                let result = uploader
                    .upload_outputs(output_folder, &self.config.staged_artifacts())
                    .await;
                if let Err(e) = &result {
                    tracing::error!("❌ Upload failed: {}", e);
                }
                report.upload = Some(result);
            } else {
                tracing::warn!("⚠️ Skipping upload: {} stage(s) failed", report.failures().len());
            }
        }

        self.monitor.log_final_stats();
        report
    }

    fn prep_cities(&self) -> Result<DatasetSummary> {
        let data = read_input(Dataset::Cities, &self.config.input.cities)?;
        let rows: Vec<RawCityRow> = read_records(&data, b';', Dataset::Cities.name())?;
        let output = normalize_cities(rows);
        self.write_file(Dataset::Cities, &self.config.output.cities, output)
    }

    fn prep_airports(&self) -> Result<DatasetSummary> {
        let data = read_input(Dataset::Airports, &self.config.input.airports)?;
        let rows: Vec<RawAirportRow> = read_records(&data, b',', Dataset::Airports.name())?;
        let output = normalize_airports(rows)?;
        self.write_file(Dataset::Airports, &self.config.output.airports, output)
    }

    fn prep_temperatures(&self) -> Result<DatasetSummary> {
        let data = read_input(Dataset::Temperatures, &self.config.input.temperatures)?;
        let rows: Vec<RawTemperatureRow> = read_records(&data, b',', Dataset::Temperatures.name())?;
        let output = normalize_temperatures(rows)?;
        self.write_file(Dataset::Temperatures, &self.config.output.temperatures, output)
    }

    async fn prep_travelers(&self) -> Result<DatasetSummary> {
        let partitions = self
            .executor
            .execute(Arc::clone(&self.traveler_source), normalize_travelers)
            .await?;

        let dir = self.config.output_path(&self.config.output.travelers);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;

        let mut input_rows = 0;
        let mut output_rows = 0;
        let mut dropped_rows = 0;
        for (index, partition) in partitions.iter().enumerate() {
            // COPY 不略過表頭，分片不寫表頭
            let bytes = write_records(&partition.records, false)?;
            fs::write(dir.join(format!("part-{:05}.csv", index)), bytes)?;
            input_rows += partition.input_rows;
            output_rows += partition.records.len();
            dropped_rows += partition.dropped_rows;
        }
        fs::write(dir.join(SUCCESS_MARKER), b"")?;

        Ok(DatasetSummary {
            dataset: Dataset::Travelers,
            input_rows,
            output_rows,
            dropped_rows,
            output_path: dir.display().to_string(),
            duration_ms: 0,
        })
    }

    fn write_file<T: Serialize>(
        &self,
        dataset: Dataset,
        file: &str,
        output: Normalized<T>,
    ) -> Result<DatasetSummary> {
        let path: PathBuf = self.config.output_path(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, write_records(&output.records, true)?)?;

        Ok(DatasetSummary {
            dataset,
            input_rows: output.input_rows,
            output_rows: output.records.len(),
            dropped_rows: output.dropped_rows,
            output_path: path.display().to_string(),
            duration_ms: 0,
        })
    }
}

fn read_input(dataset: Dataset, path: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| EtlError::input(dataset.name(), format!("cannot read {}: {}", path, e)))
}
