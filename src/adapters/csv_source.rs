use crate::core::upload::is_manifest_file;
use crate::domain::model::RawTravelerRow;
use crate::domain::ports::TravelerSource;
use crate::utils::csv_io::read_records;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::path::PathBuf;

/// Traveler input exported from the SAS dataset to CSV. Either one file or a
/// directory of `*.csv` parts; each file is one partition.
#[derive(Debug, Clone)]
pub struct CsvTravelerSource {
    path: PathBuf,
}

impl CsvTravelerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TravelerSource for CsvTravelerSource {
    fn partitions(&self) -> Result<Vec<String>> {
        let metadata = fs::metadata(&self.path).map_err(|e| {
            EtlError::input("travelers", format!("cannot open {}: {}", self.path.display(), e))
        })?;

        if metadata.is_file() {
            return Ok(vec![self.path.to_string_lossy().into_owned()]);
        }

        let mut parts = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.is_file() && !is_manifest_file(name) && name.ends_with(".csv") {
                parts.push(path.to_string_lossy().into_owned());
            }
        }
        // 分片順序固定，輸出檔編號才穩定
        parts.sort();

        if parts.is_empty() {
            return Err(EtlError::input(
                "travelers",
                format!("no CSV parts found in {}", self.path.display()),
            ));
        }
        Ok(parts)
    }

    fn read_partition(&self, partition: &str) -> Result<Vec<RawTravelerRow>> {
        let data = fs::read(partition)
            .map_err(|e| EtlError::input("travelers", format!("cannot read {}: {}", partition, e)))?;
        read_records(&data, b',', "travelers")
    }
}
