use crate::core::loader::StagedArtifacts;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// 分散式輸出附帶的標記/校驗檔（`_SUCCESS`、`.part.crc` 等）不上傳
pub fn is_manifest_file(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.') || name.ends_with(".crc")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Copies the staged CSV artifacts from the local output folder to object
/// storage under `prefix`.
pub struct Uploader<S: Storage> {
    storage: S,
    prefix: String,
}

impl<S: Storage> Uploader<S> {
    pub fn new(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    async fn upload_file(&self, local: &Path, key: &str, summary: &mut UploadSummary) -> Result<()> {
        let data = fs::read(local)?;
        self.storage.write_file(key, &data).await?;
        tracing::debug!("⬆️ {} -> {}", local.display(), key);
        summary.files += 1;
        summary.bytes += data.len() as u64;
        Ok(())
    }

    pub async fn upload_outputs(&self, output_folder: &Path, artifacts: &StagedArtifacts) -> Result<UploadSummary> {
        let mut summary = UploadSummary::default();

        for name in [&artifacts.cities, &artifacts.airports, &artifacts.temperatures] {
            self.upload_file(&output_folder.join(name), &self.key(name), &mut summary)
                .await?;
        }

        let travelers_dir = output_folder.join(&artifacts.travelers);
        let travelers_prefix = artifacts.travelers.trim_matches('/');
        let mut parts: Vec<String> = fs::read_dir(&travelers_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !is_manifest_file(name) && name.ends_with(".csv"))
            .collect();
        parts.sort();

        for part in parts {
            let key = self.key(&format!("{}/{}", travelers_prefix, part));
            self.upload_file(&travelers_dir.join(&part), &key, &mut summary).await?;
        }

        tracing::info!("☁️ Uploaded {} files ({} bytes)", summary.files, summary.bytes);
        Ok(summary)
    }
}
