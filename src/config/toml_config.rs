use crate::core::loader::StagedArtifacts;
use crate::core::schema::StagingLocation;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_aws_region, validate_iam_role_arn, validate_non_empty_string, validate_path, validate_range,
    validate_s3_bucket_name, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline configuration, loaded once and passed to each component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub aws: Option<AwsConfig>,
    pub s3: Option<S3Config>,
    pub iam_role: Option<IamRoleConfig>,
    pub warehouse: Option<WarehouseConfig>,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub cities: String,
    pub airports: String,
    pub temperatures: String,
    /// CSV export of the I-94 SAS dataset: a file or a directory of parts.
    pub travelers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub folder: String,
    pub cities: String,
    pub airports: String,
    pub temperatures: String,
    /// Directory name (under `folder`) for the traveler parts.
    pub travelers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub key: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamRoleConfig {
    pub arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Postgres-protocol connection URL of the warehouse.
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// 同時處理的 traveler 分片數
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    4
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl EtlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| EtlError::ConfigError {
            message: format!("Cannot read config file {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AWS_SECRET_ACCESS_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        Path::new(&self.output.folder).join(file)
    }

    pub fn aws(&self) -> Result<&AwsConfig> {
        self.aws.as_ref().ok_or_else(|| missing("aws"))
    }

    pub fn s3(&self) -> Result<&S3Config> {
        self.s3.as_ref().ok_or_else(|| missing("s3"))
    }

    pub fn warehouse(&self) -> Result<&WarehouseConfig> {
        self.warehouse.as_ref().ok_or_else(|| missing("warehouse"))
    }

    /// Checks the sections needed to upload staged files.
    pub fn validate_upload(&self) -> Result<()> {
        let aws = self.aws()?;
        validate_aws_region("aws.region", &aws.region)?;
        validate_non_empty_string("aws.key", &aws.key)?;
        validate_non_empty_string("aws.secret", &aws.secret)?;

        let s3 = self.s3()?;
        validate_s3_bucket_name("s3.bucket", &s3.bucket)?;
        Ok(())
    }

    /// Bulk-copy source for the warehouse: bucket, folder and IAM role.
    pub fn staging_location(&self) -> Result<StagingLocation> {
        let s3 = self.s3()?;
        validate_s3_bucket_name("s3.bucket", &s3.bucket)?;
        let iam_role = self.iam_role.as_ref().ok_or_else(|| missing("iam_role"))?;
        validate_iam_role_arn("iam_role.arn", &iam_role.arn)?;

        Ok(StagingLocation {
            bucket: s3.bucket.clone(),
            folder: s3.folder.clone(),
            iam_role_arn: iam_role.arn.clone(),
        })
    }

    pub fn staged_artifacts(&self) -> StagedArtifacts {
        StagedArtifacts {
            cities: self.output.cities.clone(),
            airports: self.output.airports.clone(),
            temperatures: self.output.temperatures.clone(),
            travelers: self.output.travelers.clone(),
        }
    }
}

fn missing(section: &str) -> EtlError {
    EtlError::MissingConfigError {
        field: format!("[{}]", section),
    }
}

impl Validate for EtlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input.cities", &self.input.cities)?;
        validate_path("input.airports", &self.input.airports)?;
        validate_path("input.temperatures", &self.input.temperatures)?;
        validate_path("input.travelers", &self.input.travelers)?;

        validate_path("output.folder", &self.output.folder)?;
        validate_path("output.cities", &self.output.cities)?;
        validate_path("output.airports", &self.output.airports)?;
        validate_path("output.temperatures", &self.output.temperatures)?;
        validate_path("output.travelers", &self.output.travelers)?;

        validate_range("processing.workers", self.processing.workers, 1, 64)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
