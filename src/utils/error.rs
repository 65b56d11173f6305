use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input error in {dataset}: {message}")]
    InputError { dataset: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Warehouse statement failed during {phase} ({statement}): {message}")]
    WarehouseError {
        phase: String,
        statement: String,
        message: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// 錯誤分類，供 driver 彙整每個階段的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Input,
    Storage,
    Warehouse,
    Processing,
}

impl EtlError {
    pub fn input(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::InputError {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            EtlError::CsvError(_) | EtlError::IoError(_) | EtlError::InputError { .. } => {
                ErrorCategory::Input
            }
            EtlError::StorageError { .. } => ErrorCategory::Storage,
            EtlError::WarehouseError { .. } => ErrorCategory::Warehouse,
            EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Config => format!("配置錯誤: {}", self),
            ErrorCategory::Input => format!("輸入資料無法讀取: {}", self),
            ErrorCategory::Storage => format!("上傳失敗: {}", self),
            ErrorCategory::Warehouse => format!("資料倉儲執行失敗: {}", self),
            ErrorCategory::Processing => format!("資料處理失敗: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Config => "Check the TOML config file and required environment variables",
            ErrorCategory::Input => "Verify the input file paths and their delimiters/headers",
            ErrorCategory::Storage => "Check the bucket name, region and AWS credentials",
            ErrorCategory::Warehouse => "Check the warehouse URL, IAM role and that staging files were uploaded",
            ErrorCategory::Processing => "Re-run with --verbose to see which records triggered the failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = EtlError::input("cities", "missing column City");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.to_string().contains("cities"));

        let err = EtlError::WarehouseError {
            phase: "COPY_STAGING".to_string(),
            statement: "staging_cities".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Warehouse);
        assert!(err.user_friendly_message().contains("permission denied"));
    }
}
