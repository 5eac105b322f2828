use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input file not found: {path}")]
    MissingInput { path: String },

    #[error("Malformed dosage artifact: {message}")]
    ArtifactFormatError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Input,
    Output,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::MissingInput { .. } | EtlError::ArtifactFormatError { .. } => {
                ErrorCategory::Input
            }
            EtlError::IoError(_) => ErrorCategory::Output,
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity and that the catalog endpoint is reachable".to_string()
            }
            EtlError::ConfigError { .. } | EtlError::ConfigValidationError { .. } => {
                "Review the TOML configuration file for syntax errors".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration or CLI flags", field)
            }
            EtlError::MissingInput { path } => format!(
                "Run the crawl step first so that '{}' exists, or point --output-path at it",
                path
            ),
            EtlError::ArtifactFormatError { .. } => {
                "Regenerate the artifact with the convert step".to_string()
            }
            EtlError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Inspect the intermediate medicines file for corrupted entries".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(_) => "無法連線到藥品目錄服務".to_string(),
            EtlError::MissingInput { path } => format!("找不到輸入檔案: {}", path),
            EtlError::ConfigError { message } => format!("配置錯誤: {}", message),
            EtlError::ConfigValidationError { field, message } => {
                format!("配置錯誤 ({}): {}", field, message)
            }
            EtlError::InvalidConfigValueError { field, value, reason } => {
                format!("配置值無效 {} = '{}': {}", field, value, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// 單一條目抓取失敗的原因，不會中斷整批爬取
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("undecodable response body: {0}")]
    Decode(String),

    #[error("catalog returned code {0}")]
    PayloadCode(i64),

    #[error("catalog returned no data")]
    EmptyData,

    #[error("entry has no title")]
    MissingTitle,
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else if err.is_decode() {
            FetchFailure::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFailure::HttpStatus(status.as_u16())
        } else {
            FetchFailure::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_high_severity_input_error() {
        let err = EtlError::MissingInput {
            path: "out/medicines.json".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("out/medicines.json"));
        assert!(err.recovery_suggestion().contains("out/medicines.json"));
    }

    #[test]
    fn test_invalid_value_mentions_field() {
        let err = EtlError::InvalidConfigValueError {
            field: "crawl.start_id".to_string(),
            value: "9".to_string(),
            reason: "must not exceed crawl.end_id".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().contains("crawl.start_id"));
    }
}
