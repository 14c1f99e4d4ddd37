use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Bundle archive failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Service directory request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Service directory returned {status} for {endpoint}")]
    DirectoryError { status: u16, endpoint: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Rendering error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Data,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::ApiError(_) | SiteError::DirectoryError { .. } => ErrorCategory::Network,
            SiteError::IoError(_) | SiteError::ZipError(_) => ErrorCategory::Storage,
            SiteError::SerializationError(_) => ErrorCategory::Data,
            SiteError::ConfigValidationError { .. } | SiteError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            SiteError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // a flaky directory is worth a retry
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SiteError::ApiError(_) => {
                "Check that the service directory endpoint is reachable and try again"
            }
            SiteError::DirectoryError { .. } => {
                "Verify the directory endpoint path and that the API is healthy"
            }
            SiteError::IoError(_) => {
                "Check that the source file exists and the output directory is writable"
            }
            SiteError::ZipError(_) => "Disable bundling or free up disk space and rebuild",
            SiteError::SerializationError(_) => {
                "Make sure the directory returns a JSON array of service objects"
            }
            SiteError::ConfigValidationError { .. } | SiteError::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            SiteError::ProcessingError { .. } => "Inspect the offending service record",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::ApiError(_) | SiteError::DirectoryError { .. } => {
                format!("Could not load services: {}", self)
            }
            SiteError::SerializationError(_) => {
                format!("Service data is malformed: {}", self)
            }
            SiteError::IoError(_) | SiteError::ZipError(_) => {
                format!("Could not read or write site files: {}", self)
            }
            SiteError::ConfigValidationError { .. } | SiteError::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
            SiteError::ProcessingError { .. } => format!("Site build failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
