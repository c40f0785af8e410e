use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Node {index} is not part of this document")]
    StaleNode { index: usize },

    #[error("Invalid document operation: {message}")]
    DocumentError { message: String },

    #[error("Map has not been initialized")]
    MapNotInitialized,

    #[error("Request to {endpoint} was rejected: {reason}")]
    RequestRejected { endpoint: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Document,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code used by the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl PageError {
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        PageError::ElementNotFound {
            selector: selector.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PageError::ApiError(_) | PageError::RequestRejected { .. } => ErrorCategory::Network,
            PageError::ElementNotFound { .. }
            | PageError::StaleNode { .. }
            | PageError::DocumentError { .. }
            | PageError::MapNotInitialized => ErrorCategory::Document,
            PageError::ConfigError { .. }
            | PageError::InvalidConfigValueError { .. }
            | PageError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PageError::CsvError(_) | PageError::IoError(_) | PageError::SerializationError(_) => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 後端失敗只會顯示通知，頁面仍可使用
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Document | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PageError::ApiError(_) | PageError::RequestRejected { .. } => {
                "The marketplace backend could not complete the request".to_string()
            }
            PageError::ElementNotFound { selector } => {
                format!("The page is missing the element {}", selector)
            }
            PageError::StaleNode { .. } => "A page element was used after removal".to_string(),
            PageError::DocumentError { message } => format!("Page update failed: {}", message),
            PageError::MapNotInitialized => "The map is not available on this page".to_string(),
            PageError::CsvError(_) => "The job card file could not be read".to_string(),
            PageError::IoError(e) => format!("File access failed: {}", e),
            PageError::SerializationError(_) => "Received malformed data".to_string(),
            PageError::ConfigError { message } => format!("Configuration problem: {}", message),
            PageError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value {} is invalid: {}", field, reason)
            }
            PageError::MissingConfigError { field } => {
                format!("Configuration value {} is required", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend is reachable and try again",
            ErrorCategory::Document => "Make sure the page template provides the expected elements",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::Data => "Check the input file path and its format",
        }
    }
}

pub type Result<T> = std::result::Result<T, PageError>;
