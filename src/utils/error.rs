use thiserror::Error;

/// 啟動時即致命的配置錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Duplicate destination node id: {node_id}")]
    DuplicateNode { node_id: String },

    #[error("Destination node at position {index} has an empty id")]
    EmptyNodeId { index: usize },

    #[error("Alias key is empty after trimming (target: {node_id})")]
    EmptyAliasKey { node_id: String },

    #[error("Alias '{key}' references unknown node '{node_id}'")]
    DanglingAlias { key: String, node_id: String },

    #[error("Alias '{key}' references inactive node '{node_id}'")]
    InactiveAliasTarget { key: String, node_id: String },

    #[error("Alias '{key}' maps to both '{first}' and '{second}'")]
    ConflictingAlias {
        key: String,
        first: String,
        second: String,
    },

    #[error("Neighbor threshold must be a positive number of km, got {value}")]
    InvalidThreshold { value: f64 },

    #[error("Phrase word limit must be between 1 and 10, got {value}")]
    InvalidMaxWords { value: usize },
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Every {kind} record in a batch of {total} was rejected")]
    EmptyBatch { kind: String, total: usize },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Ingestion,
    Storage,
    Processing,
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
            EtlError::ConfigError(_)
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::EmptyBatch { .. }
            | EtlError::CsvError(_)
            | EtlError::SerializationError(_) => ErrorCategory::Ingestion,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Storage,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Ingestion => ErrorSeverity::Medium,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ConfigError(ConfigError::DuplicateNode { node_id }) => {
                format!("Remove or rename the second node with id '{}'", node_id)
            }
            EtlError::ConfigError(ConfigError::DanglingAlias { key, .. })
            | EtlError::ConfigError(ConfigError::InactiveAliasTarget { key, .. }) => {
                format!("Point alias '{}' at an active or planned node, or remove it", key)
            }
            EtlError::ConfigError(ConfigError::InvalidThreshold { .. }) => {
                "Set neighbors.threshold_km to a value greater than 0".to_string()
            }
            EtlError::ConfigError(_) => "Fix the node or alias table and rerun".to_string(),
            EtlError::ConfigValidationError { field, .. }
            | EtlError::InvalidConfigValueError { field, .. }
            | EtlError::MissingConfigError { field } => {
                format!("Check the '{}' setting in your configuration", field)
            }
            EtlError::EmptyBatch { kind, .. } => format!(
                "Inspect the {} source file: see the rejections list in summary.json",
                kind
            ),
            EtlError::CsvError(_) | EtlError::SerializationError(_) => {
                "Make sure input files are valid JSON/CSV".to_string()
            }
            EtlError::IoError(_) => "Check file paths and permissions".to_string(),
            EtlError::ZipError(_) => "Check free disk space in the output directory".to_string(),
            EtlError::ProcessingError { .. } => "Rerun with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Ingestion => format!("Input data problem: {}", self),
            ErrorCategory::Storage => format!("File system problem: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl From<toml::de::Error> for EtlError {
    fn from(e: toml::de::Error) -> Self {
        EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
