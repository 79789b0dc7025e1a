use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Unsupported file type {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("Column selected more than once: {column}")]
    DuplicateSelection { column: String },

    #[error("At least one column must be selected")]
    EmptySelection,

    #[error("Invalid conversion target: {target} (expected CSV or Excel)")]
    InvalidConversionTarget { target: String },

    #[error("Parse error in {file}: {message}")]
    ParseError { file: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet processing error: {0}")]
    SpreadsheetError(#[from] calamine::XlsxError),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 使用者提供的檔案或選擇有誤
    Input,
    /// 檔案內容無法解析或處理
    Data,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SweepError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SweepError::UnsupportedFormat { .. }
            | SweepError::UnknownColumn { .. }
            | SweepError::DuplicateSelection { .. }
            | SweepError::EmptySelection
            | SweepError::ValidationError { .. } => ErrorCategory::Input,
            SweepError::ParseError { .. }
            | SweepError::CsvError(_)
            | SweepError::SpreadsheetError(_) => ErrorCategory::Data,
            SweepError::InvalidConversionTarget { .. }
            | SweepError::ConfigError { .. }
            | SweepError::ConfigValidationError { .. }
            | SweepError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            SweepError::ZipError(_)
            | SweepError::IoError(_)
            | SweepError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 轉換目標錯誤屬於程式缺陷，不是可恢復的輸入錯誤
            SweepError::InvalidConversionTarget { .. } => ErrorSeverity::Critical,
            SweepError::ZipError(_) | SweepError::IoError(_) | SweepError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
            SweepError::ParseError { .. }
            | SweepError::CsvError(_)
            | SweepError::SpreadsheetError(_) => ErrorSeverity::High,
            SweepError::ConfigError { .. }
            | SweepError::ConfigValidationError { .. }
            | SweepError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            SweepError::UnsupportedFormat { .. }
            | SweepError::UnknownColumn { .. }
            | SweepError::DuplicateSelection { .. }
            | SweepError::EmptySelection
            | SweepError::ValidationError { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SweepError::UnsupportedFormat { .. } => "Upload a .csv or .xlsx file",
            SweepError::UnknownColumn { .. } | SweepError::DuplicateSelection { .. } => {
                "Pick column names from the file preview"
            }
            SweepError::EmptySelection => "Select at least one column or leave the selection empty to keep all",
            SweepError::InvalidConversionTarget { .. } => "Use 'csv' or 'xlsx' as the conversion target",
            SweepError::ParseError { .. } | SweepError::CsvError(_) => {
                "Check that the file is a well-formed comma separated file with a header row"
            }
            SweepError::SpreadsheetError(_) => "Check that the file is a valid .xlsx workbook",
            SweepError::ZipError(_) => "Retry the conversion; the output archive could not be built",
            SweepError::IoError(_) => "Check that the input exists and the output directory is writable",
            SweepError::SerializationError(_) => "Retry; the batch summary could not be serialized",
            SweepError::ConfigError { .. }
            | SweepError::ConfigValidationError { .. }
            | SweepError::InvalidConfigValueError { .. } => "Fix the configuration file or command line flags",
            SweepError::ValidationError { .. } => "Review the requested actions for this file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SweepError::UnsupportedFormat { extension } => {
                format!("Unsupported file type {}", extension)
            }
            SweepError::IoError(e) => format!("Could not read or write a file: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
