use serde::Serialize;

/// All application errors, categorized by domain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ── Data / Import ──
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),

    #[error("Parquet conversion failed: {0}")]
    ParquetConversion(String),

    #[error("CSV parse error at row {row}: {message}")]
    CsvParseError { row: usize, message: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Timestamps are not strictly increasing at row {row}")]
    UnsortedIndex { row: usize },

    #[error("Dataset contains no rows")]
    EmptyDataset,

    // ── Session ──
    #[error("Data unavailable ({path}): {reason}")]
    DataUnavailable { path: String, reason: String },

    // ── Configuration ──
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Serialization ──
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Serializable error response for the frontend.
#[derive(Debug, Serialize, Clone)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let code = match err {
            AppError::FileNotFound(_) => "FILE_NOT_FOUND",
            AppError::FileRead(_) => "FILE_READ",
            AppError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AppError::ParquetConversion(_) => "PARQUET_CONVERSION",
            AppError::CsvParseError { .. } => "CSV_PARSE_ERROR",
            AppError::MissingColumn(_) => "MISSING_COLUMN",
            AppError::InvalidTimestamp(_) => "INVALID_TIMESTAMP",
            AppError::UnsortedIndex { .. } => "UNSORTED_INDEX",
            AppError::EmptyDataset => "EMPTY_DATASET",
            AppError::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            AppError::InvalidConfig(_) => "INVALID_CONFIG",
            AppError::Serialization(_) => "SERIALIZATION",
        };
        ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

// Allow AppError to be returned from Tauri commands.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let response = ErrorResponse::from(self);
        response.serialize(serializer)
    }
}

// ── Conversions from external errors ──

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        let row = err
            .position()
            .map(|p| p.record() as usize)
            .unwrap_or_default();
        AppError::CsvParseError {
            row,
            message: err.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::ParquetConversion(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_unavailable_serializes_with_code() {
        let err = AppError::DataUnavailable {
            path: "data/missing.parquet".into(),
            reason: "File not found: data/missing.parquet".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "DATA_UNAVAILABLE");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("data/missing.parquet"));
    }

    #[test]
    fn test_io_error_maps_to_file_read() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::FileRead(_)));
    }
}
