use std::fmt;
use std::path::PathBuf;

use crate::logger::ColumnType;

/// Result type for Mnemosyne operations
pub type Result<T> = std::result::Result<T, MnemosyneError>;

/// Main error type for the Mnemosyne library
#[derive(Debug, Clone)]
pub enum MnemosyneError {
    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// Tabular data file errors
    CsvError(String),

    /// Image encoding/decoding errors
    ImageError(String),

    /// Chart rendering errors
    RenderError(String),

    /// Loaded table and metadata disagree, or a file is unreadable
    CorruptLog(String),

    /// Metadata declares a type tag outside the known kinds
    UnknownDataType {
        column: String,
        tag: String,
    },

    /// A column already exists with a different type
    TypeMismatch {
        column: String,
        requested: ColumnType,
        actual: ColumnType,
    },

    /// No column with the given name
    ColumnNotFound(String),

    /// A cell was never populated at the requested iteration
    MissingCell {
        column: String,
        iteration: i64,
    },

    /// The run directory already holds logged data and the caller did not
    /// confirm working with it
    ExistingData(PathBuf),

    /// The run directory does not exist
    RunNotFound(PathBuf),

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Operation not supported by this component
    Unsupported(&'static str),
}

impl fmt::Display for MnemosyneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MnemosyneError::IoError(msg) => write!(f, "IO error: {}", msg),
            MnemosyneError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            MnemosyneError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            MnemosyneError::ImageError(msg) => write!(f, "Image error: {}", msg),
            MnemosyneError::RenderError(msg) => write!(f, "Render error: {}", msg),
            MnemosyneError::CorruptLog(msg) => write!(f, "Corrupt run directory: {}", msg),
            MnemosyneError::UnknownDataType { column, tag } => {
                write!(f, "Unknown datatype in metadata: '{}' for column '{}'", tag, column)
            }
            MnemosyneError::TypeMismatch { column, requested, actual } => {
                write!(
                    f,
                    "Wrong datatype '{}' for column '{}' of type '{}'",
                    requested, column, actual
                )
            }
            MnemosyneError::ColumnNotFound(name) => write!(f, "No column named '{}'", name),
            MnemosyneError::MissingCell { column, iteration } => {
                write!(f, "Column '{}' has no value at iteration {}", column, iteration)
            }
            MnemosyneError::ExistingData(dir) => {
                write!(f, "The directory {} already holds logged data", dir.display())
            }
            MnemosyneError::RunNotFound(dir) => {
                write!(f, "No run directory at {}", dir.display())
            }
            MnemosyneError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            MnemosyneError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
        }
    }
}

impl std::error::Error for MnemosyneError {}

// Conversion from std::io::Error
impl From<std::io::Error> for MnemosyneError {
    fn from(err: std::io::Error) -> Self {
        MnemosyneError::IoError(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MnemosyneError {
    fn from(err: serde_json::Error) -> Self {
        MnemosyneError::SerializationError(err.to_string())
    }
}

// Conversion from csv::Error
impl From<csv::Error> for MnemosyneError {
    fn from(err: csv::Error) -> Self {
        MnemosyneError::CsvError(err.to_string())
    }
}

// Conversion from image::ImageError
impl From<image::ImageError> for MnemosyneError {
    fn from(err: image::ImageError) -> Self {
        MnemosyneError::ImageError(err.to_string())
    }
}

// Helper functions for common error patterns
impl MnemosyneError {
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        MnemosyneError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch<S: Into<String>>(column: S, requested: ColumnType, actual: ColumnType) -> Self {
        MnemosyneError::TypeMismatch {
            column: column.into(),
            requested,
            actual,
        }
    }

    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        MnemosyneError::CorruptLog(msg.into())
    }
}
