//! Error types for schema decoding, encoding and normalization.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while building a schema tree from JSON, YAML or HCL input.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "yaml")]
    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid HCL: {source}")]
    InvalidHcl {
        #[source]
        source: hcl::Error,
    },

    #[error("invalid value for \"{key}\": expected {expected}, got {found}")]
    Shape {
        key: String,
        expected: String,
        found: String,
    },

    #[error("invalid type name \"{name}\" in \"{key}\"")]
    InvalidTypeName { key: String, name: String },

    #[error("not supported expression for \"{key}\": {expr}")]
    UnsupportedExpression { key: String, expr: String },

    #[error("invalid expression for \"{key}\": {expr}")]
    InvalidExpression { key: String, expr: String },
}

impl DecodeError {
    pub(crate) fn shape(key: &str, expected: &str, found: impl Into<String>) -> Self {
        DecodeError::Shape {
            key: key.to_string(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }
}

/// Errors while rendering a schema tree.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode non-finite number in \"{key}\"")]
    NonFiniteNumber { key: String },

    #[error("failed to render JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render HCL: {source}")]
    Hcl {
        #[source]
        source: hcl::Error,
    },
}

/// Errors from the transformation passes.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("reference resolution did not reach a fixed point after {sweeps} sweeps")]
    RefsDidNotConverge { sweeps: usize },
}

/// Errors while converting documents on disk.
#[derive(Debug, Error)]
pub enum ConvertError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Schema errors (exit code 2)
    #[error("cannot infer format of {path}: use a .json, .yaml, .yml or .hcl extension")]
    UnknownFormat { path: PathBuf },

    #[error("format {format} is not supported for {operation}")]
    UnsupportedFormat { format: String, operation: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::FileNotFound { .. }
            | ConvertError::ReadError { .. }
            | ConvertError::WriteError { .. } => 3,
            _ => 2,
        }
    }
}
