//! Schema loading and writing.
//!
//! Reads documents from disk, picks a codec from the file extension (or an
//! explicit format) and exposes the embedded draft-07 meta-schema.

use std::path::Path;

use crate::error::{ConvertError, DecodeError};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::types::Format;
use crate::{hcl_codec, json_codec};

/// `$id` of the embedded draft-07 meta-schema.
pub const BASE_SCHEMA_ID: &str = "http://json-schema.org/draft-07/schema#";

const BASE_SCHEMA: &[u8] = include_bytes!("../resources/draft-07-schema.json");

/// Raw bytes of the embedded draft-07 meta-schema.
pub fn base_schema_bytes() -> &'static [u8] {
    BASE_SCHEMA
}

/// Decode the embedded meta-schema, registering it under [`BASE_SCHEMA_ID`].
///
/// # Errors
///
/// Only fails if the embedded resource is malformed.
pub fn base_schema(registry: &Registry) -> Result<Schema, DecodeError> {
    json_codec::from_slice(BASE_SCHEMA, registry)
}

/// Pick the format for `path`: the explicit one if given, else the extension.
///
/// # Errors
///
/// Returns `ConvertError::UnknownFormat` if neither is available.
pub fn detect_format(path: &Path, explicit: Option<Format>) -> Result<Format, ConvertError> {
    explicit
        .or_else(|| Format::from_path(path))
        .ok_or_else(|| ConvertError::UnknownFormat {
            path: path.to_path_buf(),
        })
}

/// Read a file to a string.
///
/// # Errors
///
/// Returns `ConvertError::FileNotFound` if the file doesn't exist,
/// or `ConvertError::ReadError` if it can't be read.
pub fn read_source(path: &Path) -> Result<String, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| ConvertError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode `content` with the codec for `format`.
///
/// # Errors
///
/// Returns the codec's decode error, or `ConvertError::UnsupportedFormat`
/// for YAML when the `yaml` feature is disabled.
pub fn decode_str(
    content: &str,
    format: Format,
    registry: &Registry,
) -> Result<Schema, ConvertError> {
    let schema = match format {
        Format::Json => json_codec::from_str(content, registry)?,
        Format::Hcl => hcl_codec::from_str(content, registry)?,
        #[cfg(feature = "yaml")]
        Format::Yaml => json_codec::from_yaml_str(content, registry)?,
        #[cfg(not(feature = "yaml"))]
        Format::Yaml => {
            return Err(ConvertError::UnsupportedFormat {
                format: "yaml".to_string(),
                operation: "input (build with the `yaml` feature)".to_string(),
            })
        }
    };
    Ok(schema)
}

/// Load and decode a schema file.
///
/// Every schema in the file that declares `$id` is added to `registry`.
///
/// # Errors
///
/// Returns an IO error (`FileNotFound`, `ReadError`), `UnknownFormat`, or the
/// codec's decode error.
pub fn load_schema(
    path: &Path,
    format: Option<Format>,
    registry: &Registry,
) -> Result<Schema, ConvertError> {
    let format = detect_format(path, format)?;
    let content = read_source(path)?;
    decode_str(&content, format, registry)
}

/// Render a schema with the codec for `format`.
///
/// `pretty` only affects JSON; HCL output is always formatted.
///
/// # Errors
///
/// Returns the codec's encode error, or `ConvertError::UnsupportedFormat`
/// for YAML, which is input-only.
pub fn encode(schema: &Schema, format: Format, pretty: bool) -> Result<String, ConvertError> {
    let rendered = match format {
        Format::Json => json_codec::to_string(schema, pretty)?,
        Format::Hcl => hcl_codec::to_string(schema)?,
        Format::Yaml => {
            return Err(ConvertError::UnsupportedFormat {
                format: "yaml".to_string(),
                operation: "output".to_string(),
            })
        }
    };
    Ok(rendered)
}

/// Write rendered output to `path`, adding a trailing newline if missing.
///
/// # Errors
///
/// Returns `ConvertError::WriteError` if the file can't be written.
pub fn write_output(path: &Path, content: &str) -> Result<(), ConvertError> {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    std::fs::write(path, content).map_err(|source| ConvertError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}
