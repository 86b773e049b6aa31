//! JSON Schema ⇄ HCL
//!
//! Lossless conversion of JSON Schema draft-07 documents between JSON (or YAML)
//! and HCL, plus graph rewrites over the decoded tree.
//!
//! Documents decode into a [`Schema`]: either a boolean schema or a
//! [`SchemaObject`] holding every draft-07 keyword. Both codecs produce and
//! consume the same tree, so any input format can be written as any output
//! format.
//!
//! # Example
//!
//! ```
//! use jsonschema_hcl::{hcl_codec, json_codec, Registry};
//!
//! let registry = Registry::new();
//! let schema = json_codec::from_str(
//!     r#"{"type": "object", "additionalProperties": false}"#,
//!     &registry,
//! )
//! .unwrap();
//!
//! let hcl = hcl_codec::to_string(&schema).unwrap();
//! assert!(hcl.contains("additionalProperties = false"));
//!
//! // Decoding the HCL gives back the same tree
//! let back = hcl_codec::from_str(&hcl, &registry).unwrap();
//! assert_eq!(back, schema);
//! ```
//!
//! # Normalization
//!
//! | Pass | Effect |
//! |------|--------|
//! | [`resolve_refs`] | Substitute `$ref` pointers found in the document or the [`Registry`] |
//! | [`flatten_all_of`] | Merge `allOf` members into their parent, later members winning |
//! | [`any_of_to_one_of`] | Rename `anyOf` to `oneOf` where no `oneOf` exists |
//!
//! [`normalize`] runs the passes selected by [`NormalizeOptions`] in that order.
//!
//! # Registry
//!
//! Every schema decoded with a `$id` is registered, so documents loaded
//! earlier in a session can be referenced by later ones:
//!
//! ```
//! use jsonschema_hcl::{json_codec, resolve_refs, Registry};
//!
//! let registry = Registry::new();
//! json_codec::from_str(
//!     r#"{"$id": "urn:x#", "definitions": {"Foo": {"type": "string"}}}"#,
//!     &registry,
//! )
//! .unwrap();
//!
//! let mut schema = json_codec::from_str(r#"{"$ref": "urn:x#/definitions/Foo"}"#, &registry).unwrap();
//! resolve_refs(&mut schema, &registry, 8).unwrap();
//! assert_eq!(json_codec::to_string(&schema, false).unwrap(), r#"{"type":"string"}"#);
//! ```

mod error;
mod normalize;
mod registry;
mod schema;
mod types;

pub mod flat;
pub mod hcl_codec;
pub mod json_codec;
pub mod loader;

pub use error::{ConvertError, DecodeError, EncodeError, NormalizeError};
pub use flat::FlatSchema;
pub use loader::{base_schema, load_schema, BASE_SCHEMA_ID};
pub use normalize::{
    any_of_to_one_of, flatten_all_of, normalize, resolve_refs, NormalizeReport, RefResolution,
};
pub use registry::{Registry, RegistrySnapshot};
pub use schema::{walk_mut, Context, Dependencies, NamedSchemas, Schema, SchemaObject};
pub use types::{
    is_type_name, EnumValue, Format, IntegerOrFloat, NormalizeOptions, SchemaOrSchemaArray,
    SchemaOrStringArray, StringOrStringArray, DEFAULT_MAX_REF_SWEEPS, TYPE_NAMES,
};
