//! Primitive unions, the type-name vocabulary, and conversion options.

use std::path::Path;

use serde_json::Value;

use crate::schema::Schema;

/// The seven primitive type names accepted by the `type` keyword.
pub const TYPE_NAMES: &[&str] = &[
    "array", "boolean", "integer", "null", "number", "object", "string",
];

/// Default upper bound on full reference-resolution sweeps.
pub const DEFAULT_MAX_REF_SWEEPS: usize = 64;

/// Returns true if `name` is one of the primitive type names.
pub fn is_type_name(name: &str) -> bool {
    TYPE_NAMES.contains(&name)
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Value of the `type` keyword: a single name or a non-empty list of names.
#[derive(Debug, Clone, PartialEq)]
pub enum StringOrStringArray {
    String(String),
    StringArray(Vec<String>),
}

impl StringOrStringArray {
    /// Returns true if the single name equals `name`, or the list contains it.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::String(s) => s == name,
            Self::StringArray(names) => names.iter().any(|n| n == name),
        }
    }

    /// Returns the single name, if this is the single-name variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::StringArray(_) => None,
        }
    }
}

impl From<&str> for StringOrStringArray {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for StringOrStringArray {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<String>> for StringOrStringArray {
    fn from(names: Vec<String>) -> Self {
        Self::StringArray(names)
    }
}

/// A number that remembers whether it was written as an integer or a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegerOrFloat {
    Integer(i64),
    Float(f64),
}

impl IntegerOrFloat {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }
}

impl From<i64> for IntegerOrFloat {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for IntegerOrFloat {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Value of `items`: one schema for every element, or positional schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOrSchemaArray {
    Schema(Box<Schema>),
    SchemaArray(Vec<Schema>),
}

impl From<Schema> for SchemaOrSchemaArray {
    fn from(schema: Schema) -> Self {
        Self::Schema(Box::new(schema))
    }
}

impl From<Vec<Schema>> for SchemaOrSchemaArray {
    fn from(schemas: Vec<Schema>) -> Self {
        Self::SchemaArray(schemas)
    }
}

/// Value of a `dependencies` entry: a schema, or co-required property names.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOrStringArray {
    Schema(Box<Schema>),
    StringArray(Vec<String>),
}

impl From<Schema> for SchemaOrStringArray {
    fn from(schema: Schema) -> Self {
        Self::Schema(Box::new(schema))
    }
}

impl From<Vec<String>> for SchemaOrStringArray {
    fn from(names: Vec<String>) -> Self {
        Self::StringArray(names)
    }
}

/// A single member of an `enum` list.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    String(String),
    Bool(bool),
    Number(IntegerOrFloat),
    Null,
}

impl From<&str> for EnumValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for EnumValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<IntegerOrFloat> for EnumValue {
    fn from(n: IntegerOrFloat) -> Self {
        Self::Number(n)
    }
}

/// Surface syntax of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    Hcl,
}

impl Format {
    /// Parse a format name. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "hcl" => Some(Format::Hcl),
            _ => None,
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::parse)
    }
}

/// Options selecting the transformation passes run by [`crate::normalize`].
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Substitute resolvable `$ref` pointers with their targets.
    pub resolve_refs: bool,
    /// Merge `allOf` members into their parent.
    pub flatten_all_of: bool,
    /// Rename `anyOf` to `oneOf` where no `oneOf` exists.
    pub any_of_to_one_of: bool,
    /// Upper bound on full reference-resolution sweeps.
    pub max_ref_sweeps: usize,
}

impl NormalizeOptions {
    /// Create options with every pass disabled.
    pub fn new() -> Self {
        Self {
            resolve_refs: false,
            flatten_all_of: false,
            any_of_to_one_of: false,
            max_ref_sweeps: DEFAULT_MAX_REF_SWEEPS,
        }
    }

    /// Create options with every pass enabled.
    pub fn all() -> Self {
        Self::new()
            .resolve_refs(true)
            .flatten_all_of(true)
            .any_of_to_one_of(true)
    }

    pub fn resolve_refs(mut self, enabled: bool) -> Self {
        self.resolve_refs = enabled;
        self
    }

    pub fn flatten_all_of(mut self, enabled: bool) -> Self {
        self.flatten_all_of = enabled;
        self
    }

    pub fn any_of_to_one_of(mut self, enabled: bool) -> Self {
        self.any_of_to_one_of = enabled;
        self
    }

    /// Set the sweep cap. A cap of zero is raised to one.
    pub fn max_ref_sweeps(mut self, sweeps: usize) -> Self {
        self.max_ref_sweeps = sweeps.max(1);
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_names_are_the_seven_primitives() {
        assert!(is_type_name("integer"));
        assert!(is_type_name("null"));
        assert!(!is_type_name("map"));
        assert!(!is_type_name("String"));
        assert_eq!(TYPE_NAMES.len(), 7);
    }

    #[test]
    fn json_type_name_distinguishes_number_kinds() {
        assert_eq!(json_type_name(&json!(1)), "integer");
        assert_eq!(json_type_name(&json!(1.0)), "float");
        assert_eq!(json_type_name(&json!({})), "object");
    }

    #[test]
    fn string_or_string_array_contains() {
        let single = StringOrStringArray::from("string");
        assert!(single.contains("string"));
        assert_eq!(single.as_str(), Some("string"));

        let list = StringOrStringArray::from(vec!["string".to_string(), "null".to_string()]);
        assert!(list.contains("null"));
        assert!(!list.contains("object"));
        assert_eq!(list.as_str(), None);
    }

    #[test]
    fn integer_or_float_keeps_kind() {
        assert!(IntegerOrFloat::from(1).is_integer());
        assert!(!IntegerOrFloat::from(1.0).is_integer());
        assert_ne!(IntegerOrFloat::Integer(1), IntegerOrFloat::Float(1.0));
    }

    #[test]
    fn format_parse() {
        assert_eq!(Format::parse("JSON"), Some(Format::Json));
        assert_eq!(Format::parse("yml"), Some(Format::Yaml));
        assert_eq!(Format::parse("hcl"), Some(Format::Hcl));
        assert_eq!(Format::parse("toml"), None);
    }

    #[test]
    fn format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.hcl")), Some(Format::Hcl));
        assert_eq!(Format::from_path(Path::new("schema.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("schema")), None);
    }

    #[test]
    fn normalize_options_builder() {
        let opts = NormalizeOptions::new();
        assert!(!opts.resolve_refs && !opts.flatten_all_of && !opts.any_of_to_one_of);
        assert_eq!(opts.max_ref_sweeps, DEFAULT_MAX_REF_SWEEPS);

        let opts = NormalizeOptions::all().max_ref_sweeps(0);
        assert!(opts.resolve_refs && opts.flatten_all_of && opts.any_of_to_one_of);
        assert_eq!(opts.max_ref_sweeps, 1);
    }
}
