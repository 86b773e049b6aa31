//! Generic-tree codec: JSON (and YAML) to and from the schema tree.
//!
//! Decoding goes through [`serde_json::Value`], so any syntax that parses into
//! that tree shares the same keyword table. Error keys are JSON-pointer style
//! paths from the document root (`#/properties/name/type`).

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{DecodeError, EncodeError};
use crate::registry::Registry;
use crate::schema::{Dependencies, NamedSchemas, Schema, SchemaObject};
use crate::types::{
    is_type_name, json_type_name, EnumValue, IntegerOrFloat, SchemaOrSchemaArray,
    SchemaOrStringArray, StringOrStringArray,
};

/// Path of the document root in error keys.
pub const ROOT_PATH: &str = "#";

/// Decode a JSON document, registering every schema that declares `$id`.
pub fn from_str(input: &str, registry: &Registry) -> Result<Schema, DecodeError> {
    let value: Value =
        serde_json::from_str(input).map_err(|source| DecodeError::InvalidJson { source })?;
    from_value(&value, registry)
}

/// Decode a JSON document from raw bytes.
pub fn from_slice(input: &[u8], registry: &Registry) -> Result<Schema, DecodeError> {
    let value: Value =
        serde_json::from_slice(input).map_err(|source| DecodeError::InvalidJson { source })?;
    from_value(&value, registry)
}

/// Decode a YAML document. YAML is read into the same generic tree as JSON.
#[cfg(feature = "yaml")]
pub fn from_yaml_str(input: &str, registry: &Registry) -> Result<Schema, DecodeError> {
    let value: Value =
        serde_yaml::from_str(input).map_err(|source| DecodeError::InvalidYaml { source })?;
    from_value(&value, registry)
}

/// Decode an already-parsed tree.
pub fn from_value(value: &Value, registry: &Registry) -> Result<Schema, DecodeError> {
    decode_schema(value, ROOT_PATH, registry)
}

/// Append one pointer segment to `path`, escaping `~` and `/`.
pub(crate) fn child_path(path: &str, segment: &str) -> String {
    format!("{}/{}", path, segment.replace('~', "~0").replace('/', "~1"))
}

pub(crate) fn decode_schema(
    value: &Value,
    path: &str,
    registry: &Registry,
) -> Result<Schema, DecodeError> {
    match value {
        Value::Bool(b) => Ok(Schema::Bool(*b)),
        Value::Object(map) => {
            let obj = decode_object(map, path, registry)?;
            if let Some(id) = obj.id.as_deref() {
                registry.register(id, Schema::from(obj.clone()));
            }
            Ok(Schema::from(obj))
        }
        other => Err(DecodeError::shape(
            path,
            "schema object or boolean",
            json_type_name(other),
        )),
    }
}

fn decode_object(
    map: &Map<String, Value>,
    path: &str,
    registry: &Registry,
) -> Result<SchemaObject, DecodeError> {
    let mut obj = SchemaObject::default();

    for (key, value) in map {
        let path = child_path(path, key);
        let path = path.as_str();
        match key.as_str() {
            "$ref" => obj.reference = Some(decode_string(value, path)?),
            "$id" => obj.id = Some(decode_string(value, path)?),
            "$schema" => obj.schema = Some(decode_string(value, path)?),
            "$comment" => obj.comment = Some(decode_string(value, path)?),
            "title" => obj.title = Some(decode_string(value, path)?),
            "description" => obj.description = Some(decode_string(value, path)?),
            "format" => obj.format = Some(decode_string(value, path)?),
            "contentMediaType" => obj.content_media_type = Some(decode_string(value, path)?),
            "contentEncoding" => obj.content_encoding = Some(decode_string(value, path)?),
            "readOnly" => obj.read_only = Some(decode_bool(value, path)?),
            "writeOnly" => obj.write_only = Some(decode_bool(value, path)?),
            "default" => obj.default = Some(value.clone()),
            "examples" => obj.examples = Some(value.clone()),

            "type" => obj.r#type = Some(decode_type(value, path)?),

            "multipleOf" => obj.multiple_of = Some(decode_number(value, path)?),
            "maximum" => obj.maximum = Some(decode_number(value, path)?),
            "exclusiveMaximum" => obj.exclusive_maximum = Some(decode_number(value, path)?),
            "minimum" => obj.minimum = Some(decode_number(value, path)?),
            "exclusiveMinimum" => obj.exclusive_minimum = Some(decode_number(value, path)?),

            "maxLength" => obj.max_length = Some(decode_integer(value, path)?),
            "minLength" => obj.min_length = Some(decode_integer(value, path)?),
            "pattern" => obj.pattern = Some(decode_string(value, path)?),

            "items" => obj.items = Some(decode_items(value, path, registry)?),
            "additionalItems" => obj.additional_items = Some(decode_schema(value, path, registry)?),
            "maxItems" => obj.max_items = Some(decode_integer(value, path)?),
            "minItems" => obj.min_items = Some(decode_integer(value, path)?),
            "uniqueItems" => obj.unique_items = Some(decode_bool(value, path)?),
            "contains" => obj.contains = Some(decode_schema(value, path, registry)?),

            "maxProperties" => obj.max_properties = Some(decode_integer(value, path)?),
            "minProperties" => obj.min_properties = Some(decode_integer(value, path)?),
            "required" => obj.required = Some(decode_string_array(value, path)?),
            "additionalProperties" => {
                obj.additional_properties = Some(decode_schema(value, path, registry)?)
            }
            "propertyNames" => obj.property_names = Some(decode_schema(value, path, registry)?),
            "properties" => obj.properties = Some(decode_named(value, path, registry)?),
            "patternProperties" => {
                obj.pattern_properties = Some(decode_named(value, path, registry)?)
            }
            "dependencies" => obj.dependencies = Some(decode_dependencies(value, path, registry)?),
            "definitions" => obj.definitions = Some(decode_named(value, path, registry)?),

            "allOf" => obj.all_of = Some(decode_schema_list(value, path, registry)?),
            "anyOf" => obj.any_of = Some(decode_schema_list(value, path, registry)?),
            "oneOf" => obj.one_of = Some(decode_schema_list(value, path, registry)?),
            "not" => obj.not = Some(decode_schema(value, path, registry)?),
            "if" => obj.r#if = Some(decode_schema(value, path, registry)?),
            "then" => obj.then = Some(decode_schema(value, path, registry)?),
            "else" => obj.r#else = Some(decode_schema(value, path, registry)?),

            "const" => obj.r#const = Some(value.clone()),
            "enum" => obj.r#enum = Some(decode_enum(value, path)?),

            _ => debug!(key = key.as_str(), path, "ignoring unknown keyword"),
        }
    }

    Ok(obj)
}

fn decode_string(value: &Value, path: &str) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(DecodeError::shape(path, "string", json_type_name(other))),
    }
}

fn decode_bool(value: &Value, path: &str) -> Result<bool, DecodeError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(DecodeError::shape(path, "boolean", json_type_name(other))),
    }
}

fn decode_integer(value: &Value, path: &str) -> Result<i64, DecodeError> {
    match value {
        Value::Number(n) if !n.is_f64() => n
            .as_i64()
            .ok_or_else(|| DecodeError::shape(path, "integer", n.to_string())),
        other => Err(DecodeError::shape(path, "integer", json_type_name(other))),
    }
}

/// Classify by lexical kind: `1` is an integer, `1.0` and `1e0` are floats.
pub(crate) fn decode_number(value: &Value, path: &str) -> Result<IntegerOrFloat, DecodeError> {
    match value {
        Value::Number(n) => number_kind(n)
            .ok_or_else(|| DecodeError::shape(path, "integer or float", n.to_string())),
        other => Err(DecodeError::shape(
            path,
            "integer or float",
            json_type_name(other),
        )),
    }
}

/// Integers outside the `i64` range fall back to a float.
pub(crate) fn number_kind(n: &Number) -> Option<IntegerOrFloat> {
    if n.is_f64() {
        n.as_f64().map(IntegerOrFloat::Float)
    } else {
        n.as_i64()
            .map(IntegerOrFloat::Integer)
            .or_else(|| n.as_f64().map(IntegerOrFloat::Float))
    }
}

fn decode_type(value: &Value, path: &str) -> Result<StringOrStringArray, DecodeError> {
    const EXPECTED: &str = "type name or non-empty array of type names";
    match value {
        Value::String(name) => {
            check_type_name(name, path)?;
            Ok(StringOrStringArray::String(name.clone()))
        }
        Value::Array(items) if !items.is_empty() => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                let name = match item {
                    Value::String(s) => s,
                    other => return Err(DecodeError::shape(path, EXPECTED, json_type_name(other))),
                };
                check_type_name(name, path)?;
                names.push(name.clone());
            }
            Ok(StringOrStringArray::StringArray(names))
        }
        Value::Array(_) => Err(DecodeError::shape(path, EXPECTED, "empty array")),
        other => Err(DecodeError::shape(path, EXPECTED, json_type_name(other))),
    }
}

pub(crate) fn check_type_name(name: &str, path: &str) -> Result<(), DecodeError> {
    if is_type_name(name) {
        Ok(())
    } else {
        Err(DecodeError::InvalidTypeName {
            key: path.to_string(),
            name: name.to_string(),
        })
    }
}

fn decode_string_array(value: &Value, path: &str) -> Result<Vec<String>, DecodeError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(DecodeError::shape(
                    path,
                    "array of strings",
                    json_type_name(other),
                )),
            })
            .collect(),
        other => Err(DecodeError::shape(
            path,
            "array of strings",
            json_type_name(other),
        )),
    }
}

fn decode_items(
    value: &Value,
    path: &str,
    registry: &Registry,
) -> Result<SchemaOrSchemaArray, DecodeError> {
    match value {
        Value::Array(items) if items.is_empty() => Err(DecodeError::shape(
            path,
            "schema or non-empty array of schemas",
            "empty array",
        )),
        Value::Array(_) => Ok(SchemaOrSchemaArray::SchemaArray(decode_schema_list(
            value, path, registry,
        )?)),
        _ => Ok(SchemaOrSchemaArray::Schema(Box::new(decode_schema(
            value, path, registry,
        )?))),
    }
}

fn decode_schema_list(
    value: &Value,
    path: &str,
    registry: &Registry,
) -> Result<Vec<Schema>, DecodeError> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_schema(item, &child_path(path, &i.to_string()), registry))
            .collect(),
        other => Err(DecodeError::shape(
            path,
            "array of schemas",
            json_type_name(other),
        )),
    }
}

fn decode_named(
    value: &Value,
    path: &str,
    registry: &Registry,
) -> Result<NamedSchemas, DecodeError> {
    match value {
        Value::Object(map) => {
            let mut named = IndexMap::with_capacity(map.len());
            for (name, item) in map {
                let schema = decode_schema(item, &child_path(path, name), registry)?;
                named.insert(name.clone(), schema);
            }
            Ok(named)
        }
        other => Err(DecodeError::shape(
            path,
            "object of named schemas",
            json_type_name(other),
        )),
    }
}

pub(crate) fn decode_dependencies(
    value: &Value,
    path: &str,
    registry: &Registry,
) -> Result<Dependencies, DecodeError> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(DecodeError::shape(
                path,
                "object of schemas or string arrays",
                json_type_name(other),
            ))
        }
    };

    let mut deps = IndexMap::with_capacity(map.len());
    for (name, item) in map {
        let path = child_path(path, name);
        // schema-or-boolean first, then the string list
        let dep = match item {
            Value::Array(_) => SchemaOrStringArray::StringArray(decode_string_array(item, &path)?),
            _ => SchemaOrStringArray::Schema(Box::new(decode_schema(item, &path, registry)?)),
        };
        deps.insert(name.clone(), dep);
    }
    Ok(deps)
}

fn decode_enum(value: &Value, path: &str) -> Result<Vec<EnumValue>, DecodeError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(DecodeError::shape(path, "array", json_type_name(other))),
    };
    items.iter().map(|item| decode_enum_value(item, path)).collect()
}

pub(crate) fn decode_enum_value(value: &Value, path: &str) -> Result<EnumValue, DecodeError> {
    const EXPECTED: &str = "string, boolean, number or null";
    match value {
        Value::String(s) => Ok(EnumValue::String(s.clone())),
        Value::Bool(b) => Ok(EnumValue::Bool(*b)),
        Value::Null => Ok(EnumValue::Null),
        Value::Number(n) => number_kind(n)
            .map(EnumValue::Number)
            .ok_or_else(|| DecodeError::shape(path, EXPECTED, n.to_string())),
        other => Err(DecodeError::shape(path, EXPECTED, json_type_name(other))),
    }
}

/// Encode to a generic tree with keys in canonical draft-07 order.
pub fn to_value(schema: &Schema) -> Result<Value, EncodeError> {
    encode_schema(schema, ROOT_PATH)
}

/// Encode to JSON text.
pub fn to_string(schema: &Schema, pretty: bool) -> Result<String, EncodeError> {
    let value = to_value(schema)?;
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    rendered.map_err(|source| EncodeError::Json { source })
}

pub(crate) fn encode_schema(schema: &Schema, path: &str) -> Result<Value, EncodeError> {
    match schema {
        Schema::Bool(b) => Ok(Value::Bool(*b)),
        Schema::Object(obj) => encode_object(obj, path).map(Value::Object),
    }
}

fn encode_object(obj: &SchemaObject, path: &str) -> Result<Map<String, Value>, EncodeError> {
    let mut out = Map::new();

    let strings = [
        ("$schema", &obj.schema),
        ("$id", &obj.id),
        ("$ref", &obj.reference),
        ("$comment", &obj.comment),
        ("title", &obj.title),
        ("description", &obj.description),
    ];
    for (key, value) in strings {
        if let Some(s) = value {
            out.insert(key.to_string(), Value::String(s.clone()));
        }
    }

    if let Some(t) = &obj.r#type {
        let value = match t {
            StringOrStringArray::String(s) => Value::String(s.clone()),
            StringOrStringArray::StringArray(names) => string_array(names),
        };
        out.insert("type".to_string(), value);
    }

    let strings = [
        ("format", &obj.format),
        ("contentMediaType", &obj.content_media_type),
        ("contentEncoding", &obj.content_encoding),
    ];
    for (key, value) in strings {
        if let Some(s) = value {
            out.insert(key.to_string(), Value::String(s.clone()));
        }
    }

    if let Some(v) = &obj.default {
        out.insert("default".to_string(), v.clone());
    }
    if let Some(b) = obj.read_only {
        out.insert("readOnly".to_string(), Value::Bool(b));
    }
    if let Some(b) = obj.write_only {
        out.insert("writeOnly".to_string(), Value::Bool(b));
    }
    if let Some(v) = &obj.examples {
        out.insert("examples".to_string(), v.clone());
    }

    let numbers = [
        ("multipleOf", obj.multiple_of),
        ("maximum", obj.maximum),
        ("exclusiveMaximum", obj.exclusive_maximum),
        ("minimum", obj.minimum),
        ("exclusiveMinimum", obj.exclusive_minimum),
    ];
    for (key, value) in numbers {
        if let Some(n) = value {
            let value = number_to_json(n, &child_path(path, key))?;
            out.insert(key.to_string(), value);
        }
    }

    if let Some(n) = obj.max_length {
        out.insert("maxLength".to_string(), Value::from(n));
    }
    if let Some(n) = obj.min_length {
        out.insert("minLength".to_string(), Value::from(n));
    }
    if let Some(s) = &obj.pattern {
        out.insert("pattern".to_string(), Value::String(s.clone()));
    }

    if let Some(s) = &obj.additional_items {
        let value = encode_schema(s, &child_path(path, "additionalItems"))?;
        out.insert("additionalItems".to_string(), value);
    }
    if let Some(items) = &obj.items {
        let path = child_path(path, "items");
        let value = match items {
            SchemaOrSchemaArray::Schema(s) => encode_schema(s, &path)?,
            SchemaOrSchemaArray::SchemaArray(list) => encode_schema_list(list, &path)?,
        };
        out.insert("items".to_string(), value);
    }
    if let Some(n) = obj.max_items {
        out.insert("maxItems".to_string(), Value::from(n));
    }
    if let Some(n) = obj.min_items {
        out.insert("minItems".to_string(), Value::from(n));
    }
    if let Some(b) = obj.unique_items {
        out.insert("uniqueItems".to_string(), Value::Bool(b));
    }
    if let Some(s) = &obj.contains {
        let value = encode_schema(s, &child_path(path, "contains"))?;
        out.insert("contains".to_string(), value);
    }

    if let Some(n) = obj.max_properties {
        out.insert("maxProperties".to_string(), Value::from(n));
    }
    if let Some(n) = obj.min_properties {
        out.insert("minProperties".to_string(), Value::from(n));
    }
    if let Some(names) = &obj.required {
        out.insert("required".to_string(), string_array(names));
    }
    if let Some(s) = &obj.additional_properties {
        let value = encode_schema(s, &child_path(path, "additionalProperties"))?;
        out.insert("additionalProperties".to_string(), value);
    }

    let named = [
        ("definitions", &obj.definitions),
        ("properties", &obj.properties),
        ("patternProperties", &obj.pattern_properties),
    ];
    for (key, value) in named {
        if let Some(map) = value {
            let value = encode_named(map, &child_path(path, key))?;
            out.insert(key.to_string(), value);
        }
    }

    if let Some(deps) = &obj.dependencies {
        let dep_path = child_path(path, "dependencies");
        let mut map = Map::new();
        for (name, dep) in deps {
            let value = match dep {
                SchemaOrStringArray::Schema(s) => encode_schema(s, &child_path(&dep_path, name))?,
                SchemaOrStringArray::StringArray(names) => string_array(names),
            };
            map.insert(name.clone(), value);
        }
        out.insert("dependencies".to_string(), Value::Object(map));
    }
    if let Some(s) = &obj.property_names {
        let value = encode_schema(s, &child_path(path, "propertyNames"))?;
        out.insert("propertyNames".to_string(), value);
    }

    if let Some(v) = &obj.r#const {
        out.insert("const".to_string(), v.clone());
    }
    if let Some(members) = &obj.r#enum {
        let enum_path = child_path(path, "enum");
        let values = members
            .iter()
            .map(|m| enum_value_to_json(m, &enum_path))
            .collect::<Result<Vec<_>, _>>()?;
        out.insert("enum".to_string(), Value::Array(values));
    }

    let lists = [
        ("allOf", &obj.all_of),
        ("anyOf", &obj.any_of),
        ("oneOf", &obj.one_of),
    ];
    for (key, value) in lists {
        if let Some(list) = value {
            let value = encode_schema_list(list, &child_path(path, key))?;
            out.insert(key.to_string(), value);
        }
    }

    let singles = [
        ("not", &obj.not),
        ("if", &obj.r#if),
        ("then", &obj.then),
        ("else", &obj.r#else),
    ];
    for (key, value) in singles {
        if let Some(s) = value {
            let value = encode_schema(s, &child_path(path, key))?;
            out.insert(key.to_string(), value);
        }
    }

    Ok(out)
}

fn encode_schema_list(list: &[Schema], path: &str) -> Result<Value, EncodeError> {
    list.iter()
        .enumerate()
        .map(|(i, s)| encode_schema(s, &child_path(path, &i.to_string())))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn encode_named(map: &NamedSchemas, path: &str) -> Result<Value, EncodeError> {
    let mut out = Map::new();
    for (name, schema) in map {
        out.insert(name.clone(), encode_schema(schema, &child_path(path, name))?);
    }
    Ok(Value::Object(out))
}

fn string_array(names: &[String]) -> Value {
    Value::Array(names.iter().cloned().map(Value::String).collect())
}

pub(crate) fn number_to_json(n: IntegerOrFloat, path: &str) -> Result<Value, EncodeError> {
    match n {
        IntegerOrFloat::Integer(i) => Ok(Value::from(i)),
        IntegerOrFloat::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| EncodeError::NonFiniteNumber {
                key: path.to_string(),
            }),
    }
}

pub(crate) fn enum_value_to_json(value: &EnumValue, path: &str) -> Result<Value, EncodeError> {
    match value {
        EnumValue::String(s) => Ok(Value::String(s.clone())),
        EnumValue::Bool(b) => Ok(Value::Bool(*b)),
        EnumValue::Number(n) => number_to_json(*n, path),
        EnumValue::Null => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Schema {
        from_value(&value, &Registry::new()).unwrap()
    }

    fn object(schema: &Schema) -> &SchemaObject {
        schema.as_object().unwrap()
    }

    #[test]
    fn boolean_literal_decodes_to_boolean_variant() {
        assert_eq!(decode(json!(true)), Schema::Bool(true));
        let schema = decode(json!({"additionalProperties": false}));
        assert_eq!(object(&schema).additional_properties, Some(Schema::Bool(false)));
    }

    #[test]
    fn object_decodes_to_schema_variant() {
        let schema = decode(json!({"not": {"type": "string"}}));
        let not = object(&schema).not.as_ref().unwrap();
        assert!(object(not).type_is("string"));
    }

    #[test]
    fn type_and_enum_scenario() {
        let input = json!({"type": ["string", "null"], "enum": ["x", "y", null]});
        let schema = decode(input.clone());
        let obj = object(&schema);

        assert_eq!(
            obj.r#type,
            Some(StringOrStringArray::StringArray(vec![
                "string".to_string(),
                "null".to_string()
            ]))
        );
        assert_eq!(
            obj.r#enum,
            Some(vec![
                EnumValue::from("x"),
                EnumValue::from("y"),
                EnumValue::Null
            ])
        );
        assert_eq!(to_value(&schema).unwrap(), input);
    }

    #[test]
    fn numeric_kind_follows_lexical_form() {
        let schema = from_str(r#"{"minimum": 1, "maximum": 1.0, "multipleOf": 1e1}"#, &Registry::new())
            .unwrap();
        let obj = object(&schema);
        assert_eq!(obj.minimum, Some(IntegerOrFloat::Integer(1)));
        assert_eq!(obj.maximum, Some(IntegerOrFloat::Float(1.0)));
        assert_eq!(obj.multiple_of, Some(IntegerOrFloat::Float(10.0)));

        let text = to_string(&schema, false).unwrap();
        assert!(text.contains(r#""maximum":1.0"#));
        assert!(text.contains(r#""minimum":1"#));
        assert!(!text.contains(r#""minimum":1.0"#));
    }

    #[test]
    fn integers_beyond_i64_become_floats() {
        let schema = from_str(
            r#"{"maximum": 18446744073709551615, "enum": [9223372036854775808]}"#,
            &Registry::new(),
        )
        .unwrap();
        let obj = object(&schema);
        assert_eq!(obj.maximum, Some(IntegerOrFloat::Float(18446744073709551615.0)));
        assert_eq!(
            obj.r#enum,
            Some(vec![EnumValue::Number(IntegerOrFloat::Float(9223372036854775808.0))])
        );

        let text = to_string(&schema, false).unwrap();
        assert_eq!(from_str(&text, &Registry::new()).unwrap(), schema);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let schema = decode(json!({"x-vendor": {"a": 1}, "title": "t"}));
        assert_eq!(object(&schema).title.as_deref(), Some("t"));
        assert_eq!(
            to_value(&schema).unwrap(),
            json!({"title": "t"})
        );
    }

    #[test]
    fn shape_errors_name_the_key() {
        let err = from_value(&json!({"type": 5}), &Registry::new()).unwrap_err();
        match err {
            DecodeError::Shape { key, found, .. } => {
                assert_eq!(key, "#/type");
                assert_eq!(found, "integer");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = from_value(
            &json!({"properties": {"a": {"maxLength": 1.5}}}),
            &Registry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Shape { ref key, .. } if key == "#/properties/a/maxLength"));
    }

    #[test]
    fn type_names_are_validated() {
        let err = from_value(&json!({"type": ["string", "map"]}), &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTypeName { ref name, .. } if name == "map"));

        let err = from_value(&json!({"type": []}), &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { .. }));
    }

    #[test]
    fn items_single_and_tuple() {
        let schema = decode(json!({"items": {"type": "string"}}));
        assert!(matches!(
            object(&schema).items,
            Some(SchemaOrSchemaArray::Schema(_))
        ));

        let schema = decode(json!({"items": [{"type": "string"}, true]}));
        match &object(&schema).items {
            Some(SchemaOrSchemaArray::SchemaArray(list)) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[1], Schema::Bool(true));
            }
            other => panic!("unexpected items: {other:?}"),
        }

        assert!(from_value(&json!({"items": []}), &Registry::new()).is_err());
    }

    #[test]
    fn dependencies_distinguish_schema_and_names() {
        let schema = decode(json!({
            "dependencies": {
                "card": ["billing"],
                "vip": {"required": ["tier"]},
                "free": true
            }
        }));
        let deps = object(&schema).dependencies.as_ref().unwrap();
        assert_eq!(
            deps["card"],
            SchemaOrStringArray::StringArray(vec!["billing".to_string()])
        );
        assert!(matches!(deps["vip"], SchemaOrStringArray::Schema(_)));
        assert_eq!(deps["free"], SchemaOrStringArray::Schema(Box::new(Schema::Bool(true))));
    }

    #[test]
    fn enum_rejects_compound_members() {
        let err = from_value(&json!({"enum": [{"a": 1}]}), &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { .. }));
    }

    #[test]
    fn ids_are_registered_while_decoding() {
        let registry = Registry::new();
        from_value(
            &json!({
                "$id": "urn:x#",
                "definitions": {
                    "Foo": {"type": "string"},
                    "Bar": {"$id": "urn:bar#", "type": "integer"}
                }
            }),
            &registry,
        )
        .unwrap();

        assert_eq!(registry.ids(), vec!["urn:bar#".to_string(), "urn:x#".to_string()]);
        let root = registry.get("urn:x#").unwrap();
        assert!(object(&root).definition("Foo").is_some());
    }

    #[test]
    fn property_order_survives_round_trip() {
        let input = r#"{"properties":{"zeta":{"type":"string"},"alpha":{"type":"integer"}}}"#;
        let schema = from_str(input, &Registry::new()).unwrap();
        assert_eq!(to_string(&schema, false).unwrap(), input);
    }

    #[test]
    fn empty_collections_are_kept() {
        let schema = decode(json!({"properties": {}, "required": []}));
        assert_eq!(
            to_value(&schema).unwrap(),
            json!({"required": [], "properties": {}})
        );
        assert_eq!(to_value(&Schema::empty()).unwrap(), json!({}));
    }

    #[test]
    fn non_finite_float_fails_to_encode() {
        let schema = Schema::from(SchemaObject {
            maximum: Some(IntegerOrFloat::Float(f64::INFINITY)),
            ..SchemaObject::default()
        });
        let err = to_value(&schema).unwrap_err();
        assert!(matches!(err, EncodeError::NonFiniteNumber { ref key } if key == "#/maximum"));
    }

    #[test]
    fn malformed_json_is_a_syntax_error() {
        let err = from_str("{\"type\": ", &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson { .. }));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_reads_into_the_same_tree() {
        let yaml = "type: object\nproperties:\n  name:\n    type: string\n    maxLength: 3\n  ratio:\n    maximum: 1.0\n";
        let schema = from_yaml_str(yaml, &Registry::new()).unwrap();
        let obj = object(&schema);
        assert!(obj.type_is("object"));
        let name = object(obj.property("name").unwrap());
        assert_eq!(name.max_length, Some(3));
        let ratio = object(obj.property("ratio").unwrap());
        assert_eq!(ratio.maximum, Some(IntegerOrFloat::Float(1.0)));
    }

    #[test]
    fn child_path_escapes_segments() {
        assert_eq!(child_path("#", "a/b~c"), "#/a~1b~0c");
    }
}
