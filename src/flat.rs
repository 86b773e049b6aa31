//! Flattened, serde-derived mirror of the schema tree.
//!
//! Every named collection is a `BTreeMap`, so lookups are plain map access and
//! output is sorted by key. Declaration order is lost on the way through; use
//! [`crate::json_codec`] when order must survive. The two collection
//! strategies are never mixed: [`Schema`] is always insertion-ordered and
//! [`FlatSchema`] is always key-sorted.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::json_codec::{check_type_name, child_path, ROOT_PATH};
use crate::registry::Registry;
use crate::schema::{NamedSchemas, Schema, SchemaObject};
use crate::types::{
    EnumValue, IntegerOrFloat, SchemaOrSchemaArray, SchemaOrStringArray, StringOrStringArray,
};

/// A boolean schema or a flattened keyword object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatSchema {
    Bool(bool),
    Object(Box<FlatObject>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatNumber {
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatTypes {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatItems {
    Many(Vec<FlatSchema>),
    One(Box<FlatSchema>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatDependency {
    Names(Vec<String>),
    Schema(FlatSchema),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatEnumValue {
    String(String),
    Bool(bool),
    Number(FlatNumber),
    Null,
}

/// Keyword object with key-sorted collections.
///
/// Unknown keys are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatObject {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "$comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub examples: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<FlatTypes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<FlatNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<FlatNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<FlatNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<FlatNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<FlatNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FlatItems>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<FlatSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<FlatSchema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<FlatSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_names: Option<FlatSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, FlatSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_properties: Option<BTreeMap<String, FlatSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, FlatDependency>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<BTreeMap<String, FlatSchema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<FlatSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<FlatSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<FlatSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<FlatSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#if: Option<FlatSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<FlatSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#else: Option<FlatSchema>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub r#const: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<FlatEnumValue>>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` instead of `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parse JSON straight into the flattened form, then convert.
///
/// Schemas declaring `$id` are registered as with [`crate::json_codec`].
pub fn from_str(input: &str, registry: &Registry) -> Result<Schema, DecodeError> {
    let flat: FlatSchema =
        serde_json::from_str(input).map_err(|source| DecodeError::InvalidJson { source })?;
    flat.into_schema(ROOT_PATH, registry)
}

/// Render through the flattened form; collections come out key-sorted.
pub fn to_string(schema: &Schema, pretty: bool) -> Result<String, EncodeError> {
    let flat = FlatSchema::from(schema);
    let rendered = if pretty {
        serde_json::to_string_pretty(&flat)
    } else {
        serde_json::to_string(&flat)
    };
    rendered.map_err(|source| EncodeError::Json { source })
}

impl FlatSchema {
    /// Convert to the ordered tree, validating type names.
    pub fn into_schema(self, path: &str, registry: &Registry) -> Result<Schema, DecodeError> {
        match self {
            FlatSchema::Bool(b) => Ok(Schema::Bool(b)),
            FlatSchema::Object(flat) => {
                let obj = flat.into_object(path, registry)?;
                if let Some(id) = obj.id.as_deref() {
                    registry.register(id, Schema::from(obj.clone()));
                }
                Ok(Schema::from(obj))
            }
        }
    }
}

impl FlatObject {
    fn into_object(self, path: &str, registry: &Registry) -> Result<SchemaObject, DecodeError> {
        let child = |key: &str| child_path(path, key);
        let single = |schema: Option<FlatSchema>, key: &str| {
            schema
                .map(|s| s.into_schema(&child(key), registry))
                .transpose()
        };
        let list = |schemas: Option<Vec<FlatSchema>>, key: &str| {
            schemas
                .map(|list| {
                    let list_path = child(key);
                    list.into_iter()
                        .enumerate()
                        .map(|(i, s)| s.into_schema(&child_path(&list_path, &i.to_string()), registry))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()
        };
        let named = |map: Option<BTreeMap<String, FlatSchema>>, key: &str| {
            map.map(|map| {
                let map_path = child(key);
                map.into_iter()
                    .map(|(name, s)| {
                        let schema = s.into_schema(&child_path(&map_path, &name), registry)?;
                        Ok((name, schema))
                    })
                    .collect::<Result<NamedSchemas, DecodeError>>()
            })
            .transpose()
        };

        let r#type = match self.r#type {
            None => None,
            Some(FlatTypes::One(name)) => {
                check_type_name(&name, &child("type"))?;
                Some(StringOrStringArray::String(name))
            }
            Some(FlatTypes::Many(names)) => {
                if names.is_empty() {
                    return Err(DecodeError::shape(
                        &child("type"),
                        "type name or non-empty array of type names",
                        "empty array",
                    ));
                }
                for name in &names {
                    check_type_name(name, &child("type"))?;
                }
                Some(StringOrStringArray::StringArray(names))
            }
        };

        let items = match self.items {
            None => None,
            Some(FlatItems::One(schema)) => Some(SchemaOrSchemaArray::Schema(Box::new(
                schema.into_schema(&child("items"), registry)?,
            ))),
            Some(FlatItems::Many(schemas)) if schemas.is_empty() => {
                return Err(DecodeError::shape(
                    &child("items"),
                    "schema or non-empty array of schemas",
                    "empty array",
                ))
            }
            Some(FlatItems::Many(schemas)) => {
                list(Some(schemas), "items")?.map(SchemaOrSchemaArray::SchemaArray)
            }
        };

        let dependencies = match self.dependencies {
            None => None,
            Some(map) => {
                let deps_path = child("dependencies");
                let mut deps = indexmap::IndexMap::with_capacity(map.len());
                for (name, dep) in map {
                    let dep = match dep {
                        FlatDependency::Names(names) => SchemaOrStringArray::StringArray(names),
                        FlatDependency::Schema(s) => SchemaOrStringArray::Schema(Box::new(
                            s.into_schema(&child_path(&deps_path, &name), registry)?,
                        )),
                    };
                    deps.insert(name, dep);
                }
                Some(deps)
            }
        };

        Ok(SchemaObject {
            reference: self.reference,
            id: self.id,
            schema: self.schema,
            comment: self.comment,
            title: self.title,
            description: self.description,
            format: self.format,
            content_media_type: self.content_media_type,
            content_encoding: self.content_encoding,
            read_only: self.read_only,
            write_only: self.write_only,
            default: self.default,
            examples: self.examples,
            r#type,
            multiple_of: self.multiple_of.map(IntegerOrFloat::from),
            maximum: self.maximum.map(IntegerOrFloat::from),
            exclusive_maximum: self.exclusive_maximum.map(IntegerOrFloat::from),
            minimum: self.minimum.map(IntegerOrFloat::from),
            exclusive_minimum: self.exclusive_minimum.map(IntegerOrFloat::from),
            max_length: self.max_length,
            min_length: self.min_length,
            pattern: self.pattern,
            items,
            additional_items: single(self.additional_items, "additionalItems")?,
            max_items: self.max_items,
            min_items: self.min_items,
            unique_items: self.unique_items,
            contains: single(self.contains, "contains")?,
            max_properties: self.max_properties,
            min_properties: self.min_properties,
            required: self.required,
            additional_properties: single(self.additional_properties, "additionalProperties")?,
            property_names: single(self.property_names, "propertyNames")?,
            properties: named(self.properties, "properties")?,
            pattern_properties: named(self.pattern_properties, "patternProperties")?,
            dependencies,
            definitions: named(self.definitions, "definitions")?,
            all_of: list(self.all_of, "allOf")?,
            any_of: list(self.any_of, "anyOf")?,
            one_of: list(self.one_of, "oneOf")?,
            not: single(self.not, "not")?,
            r#if: single(self.r#if, "if")?,
            then: single(self.then, "then")?,
            r#else: single(self.r#else, "else")?,
            r#const: self.r#const,
            r#enum: self
                .r#enum
                .map(|members| members.into_iter().map(EnumValue::from).collect()),
        })
    }
}

impl From<FlatNumber> for IntegerOrFloat {
    fn from(n: FlatNumber) -> Self {
        match n {
            FlatNumber::Integer(i) => IntegerOrFloat::Integer(i),
            FlatNumber::Float(f) => IntegerOrFloat::Float(f),
        }
    }
}

impl From<IntegerOrFloat> for FlatNumber {
    fn from(n: IntegerOrFloat) -> Self {
        match n {
            IntegerOrFloat::Integer(i) => FlatNumber::Integer(i),
            IntegerOrFloat::Float(f) => FlatNumber::Float(f),
        }
    }
}

impl From<FlatEnumValue> for EnumValue {
    fn from(value: FlatEnumValue) -> Self {
        match value {
            FlatEnumValue::String(s) => EnumValue::String(s),
            FlatEnumValue::Bool(b) => EnumValue::Bool(b),
            FlatEnumValue::Number(n) => EnumValue::Number(n.into()),
            FlatEnumValue::Null => EnumValue::Null,
        }
    }
}

impl From<&EnumValue> for FlatEnumValue {
    fn from(value: &EnumValue) -> Self {
        match value {
            EnumValue::String(s) => FlatEnumValue::String(s.clone()),
            EnumValue::Bool(b) => FlatEnumValue::Bool(*b),
            EnumValue::Number(n) => FlatEnumValue::Number((*n).into()),
            EnumValue::Null => FlatEnumValue::Null,
        }
    }
}

fn flatten_named(map: &Option<NamedSchemas>) -> Option<BTreeMap<String, FlatSchema>> {
    map.as_ref().map(|map| {
        map.iter()
            .map(|(name, schema)| (name.clone(), FlatSchema::from(schema)))
            .collect()
    })
}

fn flatten_list(list: &Option<Vec<Schema>>) -> Option<Vec<FlatSchema>> {
    list.as_ref()
        .map(|list| list.iter().map(FlatSchema::from).collect())
}

fn flatten_single(schema: &Option<Schema>) -> Option<FlatSchema> {
    schema.as_ref().map(FlatSchema::from)
}

impl From<&Schema> for FlatSchema {
    fn from(schema: &Schema) -> Self {
        match schema {
            Schema::Bool(b) => FlatSchema::Bool(*b),
            Schema::Object(obj) => FlatSchema::Object(Box::new(FlatObject::from(obj.as_ref()))),
        }
    }
}

impl From<&SchemaObject> for FlatObject {
    fn from(obj: &SchemaObject) -> Self {
        FlatObject {
            reference: obj.reference.clone(),
            id: obj.id.clone(),
            schema: obj.schema.clone(),
            comment: obj.comment.clone(),
            title: obj.title.clone(),
            description: obj.description.clone(),
            format: obj.format.clone(),
            content_media_type: obj.content_media_type.clone(),
            content_encoding: obj.content_encoding.clone(),
            read_only: obj.read_only,
            write_only: obj.write_only,
            default: obj.default.clone(),
            examples: obj.examples.clone(),
            r#type: obj.r#type.as_ref().map(|t| match t {
                StringOrStringArray::String(s) => FlatTypes::One(s.clone()),
                StringOrStringArray::StringArray(names) => FlatTypes::Many(names.clone()),
            }),
            multiple_of: obj.multiple_of.map(FlatNumber::from),
            maximum: obj.maximum.map(FlatNumber::from),
            exclusive_maximum: obj.exclusive_maximum.map(FlatNumber::from),
            minimum: obj.minimum.map(FlatNumber::from),
            exclusive_minimum: obj.exclusive_minimum.map(FlatNumber::from),
            max_length: obj.max_length,
            min_length: obj.min_length,
            pattern: obj.pattern.clone(),
            items: obj.items.as_ref().map(|items| match items {
                SchemaOrSchemaArray::Schema(s) => FlatItems::One(Box::new(FlatSchema::from(s.as_ref()))),
                SchemaOrSchemaArray::SchemaArray(list) => {
                    FlatItems::Many(list.iter().map(FlatSchema::from).collect())
                }
            }),
            additional_items: flatten_single(&obj.additional_items),
            max_items: obj.max_items,
            min_items: obj.min_items,
            unique_items: obj.unique_items,
            contains: flatten_single(&obj.contains),
            max_properties: obj.max_properties,
            min_properties: obj.min_properties,
            required: obj.required.clone(),
            additional_properties: flatten_single(&obj.additional_properties),
            property_names: flatten_single(&obj.property_names),
            properties: flatten_named(&obj.properties),
            pattern_properties: flatten_named(&obj.pattern_properties),
            dependencies: obj.dependencies.as_ref().map(|deps| {
                deps.iter()
                    .map(|(name, dep)| {
                        let dep = match dep {
                            SchemaOrStringArray::Schema(s) => {
                                FlatDependency::Schema(FlatSchema::from(s.as_ref()))
                            }
                            SchemaOrStringArray::StringArray(names) => {
                                FlatDependency::Names(names.clone())
                            }
                        };
                        (name.clone(), dep)
                    })
                    .collect()
            }),
            definitions: flatten_named(&obj.definitions),
            all_of: flatten_list(&obj.all_of),
            any_of: flatten_list(&obj.any_of),
            one_of: flatten_list(&obj.one_of),
            not: flatten_single(&obj.not),
            r#if: flatten_single(&obj.r#if),
            then: flatten_single(&obj.then),
            r#else: flatten_single(&obj.r#else),
            r#const: obj.r#const.clone(),
            r#enum: obj
                .r#enum
                .as_ref()
                .map(|members| members.iter().map(FlatEnumValue::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_codec;
    use serde_json::json;

    #[test]
    fn collections_come_out_sorted() {
        let input = r#"{"properties":{"zeta":{"type":"string"},"alpha":{"type":"integer"}}}"#;
        let schema = json_codec::from_str(input, &Registry::new()).unwrap();
        assert_eq!(
            to_string(&schema, false).unwrap(),
            r#"{"properties":{"alpha":{"type":"integer"},"zeta":{"type":"string"}}}"#
        );
    }

    #[test]
    fn flat_and_ordered_trees_agree() {
        let input = json!({
            "$id": "urn:flat#",
            "type": ["object", "null"],
            "properties": {
                "b": {"type": "number", "maximum": 1.0, "minimum": 0},
                "a": {"enum": ["x", 2, 2.5, false, null]}
            },
            "items": [{"type": "string"}, true],
            "dependencies": {"a": ["b"], "b": {"required": ["a"]}},
            "default": null,
            "additionalProperties": false
        });
        let text = input.to_string();
        let ordered = json_codec::from_str(&text, &Registry::new()).unwrap();
        let flat = from_str(&text, &Registry::new()).unwrap();
        assert_eq!(flat, ordered);

        let rendered = to_string(&ordered, false).unwrap();
        assert_eq!(json_codec::from_str(&rendered, &Registry::new()).unwrap(), ordered);
    }

    #[test]
    fn explicit_null_default_is_kept() {
        let schema = from_str(r#"{"default": null}"#, &Registry::new()).unwrap();
        assert_eq!(schema.as_object().unwrap().default, Some(Value::Null));
    }

    #[test]
    fn numbers_keep_their_kind() {
        let flat: FlatObject = serde_json::from_str(r#"{"minimum": 1, "maximum": 1.0}"#).unwrap();
        assert_eq!(flat.minimum, Some(FlatNumber::Integer(1)));
        assert_eq!(flat.maximum, Some(FlatNumber::Float(1.0)));
    }

    #[test]
    fn invalid_type_name_is_rejected() {
        let err = from_str(r#"{"type": "map"}"#, &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTypeName { .. }));
    }

    #[test]
    fn ids_are_registered() {
        let registry = Registry::new();
        from_str(r#"{"$id": "urn:flat#"}"#, &registry).unwrap();
        assert!(registry.contains("urn:flat#"));
    }
}
