//! The draft-07 schema tree.
//!
//! A [`Schema`] is either a boolean schema or a [`SchemaObject`] holding every
//! keyword as an optional field. Named collections (`properties`,
//! `definitions`, `patternProperties`, `dependencies`) are insertion-ordered
//! maps so declaration order survives a round trip through either format.

use indexmap::IndexMap;
use serde_json::Value;

use crate::types::{
    EnumValue, IntegerOrFloat, SchemaOrSchemaArray, SchemaOrStringArray, StringOrStringArray,
};

/// Ordered name → schema mapping.
pub type NamedSchemas = IndexMap<String, Schema>;

/// Ordered name → dependency mapping.
pub type Dependencies = IndexMap<String, SchemaOrStringArray>;

/// A schema: the always/never boolean schema, or a keyword object.
///
/// This is also the "schema or boolean" union used by every keyword whose
/// value is a sub-schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Bool(bool),
    Object(Box<SchemaObject>),
}

impl Schema {
    /// An object schema with no keywords.
    pub fn empty() -> Self {
        Schema::Object(Box::default())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Schema::Bool(b) => Some(*b),
            Schema::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            Schema::Object(obj) => Some(obj),
            Schema::Bool(_) => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut SchemaObject> {
        match self {
            Schema::Object(obj) => Some(obj),
            Schema::Bool(_) => None,
        }
    }
}

impl From<bool> for Schema {
    fn from(b: bool) -> Self {
        Schema::Bool(b)
    }
}

impl From<SchemaObject> for Schema {
    fn from(obj: SchemaObject) -> Self {
        Schema::Object(Box::new(obj))
    }
}

/// Every draft-07 keyword, each optional.
///
/// `default`, `examples` and `const` are opaque JSON values; they are stored
/// and re-emitted but never interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaObject {
    pub reference: Option<String>,

    pub id: Option<String>,
    pub schema: Option<String>,
    pub comment: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub content_media_type: Option<String>,
    pub content_encoding: Option<String>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub default: Option<Value>,
    pub examples: Option<Value>,

    pub r#type: Option<StringOrStringArray>,

    pub multiple_of: Option<IntegerOrFloat>,
    pub maximum: Option<IntegerOrFloat>,
    pub exclusive_maximum: Option<IntegerOrFloat>,
    pub minimum: Option<IntegerOrFloat>,
    pub exclusive_minimum: Option<IntegerOrFloat>,

    pub max_length: Option<i64>,
    pub min_length: Option<i64>,
    pub pattern: Option<String>,

    pub items: Option<SchemaOrSchemaArray>,
    pub additional_items: Option<Schema>,
    pub max_items: Option<i64>,
    pub min_items: Option<i64>,
    pub unique_items: Option<bool>,
    pub contains: Option<Schema>,

    pub max_properties: Option<i64>,
    pub min_properties: Option<i64>,
    pub required: Option<Vec<String>>,
    pub additional_properties: Option<Schema>,
    pub property_names: Option<Schema>,
    pub properties: Option<NamedSchemas>,
    pub pattern_properties: Option<NamedSchemas>,
    pub dependencies: Option<Dependencies>,
    pub definitions: Option<NamedSchemas>,

    pub all_of: Option<Vec<Schema>>,
    pub any_of: Option<Vec<Schema>>,
    pub one_of: Option<Vec<Schema>>,
    pub not: Option<Schema>,
    pub r#if: Option<Schema>,
    pub then: Option<Schema>,
    pub r#else: Option<Schema>,

    pub r#const: Option<Value>,
    pub r#enum: Option<Vec<EnumValue>>,
}

macro_rules! overwrite_populated {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

impl SchemaObject {
    /// True iff no keyword is set.
    pub fn is_empty(&self) -> bool {
        *self == SchemaObject::default()
    }

    /// True iff `$ref` is set and no other keyword is.
    pub fn is_pure_reference(&self) -> bool {
        self.reference.is_some()
            && *self
                == SchemaObject {
                    reference: self.reference.clone(),
                    ..SchemaObject::default()
                }
    }

    /// True if `type` names `type_name`, either alone or in its list.
    pub fn type_is(&self, type_name: &str) -> bool {
        self.r#type
            .as_ref()
            .map(|t| t.contains(type_name))
            .unwrap_or(false)
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.as_ref().and_then(|m| m.get(name))
    }

    pub fn definition(&self, name: &str) -> Option<&Schema> {
        self.definitions.as_ref().and_then(|m| m.get(name))
    }

    pub fn pattern_property(&self, name: &str) -> Option<&Schema> {
        self.pattern_properties.as_ref().and_then(|m| m.get(name))
    }

    /// Append (or replace in place) a named property.
    pub fn add_property(&mut self, name: impl Into<String>, schema: Schema) {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), schema);
    }

    /// Shallow merge: every keyword populated on `source` overwrites the
    /// same keyword here. Keywords absent on `source` are left untouched.
    pub fn merge_from(&mut self, source: &SchemaObject) {
        overwrite_populated!(
            self,
            source,
            reference,
            id,
            schema,
            comment,
            title,
            description,
            format,
            content_media_type,
            content_encoding,
            read_only,
            write_only,
            default,
            examples,
            r#type,
            multiple_of,
            maximum,
            exclusive_maximum,
            minimum,
            exclusive_minimum,
            max_length,
            min_length,
            pattern,
            items,
            additional_items,
            max_items,
            min_items,
            unique_items,
            contains,
            max_properties,
            min_properties,
            required,
            additional_properties,
            property_names,
            properties,
            pattern_properties,
            dependencies,
            definitions,
            all_of,
            any_of,
            one_of,
            not,
            r#if,
            then,
            r#else,
            r#const,
            r#enum,
        );
    }
}

/// The keyword through which a nested schema was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Root,
    AdditionalItems,
    Items,
    Contains,
    AdditionalProperties,
    Definitions,
    Properties,
    PatternProperties,
    Dependencies,
    PropertyNames,
    If,
    Then,
    Else,
    AllOf,
    AnyOf,
    OneOf,
    Not,
}

/// Visit `schema` and every schema nested in it, children before parents.
///
/// `visit` receives each schema together with the keyword it hangs off.
pub fn walk_mut<F>(schema: &mut Schema, context: Context, visit: &mut F)
where
    F: FnMut(&mut Schema, Context),
{
    if let Schema::Object(obj) = schema {
        let obj: &mut SchemaObject = obj;
        if let Some(child) = obj.additional_items.as_mut() {
            walk_mut(child, Context::AdditionalItems, visit);
        }
        match obj.items.as_mut() {
            Some(SchemaOrSchemaArray::Schema(child)) => walk_mut(child, Context::Items, visit),
            Some(SchemaOrSchemaArray::SchemaArray(children)) => {
                for child in children {
                    walk_mut(child, Context::Items, visit);
                }
            }
            None => {}
        }
        if let Some(child) = obj.contains.as_mut() {
            walk_mut(child, Context::Contains, visit);
        }
        if let Some(child) = obj.additional_properties.as_mut() {
            walk_mut(child, Context::AdditionalProperties, visit);
        }
        for (map, context) in [
            (obj.definitions.as_mut(), Context::Definitions),
            (obj.properties.as_mut(), Context::Properties),
            (obj.pattern_properties.as_mut(), Context::PatternProperties),
        ] {
            if let Some(map) = map {
                for child in map.values_mut() {
                    walk_mut(child, context, visit);
                }
            }
        }
        if let Some(deps) = obj.dependencies.as_mut() {
            for dep in deps.values_mut() {
                if let SchemaOrStringArray::Schema(child) = dep {
                    walk_mut(child, Context::Dependencies, visit);
                }
            }
        }
        if let Some(child) = obj.property_names.as_mut() {
            walk_mut(child, Context::PropertyNames, visit);
        }
        for (child, context) in [
            (obj.r#if.as_mut(), Context::If),
            (obj.then.as_mut(), Context::Then),
            (obj.r#else.as_mut(), Context::Else),
        ] {
            if let Some(child) = child {
                walk_mut(child, context, visit);
            }
        }
        for (list, context) in [
            (obj.all_of.as_mut(), Context::AllOf),
            (obj.any_of.as_mut(), Context::AnyOf),
            (obj.one_of.as_mut(), Context::OneOf),
        ] {
            if let Some(list) = list {
                for child in list {
                    walk_mut(child, context, visit);
                }
            }
        }
        if let Some(child) = obj.not.as_mut() {
            walk_mut(child, Context::Not, visit);
        }
    }

    visit(schema, context);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(name: &str) -> Schema {
        Schema::from(SchemaObject {
            r#type: Some(name.into()),
            ..SchemaObject::default()
        })
    }

    #[test]
    fn empty_object_is_empty() {
        assert!(SchemaObject::default().is_empty());
        let obj = SchemaObject {
            properties: Some(IndexMap::new()),
            ..SchemaObject::default()
        };
        // an explicitly empty collection is still a populated keyword
        assert!(!obj.is_empty());
    }

    #[test]
    fn pure_reference_detection() {
        let pure = SchemaObject {
            reference: Some("#/definitions/a".into()),
            ..SchemaObject::default()
        };
        assert!(pure.is_pure_reference());

        let annotated = SchemaObject {
            reference: Some("#/definitions/a".into()),
            description: Some("annotated".into()),
            ..SchemaObject::default()
        };
        assert!(!annotated.is_pure_reference());
        assert!(!SchemaObject::default().is_pure_reference());
    }

    #[test]
    fn lookup_by_name_returns_explicit_absence() {
        let mut obj = SchemaObject::default();
        assert!(obj.property("name").is_none());

        obj.add_property("name", typed("string"));
        obj.add_property("age", typed("integer"));
        assert_eq!(obj.property("name"), Some(&typed("string")));
        assert!(obj.property("missing").is_none());
        assert!(obj.definition("name").is_none());
        assert!(obj.pattern_property("name").is_none());

        let names: Vec<&String> = obj.properties.as_ref().unwrap().keys().collect();
        assert_eq!(names, ["name", "age"]);
    }

    #[test]
    fn type_is_checks_single_and_list() {
        let obj = SchemaObject {
            r#type: Some(vec!["object".to_string(), "null".to_string()].into()),
            ..SchemaObject::default()
        };
        assert!(obj.type_is("object"));
        assert!(obj.type_is("null"));
        assert!(!obj.type_is("string"));
        assert!(!SchemaObject::default().type_is("object"));
    }

    #[test]
    fn merge_overwrites_only_populated_fields() {
        let mut target = SchemaObject {
            title: Some("target".into()),
            description: Some("kept".into()),
            ..SchemaObject::default()
        };
        let source = SchemaObject {
            title: Some("source".into()),
            max_length: Some(3),
            ..SchemaObject::default()
        };
        target.merge_from(&source);

        assert_eq!(target.title.as_deref(), Some("source"));
        assert_eq!(target.description.as_deref(), Some("kept"));
        assert_eq!(target.max_length, Some(3));
    }

    #[test]
    fn equality_ignores_named_collection_order() {
        let mut a = SchemaObject::default();
        a.add_property("x", typed("string"));
        a.add_property("y", typed("number"));
        let mut b = SchemaObject::default();
        b.add_property("y", typed("number"));
        b.add_property("x", typed("string"));
        assert_eq!(Schema::from(a), Schema::from(b));
    }

    #[test]
    fn equality_keeps_list_order_and_number_kind() {
        let a = SchemaObject {
            all_of: Some(vec![typed("string"), typed("null")]),
            ..SchemaObject::default()
        };
        let b = SchemaObject {
            all_of: Some(vec![typed("null"), typed("string")]),
            ..SchemaObject::default()
        };
        assert_ne!(a, b);

        let int = SchemaObject {
            minimum: Some(IntegerOrFloat::Integer(1)),
            ..SchemaObject::default()
        };
        let float = SchemaObject {
            minimum: Some(IntegerOrFloat::Float(1.0)),
            ..SchemaObject::default()
        };
        assert_ne!(int, float);
    }

    #[test]
    fn walk_visits_children_before_parents() {
        let mut root = SchemaObject::default();
        root.add_property("a", typed("string"));
        root.one_of = Some(vec![typed("null"), Schema::Bool(true)]);
        let mut root = Schema::from(root);

        let mut seen = Vec::new();
        walk_mut(&mut root, Context::Root, &mut |schema, context| {
            seen.push((context, schema.as_bool()));
        });

        assert_eq!(
            seen,
            vec![
                (Context::Properties, None),
                (Context::OneOf, None),
                (Context::OneOf, Some(true)),
                (Context::Root, None),
            ]
        );
    }
}
