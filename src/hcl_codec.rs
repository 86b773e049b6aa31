//! Attribute/block codec: HCL to and from the schema tree.
//!
//! Scalars and literal lists are attributes; schema-shaped keywords are
//! blocks. Named collections use one labelled block per entry:
//!
//! ```hcl
//! _id  = "urn:example#"
//! type = "object"
//! required = ["name"]
//!
//! properties "name" {
//!   type      = "string"
//!   maxLength = 64
//! }
//!
//! additionalProperties = false
//! ```
//!
//! The reserved keywords `$id`, `$ref`, `$schema` and `$comment` are written
//! with a leading `_` because `$` cannot start an identifier. A body holding
//! only the `_value` attribute carries a non-object value (a boolean schema
//! or a dependency's property list).

use hcl::edit::expr::Expression as EditExpression;
use hcl::edit::visit_mut::{visit_expr_mut, VisitMut};
use hcl::edit::Ident;
use hcl::expr::{Operation, TemplateExpr, TraversalOperator, UnaryOperator, Variable};
use hcl::{Attribute, Block, BlockLabel, Body, Expression, Identifier, Number, ObjectKey, Structure};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{DecodeError, EncodeError};
use crate::json_codec::{self, child_path, ROOT_PATH};
use crate::registry::Registry;
use crate::schema::{Dependencies, NamedSchemas, Schema, SchemaObject};
use crate::types::{
    EnumValue, IntegerOrFloat, SchemaOrSchemaArray, SchemaOrStringArray, StringOrStringArray,
};

/// Attribute carrying the value of a non-object body.
pub const VALUE_ATTRIBUTE: &str = "_value";

const RESERVED: [(&str, &str); 4] = [
    ("$id", "_id"),
    ("$ref", "_ref"),
    ("$schema", "_schema"),
    ("$comment", "_comment"),
];

/// Map an HCL attribute name to its schema keyword (`_ref` → `$ref`).
pub fn keyword_for(attribute: &str) -> &str {
    RESERVED
        .iter()
        .find(|(_, attr)| *attr == attribute)
        .map(|(keyword, _)| *keyword)
        .unwrap_or(attribute)
}

/// Map a schema keyword to its HCL attribute name (`$ref` → `_ref`).
pub fn attribute_for(keyword: &str) -> &str {
    RESERVED
        .iter()
        .find(|(kw, _)| *kw == keyword)
        .map(|(_, attr)| *attr)
        .unwrap_or(keyword)
}

/// Decode an HCL document, registering every schema that declares `$id`.
///
/// Float literals without a fractional part (`1.0`) keep their float kind.
pub fn from_str(input: &str, registry: &Registry) -> Result<Schema, DecodeError> {
    let mut body = hcl::edit::parser::parse_body(input)
        .map_err(|source| DecodeError::InvalidHcl { source: source.into() })?;
    FloatLiterals.visit_body_mut(&mut body);
    let body: Body = body.into();
    from_body(&body, registry)
}

/// Rewrites integral float literals into bare variables holding the literal
/// text, since converting to [`Body`] folds `1.0` into the integer `1`.
/// [`literal_number`] reads them back as floats.
struct FloatLiterals;

impl VisitMut for FloatLiterals {
    fn visit_expr_mut(&mut self, expr: &mut EditExpression) {
        let literal = match expr {
            EditExpression::Number(n) if !n.value().is_f64() => n
                .as_repr()
                .map(|repr| (**repr).to_owned())
                .filter(|text| float_literal(text).is_some()),
            _ => None,
        };
        match literal {
            Some(text) => *expr = EditExpression::from(Ident::new_unchecked(text)),
            None => visit_expr_mut(self, expr),
        }
    }
}

/// Value of a float literal such as `1.0`, `-2.0` or `1e3`.
fn float_literal(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.starts_with(|c: char| c.is_ascii_digit())
        || !digits.contains(|c: char| matches!(c, '.' | 'e' | 'E'))
    {
        return None;
    }
    digits
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| if text.starts_with('-') { -f } else { f })
}

/// Decode an already-parsed body.
pub fn from_body(body: &Body, registry: &Registry) -> Result<Schema, DecodeError> {
    decode_body(body, ROOT_PATH, registry)
}

fn value_attribute(body: &Body) -> Option<&Expression> {
    let mut structures = body.iter();
    match (structures.next(), structures.next()) {
        (Some(Structure::Attribute(attr)), None) if attr.key.as_str() == VALUE_ATTRIBUTE => {
            Some(&attr.expr)
        }
        _ => None,
    }
}

fn decode_body(body: &Body, path: &str, registry: &Registry) -> Result<Schema, DecodeError> {
    if let Some(expr) = value_attribute(body) {
        return decode_schema_expr(expr, path, registry);
    }

    let obj = decode_object_body(body, path, registry)?;
    if let Some(id) = obj.id.as_deref() {
        registry.register(id, Schema::from(obj.clone()));
    }
    Ok(Schema::from(obj))
}

fn decode_object_body(
    body: &Body,
    path: &str,
    registry: &Registry,
) -> Result<SchemaObject, DecodeError> {
    let mut obj = SchemaObject::default();
    let mut item_blocks = Vec::new();

    for structure in body.iter() {
        match structure {
            Structure::Attribute(attr) => {
                decode_attribute(attr, path, registry, &mut obj)?
            }
            Structure::Block(block) => {
                decode_block(block, path, registry, &mut obj, &mut item_blocks)?
            }
        }
    }

    if !item_blocks.is_empty() {
        obj.items = Some(match obj.items.take() {
            None if item_blocks.len() == 1 => {
                SchemaOrSchemaArray::Schema(Box::new(item_blocks.remove(0)))
            }
            None => SchemaOrSchemaArray::SchemaArray(item_blocks),
            Some(SchemaOrSchemaArray::Schema(first)) => {
                let mut list = vec![*first];
                list.extend(item_blocks);
                SchemaOrSchemaArray::SchemaArray(list)
            }
            Some(SchemaOrSchemaArray::SchemaArray(mut list)) => {
                list.extend(item_blocks);
                SchemaOrSchemaArray::SchemaArray(list)
            }
        });
    }

    Ok(obj)
}

fn decode_attribute(
    attr: &Attribute,
    path: &str,
    registry: &Registry,
    obj: &mut SchemaObject,
) -> Result<(), DecodeError> {
    let keyword = keyword_for(attr.key.as_str());
    let path = child_path(path, keyword);
    let path = path.as_str();
    let expr = &attr.expr;

    match keyword {
        "$ref" => obj.reference = Some(decode_string(expr, path)?),
        "$id" => obj.id = Some(decode_string(expr, path)?),
        "$schema" => obj.schema = Some(decode_string(expr, path)?),
        "$comment" => obj.comment = Some(decode_string(expr, path)?),
        "title" => obj.title = Some(decode_string(expr, path)?),
        "description" => obj.description = Some(decode_string(expr, path)?),
        "format" => obj.format = Some(decode_string(expr, path)?),
        "contentMediaType" => obj.content_media_type = Some(decode_string(expr, path)?),
        "contentEncoding" => obj.content_encoding = Some(decode_string(expr, path)?),
        "readOnly" => obj.read_only = Some(decode_bool(expr, path)?),
        "writeOnly" => obj.write_only = Some(decode_bool(expr, path)?),
        "default" => obj.default = Some(expr_to_json(expr, path)?),
        "examples" => obj.examples = Some(expr_to_json(expr, path)?),

        "type" => obj.r#type = Some(decode_type(expr, path)?),

        "multipleOf" => obj.multiple_of = Some(decode_number(expr, path)?),
        "maximum" => obj.maximum = Some(decode_number(expr, path)?),
        "exclusiveMaximum" => obj.exclusive_maximum = Some(decode_number(expr, path)?),
        "minimum" => obj.minimum = Some(decode_number(expr, path)?),
        "exclusiveMinimum" => obj.exclusive_minimum = Some(decode_number(expr, path)?),

        "maxLength" => obj.max_length = Some(decode_integer(expr, path)?),
        "minLength" => obj.min_length = Some(decode_integer(expr, path)?),
        "pattern" => obj.pattern = Some(decode_string(expr, path)?),

        "items" => {
            obj.items = Some(match expr {
                Expression::Array(members) if members.is_empty() => {
                    return Err(DecodeError::shape(
                        path,
                        "schema or non-empty list of schemas",
                        "empty tuple",
                    ))
                }
                Expression::Array(_) => {
                    SchemaOrSchemaArray::SchemaArray(decode_schema_tuple(expr, path, registry)?)
                }
                _ => SchemaOrSchemaArray::Schema(Box::new(decode_schema_expr(
                    expr, path, registry,
                )?)),
            })
        }
        "additionalItems" => obj.additional_items = Some(decode_schema_expr(expr, path, registry)?),
        "maxItems" => obj.max_items = Some(decode_integer(expr, path)?),
        "minItems" => obj.min_items = Some(decode_integer(expr, path)?),
        "uniqueItems" => obj.unique_items = Some(decode_bool(expr, path)?),
        "contains" => obj.contains = Some(decode_schema_expr(expr, path, registry)?),

        "maxProperties" => obj.max_properties = Some(decode_integer(expr, path)?),
        "minProperties" => obj.min_properties = Some(decode_integer(expr, path)?),
        "required" => obj.required = Some(decode_string_tuple(expr, path)?),
        "additionalProperties" => {
            obj.additional_properties = Some(decode_schema_expr(expr, path, registry)?)
        }
        "propertyNames" => obj.property_names = Some(decode_schema_expr(expr, path, registry)?),
        "properties" => obj.properties = Some(decode_named_expr(expr, path, registry)?),
        "patternProperties" => {
            obj.pattern_properties = Some(decode_named_expr(expr, path, registry)?)
        }
        "definitions" => obj.definitions = Some(decode_named_expr(expr, path, registry)?),
        "dependencies" => {
            let mut value = expr_to_json(expr, path)?;
            remap_named_schemas(&mut value);
            obj.dependencies = Some(json_codec::decode_dependencies(&value, path, registry)?);
        }

        "allOf" => obj.all_of = Some(decode_schema_tuple(expr, path, registry)?),
        "anyOf" => obj.any_of = Some(decode_schema_tuple(expr, path, registry)?),
        "oneOf" => obj.one_of = Some(decode_schema_tuple(expr, path, registry)?),
        "not" => obj.not = Some(decode_schema_expr(expr, path, registry)?),
        "if" => obj.r#if = Some(decode_schema_expr(expr, path, registry)?),
        "then" => obj.then = Some(decode_schema_expr(expr, path, registry)?),
        "else" => obj.r#else = Some(decode_schema_expr(expr, path, registry)?),

        "const" => obj.r#const = Some(expr_to_json(expr, path)?),
        "enum" => obj.r#enum = Some(decode_enum(expr, path)?),

        _ => debug!(key = attr.key.as_str(), path, "ignoring unknown attribute"),
    }

    Ok(())
}

fn decode_block(
    block: &Block,
    path: &str,
    registry: &Registry,
    obj: &mut SchemaObject,
    item_blocks: &mut Vec<Schema>,
) -> Result<(), DecodeError> {
    let keyword = block.identifier.as_str();
    let path = child_path(path, keyword);
    let path = path.as_str();

    match keyword {
        "properties" => {
            let named = obj.properties.get_or_insert_with(IndexMap::new);
            decode_named_block(block, path, registry, named)?;
        }
        "patternProperties" => {
            let named = obj.pattern_properties.get_or_insert_with(IndexMap::new);
            decode_named_block(block, path, registry, named)?;
        }
        "definitions" => {
            let named = obj.definitions.get_or_insert_with(IndexMap::new);
            decode_named_block(block, path, registry, named)?;
        }
        "dependencies" => {
            let deps = obj.dependencies.get_or_insert_with(IndexMap::new);
            decode_dependencies_block(block, path, registry, deps)?;
        }
        "items" => {
            expect_unlabelled(block, path)?;
            let index = child_path(path, &item_blocks.len().to_string());
            item_blocks.push(decode_body(&block.body, &index, registry)?);
        }
        "allOf" | "anyOf" | "oneOf" => {
            expect_unlabelled(block, path)?;
            let list = match keyword {
                "allOf" => obj.all_of.get_or_insert_with(Vec::new),
                "anyOf" => obj.any_of.get_or_insert_with(Vec::new),
                _ => obj.one_of.get_or_insert_with(Vec::new),
            };
            let index = child_path(path, &list.len().to_string());
            list.push(decode_body(&block.body, &index, registry)?);
        }
        "additionalItems" | "contains" | "additionalProperties" | "propertyNames" | "not" | "if"
        | "then" | "else" => {
            expect_unlabelled(block, path)?;
            let schema = decode_body(&block.body, path, registry)?;
            let slot = match keyword {
                "additionalItems" => &mut obj.additional_items,
                "contains" => &mut obj.contains,
                "additionalProperties" => &mut obj.additional_properties,
                "propertyNames" => &mut obj.property_names,
                "not" => &mut obj.not,
                "if" => &mut obj.r#if,
                "then" => &mut obj.then,
                _ => &mut obj.r#else,
            };
            *slot = Some(schema);
        }
        _ => debug!(key = keyword, path, "ignoring unknown block"),
    }

    Ok(())
}

fn expect_unlabelled(block: &Block, path: &str) -> Result<(), DecodeError> {
    if block.labels.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::shape(
            path,
            "unlabelled block",
            format!("block with {} label(s)", block.labels.len()),
        ))
    }
}

/// `properties "name" { ... }` adds one entry. An unlabelled block adds one
/// entry per attribute or nested block, and an empty one only marks the
/// collection present.
fn decode_named_block(
    block: &Block,
    path: &str,
    registry: &Registry,
    named: &mut NamedSchemas,
) -> Result<(), DecodeError> {
    match block.labels.as_slice() {
        [label] => {
            let name = label.as_str();
            let schema = decode_body(&block.body, &child_path(path, name), registry)?;
            named.insert(name.to_string(), schema);
        }
        [] => {
            for structure in block.body.iter() {
                let (name, schema) = match structure {
                    Structure::Attribute(attr) => {
                        let name = attr.key.as_str();
                        let schema =
                            decode_schema_expr(&attr.expr, &child_path(path, name), registry)?;
                        (name, schema)
                    }
                    Structure::Block(inner) => {
                        let name = inner.identifier.as_str();
                        let inner_path = child_path(path, name);
                        expect_unlabelled(inner, &inner_path)?;
                        (name, decode_body(&inner.body, &inner_path, registry)?)
                    }
                };
                named.insert(name.to_string(), schema);
            }
        }
        labels => {
            return Err(DecodeError::shape(
                path,
                "block with at most one label",
                format!("block with {} labels", labels.len()),
            ))
        }
    }
    Ok(())
}

fn decode_dependencies_block(
    block: &Block,
    path: &str,
    registry: &Registry,
    deps: &mut Dependencies,
) -> Result<(), DecodeError> {
    match block.labels.as_slice() {
        [label] => {
            let name = label.as_str();
            let entry_path = child_path(path, name);
            let dep = match value_attribute(&block.body) {
                Some(expr) => decode_dependency_expr(expr, &entry_path, registry)?,
                None => SchemaOrStringArray::Schema(Box::new(decode_body(
                    &block.body,
                    &entry_path,
                    registry,
                )?)),
            };
            deps.insert(name.to_string(), dep);
        }
        [] => {
            for structure in block.body.iter() {
                let (name, dep) = match structure {
                    Structure::Attribute(attr) => {
                        let name = attr.key.as_str();
                        let dep =
                            decode_dependency_expr(&attr.expr, &child_path(path, name), registry)?;
                        (name, dep)
                    }
                    Structure::Block(inner) => {
                        let name = inner.identifier.as_str();
                        let inner_path = child_path(path, name);
                        expect_unlabelled(inner, &inner_path)?;
                        let schema = decode_body(&inner.body, &inner_path, registry)?;
                        (name, SchemaOrStringArray::Schema(Box::new(schema)))
                    }
                };
                deps.insert(name.to_string(), dep);
            }
        }
        labels => {
            return Err(DecodeError::shape(
                path,
                "block with at most one label",
                format!("block with {} labels", labels.len()),
            ))
        }
    }
    Ok(())
}

fn decode_dependency_expr(
    expr: &Expression,
    path: &str,
    registry: &Registry,
) -> Result<SchemaOrStringArray, DecodeError> {
    match expr {
        Expression::Array(_) => Ok(SchemaOrStringArray::StringArray(decode_string_tuple(
            expr, path,
        )?)),
        _ => Ok(SchemaOrStringArray::Schema(Box::new(decode_schema_expr(
            expr, path, registry,
        )?))),
    }
}

/// Decode an expression in a schema position.
///
/// A boolean literal is the boolean schema, an object expression is an
/// inline schema, and a traversal such as `definitions.Foo` is shorthand for
/// `$ref = "#/definitions/Foo"`.
fn decode_schema_expr(
    expr: &Expression,
    path: &str,
    registry: &Registry,
) -> Result<Schema, DecodeError> {
    match expr {
        Expression::Bool(b) => Ok(Schema::Bool(*b)),
        Expression::Object(_) => {
            let mut value = expr_to_json(expr, path)?;
            remap_inline_schema(&mut value);
            json_codec::decode_schema(&value, path, registry)
        }
        Expression::Traversal(traversal) => {
            let root = match &traversal.expr {
                Expression::Variable(var) => var.as_str().to_string(),
                _ => return Err(invalid_expression(expr, path)),
            };
            let mut pointer = format!("#/{root}");
            for operator in &traversal.operators {
                match operator {
                    TraversalOperator::GetAttr(name) => {
                        pointer.push('/');
                        pointer.push_str(name.as_str());
                    }
                    _ => return Err(invalid_expression(expr, path)),
                }
            }
            Ok(Schema::from(SchemaObject {
                reference: Some(pointer),
                ..SchemaObject::default()
            }))
        }
        Expression::Variable(_) => Err(invalid_expression(expr, path)),
        _ => Err(unsupported_expression(expr, path)),
    }
}

fn decode_schema_tuple(
    expr: &Expression,
    path: &str,
    registry: &Registry,
) -> Result<Vec<Schema>, DecodeError> {
    match expr {
        Expression::Array(members) => members
            .iter()
            .enumerate()
            .map(|(i, member)| decode_schema_expr(member, &child_path(path, &i.to_string()), registry))
            .collect(),
        _ => Err(DecodeError::shape(
            path,
            "list of schemas",
            expression_kind(expr),
        )),
    }
}

fn decode_named_expr(
    expr: &Expression,
    path: &str,
    registry: &Registry,
) -> Result<NamedSchemas, DecodeError> {
    match expr {
        Expression::Object(entries) => {
            let mut named = IndexMap::with_capacity(entries.len());
            for (key, value) in entries.iter() {
                let name = object_key(key, path)?;
                let schema = decode_schema_expr(value, &child_path(path, &name), registry)?;
                named.insert(name, schema);
            }
            Ok(named)
        }
        _ => Err(DecodeError::shape(
            path,
            "object of named schemas",
            expression_kind(expr),
        )),
    }
}

fn invalid_expression(expr: &Expression, path: &str) -> DecodeError {
    DecodeError::InvalidExpression {
        key: path.to_string(),
        expr: format!("{expr:?}"),
    }
}

fn unsupported_expression(expr: &Expression, path: &str) -> DecodeError {
    DecodeError::UnsupportedExpression {
        key: path.to_string(),
        expr: format!("{expr:?}"),
    }
}

fn expression_kind(expr: &Expression) -> &'static str {
    match expr {
        Expression::Null => "null",
        Expression::Bool(_) => "boolean",
        Expression::Number(n) if n.is_f64() => "float",
        Expression::Number(_) => "integer",
        Expression::Variable(var) if float_literal(var.as_str()).is_some() => "float",
        Expression::String(_) | Expression::TemplateExpr(_) => "string",
        Expression::Array(_) => "tuple",
        Expression::Object(_) => "object",
        Expression::Variable(_) | Expression::Traversal(_) => "reference",
        _ => "expression",
    }
}

/// A string literal, including a quoted template without interpolation.
fn literal_string(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::String(s) => Some(s.as_str()),
        Expression::TemplateExpr(template) => match template.as_ref() {
            TemplateExpr::QuotedString(s) if !s.contains("${") && !s.contains("%{") => {
                Some(s.as_str())
            }
            _ => None,
        },
        _ => None,
    }
}

fn decode_string(expr: &Expression, path: &str) -> Result<String, DecodeError> {
    match literal_string(expr) {
        Some(s) => Ok(s.to_string()),
        None => Err(shape_or_unsupported(expr, path, "string")),
    }
}

fn decode_bool(expr: &Expression, path: &str) -> Result<bool, DecodeError> {
    match expr {
        Expression::Bool(b) => Ok(*b),
        _ => Err(shape_or_unsupported(expr, path, "boolean")),
    }
}

/// Literals of the wrong kind are shape errors; anything that is not a
/// literal at all is an unsupported expression.
fn shape_or_unsupported(expr: &Expression, path: &str, expected: &str) -> DecodeError {
    match expression_kind(expr) {
        "expression" | "reference" => unsupported_expression(expr, path),
        found => DecodeError::shape(path, expected, found),
    }
}

/// A numeric literal, with unary minus folded in.
fn literal_number(expr: &Expression) -> Option<IntegerOrFloat> {
    match expr {
        Expression::Number(n) => hcl_number_kind(n),
        Expression::Variable(var) => float_literal(var.as_str()).map(IntegerOrFloat::Float),
        Expression::Operation(op) => match op.as_ref() {
            Operation::Unary(unary) if matches!(unary.operator, UnaryOperator::Neg) => {
                match literal_number(&unary.expr)? {
                    IntegerOrFloat::Integer(i) => i.checked_neg().map(IntegerOrFloat::Integer),
                    IntegerOrFloat::Float(f) => Some(IntegerOrFloat::Float(-f)),
                }
            }
            _ => None,
        },
        _ => None,
    }
}

fn hcl_number_kind(n: &Number) -> Option<IntegerOrFloat> {
    if n.is_f64() {
        n.as_f64().map(IntegerOrFloat::Float)
    } else {
        n.as_i64()
            .map(IntegerOrFloat::Integer)
            .or_else(|| n.as_f64().map(IntegerOrFloat::Float))
    }
}

/// The literal decides the kind, whatever `type` says: `multipleOf = 0.5`
/// stays a float under `type = "integer"`.
fn decode_number(expr: &Expression, path: &str) -> Result<IntegerOrFloat, DecodeError> {
    literal_number(expr).ok_or_else(|| shape_or_unsupported(expr, path, "integer or float"))
}

fn decode_integer(expr: &Expression, path: &str) -> Result<i64, DecodeError> {
    match literal_number(expr) {
        Some(IntegerOrFloat::Integer(i)) => Ok(i),
        Some(IntegerOrFloat::Float(f)) => Err(DecodeError::shape(path, "integer", f.to_string())),
        None => Err(shape_or_unsupported(expr, path, "integer")),
    }
}

fn decode_type(expr: &Expression, path: &str) -> Result<StringOrStringArray, DecodeError> {
    const EXPECTED: &str = "type name or non-empty list of type names";
    match expr {
        Expression::Array(members) if members.is_empty() => {
            Err(DecodeError::shape(path, EXPECTED, "empty tuple"))
        }
        Expression::Array(members) => {
            let mut names = Vec::with_capacity(members.len());
            for member in members {
                let name = literal_string(member)
                    .ok_or_else(|| shape_or_unsupported(member, path, EXPECTED))?;
                json_codec::check_type_name(name, path)?;
                names.push(name.to_string());
            }
            Ok(StringOrStringArray::StringArray(names))
        }
        _ => {
            let name =
                literal_string(expr).ok_or_else(|| shape_or_unsupported(expr, path, EXPECTED))?;
            json_codec::check_type_name(name, path)?;
            Ok(StringOrStringArray::String(name.to_string()))
        }
    }
}

fn decode_string_tuple(expr: &Expression, path: &str) -> Result<Vec<String>, DecodeError> {
    match expr {
        Expression::Array(members) => members
            .iter()
            .map(|member| decode_string(member, path))
            .collect(),
        _ => Err(shape_or_unsupported(expr, path, "list of strings")),
    }
}

/// Enum members are classified one by one, so mixed lists keep each kind.
fn decode_enum(expr: &Expression, path: &str) -> Result<Vec<EnumValue>, DecodeError> {
    const EXPECTED: &str = "string, boolean, number or null";
    let members = match expr {
        Expression::Array(members) => members,
        _ => return Err(shape_or_unsupported(expr, path, "list")),
    };
    members
        .iter()
        .map(|member| match member {
            Expression::Null => Ok(EnumValue::Null),
            Expression::Bool(b) => Ok(EnumValue::Bool(*b)),
            _ => {
                if let Some(s) = literal_string(member) {
                    Ok(EnumValue::String(s.to_string()))
                } else if let Some(n) = literal_number(member) {
                    Ok(EnumValue::Number(n))
                } else {
                    Err(shape_or_unsupported(member, path, EXPECTED))
                }
            }
        })
        .collect()
}

fn object_key(key: &ObjectKey, path: &str) -> Result<String, DecodeError> {
    match key {
        ObjectKey::Identifier(id) => Ok(id.as_str().to_string()),
        ObjectKey::Expression(expr) => match literal_string(expr) {
            Some(s) => Ok(s.to_string()),
            None => Err(unsupported_expression(expr, path)),
        },
        #[allow(unreachable_patterns)]
        _ => Err(DecodeError::UnsupportedExpression {
            key: path.to_string(),
            expr: format!("{key:?}"),
        }),
    }
}

/// Map reserved keywords in attribute form (`_ref`) back to the keyword
/// (`$ref`) in an inline schema and the schemas nested in it. Property names
/// and `const`, `default`, `examples` and `enum` values are left alone.
fn remap_inline_schema(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, mut child) in std::mem::take(map) {
        let keyword = keyword_for(&key);
        match keyword {
            "additionalItems" | "items" | "contains" | "additionalProperties"
            | "propertyNames" | "not" | "if" | "then" | "else" | "allOf" | "anyOf" | "oneOf" => {
                match &mut child {
                    Value::Array(members) => members.iter_mut().for_each(remap_inline_schema),
                    single => remap_inline_schema(single),
                }
            }
            "definitions" | "properties" | "patternProperties" | "dependencies" => {
                remap_named_schemas(&mut child)
            }
            _ => {}
        }
        map.insert(keyword.to_string(), child);
    }
}

/// Remap each entry of a named collection. Names stay as written.
fn remap_named_schemas(value: &mut Value) {
    if let Value::Object(entries) = value {
        entries.values_mut().for_each(remap_inline_schema);
    }
}

/// Convert a literal expression to a generic value.
fn expr_to_json(expr: &Expression, path: &str) -> Result<Value, DecodeError> {
    match expr {
        Expression::Null => Ok(Value::Null),
        Expression::Bool(b) => Ok(Value::Bool(*b)),
        Expression::Array(members) => members
            .iter()
            .map(|member| expr_to_json(member, path))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expression::Object(entries) => {
            let mut map = serde_json::Map::new();
            for (key, value) in entries.iter() {
                let name = object_key(key, path)?;
                let value = expr_to_json(value, &child_path(path, &name))?;
                map.insert(name, value);
            }
            Ok(Value::Object(map))
        }
        _ => {
            if let Some(s) = literal_string(expr) {
                return Ok(Value::String(s.to_string()));
            }
            match literal_number(expr) {
                Some(IntegerOrFloat::Integer(i)) => Ok(Value::from(i)),
                Some(IntegerOrFloat::Float(f)) => serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| DecodeError::shape(path, "finite number", f.to_string())),
                None => Err(unsupported_expression(expr, path)),
            }
        }
    }
}

/// Encode to an HCL body.
pub fn to_body(schema: &Schema) -> Result<Body, EncodeError> {
    let structures = match schema {
        Schema::Bool(b) => vec![value_structure(Expression::Bool(*b))],
        Schema::Object(obj) => encode_object(obj, ROOT_PATH)?,
    };
    Ok(structures.into_iter().collect())
}

/// Encode to HCL text.
pub fn to_string(schema: &Schema) -> Result<String, EncodeError> {
    let body = to_body(schema)?;
    hcl::format::to_string(&body).map_err(|source| EncodeError::Hcl { source })
}

fn value_structure(expr: Expression) -> Structure {
    Structure::Attribute(Attribute::new(VALUE_ATTRIBUTE, expr))
}

fn attribute(keyword: &str, expr: Expression) -> Structure {
    Structure::Attribute(Attribute::new(attribute_for(keyword), expr))
}

fn block(keyword: &str, label: Option<&str>, body: Vec<Structure>) -> Structure {
    Structure::Block(Block {
        identifier: Identifier::from(keyword),
        labels: label.map(BlockLabel::from).into_iter().collect(),
        body: body.into_iter().collect(),
    })
}

fn encode_object(obj: &SchemaObject, path: &str) -> Result<Vec<Structure>, EncodeError> {
    let mut attrs = Vec::new();
    let mut blocks = Vec::new();

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
            attrs.push(attribute(key, Expression::String(s.clone())));
        }
    }

    if let Some(t) = &obj.r#type {
        let expr = match t {
            StringOrStringArray::String(s) => Expression::String(s.clone()),
            StringOrStringArray::StringArray(names) => string_tuple(names),
        };
        attrs.push(attribute("type", expr));
    }

    let strings = [
        ("format", &obj.format),
        ("contentMediaType", &obj.content_media_type),
        ("contentEncoding", &obj.content_encoding),
    ];
    for (key, value) in strings {
        if let Some(s) = value {
            attrs.push(attribute(key, Expression::String(s.clone())));
        }
    }

    if let Some(v) = &obj.default {
        attrs.push(attribute("default", json_to_expr(v, &child_path(path, "default"))?));
    }
    let flags = [
        ("readOnly", obj.read_only),
        ("writeOnly", obj.write_only),
    ];
    for (key, value) in flags {
        if let Some(b) = value {
            attrs.push(attribute(key, Expression::Bool(b)));
        }
    }
    if let Some(v) = &obj.examples {
        attrs.push(attribute("examples", json_to_expr(v, &child_path(path, "examples"))?));
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
            attrs.push(attribute(key, number_to_expr(n, &child_path(path, key))?));
        }
    }

    let integers = [
        ("maxLength", obj.max_length),
        ("minLength", obj.min_length),
        ("maxItems", obj.max_items),
        ("minItems", obj.min_items),
        ("maxProperties", obj.max_properties),
        ("minProperties", obj.min_properties),
    ];
    for (key, value) in integers {
        if let Some(i) = value {
            attrs.push(attribute(key, Expression::Number(Number::from(i))));
        }
    }
    if let Some(s) = &obj.pattern {
        attrs.push(attribute("pattern", Expression::String(s.clone())));
    }
    if let Some(b) = obj.unique_items {
        attrs.push(attribute("uniqueItems", Expression::Bool(b)));
    }
    if let Some(names) = &obj.required {
        attrs.push(attribute("required", string_tuple(names)));
    }

    if let Some(v) = &obj.r#const {
        attrs.push(attribute("const", json_to_expr(v, &child_path(path, "const"))?));
    }
    if let Some(members) = &obj.r#enum {
        let enum_path = child_path(path, "enum");
        let exprs = members
            .iter()
            .map(|m| enum_value_to_expr(m, &enum_path))
            .collect::<Result<Vec<_>, _>>()?;
        attrs.push(attribute("enum", Expression::Array(exprs)));
    }

    if let Some(s) = &obj.additional_items {
        encode_single("additionalItems", s, path, &mut attrs, &mut blocks)?;
    }
    match &obj.items {
        Some(SchemaOrSchemaArray::Schema(s)) => {
            encode_single("items", s, path, &mut attrs, &mut blocks)?
        }
        Some(SchemaOrSchemaArray::SchemaArray(list)) if list.len() >= 2 => {
            encode_list("items", list, path, &mut attrs, &mut blocks)?
        }
        Some(SchemaOrSchemaArray::SchemaArray(list)) => {
            // one block would read back as a single schema
            let items_path = child_path(path, "items");
            attrs.push(attribute("items", schema_tuple(list, &items_path)?));
        }
        None => {}
    }
    if let Some(s) = &obj.contains {
        encode_single("contains", s, path, &mut attrs, &mut blocks)?;
    }
    if let Some(s) = &obj.additional_properties {
        encode_single("additionalProperties", s, path, &mut attrs, &mut blocks)?;
    }

    let named = [
        ("definitions", &obj.definitions),
        ("properties", &obj.properties),
        ("patternProperties", &obj.pattern_properties),
    ];
    for (key, value) in named {
        if let Some(map) = value {
            encode_named(key, map, path, &mut blocks)?;
        }
    }

    if let Some(deps) = &obj.dependencies {
        let deps_path = child_path(path, "dependencies");
        if deps.is_empty() {
            blocks.push(block("dependencies", None, Vec::new()));
        }
        for (name, dep) in deps {
            let body = match dep {
                SchemaOrStringArray::StringArray(names) => vec![value_structure(string_tuple(names))],
                SchemaOrStringArray::Schema(s) => encode_body(s, &child_path(&deps_path, name))?,
            };
            blocks.push(block("dependencies", Some(name), body));
        }
    }
    if let Some(s) = &obj.property_names {
        encode_single("propertyNames", s, path, &mut attrs, &mut blocks)?;
    }

    let lists = [
        ("allOf", &obj.all_of),
        ("anyOf", &obj.any_of),
        ("oneOf", &obj.one_of),
    ];
    for (key, value) in lists {
        if let Some(list) = value {
            encode_list(key, list, path, &mut attrs, &mut blocks)?;
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
            encode_single(key, s, path, &mut attrs, &mut blocks)?;
        }
    }

    attrs.extend(blocks);
    Ok(attrs)
}

/// Body for a schema in block position: keywords, or `_value` for booleans.
fn encode_body(schema: &Schema, path: &str) -> Result<Vec<Structure>, EncodeError> {
    match schema {
        Schema::Bool(b) => Ok(vec![value_structure(Expression::Bool(*b))]),
        Schema::Object(obj) => encode_object(obj, path),
    }
}

/// Boolean schemas become plain attributes, object schemas blocks.
fn encode_single(
    keyword: &str,
    schema: &Schema,
    path: &str,
    attrs: &mut Vec<Structure>,
    blocks: &mut Vec<Structure>,
) -> Result<(), EncodeError> {
    match schema {
        Schema::Bool(b) => attrs.push(attribute(keyword, Expression::Bool(*b))),
        Schema::Object(obj) => {
            let body = encode_object(obj, &child_path(path, keyword))?;
            blocks.push(block(keyword, None, body));
        }
    }
    Ok(())
}

/// Lists of object schemas become repeated unlabelled blocks. Lists that are
/// empty or hold a boolean member are written as a tuple attribute.
fn encode_list(
    keyword: &str,
    list: &[Schema],
    path: &str,
    attrs: &mut Vec<Structure>,
    blocks: &mut Vec<Structure>,
) -> Result<(), EncodeError> {
    let list_path = child_path(path, keyword);
    if list.is_empty() || list.iter().any(|s| s.as_bool().is_some()) {
        attrs.push(attribute(keyword, schema_tuple(list, &list_path)?));
        return Ok(());
    }
    for (i, schema) in list.iter().enumerate() {
        let body = encode_body(schema, &child_path(&list_path, &i.to_string()))?;
        blocks.push(block(keyword, None, body));
    }
    Ok(())
}

fn encode_named(
    keyword: &str,
    map: &NamedSchemas,
    path: &str,
    blocks: &mut Vec<Structure>,
) -> Result<(), EncodeError> {
    if map.is_empty() {
        blocks.push(block(keyword, None, Vec::new()));
        return Ok(());
    }
    let named_path = child_path(path, keyword);
    for (name, schema) in map {
        let body = encode_body(schema, &child_path(&named_path, name))?;
        blocks.push(block(keyword, Some(name), body));
    }
    Ok(())
}

/// Tuple of inline schemas: booleans as literals, objects as object
/// expressions.
fn schema_tuple(list: &[Schema], path: &str) -> Result<Expression, EncodeError> {
    list.iter()
        .enumerate()
        .map(|(i, schema)| {
            let member_path = child_path(path, &i.to_string());
            match schema {
                Schema::Bool(b) => Ok(Expression::Bool(*b)),
                Schema::Object(_) => {
                    json_to_expr(&json_codec::encode_schema(schema, &member_path)?, &member_path)
                }
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Expression::Array)
}

fn string_tuple(names: &[String]) -> Expression {
    Expression::Array(names.iter().cloned().map(Expression::String).collect())
}

/// Integral floats are written verbatim (`1.0`), since [`Number`] would
/// store them as integers.
fn number_to_expr(n: IntegerOrFloat, path: &str) -> Result<Expression, EncodeError> {
    match n {
        IntegerOrFloat::Integer(i) => Ok(Expression::Number(Number::from(i))),
        IntegerOrFloat::Float(f) if f.is_finite() && f.fract() == 0.0 => {
            Ok(Expression::Variable(Variable::unchecked(format!("{f:?}"))))
        }
        IntegerOrFloat::Float(f) => Number::from_f64(f)
            .map(Expression::Number)
            .ok_or_else(|| EncodeError::NonFiniteNumber {
                key: path.to_string(),
            }),
    }
}

fn enum_value_to_expr(value: &EnumValue, path: &str) -> Result<Expression, EncodeError> {
    match value {
        EnumValue::String(s) => Ok(Expression::String(s.clone())),
        EnumValue::Bool(b) => Ok(Expression::Bool(*b)),
        EnumValue::Number(n) => number_to_expr(*n, path),
        EnumValue::Null => Ok(Expression::Null),
    }
}

/// Object keys are always written as quoted strings, so any key survives.
fn json_to_expr(value: &Value, path: &str) -> Result<Expression, EncodeError> {
    match value {
        Value::Null => Ok(Expression::Null),
        Value::Bool(b) => Ok(Expression::Bool(*b)),
        Value::Number(n) => match json_codec::number_kind(n) {
            Some(kind) => number_to_expr(kind, path),
            None => Err(EncodeError::NonFiniteNumber {
                key: path.to_string(),
            }),
        },
        Value::String(s) => Ok(Expression::String(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| json_to_expr(item, path))
            .collect::<Result<Vec<_>, _>>()
            .map(Expression::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| {
                let expr = json_to_expr(item, &child_path(path, key))?;
                Ok((ObjectKey::Expression(Expression::String(key.clone())), expr))
            })
            .collect::<Result<_, EncodeError>>()
            .map(Expression::Object),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(input: &str) -> Schema {
        from_str(input, &Registry::new()).unwrap()
    }

    fn decode_json(value: Value) -> Schema {
        json_codec::from_value(&value, &Registry::new()).unwrap()
    }

    fn round_trip(schema: &Schema) -> Schema {
        let text = to_string(schema).unwrap();
        from_str(&text, &Registry::new())
            .unwrap_or_else(|e| panic!("re-decode failed: {e}\n{text}"))
    }

    fn object(schema: &Schema) -> &SchemaObject {
        schema.as_object().unwrap()
    }

    #[test]
    fn reserved_keys_are_remapped() {
        assert_eq!(attribute_for("$ref"), "_ref");
        assert_eq!(attribute_for("title"), "title");
        assert_eq!(keyword_for("_comment"), "$comment");
        assert_eq!(keyword_for("_value"), "_value");

        let schema = decode(r##"
            _id  = "urn:x#"
            _ref = "#/definitions/a"
        "##);
        let obj = object(&schema);
        assert_eq!(obj.id.as_deref(), Some("urn:x#"));
        assert_eq!(obj.reference.as_deref(), Some("#/definitions/a"));

        let text = to_string(&schema).unwrap();
        assert!(text.contains("_id"));
        assert!(text.contains("_ref"));
        assert!(!text.contains("$id"));
    }

    #[test]
    fn additional_properties_false_is_an_attribute() {
        let schema = decode_json(json!({"additionalProperties": false}));
        let text = to_string(&schema).unwrap();
        assert!(text.contains("additionalProperties = false"));
        assert!(!text.contains("additionalProperties {"));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn labelled_blocks_hold_named_entries() {
        let schema = decode(r#"
            type = "object"
            required = ["name"]

            properties "name" {
              type = "string"
              maxLength = 64
            }

            properties "age" {
              type = "integer"
              minimum = 0
            }
        "#);
        let obj = object(&schema);
        assert_eq!(obj.required, Some(vec!["name".to_string()]));
        let names: Vec<&String> = obj.properties.as_ref().unwrap().keys().collect();
        assert_eq!(names, ["name", "age"]);
        let name = object(obj.property("name").unwrap());
        assert_eq!(name.max_length, Some(64));
    }

    #[test]
    fn empty_unlabelled_block_marks_collection_present() {
        let schema = decode("properties {}");
        assert_eq!(object(&schema).properties, Some(IndexMap::new()));

        let absent = decode("type = \"object\"");
        assert_eq!(object(&absent).properties, None);

        let schema = decode_json(json!({"definitions": {}}));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn unlabelled_block_entries() {
        let schema = decode(r#"
            properties {
              flag = true
              name {
                type = "string"
              }
            }
        "#);
        let obj = object(&schema);
        assert_eq!(obj.property("flag"), Some(&Schema::Bool(true)));
        assert!(object(obj.property("name").unwrap()).type_is("string"));
    }

    #[test]
    fn numeric_facets_follow_the_literal() {
        let schema = decode(r#"
            type = "integer"
            maximum = 10
            minimum = 0.0
            multipleOf = 0.5
        "#);
        let obj = object(&schema);
        assert_eq!(obj.maximum, Some(IntegerOrFloat::Integer(10)));
        assert_eq!(obj.minimum, Some(IntegerOrFloat::Float(0.0)));
        assert_eq!(obj.multiple_of, Some(IntegerOrFloat::Float(0.5)));

        let schema = decode("maximum = 10.5\nminimum = 2\n");
        let obj = object(&schema);
        assert_eq!(obj.maximum, Some(IntegerOrFloat::Float(10.5)));
        assert_eq!(obj.minimum, Some(IntegerOrFloat::Integer(2)));
    }

    #[test]
    fn fractional_multiple_of_under_integer_type_round_trips() {
        let schema = decode_json(json!({"type": "integer", "multipleOf": 0.5}));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn integral_floats_keep_their_kind() {
        let schema = decode_json(json!({"maximum": 1.0, "enum": [2.0, 3, -4.0]}));
        let text = to_string(&schema).unwrap();
        assert!(text.contains("1.0"), "{text}");
        assert!(text.contains("-4.0"), "{text}");

        let decoded = round_trip(&schema);
        assert_eq!(decoded, schema);
        let obj = object(&decoded);
        assert_eq!(obj.maximum, Some(IntegerOrFloat::Float(1.0)));
        assert_eq!(
            obj.r#enum,
            Some(vec![
                EnumValue::Number(IntegerOrFloat::Float(2.0)),
                EnumValue::Number(IntegerOrFloat::Integer(3)),
                EnumValue::Number(IntegerOrFloat::Float(-4.0)),
            ])
        );
    }

    #[test]
    fn integral_floats_in_opaque_and_inline_values() {
        let schema = decode_json(json!({
            "const": {"a": 1.0, "b": [2.0, 2]},
            "default": 5.0,
            "oneOf": [true, {"minimum": 0.0}]
        }));
        assert_eq!(round_trip(&schema), schema);
        assert_eq!(
            json_codec::to_value(&round_trip(&schema)).unwrap(),
            json_codec::to_value(&schema).unwrap()
        );
    }

    #[test]
    fn float_literal_text() {
        assert_eq!(float_literal("1.0"), Some(1.0));
        assert_eq!(float_literal("-2.0"), Some(-2.0));
        assert_eq!(float_literal("1e3"), Some(1000.0));
        assert_eq!(float_literal("12"), None);
        assert_eq!(float_literal("Foo"), None);
        assert_eq!(float_literal("inf"), None);
    }

    #[test]
    fn integral_float_is_not_a_length() {
        let err = from_str("maxLength = 3.0\n", &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { ref key, .. } if key == "#/maxLength"));
    }

    #[test]
    fn negative_numbers() {
        let schema = decode("minimum = -5\nmaximum = -1.5\n");
        let obj = object(&schema);
        assert_eq!(obj.minimum, Some(IntegerOrFloat::Integer(-5)));
        assert_eq!(obj.maximum, Some(IntegerOrFloat::Float(-1.5)));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn enum_members_are_classified_independently() {
        let schema = decode(r#"enum = ["x", 1, 2.5, true, null]"#);
        assert_eq!(
            object(&schema).r#enum,
            Some(vec![
                EnumValue::from("x"),
                EnumValue::Number(IntegerOrFloat::Integer(1)),
                EnumValue::Number(IntegerOrFloat::Float(2.5)),
                EnumValue::Bool(true),
                EnumValue::Null,
            ])
        );
    }

    #[test]
    fn type_and_enum_round_trip() {
        let schema = decode_json(json!({"type": ["string", "null"], "enum": ["x", "y", null]}));
        let text = to_string(&schema).unwrap();
        assert!(text.contains("null"));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn traversal_is_reference_shorthand() {
        let schema = decode("items = definitions.Foo\n");
        match &object(&schema).items {
            Some(SchemaOrSchemaArray::Schema(item)) => {
                assert_eq!(object(item).reference.as_deref(), Some("#/definitions/Foo"));
            }
            other => panic!("unexpected items: {other:?}"),
        }
    }

    #[test]
    fn bare_variable_is_invalid_expression() {
        let err = from_str("not = Foo\n", &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidExpression { ref key, .. } if key == "#/not"));
    }

    #[test]
    fn function_call_is_unsupported_expression() {
        let err = from_str("not = upper(\"x\")\n", &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedExpression { ref key, .. } if key == "#/not"));
    }

    #[test]
    fn object_expression_is_inline_schema() {
        let schema = decode(r##"not = { type = "string", _ref = "#/definitions/a" }"##);
        let not = object(object(&schema).not.as_ref().unwrap());
        assert!(not.type_is("string"));
        assert_eq!(not.reference.as_deref(), Some("#/definitions/a"));
    }

    #[test]
    fn reserved_names_inside_data_are_kept() {
        let schema = decode_json(json!({
            "oneOf": [true, {"const": {"_id": 1}, "properties": {"_ref": {}}}]
        }));
        let decoded = round_trip(&schema);
        assert_eq!(decoded, schema);

        let member = object(&object(&decoded).one_of.as_ref().unwrap()[1]);
        assert_eq!(member.r#const, Some(json!({"_id": 1})));
        assert!(member.property("_ref").is_some());
        assert_eq!(member.reference, None);
    }

    #[test]
    fn reserved_attributes_in_nested_inline_schemas() {
        let schema = decode(r##"
            anyOf = [true, {
              _comment = "outer"
              properties = { _id = { _ref = "#/definitions/a" } }
              default = { _ref = "kept" }
            }]
        "##);
        let member = object(&object(&schema).any_of.as_ref().unwrap()[1]);
        assert_eq!(member.comment.as_deref(), Some("outer"));
        assert_eq!(member.default, Some(json!({"_ref": "kept"})));
        let inner = object(member.property("_id").unwrap());
        assert_eq!(inner.reference.as_deref(), Some("#/definitions/a"));
    }

    #[test]
    fn items_shapes_round_trip() {
        let cases = [
            json!({"items": {"type": "string"}}),
            json!({"items": false}),
            json!({"items": [{"type": "string"}, {"type": "integer"}]}),
            json!({"items": [{"type": "string"}]}),
            json!({"items": [{"type": "string"}, true]}),
        ];
        for case in cases {
            let schema = decode_json(case.clone());
            assert_eq!(round_trip(&schema), schema, "case {case}");
        }
    }

    #[test]
    fn combinator_lists_round_trip() {
        let cases = [
            json!({"allOf": [{"type": "string"}]}),
            json!({"anyOf": [{"type": "string"}, {"type": "null"}]}),
            json!({"oneOf": [true, {"minLength": 1}]}),
            json!({"allOf": []}),
        ];
        for case in cases {
            let schema = decode_json(case.clone());
            assert_eq!(round_trip(&schema), schema, "case {case}");
        }
    }

    #[test]
    fn dependencies_round_trip() {
        let schema = decode_json(json!({
            "dependencies": {
                "card": ["billing", "zip"],
                "none": [],
                "vip": {"required": ["tier"]},
                "free": true
            }
        }));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn opaque_values_round_trip() {
        let schema = decode_json(json!({
            "const": {"a": [1, "two", null], "$weird key": true},
            "default": 1.5,
            "examples": ["a", {"b": false}]
        }));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn boolean_root_and_entries_use_value_attribute() {
        let text = to_string(&Schema::Bool(false)).unwrap();
        assert!(text.contains("_value = false"));
        assert_eq!(decode(&text), Schema::Bool(false));

        let schema = decode_json(json!({"properties": {"any": true, "none": false}}));
        assert_eq!(round_trip(&schema), schema);
    }

    #[test]
    fn cross_format_equivalence() {
        let source = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "urn:cross#",
            "title": "Person",
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "maxLength": 64, "pattern": "^[a-z]+$"},
                "score": {"type": "number", "minimum": 0, "maximum": 99.5},
                "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true}
            },
            "patternProperties": {"^x-": {"type": "string"}},
            "definitions": {"Id": {"type": "integer", "exclusiveMinimum": 0}},
            "additionalProperties": false,
            "if": {"properties": {"name": {"const": "root"}}},
            "then": {"required": ["score"]},
            "else": true
        });
        let schema = decode_json(source.clone());
        let json_text = json_codec::to_string(&schema, false).unwrap();
        let from_json = json_codec::from_str(&json_text, &Registry::new()).unwrap();
        assert_eq!(round_trip(&from_json), schema);
        assert_eq!(json_codec::to_value(&round_trip(&schema)).unwrap(), source);
    }

    #[test]
    fn ids_are_registered_while_decoding() {
        let registry = Registry::new();
        from_str(
            r#"
            _id = "urn:hcl#"
            definitions "Foo" {
              type = "string"
            }
            "#,
            &registry,
        )
        .unwrap();
        assert!(registry.contains("urn:hcl#"));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = from_str("type = \n", &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHcl { .. }));
    }

    #[test]
    fn labelled_single_schema_block_is_rejected() {
        let err = from_str("not \"x\" {\n}\n", &Registry::new()).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { ref key, .. } if key == "#/not"));
    }
}
