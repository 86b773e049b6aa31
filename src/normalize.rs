//! Schema normalization - graph rewrites over the decoded tree.
//!
//! Three passes, each a post-order walk over every nested schema:
//! `$ref` substitution (repeated to a fixed point), `allOf` flattening and
//! the `anyOf` → `oneOf` rename. [`normalize`] runs the selected passes in
//! that order.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::NormalizeError;
use crate::registry::{Registry, RegistrySnapshot};
use crate::schema::{walk_mut, Context, Schema, SchemaObject};
use crate::types::NormalizeOptions;

/// Outcome of a reference-resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefResolution {
    /// Total substitutions across all sweeps.
    pub substitutions: usize,
    /// Sweeps run, including the final one that changed nothing.
    pub sweeps: usize,
    /// Pointers still unresolved at the fixed point, sorted.
    pub unresolved: Vec<String>,
}

/// Counts reported by [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub refs: RefResolution,
    pub all_of_flattened: usize,
    pub any_of_renamed: usize,
}

/// Run the passes enabled in `options`: references, then `allOf`, then `anyOf`.
///
/// # Errors
///
/// Returns `NormalizeError::RefsDidNotConverge` if reference resolution is
/// still substituting after `options.max_ref_sweeps` sweeps.
pub fn normalize(
    schema: &mut Schema,
    registry: &Registry,
    options: &NormalizeOptions,
) -> Result<NormalizeReport, NormalizeError> {
    let mut report = NormalizeReport::default();
    if options.resolve_refs {
        report.refs = resolve_refs(schema, registry, options.max_ref_sweeps)?;
    }
    if options.flatten_all_of {
        report.all_of_flattened = flatten_all_of(schema);
    }
    if options.any_of_to_one_of {
        report.any_of_renamed = any_of_to_one_of(schema);
    }
    Ok(report)
}

/// Substitute resolvable `$ref` pointers until a sweep makes no change.
///
/// A pointer splits at `#` into a document part and a fragment. An empty
/// document part means the schema being resolved; anything else is looked
/// up in the registry as `doc#`, then `doc`. The fragment may be empty (the
/// whole document) or `/definitions/<name>` / `/properties/<name>`.
///
/// A pure reference is replaced by a copy of its target. A reference with
/// sibling keywords loses its `$ref` and takes every keyword the target
/// populates, keeping the siblings the target leaves unset.
/// References are left alone when the target is a boolean, is object-typed,
/// has `oneOf` or `additionalProperties`, or when the reference sits directly
/// in a `oneOf` list.
///
/// Unresolvable pointers are logged and left in place.
///
/// # Errors
///
/// Returns `NormalizeError::RefsDidNotConverge` after `max_sweeps` sweeps that
/// all made substitutions (for example a reference cycle).
pub fn resolve_refs(
    schema: &mut Schema,
    registry: &Registry,
    max_sweeps: usize,
) -> Result<RefResolution, NormalizeError> {
    let max_sweeps = max_sweeps.max(1);
    let mut total = 0;

    for sweep in 1..=max_sweeps {
        let entries = registry.snapshot();
        let root = schema.clone();
        let mut substitutions = 0;
        let mut unresolved = BTreeSet::new();

        walk_mut(schema, Context::Root, &mut |node, context| {
            let Schema::Object(obj) = node else {
                return;
            };
            let Some(pointer) = obj.reference.clone() else {
                return;
            };
            match lookup(&pointer, &root, &entries) {
                Some(target) => {
                    if let Some(target) = substitutable(target, context) {
                        if obj.is_pure_reference() {
                            **obj = target.clone();
                        } else {
                            obj.reference = None;
                            obj.merge_from(target);
                        }
                        substitutions += 1;
                    }
                }
                None => {
                    unresolved.insert(pointer);
                }
            }
        });

        debug!(sweep, substitutions, "reference resolution sweep");
        total += substitutions;

        if substitutions == 0 {
            for pointer in &unresolved {
                warn!(pointer = pointer.as_str(), "unresolved $ref left in place");
            }
            return Ok(RefResolution {
                substitutions: total,
                sweeps: sweep,
                unresolved: unresolved.into_iter().collect(),
            });
        }
    }

    warn!(sweeps = max_sweeps, "reference resolution did not converge");
    Err(NormalizeError::RefsDidNotConverge { sweeps: max_sweeps })
}

fn substitutable(target: &Schema, context: Context) -> Option<&SchemaObject> {
    if context == Context::OneOf {
        return None;
    }
    let target = target.as_object()?;
    if target.type_is("object") || target.one_of.is_some() || target.additional_properties.is_some()
    {
        return None;
    }
    Some(target)
}

fn lookup<'a>(
    pointer: &str,
    root: &'a Schema,
    entries: &'a RegistrySnapshot,
) -> Option<&'a Schema> {
    let (document, fragment) = pointer.split_once('#').unwrap_or((pointer, ""));
    let document = if document.is_empty() {
        root
    } else {
        entries
            .get(&format!("{document}#"))
            .or_else(|| entries.get(document))?
    };

    let fragment = fragment.trim_end_matches('/');
    if fragment.is_empty() {
        return Some(document);
    }

    let segments: Vec<&str> = fragment.strip_prefix('/')?.split('/').collect();
    let [collection, name] = segments.as_slice() else {
        return None;
    };
    let name = unescape_segment(name);
    let obj = document.as_object()?;
    match *collection {
        "definitions" => obj.definition(&name),
        "properties" => obj.property(&name),
        _ => None,
    }
}

/// Undo JSON-pointer escaping (`~1` → `/`, `~0` → `~`).
fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Merge non-empty `allOf` members into their parent, members in order.
///
/// `true` members are vacuous; a `false` member makes the parent `false`.
/// Nested lists are flattened before their parents. Returns the number of
/// schemas rewritten.
pub fn flatten_all_of(schema: &mut Schema) -> usize {
    let mut flattened = 0;
    walk_mut(schema, Context::Root, &mut |node, _| {
        let Schema::Object(obj) = node else {
            return;
        };
        let Some(members) = obj.all_of.take_if_non_empty() else {
            return;
        };

        let mut never = false;
        for member in &members {
            match member {
                Schema::Bool(true) => {}
                Schema::Bool(false) => never = true,
                Schema::Object(member) => obj.merge_from(member),
            }
        }
        obj.all_of = None;
        flattened += 1;

        if never {
            *node = Schema::Bool(false);
        }
    });
    debug!(flattened, "flattened allOf");
    flattened
}

/// Move a non-empty `anyOf` into `oneOf` wherever `oneOf` is absent.
///
/// Returns the number of schemas rewritten.
pub fn any_of_to_one_of(schema: &mut Schema) -> usize {
    let mut renamed = 0;
    walk_mut(schema, Context::Root, &mut |node, _| {
        let Some(obj) = node.as_object_mut() else {
            return;
        };
        if obj.one_of.is_some() {
            return;
        }
        if let Some(members) = obj.any_of.take_if_non_empty() {
            obj.one_of = Some(members);
            renamed += 1;
        }
    });
    debug!(renamed, "renamed anyOf to oneOf");
    renamed
}

trait TakeNonEmpty<T> {
    fn take_if_non_empty(&mut self) -> Option<Vec<T>>;
}

impl<T> TakeNonEmpty<T> for Option<Vec<T>> {
    fn take_if_non_empty(&mut self) -> Option<Vec<T>> {
        if self.as_ref().is_some_and(|list| !list.is_empty()) {
            self.take()
        } else {
            None
        }
    }
}
