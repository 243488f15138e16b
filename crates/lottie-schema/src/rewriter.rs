//! Rewrites the raw Lottie schema document into a form the `jsonschema`
//! engine's built-in keywords cannot express on their own, replacing each
//! such spot with one of this crate's custom keywords (see [`crate::keywords`]).
//!
//! The engine is treated as a fixed dependency: every rewrite here produces
//! a schema the stock engine can still compile, just with a handful of
//! vendor-specific keys (`ty_oneof`, `prop_oneof`, ...) that the keyword
//! registrations in [`crate::keywords`] attach behavior to.

use serde_json::{Map, Value};

use crate::schema_id::SchemaId;

/// Discriminated-union member: the constant value of the tag field paired
/// with the `$defs` category/object it selects.
#[derive(Debug, Clone)]
pub(crate) struct Variant {
    pub tag: Value,
    pub category: String,
    pub object: String,
}

pub(crate) fn rewrite(schema: &mut Value, root_id: &str) {
    rewrite_ty_unions(schema, root_id);
    rewrite_property_unions(schema, root_id);
    rewrite_enums(schema, root_id);
    seed_asset_dispatch(schema, root_id);
    mark_keyframe_sequences(schema, root_id);
    seed_extra_property_warnings(schema, root_id);
}

/// Attaches `warn_extra_props` to every named object definition. The
/// keyword itself (see [`crate::keywords::warn_extra_props`]) consults the
/// property index built after this rewrite pass to decide whether a given
/// node is worth checking -- a node only ever referenced as an `allOf` base
/// is skipped there, since the composing node already sees its full,
/// merged property set.
fn seed_extra_property_warnings(schema: &mut Value, root_id: &str) {
    let Some(defs) = schema.get("$defs").and_then(Value::as_object) else {
        return;
    };
    let pointers: Vec<(String, String)> = defs
        .iter()
        .flat_map(|(category, objects)| {
            objects
                .as_object()
                .into_iter()
                .flat_map(|objects| objects.keys())
                .map(move |object| {
                    (
                        format!("/$defs/{category}/{object}"),
                        SchemaId::for_object(root_id, category, object).to_string(),
                    )
                })
        })
        .collect();

    for (pointer, id) in pointers {
        if let Some(node) = schema.pointer_mut(&pointer).and_then(Value::as_object_mut) {
            if node.contains_key("properties") {
                node.insert("warn_extra_props".to_string(), Value::String(id));
            }
        }
    }
}

/// Every object whose name begins with `all-` (except `all-assets`, handled
/// separately by [`seed_asset_dispatch`] since assets have no single
/// discriminant field) stands for a disjunction over the *other* objects
/// declared in its own category, each of which fixes its `ty` property to a
/// distinct constant. Replace it with the `ty_oneof` keyword so an
/// unrecognized `ty` produces a `Type` warning rather than the engine's
/// generic "matches no branch" error, and so a recognized `ty` is validated
/// against exactly one candidate instead of every branch.
///
/// Variant discriminants are read from the whole document before any
/// mutation starts, then applied in a second pass: `serde_json::Value`
/// gives no way to hold a read borrow of one subtree and a write borrow of
/// another at the same time.
fn rewrite_ty_unions(schema: &mut Value, root_id: &str) {
    let Some(defs) = schema.get("$defs").and_then(Value::as_object) else {
        return;
    };
    let union_targets: Vec<(String, String)> = defs
        .iter()
        .flat_map(|(category, objects)| {
            objects
                .as_object()
                .into_iter()
                .flat_map(|objects| objects.keys())
                .filter(|object| object.starts_with("all-") && object.as_str() != "all-assets")
                .map(move |object| (category.clone(), object.clone()))
        })
        .collect();

    let planned: Vec<(String, Vec<Variant>)> = union_targets
        .into_iter()
        .filter_map(|(category, union_object)| {
            let variants = plan_ty_union(schema, &category, &union_object, "ty");
            if variants.is_empty() {
                None
            } else {
                Some((format!("/$defs/{category}/{union_object}"), variants))
            }
        })
        .collect();

    for (pointer, variants) in planned {
        if let Some(node) = schema.pointer_mut(&pointer) {
            install_oneof_keyword(node, root_id, "ty", &variants, "ty_oneof");
        }
    }
}

fn collect_union_members(node: &Value) -> Option<&Vec<Value>> {
    for key in ["oneOf", "anyOf"] {
        if let Some(list) = node.get(key).and_then(Value::as_array) {
            return Some(list);
        }
    }
    None
}

/// The union object's schema is a disjunction over all *other* objects
/// declared in the same category -- not over whatever it happens to list
/// in its own `oneOf`/`anyOf`, which the real Lottie schema family doesn't
/// even populate for these nodes.
fn plan_ty_union(root: &Value, category: &str, union_object: &str, tag_field: &str) -> Vec<Variant> {
    let Some(siblings) = root.pointer(&format!("/$defs/{category}")).and_then(Value::as_object) else {
        return Vec::new();
    };
    siblings
        .keys()
        .filter(|object| object.as_str() != union_object)
        .filter_map(|object| {
            let tag = discriminant_of(root, category, object, tag_field)?;
            Some(Variant {
                tag,
                category: category.to_string(),
                object: object.clone(),
            })
        })
        .collect()
}

/// Best-effort lookup of the constant a member fixes its tag field to. Most
/// Lottie object definitions declare it directly as `properties.<field>.const`;
/// a few nest it one level inside an `allOf` branch.
fn discriminant_of(root: &Value, category: &str, object: &str, tag_field: &str) -> Option<Value> {
    let node = root.pointer(&format!("/$defs/{category}/{object}"))?;
    if let Some(constant) = node.pointer(&format!("/properties/{tag_field}/const")) {
        return Some(constant.clone());
    }
    if let Some(all_of) = node.get("allOf").and_then(Value::as_array) {
        for member in all_of {
            if let Some(constant) = member.pointer(&format!("/properties/{tag_field}/const")) {
                return Some(constant.clone());
            }
        }
    }
    None
}

fn install_oneof_keyword(node: &mut Value, root_id: &str, tag_field: &str, variants: &[Variant], keyword: &str) {
    let Value::Object(map) = node else { return };
    map.remove("oneOf");
    map.remove("anyOf");
    map.insert(keyword.to_string(), Value::String(root_id.to_string()));
    map.insert(format!("{keyword}_field"), Value::String(tag_field.to_string()));
    let encoded: Vec<Value> = variants
        .iter()
        .map(|v| {
            Value::Object(
                [
                    ("tag".to_string(), v.tag.clone()),
                    ("category".to_string(), Value::String(v.category.clone())),
                    ("object".to_string(), Value::String(v.object.clone())),
                ]
                .into_iter()
                .collect(),
            )
        })
        .collect();
    map.insert(format!("{keyword}_variants"), Value::Array(encoded));
}

/// Animated properties dispatch on shape rather than on a `ty` constant:
/// `splittable-position-property` distinguishes split/unsplit by its `s`
/// boolean, `gradient-property` nests the real union one level down inside
/// its `k` property, and every other `*-property` definition (plus the
/// `gradient-stops` helper) dispatches on `a` between a bare value and an
/// array of keyframes.
fn rewrite_property_unions(schema: &mut Value, root_id: &str) {
    let Some(defs) = schema.get("$defs").and_then(Value::as_object) else {
        return;
    };
    let candidates: Vec<(String, String)> = defs
        .iter()
        .flat_map(|(category, objects)| {
            objects
                .as_object()
                .into_iter()
                .flat_map(|objects| objects.keys())
                .map(move |object| (category.clone(), object.clone()))
        })
        .filter(|(_, object)| object.ends_with("-property") || object == "gradient-stops")
        .collect();

    for (category, object) in candidates {
        let pointer = format!("/$defs/{category}/{object}");
        if object == "splittable-position-property" {
            rewrite_splitpos(schema, &pointer, root_id);
        } else if object == "gradient-property" {
            let inner = format!("{pointer}/properties/k");
            rewrite_a_dispatch(schema, &inner, root_id);
        } else {
            rewrite_a_dispatch(schema, &pointer, root_id);
        }
    }
}

fn rewrite_a_dispatch(schema: &mut Value, pointer: &str, root_id: &str) {
    let Some(node) = schema.pointer_mut(pointer).and_then(Value::as_object_mut) else {
        return;
    };
    node.remove("oneOf");
    node.remove("anyOf");
    node.insert("prop_oneof".to_string(), Value::String(root_id.to_string()));
    node.insert("prop_oneof_field".to_string(), Value::String("a".to_string()));
}

fn rewrite_splitpos(schema: &mut Value, pointer: &str, root_id: &str) {
    let Some(node) = schema.pointer_mut(pointer).and_then(Value::as_object_mut) else {
        return;
    };
    node.remove("oneOf");
    node.remove("anyOf");
    node.insert("splitpos_oneof".to_string(), Value::String(root_id.to_string()));
    node.insert("splitpos_oneof_field".to_string(), Value::String("s".to_string()));
}

/// `constants` and `int-boolean` style definitions enumerate a fixed set of
/// `const` branches; replace them with `enum_oneof` so an out-of-range
/// value reports the offending definition's name and docs link instead of
/// the engine's generic enum mismatch message.
fn rewrite_enums(schema: &mut Value, root_id: &str) {
    let Some(defs) = schema.get("$defs").and_then(Value::as_object) else {
        return;
    };
    let targets: Vec<(String, String)> = defs
        .iter()
        .filter(|(category, _)| category.as_str() == "constants")
        .flat_map(|(category, objects)| {
            objects
                .as_object()
                .into_iter()
                .flat_map(|objects| objects.keys())
                .map(move |object| (category.clone(), object.clone()))
        })
        .chain(
            defs.get("values")
                .and_then(Value::as_object)
                .into_iter()
                .flat_map(|objects| objects.keys())
                .filter(|object| object.as_str() == "int-boolean")
                .map(|object| ("values".to_string(), object.clone())),
        )
        .collect();

    for (category, object) in targets {
        let pointer = format!("/$defs/{category}/{object}");
        let Some(node) = schema.pointer(&pointer) else { continue };
        let values: Vec<Value> = collect_union_members(node)
            .map(|members| members.iter().filter_map(|m| m.get("const").cloned()).collect())
            .or_else(|| node.get("enum").and_then(Value::as_array).cloned())
            .unwrap_or_default();
        if values.is_empty() {
            continue;
        }
        let Some(node) = schema.pointer_mut(&pointer).and_then(Value::as_object_mut) else {
            continue;
        };
        node.remove("oneOf");
        node.remove("anyOf");
        node.remove("enum");
        node.insert("enum_oneof".to_string(), Value::String(root_id.to_string()));
        node.insert("enum_oneof_values".to_string(), Value::Array(values));
    }
}

/// Assets have no shared discriminant field, so a synthetic `all-assets`
/// union is seeded carrying `asset_oneof: <rootId>`; the `asset_oneof`
/// keyword itself routes by document shape (a `layers` array marks a
/// precomposition asset, its absence an image asset) and reports a `Type`
/// warning only if the routed candidate fails to validate.
///
/// Asset-reference integrity (every `refId` names an asset that actually
/// exists) is a document-wide check, not a per-field one, so it is wired in
/// as a single `reference_asset` keyword on the root schema object rather
/// than on the `refId` property schemas themselves: only the root sees both
/// the `assets` list and every layer's `refId` at once.
fn seed_asset_dispatch(schema: &mut Value, root_id: &str) {
    if schema.pointer("/$defs/assets").and_then(Value::as_object).is_none() {
        return;
    }

    let mut map = Map::new();
    map.insert("asset_oneof".to_string(), Value::String(root_id.to_string()));
    if let Some(defs) = schema.pointer_mut("/$defs").and_then(Value::as_object_mut) {
        let all_assets = defs
            .entry("all-assets".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(all_assets) = all_assets.as_object_mut() {
            all_assets.insert("all-assets".to_string(), Value::Object(map));
        }
    }

    if let Value::Object(root) = schema {
        root.insert("reference_asset".to_string(), Value::Bool(true));
    }
}

/// Marks the array-of-keyframes schema produced by the `a == 1` branch of a
/// property union so the `keyframe_sequence` keyword can check cross-element
/// invariants (ascending `t`, at most two coincident keyframes, matching
/// `i`/`o` easing handles) that no single keyframe's own schema can express.
fn mark_keyframe_sequences(schema: &mut Value, root_id: &str) {
    let Some(defs) = schema.get("$defs").and_then(Value::as_object) else {
        return;
    };
    let Some(keyframed_pointer) = defs
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|props| {
            props
                .keys()
                .find(|k| k.as_str() == "keyframed-value" || k.as_str() == "keyframed-base-value")
        })
        .map(|object| format!("/$defs/properties/{object}"))
    else {
        return;
    };
    if let Some(node) = schema.pointer_mut(&keyframed_pointer).and_then(Value::as_object_mut) {
        node.insert("keyframe_sequence".to_string(), Value::String(root_id.to_string()));
    }
}

