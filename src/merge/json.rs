//! JSON merge primitives.
//!
//! One recursive deep-merge parameterized by an [`ArrayPolicy`] serves every
//! JSON strategy: plain documents replace colliding arrays, UI documents
//! union them. The block and texture-atlas merges are thin layers on top
//! that special-case a handful of keys.
//!
//! Array de-duplication compares entries by their canonical JSON rendering
//! (object keys sorted recursively). That makes each union O(n²) in the
//! number of array entries, which is fine for addon-sized files.

use serde_json::{Map, Value};

/// What to do when both sides of a merge hold an array under the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayPolicy {
    /// The later array replaces the earlier one.
    Replace,
    /// Concatenate, then drop entries structurally equal to an earlier one.
    Union,
}

/// Block component keys that only make sense for legacy, non-geometry blocks.
pub const LEGACY_BLOCK_KEYS: &[&str] = &[
    "minecraft:block_shape",
    "minecraft:legacy_block",
    "minecraft:material_instances",
];

const GEOMETRY: &str = "minecraft:geometry";
const COMPONENTS: &str = "components";
const TEXTURE_DATA: &str = "texture_data";
const UI_DEFS: &str = "ui_defs";

// ---------------------------------------------------------------------------
// Core primitive
// ---------------------------------------------------------------------------

/// Merge `source` into `target`.
///
/// Objects merge key by key, recursing where both sides hold objects. Where
/// both sides hold arrays, `policy` decides. Every other collision is won by
/// `source`.
pub fn deep_merge(target: &mut Value, source: Value, policy: ArrayPolicy) {
    match (target, source) {
        (Value::Object(into), Value::Object(from)) => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value, policy),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(into), Value::Array(from)) if policy == ArrayPolicy::Union => {
            into.extend(from);
            dedup_values(into);
        }
        (slot, value) => *slot = value,
    }
}

/// Fold a sequence of documents left to right with [`deep_merge`].
///
/// Returns `Value::Null` for an empty sequence.
#[must_use]
pub fn merge_documents(docs: Vec<Value>, policy: ArrayPolicy) -> Value {
    let mut docs = docs.into_iter();
    let Some(mut merged) = docs.next() else {
        return Value::Null;
    };
    for doc in docs {
        deep_merge(&mut merged, doc, policy);
    }
    merged
}

/// Render a value with object keys sorted at every level.
///
/// Two values are structurally equal exactly when their canonical
/// renderings are equal.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    fn sorted(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut out = Map::new();
                for key in keys {
                    out.insert(key.clone(), sorted(&map[key.as_str()]));
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
            other => other.clone(),
        }
    }

    sorted(value).to_string()
}

/// Remove entries structurally equal to an earlier entry, keeping order.
fn dedup_values(values: &mut Vec<Value>) {
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    values.retain(|v| {
        let key = canonical_json(v);
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

// ---------------------------------------------------------------------------
// blocks.json
// ---------------------------------------------------------------------------

/// Merge block definition documents.
///
/// Top-level entries deep-merge with [`ArrayPolicy::Replace`], except that
/// the first `components["minecraft:geometry"]` seen for an entry is never
/// overwritten by later documents. Afterwards every entry carrying geometry
/// loses its [`LEGACY_BLOCK_KEYS`].
#[must_use]
pub fn merge_blocks(docs: Vec<Value>) -> Value {
    let mut merged = Value::Object(Map::new());

    for doc in docs {
        let Value::Object(from) = doc else {
            merged = doc;
            continue;
        };
        if !merged.is_object() {
            merged = Value::Object(Map::new());
        }
        let Some(into) = merged.as_object_mut() else {
            continue;
        };
        for (key, entry) in from {
            match into.get_mut(&key) {
                Some(existing) => {
                    let first_geometry =
                        components(existing).and_then(|c| c.get(GEOMETRY)).cloned();
                    deep_merge(existing, entry, ArrayPolicy::Replace);
                    if let Some(geometry) = first_geometry
                        && let Some(components) = components_mut(existing)
                    {
                        components.insert(GEOMETRY.to_owned(), geometry);
                    }
                }
                None => {
                    into.insert(key, entry);
                }
            }
        }
    }

    if let Value::Object(entries) = &mut merged {
        for entry in entries.values_mut() {
            strip_legacy_keys(entry);
        }
    }
    merged
}

fn components(entry: &Value) -> Option<&Map<String, Value>> {
    entry.get(COMPONENTS)?.as_object()
}

fn components_mut(entry: &mut Value) -> Option<&mut Map<String, Value>> {
    entry.get_mut(COMPONENTS)?.as_object_mut()
}

/// Drop legacy block keys from an entry that uses geometry.
///
/// Geometry may sit in the entry's `components` or directly on the entry;
/// legacy keys are removed from both places.
fn strip_legacy_keys(entry: &mut Value) {
    let has_geometry = entry.get(GEOMETRY).is_some()
        || components(entry).is_some_and(|c| c.contains_key(GEOMETRY));
    if !has_geometry {
        return;
    }
    let is_legacy = |key: &String| LEGACY_BLOCK_KEYS.contains(&key.as_str());
    if let Some(map) = entry.as_object_mut() {
        map.retain(|key, _| !is_legacy(key));
    }
    if let Some(components) = components_mut(entry) {
        components.retain(|key, _| !is_legacy(key));
    }
}

// ---------------------------------------------------------------------------
// Texture atlases
// ---------------------------------------------------------------------------

/// Merge `item_texture.json` / `terrain_texture.json` documents.
///
/// Every field deep-merges normally except `texture_data`, whose entries
/// are unioned shallowly: a later document's entry for a texture key
/// replaces the earlier one wholesale.
#[must_use]
pub fn merge_texture_atlases(docs: Vec<Value>) -> Value {
    let mut merged = Value::Object(Map::new());
    let mut texture_data: Option<Map<String, Value>> = None;

    for mut doc in docs {
        // Leave a placeholder so the key keeps its position in the output.
        if let Some(slot) = doc.get_mut(TEXTURE_DATA)
            && slot.is_object()
            && let Value::Object(entries) = std::mem::take(slot)
        {
            texture_data.get_or_insert_with(Map::new).extend(entries);
        }
        deep_merge(&mut merged, doc, ArrayPolicy::Replace);
    }

    if let (Some(entries), Some(map)) = (texture_data, merged.as_object_mut()) {
        map.insert(TEXTURE_DATA.to_owned(), Value::Object(entries));
    }
    merged
}

// ---------------------------------------------------------------------------
// _ui_defs.json
// ---------------------------------------------------------------------------

/// Union the `ui_defs` arrays of every document, first-seen order.
///
/// Documents without a `ui_defs` array contribute nothing. The result is
/// always a single `{ "ui_defs": [...] }` object.
#[must_use]
pub fn merge_ui_defs(docs: Vec<Value>) -> Value {
    let mut defs: Vec<Value> = Vec::new();
    for doc in docs {
        if let Value::Object(mut map) = doc
            && let Some(Value::Array(entries)) = map.remove(UI_DEFS)
        {
            defs.extend(entries);
        }
    }
    dedup_values(&mut defs);

    let mut out = Map::new();
    out.insert(UI_DEFS.to_owned(), Value::Array(defs));
    Value::Object(out)
}
