// Views over the provider's "mixed dictionary" JSON.
//
// Yahoo serializes heterogeneous tuples as arrays or as objects keyed by
// stringified indices ("0", "1", ...) next to a stray "count" field. The
// meaning of a slot is given by the field it carries, not its position, and
// positions shift between endpoints and seasons. Everything in this module
// converts those shapes into ordered sequences so the per-endpoint decoders
// never index by position.

use serde_json::{Map, Value};

/// Is `key` a stringified non-negative index?
fn index_of(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Keys that carry container bookkeeping rather than data.
fn is_structural(key: &str) -> bool {
    key == "count" || index_of(key).is_some()
}

/// Index-keyed children of an object, in numeric order. Non-index keys are
/// dropped.
fn indexed_children(map: &Map<String, Value>) -> Vec<(usize, &Value)> {
    let mut children: Vec<(usize, &Value)> = map
        .iter()
        .filter_map(|(k, v)| index_of(k).map(|i| (i, v)))
        .collect();
    children.sort_by_key(|(i, _)| *i);
    children
}

// ---------------------------------------------------------------------------
// Tagged entries
// ---------------------------------------------------------------------------

/// One entry of a keyed collection, unwrapped from its tag.
#[derive(Debug, Clone, Copy)]
pub struct TaggedEntry<'a> {
    /// Position of the entry in the container.
    pub index: usize,
    /// The value stored under the tag (e.g. the `team` array).
    pub body: &'a Value,
}

/// Convert a keyed collection (`{"0": {"team": ...}, "count": 2}`) or a
/// plain array into its tagged entries, in index order.
///
/// Values that are not objects carrying `tag` are skipped, as are
/// non-index siblings such as `count`.
pub fn tagged_entries<'a>(container: &'a Value, tag: &str) -> Vec<TaggedEntry<'a>> {
    let candidates: Vec<(usize, &Value)> = match container {
        Value::Array(items) => items.iter().enumerate().collect(),
        Value::Object(map) => indexed_children(map),
        _ => Vec::new(),
    };

    candidates
        .into_iter()
        .filter_map(|(index, value)| {
            let body = value.as_object()?.get(tag);
            if body.is_none() {
                tracing::debug!(index, tag, "ignoring container entry without tag");
            }
            body.map(|body| TaggedEntry { index, body })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Slot sequences
// ---------------------------------------------------------------------------

/// A flattened, ordered sequence of the object slots in a heterogeneous
/// provider value.
///
/// Arrays and index-keyed objects are flattened recursively; any object
/// carrying at least one named field is itself a slot. Lookups go by field
/// name and return the first slot that carries it.
#[derive(Debug, Clone, Default)]
pub struct Slots<'a> {
    items: Vec<&'a Map<String, Value>>,
}

impl<'a> Slots<'a> {
    pub fn new(value: &'a Value) -> Self {
        let mut items = Vec::new();
        flatten_into(value, &mut items);
        Slots { items }
    }

    /// First slot satisfying `pred`.
    pub fn find<P>(&self, pred: P) -> Option<&'a Map<String, Value>>
    where
        P: Fn(&Map<String, Value>) -> bool,
    {
        self.items.iter().copied().find(|slot| pred(*slot))
    }

    /// Value of `name` in the first slot that carries it.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.find(|slot| slot.contains_key(name))
            .and_then(|slot| slot.get(name))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn flatten_into<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::Object(map) => {
            if map.keys().any(|k| !is_structural(k)) {
                out.push(map);
            }
            for (_, child) in indexed_children(map) {
                flatten_into(child, out);
            }
        }
        _ => {}
    }
}
