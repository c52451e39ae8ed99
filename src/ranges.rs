//! Rebuilding the range hierarchy of a manifest
//!
//! Presentation 2 lists every range of a manifest flat in `structures`,
//! each pointing at its parent with `within`. Presentation 3 nests child
//! ranges in their parent's `items`. Children can only be placed once
//! every range is known, so the whole list is handled in one go.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostic;
use crate::upgrade::Upgrader;

/// A processed range waiting to be assembled into the forest
struct PendingRange {
    node: Option<Value>,
    id: Option<String>,
    parent: Option<String>,
    children: Vec<usize>,
}

/// Identifier of the parent named by a legacy `within` value
fn parent_id(within: &Value) -> Option<String> {
    match within {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("@id")
            .or_else(|| obj.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(items) => items.first().and_then(parent_id),
        _ => None,
    }
}

fn node_id(node: &Value) -> Option<String> {
    node.get("id").and_then(Value::as_str).map(str::to_string)
}

impl Upgrader<'_> {
    /// Turn a flat list of ranges into a forest
    ///
    /// Roots keep their original order; children are appended to their
    /// parent in the order they appear in the list. A child whose id is
    /// already nested under the same parent takes the earlier one's place.
    /// A range whose parent does not exist is dropped, and a range that
    /// would end up inside its own subtree stays a root.
    pub(crate) fn unflatten_ranges(&mut self, structures: Vec<Value>) -> Vec<Value> {
        let mut pending: Vec<PendingRange> = Vec::with_capacity(structures.len());
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for entry in structures {
            let (node, parent) = match entry {
                Value::Object(mut obj) => {
                    let parent = obj.remove("within").as_ref().and_then(parent_id);
                    (Value::Object(self.process_resource(obj)), parent)
                }
                other => (other, None),
            };

            let id = node_id(&node);
            if let Some(id) = &id {
                by_id.insert(id.clone(), pending.len());
            }
            pending.push(PendingRange {
                node: Some(node),
                id,
                parent,
                children: Vec::new(),
            });
        }

        let mut is_root = vec![true; pending.len()];
        let mut parent_of: Vec<Option<usize>> = vec![None; pending.len()];

        for index in 0..pending.len() {
            let Some(parent) = pending[index].parent.clone() else {
                continue;
            };
            is_root[index] = false;
            let range = pending[index].id.clone().unwrap_or_default();

            let Some(&parent_index) = by_id.get(&parent) else {
                self.diagnostics.push(Diagnostic::DanglingRange { range, parent });
                self.stats.ranges_dropped += 1;
                continue;
            };

            if is_ancestor_or_self(index, parent_index, &parent_of) {
                self.diagnostics.push(Diagnostic::RangeCycle { range, parent });
                is_root[index] = true;
                continue;
            }

            // The parent may already list this range as a plain reference
            if let Some(Value::Object(parent_node)) = pending[parent_index].node.as_mut() {
                remove_item_with_id(parent_node, &range);
            }

            parent_of[index] = Some(parent_index);

            // A repeated id under the same parent replaces the earlier entry
            let existing = pending[parent_index]
                .children
                .iter()
                .position(|&child| {
                    !range.is_empty() && pending[child].id.as_deref() == Some(range.as_str())
                });
            match existing {
                Some(slot) => {
                    let replaced = pending[parent_index].children[slot];
                    parent_of[replaced] = None;
                    pending[parent_index].children[slot] = index;
                }
                None => {
                    pending[parent_index].children.push(index);
                    self.stats.ranges_reparented += 1;
                }
            }
        }

        let mut forest = Vec::new();
        for index in 0..pending.len() {
            if is_root[index] {
                if let Some(node) = assemble(index, &mut pending) {
                    forest.push(node);
                }
            }
        }
        forest
    }
}

/// Whether `candidate` is `node` or lies on the chain above `parent`
fn is_ancestor_or_self(node: usize, parent: usize, parent_of: &[Option<usize>]) -> bool {
    let mut current = Some(parent);
    while let Some(index) = current {
        if index == node {
            return true;
        }
        current = parent_of[index];
    }
    false
}

fn remove_item_with_id(node: &mut Map<String, Value>, id: &str) {
    if id.is_empty() {
        return;
    }
    if let Some(Value::Array(items)) = node.get_mut("items") {
        items.retain(|item| node_id(item).as_deref() != Some(id));
    }
}

/// Build a range with all of its accepted children nested in `items`
fn assemble(index: usize, pending: &mut [PendingRange]) -> Option<Value> {
    let mut node = pending[index].node.take()?;
    let children = std::mem::take(&mut pending[index].children);

    if children.is_empty() {
        return Some(node);
    }

    let nested: Vec<Value> = children
        .into_iter()
        .filter_map(|child| assemble(child, pending))
        .collect();

    if let Value::Object(obj) = &mut node {
        match obj.get_mut("items") {
            Some(Value::Array(items)) => items.extend(nested),
            _ => {
                obj.insert("items".to_string(), Value::Array(nested));
            }
        }
    }
    Some(node)
}
