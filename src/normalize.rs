//! Set and object-reference normalization
//!
//! Presentation 3 always uses lists for properties like `thumbnail` or
//! `service`, and every entry of an object-valued one is a typed reference.

use serde_json::{Map, Value};

use crate::deref::{classify_content_type, ContentClass};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::UpgradeError;
use crate::resource::resolve_type;
use crate::upgrade::Upgrader;
use crate::vocab::{OBJECT_PROPERTY_TYPES, SET_PROPERTIES};

/// Wrap every present set property that is not already a list
pub fn normalize_sets(node: &mut Map<String, Value>) {
    for property in SET_PROPERTIES {
        if let Some(value) = node.get_mut(*property) {
            if !value.is_array() {
                let single = value.take();
                *value = Value::Array(vec![single]);
            }
        }
    }
}

/// Turn a bare identifier into a reference object
pub fn object_reference(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(reference) => reference,
        other => {
            let mut reference = Map::new();
            reference.insert("id".to_string(), other);
            reference
        }
    }
}

/// Identifier of a reference, under either its new or legacy key
fn reference_id(reference: &Map<String, Value>) -> Option<&str> {
    reference
        .get("id")
        .or_else(|| reference.get("@id"))
        .and_then(Value::as_str)
}

fn has_type(reference: &Map<String, Value>) -> bool {
    reference.contains_key("type") || reference.contains_key("@type")
}

impl Upgrader<'_> {
    /// Make every object-valued property a list of typed references
    ///
    /// Expects set normalization to have run first.
    pub(crate) fn normalize_objects(&mut self, node: &mut Map<String, Value>) {
        for (property, default_type) in OBJECT_PROPERTY_TYPES {
            if !node.get(*property).is_some_and(Value::is_array) {
                continue;
            }
            let Some(Value::Array(values)) = node.remove(*property) else {
                continue;
            };

            let mut references = Vec::with_capacity(values.len());
            for value in values {
                let mut reference = object_reference(value);

                if !has_type(&reference) {
                    match default_type {
                        Some(t) => {
                            reference.insert("type".to_string(), Value::from(t.as_str()));
                        }
                        None if self.options.deref_links => {
                            self.dereference_reference(property, &mut reference);
                        }
                        None => {}
                    }
                }

                references.push(Value::Object(reference));
            }

            node.insert(property.to_string(), Value::Array(references));
        }
    }

    /// Try to learn a reference's type from what its identifier points at
    fn dereference_reference(&mut self, property: &str, reference: &mut Map<String, Value>) {
        let Some(id) = reference_id(reference).map(str::to_string) else {
            self.diagnostics.push(Diagnostic::UnresolvedReference {
                property: property.to_string(),
                id: String::new(),
                reason: "reference has no id".to_string(),
            });
            return;
        };

        self.stats.references_dereferenced += 1;
        let reason = match self.dereference_type(&id) {
            Ok(Some(type_name)) => {
                reference.insert("type".to_string(), Value::from(type_name));
                return;
            }
            Ok(None) => "no type could be determined".to_string(),
            Err(e) => e.to_string(),
        };

        self.diagnostics.push(Diagnostic::UnresolvedReference {
            property: property.to_string(),
            id,
            reason,
        });
    }

    fn dereference_type(&mut self, id: &str) -> Result<Option<String>, UpgradeError> {
        let content_type = self.dereferencer.content_type(id)?;

        match classify_content_type(&content_type) {
            ContentClass::Resource(t) => Ok(Some(t.as_str().to_string())),
            ContentClass::Json => {
                let document = self.dereferencer.fetch_json(id)?;
                Ok(document_type(document, &mut self.diagnostics))
            }
            ContentClass::Unknown => Ok(None),
        }
    }
}

/// The type a fetched document declares, resolved the same way as any node
fn document_type(document: Value, diagnostics: &mut Diagnostics) -> Option<String> {
    let Value::Object(obj) = document else {
        return None;
    };
    let resolved = resolve_type(obj, diagnostics);
    resolved
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string)
}
