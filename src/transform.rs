//! Per-type transformation of Presentation 2 nodes
//!
//! Every transformer takes a node by value and hands back its
//! Presentation 3 form. All of them start from the generic rewrite, which
//! covers the properties any resource may carry.

use serde_json::{json, Map, Value};

use crate::diagnostics::Diagnostic;
use crate::language::{language_map, language_pair};
use crate::normalize::{normalize_sets, object_reference};
use crate::resource::{display_value, strip_legacy_prefix, ResourceType};
use crate::upgrade::Upgrader;
use crate::vocab::{
    is_profile_short_name, profile_short_name, ATTRIBUTION_LABEL, DESCRIPTION_LABEL,
    LANGUAGE_PROPERTIES,
};

/// Wrap a single value into a list, leave lists alone
fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Turn a bare identifier into a typed reference, or type an untyped object
fn typed_reference(value: Value, resource_type: ResourceType) -> Value {
    let mut reference = object_reference(value);
    if !reference.contains_key("type") && !reference.contains_key("@type") {
        reference.insert("type".to_string(), Value::from(resource_type.as_str()));
    }
    Value::Object(reference)
}

/// Like [`typed_reference`] but the type is forced
fn forced_reference(value: Value, resource_type: ResourceType) -> Value {
    let mut reference = object_reference(value);
    reference.remove("@type");
    reference.insert("type".to_string(), Value::from(resource_type.as_str()));
    Value::Object(reference)
}

/// Append to the node's `items`, creating it if needed
fn extend_items(node: &mut Map<String, Value>, new_items: Vec<Value>) {
    let mut items = node.remove("items").map(as_list).unwrap_or_default();
    items.extend(new_items);
    node.insert("items".to_string(), Value::Array(items));
}

/// Move `startCanvas` to a Canvas-typed `start`
fn start_canvas(node: &mut Map<String, Value>) {
    if let Some(start) = node.remove("startCanvas") {
        node.insert(
            "start".to_string(),
            forced_reference(start, ResourceType::Canvas),
        );
    }
}

impl Upgrader<'_> {
    /// Rewrite the properties shared by every resource type
    pub(crate) fn process_generic(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let default_lang = self.options.default_lang.clone();
        let mut result = Map::new();
        let mut description = None;
        let mut attribution = None;

        for (key, value) in node {
            match key.as_str() {
                "@id" => {
                    result.insert("id".to_string(), value);
                }
                "license" => {
                    result.insert("rights".to_string(), value);
                }
                "viewingHint" => {
                    result.insert("behavior".to_string(), value);
                }
                "description" => description = Some(value),
                "attribution" => attribution = Some(value),
                _ => {
                    result.insert(key, value);
                }
            }
        }

        if let Some(description) = description {
            if self.options.description_is_metadata {
                // Must land before the metadata language maps are built
                let mut metadata = result.remove("metadata").map(as_list).unwrap_or_default();
                metadata.push(json!({"label": DESCRIPTION_LABEL, "value": description}));
                result.insert("metadata".to_string(), Value::Array(metadata));
            } else {
                result.insert("summary".to_string(), description);
            }
        }

        if let Some(attribution) = attribution {
            result.insert(
                "requiredStatement".to_string(),
                json!({"label": ATTRIBUTION_LABEL, "value": attribution}),
            );
        }

        if let Some(profile) = result.remove("profile") {
            let profile = self.map_profile(profile);
            result.insert("profile".to_string(), profile);
        }

        for property in LANGUAGE_PROPERTIES {
            let Some(value) = result.remove(*property) else {
                continue;
            };
            let normalized = language_map(&value, &default_lang);
            if normalized.is_empty() {
                self.report_empty_language(property);
            } else {
                result.insert(property.to_string(), Value::Object(normalized));
            }
        }

        if let Some(statement) = result.remove("requiredStatement") {
            let statement = self.normalize_pair("requiredStatement", statement, &default_lang);
            result.insert("requiredStatement".to_string(), statement);
        }

        if let Some(metadata) = result.remove("metadata") {
            let pairs = as_list(metadata)
                .into_iter()
                .map(|pair| self.normalize_pair("metadata", pair, &default_lang))
                .collect();
            result.insert("metadata".to_string(), Value::Array(pairs));
        }

        normalize_sets(&mut result);
        self.normalize_objects(&mut result);

        result
    }

    fn normalize_pair(&mut self, property: &str, pair: Value, default_lang: &str) -> Value {
        let (pair, emptied) = language_pair(pair, default_lang);
        for side in emptied {
            self.report_empty_language(&format!("{}.{}", property, side));
        }
        pair
    }

    fn report_empty_language(&mut self, property: &str) {
        self.diagnostics.push(Diagnostic::EmptyLanguageValue {
            property: property.to_string(),
        });
    }

    fn map_profile(&mut self, profile: Value) -> Value {
        match profile {
            Value::String(uri) => match profile_short_name(&uri) {
                Some(short) => Value::from(short),
                None => {
                    if !is_profile_short_name(&uri) {
                        self.diagnostics.push(Diagnostic::UnknownProfile {
                            profile: uri.clone(),
                        });
                    }
                    Value::String(uri)
                }
            },
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|p| self.map_profile(p)).collect())
            }
            // Image API profile objects describe extra features
            other @ Value::Object(_) => other,
            other => {
                self.diagnostics.push(Diagnostic::UnknownProfile {
                    profile: display_value(&other),
                });
                other
            }
        }
    }

    pub(crate) fn process_collection(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut node = self.process_generic(node);

        let mut new_items = Vec::new();
        if let Some(collections) = node.remove("collections") {
            new_items.extend(
                as_list(collections)
                    .into_iter()
                    .map(|c| typed_reference(c, ResourceType::Collection)),
            );
        }
        if let Some(manifests) = node.remove("manifests") {
            new_items.extend(
                as_list(manifests)
                    .into_iter()
                    .map(|m| typed_reference(m, ResourceType::Manifest)),
            );
        }
        if let Some(members) = node.remove("members") {
            new_items.extend(as_list(members));
        }

        if !new_items.is_empty() {
            extend_items(&mut node, new_items);
        }
        node
    }

    pub(crate) fn process_manifest(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut node = self.process_generic(node);

        start_canvas(&mut node);

        if let Some(sequences) = node.remove("sequences") {
            extend_items(&mut node, as_list(sequences));
        }

        // Unflattening needs every range at once, so it can't wait for the walk
        if let Some(structures) = node.remove("structures") {
            let forest = self.unflatten_ranges(as_list(structures));
            node.insert("structures".to_string(), Value::Array(forest));
        }

        node
    }

    pub(crate) fn process_sequence(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut node = self.process_generic(node);

        if let Some(canvases) = node.remove("canvases") {
            extend_items(&mut node, as_list(canvases));
        }
        start_canvas(&mut node);

        node
    }

    pub(crate) fn process_canvas(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut node = self.process_generic(node);

        if let Some(images) = node.remove("images") {
            let page = json!({
                "type": ResourceType::AnnotationPage.as_str(),
                "items": as_list(images),
            });
            extend_items(&mut node, vec![page]);
        }

        if let Some(other_content) = node.remove("otherContent") {
            let mut annotations = node.remove("annotations").map(as_list).unwrap_or_default();
            annotations.extend(as_list(other_content));
            node.insert("annotations".to_string(), Value::Array(annotations));
        }

        node
    }

    pub(crate) fn process_range(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut node = self.process_generic(node);

        let mut new_items = Vec::new();
        let mut had_legacy = false;
        if let Some(ranges) = node.remove("ranges") {
            had_legacy = true;
            new_items.extend(
                as_list(ranges)
                    .into_iter()
                    .map(|r| typed_reference(r, ResourceType::Range)),
            );
        }
        if let Some(canvases) = node.remove("canvases") {
            had_legacy = true;
            new_items.extend(
                as_list(canvases)
                    .into_iter()
                    .map(|c| typed_reference(c, ResourceType::Canvas)),
            );
        }
        if let Some(members) = node.remove("members") {
            had_legacy = true;
            new_items.extend(as_list(members));
        }
        if had_legacy {
            extend_items(&mut node, new_items);
        }

        if let Some(layer) = node.remove("contentLayer") {
            node.insert(
                "includes".to_string(),
                forced_reference(layer, ResourceType::AnnotationCollection),
            );
        }

        // The flattened top range marker means nothing once ranges nest
        let emptied = match node.get_mut("behavior") {
            Some(Value::Array(behavior)) => {
                behavior.retain(|b| b.as_str() != Some("top"));
                behavior.is_empty()
            }
            _ => false,
        };
        if emptied {
            node.remove("behavior");
        }

        node
    }

    pub(crate) fn process_annotation(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut node = self.process_generic(node);

        if let Some(target) = node.remove("on") {
            node.insert("target".to_string(), target);
        }
        if let Some(body) = node.remove("resource") {
            node.insert("body".to_string(), body);
        }

        if let Some(motivation) = node.remove("motivation") {
            node.insert("motivation".to_string(), strip_motivation(motivation));
        }

        node
    }

    pub(crate) fn process_annotation_page(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        self.process_generic(node)
    }

    pub(crate) fn process_annotation_collection(
        &mut self,
        node: Map<String, Value>,
    ) -> Map<String, Value> {
        self.process_generic(node)
    }

    pub(crate) fn process_choice(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut node = self.process_generic(node);

        let mut choices = Vec::new();
        let default = node.remove("default");
        let item = node.remove("item");

        if default.is_none() && item.is_none() {
            if !node.contains_key("items") {
                self.diagnostics.push(Diagnostic::MalformedChoice {
                    id: node.get("id").and_then(Value::as_str).map(str::to_string),
                });
                node.insert("items".to_string(), Value::Array(choices));
            }
            return node;
        }

        if let Some(default) = default {
            choices.push(default);
        }
        if let Some(item) = item {
            choices.extend(as_list(item));
        }
        extend_items(&mut node, choices);

        node
    }
}

fn strip_motivation(motivation: Value) -> Value {
    match motivation {
        Value::String(m) => Value::from(strip_legacy_prefix(&m)),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_motivation).collect()),
        other => other,
    }
}
