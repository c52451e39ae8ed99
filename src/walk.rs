//! Recursive walk over a document tree
//!
//! Each node is resolved, handed to the transformer for its type, and then
//! its properties are walked so nested nodes get the same treatment.

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostic;
use crate::resource::{resolve_type, ResourceType};
use crate::upgrade::Upgrader;
use crate::vocab::{is_recognized_property, LANGUAGE_PROPERTIES};

/// Properties already in their final shape once a node has been transformed
fn is_finished_property(property: &str) -> bool {
    LANGUAGE_PROPERTIES.contains(&property)
        || matches!(property, "requiredStatement" | "metadata" | "structures")
}

impl Upgrader<'_> {
    /// Resolve, transform and walk one node
    pub(crate) fn process_resource(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        self.stats.nodes_processed += 1;

        let node = resolve_type(node, &mut self.diagnostics);
        let node = match ResourceType::of(&node) {
            ResourceType::Collection => self.process_collection(node),
            ResourceType::Manifest => self.process_manifest(node),
            ResourceType::Sequence => self.process_sequence(node),
            ResourceType::Canvas => self.process_canvas(node),
            ResourceType::Range => self.process_range(node),
            ResourceType::Annotation => self.process_annotation(node),
            ResourceType::AnnotationPage => self.process_annotation_page(node),
            ResourceType::AnnotationCollection => self.process_annotation_collection(node),
            ResourceType::Choice => self.process_choice(node),
            ResourceType::Image
            | ResourceType::Sound
            | ResourceType::Video
            | ResourceType::Text
            | ResourceType::Dataset
            | ResourceType::Service
            | ResourceType::AuthCookieService1
            | ResourceType::AuthTokenService1
            | ResourceType::SearchService1
            | ResourceType::AutoCompleteService1
            | ResourceType::ImageService1
            | ResourceType::ImageService2
            | ResourceType::Generic => self.process_generic(node),
        };

        self.traverse(node)
    }

    /// Walk the properties of a transformed node
    pub(crate) fn traverse(&mut self, node: Map<String, Value>) -> Map<String, Value> {
        let mut result = Map::new();

        for (key, value) in node {
            if !is_recognized_property(&key) {
                self.diagnostics.push(Diagnostic::UnknownProperty {
                    property: key.clone(),
                });
            }

            let value = if is_finished_property(&key) {
                value
            } else {
                self.walk_value(value)
            };
            result.insert(key, value);
        }

        result
    }

    fn walk_value(&mut self, value: Value) -> Value {
        match value {
            Value::Object(obj) => Value::Object(self.process_resource(obj)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(obj) => Value::Object(self.process_resource(obj)),
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}
