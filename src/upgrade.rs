//! Top-level upgrade driver
//!
//! Takes a whole Presentation 2 document, swaps its context, and walks it
//! from the root down.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::deref::Dereferencer;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::UpgradeError;
use crate::resource::display_value;
use crate::vocab::{
    is_presentation_3_context, presentation_3_context, DEFAULT_LANGUAGE, PRESENTATION_2_CONTEXT,
};

/// Options for an upgrade run
#[derive(Debug, Clone)]
pub struct UpgradeOptions {
    /// Follow referenced documents (reserved; not used yet)
    pub crawl: bool,
    /// Move `description` into a metadata pair instead of `summary`
    pub description_is_metadata: bool,
    /// Keep extension contexts and properties (reserved; not used yet)
    pub allow_extensions: bool,
    /// Language tag for strings without one
    pub default_lang: String,
    /// Ask the dereferencer for the type of untyped references
    pub deref_links: bool,
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            crawl: false,
            description_is_metadata: true,
            allow_extensions: false,
            default_lang: DEFAULT_LANGUAGE.to_string(),
            deref_links: true,
        }
    }
}

/// Statistics from an upgrade run
#[derive(Debug, Default, Clone, Serialize)]
pub struct UpgradeStats {
    /// Nodes passed through type resolution and dispatch
    pub nodes_processed: usize,
    /// References whose type was looked up through the dereferencer
    pub references_dereferenced: usize,
    /// Ranges moved under their parent range
    pub ranges_reparented: usize,
    /// Ranges dropped because their parent does not exist
    pub ranges_dropped: usize,
}

/// Result of an upgrade
#[derive(Debug)]
pub struct UpgradeResult {
    /// The Presentation 3 document
    pub document: Value,
    /// Everything unexpected that was seen on the way
    pub diagnostics: Vec<Diagnostic>,
    pub stats: UpgradeStats,
}

/// Per-run state threaded through every stage of the upgrade
pub struct Upgrader<'a> {
    pub(crate) options: &'a UpgradeOptions,
    pub(crate) dereferencer: &'a dyn Dereferencer,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) stats: UpgradeStats,
}

impl<'a> Upgrader<'a> {
    pub fn new(options: &'a UpgradeOptions, dereferencer: &'a dyn Dereferencer) -> Self {
        Self {
            options,
            dereferencer,
            diagnostics: Diagnostics::new(),
            stats: UpgradeStats::default(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn stats(&self) -> &UpgradeStats {
        &self.stats
    }
}

/// Upgrade a Presentation 2 document to Presentation 3
///
/// Never fails on content: anything odd is recorded as a diagnostic. The
/// only error is a document whose root is not a JSON object.
pub fn upgrade(
    document: Value,
    options: &UpgradeOptions,
    dereferencer: &dyn Dereferencer,
) -> Result<UpgradeResult, UpgradeError> {
    let Value::Object(mut root) = document else {
        return Err(UpgradeError::InvalidDocument(
            "top-level value must be a JSON object".to_string(),
        ));
    };

    let root_id = root
        .get("@id")
        .or_else(|| root.get("id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let span = tracing::info_span!("upgrade", id = %root_id);
    let _guard = span.enter();

    let context = root.remove("@context");

    let mut upgrader = Upgrader::new(options, dereferencer);
    let mut upgraded = upgrader.process_resource(root);

    match context {
        Some(Value::String(ctx)) if ctx == PRESENTATION_2_CONTEXT => {
            upgraded = with_context(upgraded, presentation_3_context());
        }
        Some(ctx) => {
            // Extension contexts are passed through untouched
            if !is_presentation_3_context(&ctx) {
                upgrader.diagnostics.push(Diagnostic::UnknownContext {
                    context: display_value(&ctx),
                });
            }
            upgraded = with_context(upgraded, ctx);
        }
        None => {}
    }

    let Upgrader {
        diagnostics, stats, ..
    } = upgrader;

    tracing::info!(
        nodes = stats.nodes_processed,
        dereferenced = stats.references_dereferenced,
        ranges_reparented = stats.ranges_reparented,
        ranges_dropped = stats.ranges_dropped,
        diagnostics = diagnostics.len(),
        "upgrade complete"
    );

    Ok(UpgradeResult {
        document: Value::Object(upgraded),
        diagnostics: diagnostics.into_vec(),
        stats,
    })
}

fn with_context(node: Map<String, Value>, context: Value) -> Map<String, Value> {
    let mut result = Map::new();
    result.insert("@context".to_string(), context);
    result.extend(node);
    result
}

/// Serialize an upgraded document to a JSON string
pub fn to_json_string(result: &UpgradeResult, pretty: bool) -> Result<String, UpgradeError> {
    if pretty {
        Ok(serde_json::to_string_pretty(&result.document)?)
    } else {
        Ok(serde_json::to_string(&result.document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deref::NoOpDereferencer;
    use crate::diagnostics::DiagnosticKind;
    use serde_json::json;

    fn offline() -> UpgradeOptions {
        UpgradeOptions {
            deref_links: false,
            ..UpgradeOptions::default()
        }
    }

    fn sample_manifest() -> Value {
        json!({
            "@context": PRESENTATION_2_CONTEXT,
            "@id": "https://example.org/iiif/book1/manifest",
            "@type": "sc:Manifest",
            "label": "Book 1",
            "description": "A book",
            "license": "http://rightsstatements.org/vocab/NoC-NC/1.0/",
            "sequences": [{
                "@type": "sc:Sequence",
                "canvases": [{
                    "@id": "https://example.org/iiif/book1/canvas/p1",
                    "@type": "sc:Canvas",
                    "label": "p. 1",
                    "height": 1000,
                    "width": 750,
                    "images": [{
                        "@type": "oa:Annotation",
                        "motivation": "sc:painting",
                        "on": "https://example.org/iiif/book1/canvas/p1",
                        "resource": {
                            "@id": "https://example.org/iiif/book1/res/page1.jpg",
                            "@type": "dctypes:Image",
                            "format": "image/jpeg"
                        }
                    }]
                }]
            }]
        })
    }

    #[test]
    fn test_upgrade_replaces_context() {
        let result = upgrade(sample_manifest(), &offline(), &NoOpDereferencer).unwrap();
        assert_eq!(result.document["@context"], presentation_3_context());
        assert_eq!(result.document["type"], "Manifest");
        assert_eq!(result.document["id"], "https://example.org/iiif/book1/manifest");
        assert_eq!(result.document["label"], json!({"none": ["Book 1"]}));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_upgrade_walks_down_to_annotations() {
        let result = upgrade(sample_manifest(), &offline(), &NoOpDereferencer).unwrap();
        let canvas = &result.document["items"][0]["items"][0];
        assert_eq!(canvas["type"], "Canvas");

        let page = &canvas["items"][0];
        assert_eq!(page["type"], "AnnotationPage");

        let anno = &page["items"][0];
        assert_eq!(anno["type"], "Annotation");
        assert_eq!(anno["motivation"], "painting");
        assert_eq!(anno["target"], "https://example.org/iiif/book1/canvas/p1");
        assert_eq!(anno["body"]["type"], "Image");
        assert_eq!(anno["body"]["id"], "https://example.org/iiif/book1/res/page1.jpg");
    }

    #[test]
    fn test_unknown_context_passed_through() {
        let doc = json!({
            "@context": ["http://iiif.io/api/presentation/2/context.json", "http://example.org/ext.json"],
            "@id": "https://example.org/m",
            "@type": "sc:Manifest"
        });
        let result = upgrade(doc.clone(), &offline(), &NoOpDereferencer).unwrap();
        assert_eq!(result.document["@context"], doc["@context"]);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind() == DiagnosticKind::UnknownContext));
    }

    #[test]
    fn test_non_object_root_rejected() {
        let result = upgrade(json!([1, 2, 3]), &offline(), &NoOpDereferencer);
        assert!(matches!(result, Err(UpgradeError::InvalidDocument(_))));
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let once = upgrade(sample_manifest(), &offline(), &NoOpDereferencer).unwrap();
        let twice = upgrade(once.document.clone(), &offline(), &NoOpDereferencer).unwrap();
        assert_eq!(once.document, twice.document);
        assert!(twice.diagnostics.is_empty());
    }

    #[test]
    fn test_to_json_string() {
        let result = upgrade(sample_manifest(), &offline(), &NoOpDereferencer).unwrap();
        let compact = to_json_string(&result, false).unwrap();
        let pretty = to_json_string(&result, true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        let reparsed: Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(reparsed, result.document);
    }
}
