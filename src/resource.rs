//! Resource type classification and resolution
//!
//! Works out the Presentation 3 `type` of a node from its legacy `@type`,
//! or, for services that never had one, from `@context` and `profile`.

use std::fmt;

use serde_json::{Map, Value};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::vocab::{
    AUTH_1_CONTEXT, AUTH_COOKIE_PROFILES, AUTH_TOKEN_PROFILE, AUTOCOMPLETE_PROFILE,
    IMAGE_1_CONTEXT, IMAGE_2_CONTEXT, LEGACY_PREFIXES, SEARCH_1_CONTEXT, SEARCH_PROFILE,
};

/// The closed set of types the upgrader dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Collection,
    Manifest,
    Sequence,
    Canvas,
    Range,
    Annotation,
    AnnotationPage,
    AnnotationCollection,
    Choice,
    Image,
    Sound,
    Video,
    Text,
    Dataset,
    Service,
    AuthCookieService1,
    AuthTokenService1,
    SearchService1,
    AutoCompleteService1,
    ImageService1,
    ImageService2,
    /// Untyped, multi-typed, or a type outside this set
    Generic,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Collection => "Collection",
            ResourceType::Manifest => "Manifest",
            ResourceType::Sequence => "Sequence",
            ResourceType::Canvas => "Canvas",
            ResourceType::Range => "Range",
            ResourceType::Annotation => "Annotation",
            ResourceType::AnnotationPage => "AnnotationPage",
            ResourceType::AnnotationCollection => "AnnotationCollection",
            ResourceType::Choice => "Choice",
            ResourceType::Image => "Image",
            ResourceType::Sound => "Sound",
            ResourceType::Video => "Video",
            ResourceType::Text => "Text",
            ResourceType::Dataset => "Dataset",
            ResourceType::Service => "Service",
            ResourceType::AuthCookieService1 => "AuthCookieService1",
            ResourceType::AuthTokenService1 => "AuthTokenService1",
            ResourceType::SearchService1 => "SearchService1",
            ResourceType::AutoCompleteService1 => "AutoCompleteService1",
            ResourceType::ImageService1 => "ImageService1",
            ResourceType::ImageService2 => "ImageService2",
            ResourceType::Generic => "",
        }
    }

    /// Map a canonical type name to a variant; unknown names are `Generic`
    pub fn from_name(name: &str) -> Self {
        match name {
            "Collection" => ResourceType::Collection,
            "Manifest" => ResourceType::Manifest,
            "Sequence" => ResourceType::Sequence,
            "Canvas" => ResourceType::Canvas,
            "Range" => ResourceType::Range,
            "Annotation" => ResourceType::Annotation,
            "AnnotationPage" => ResourceType::AnnotationPage,
            "AnnotationCollection" => ResourceType::AnnotationCollection,
            "Choice" => ResourceType::Choice,
            "Image" => ResourceType::Image,
            "Sound" => ResourceType::Sound,
            "Video" => ResourceType::Video,
            "Text" => ResourceType::Text,
            "Dataset" => ResourceType::Dataset,
            "Service" => ResourceType::Service,
            "AuthCookieService1" => ResourceType::AuthCookieService1,
            "AuthTokenService1" => ResourceType::AuthTokenService1,
            "SearchService1" => ResourceType::SearchService1,
            "AutoCompleteService1" => ResourceType::AutoCompleteService1,
            "ImageService1" => ResourceType::ImageService1,
            "ImageService2" => ResourceType::ImageService2,
            _ => ResourceType::Generic,
        }
    }

    /// The dispatch type of an already resolved node
    ///
    /// A missing or multi-valued `type` dispatches as `Generic`.
    pub fn of(node: &Map<String, Value>) -> Self {
        match node.get("type") {
            Some(Value::String(name)) => Self::from_name(name),
            _ => ResourceType::Generic,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip a legacy namespace prefix ("sc:", "oa:", ...) from a name
pub fn strip_legacy_prefix(name: &str) -> &str {
    LEGACY_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Canonical Presentation 3 name for a legacy `@type` value
pub fn canonical_type_name(legacy: &str) -> String {
    match strip_legacy_prefix(legacy) {
        "Layer" => "AnnotationCollection".to_string(),
        "AnnotationList" => "AnnotationPage".to_string(),
        other => other.to_string(),
    }
}

fn canonical_type_value(legacy: Value) -> Value {
    match legacy {
        Value::String(s) => Value::String(canonical_type_name(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_type_value).collect()),
        other => other,
    }
}

/// Resolve the `type` of a node
///
/// A legacy `@type` always wins. Without one, services are recognized by
/// their `@context` or `profile`; anything else keeps whatever `type` it
/// already had.
pub fn resolve_type(mut node: Map<String, Value>, diagnostics: &mut Diagnostics) -> Map<String, Value> {
    if let Some(legacy) = node.remove("@type") {
        node.insert("type".to_string(), canonical_type_value(legacy));
        return node;
    }

    let image_service = match node.get("@context") {
        Some(context) => match context.as_str() {
            Some(IMAGE_2_CONTEXT) => Some(ResourceType::ImageService2),
            Some(IMAGE_1_CONTEXT) => Some(ResourceType::ImageService1),
            // Search and auth services are told apart by profile below
            Some(SEARCH_1_CONTEXT) | Some(AUTH_1_CONTEXT) => None,
            _ => {
                diagnostics.push(Diagnostic::UnknownContext {
                    context: display_value(context),
                });
                None
            }
        },
        None => None,
    };

    if let Some(service_type) = image_service {
        node.remove("@context");
        node.insert("type".to_string(), Value::from(service_type.as_str()));
        return node;
    }

    if let Some(service_type) = node.get("profile").and_then(service_type_for_profile) {
        node.insert("type".to_string(), Value::from(service_type.as_str()));
    }

    node
}

/// Service type implied by a profile value (a URI or a list containing one)
fn service_type_for_profile(profile: &Value) -> Option<ResourceType> {
    let by_uri = |uri: &str| {
        if AUTH_COOKIE_PROFILES.contains(&uri) {
            Some(ResourceType::AuthCookieService1)
        } else if uri == AUTH_TOKEN_PROFILE {
            Some(ResourceType::AuthTokenService1)
        } else if uri == SEARCH_PROFILE {
            Some(ResourceType::SearchService1)
        } else if uri == AUTOCOMPLETE_PROFILE {
            Some(ResourceType::AutoCompleteService1)
        } else {
            None
        }
    };

    match profile {
        Value::String(uri) => by_uri(uri),
        Value::Array(items) => items.iter().filter_map(Value::as_str).find_map(by_uri),
        _ => None,
    }
}

/// Render a JSON value for a diagnostic message
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use serde_json::json;

    fn resolve(value: Value) -> (Map<String, Value>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let node = resolve_type(value.as_object().unwrap().clone(), &mut diagnostics);
        (node, diagnostics)
    }

    #[test]
    fn test_legacy_prefixes_stripped() {
        let (node, _) = resolve(json!({"@id": "m1", "@type": "sc:Manifest"}));
        assert_eq!(node["type"], "Manifest");
        assert!(!node.contains_key("@type"));

        let (node, _) = resolve(json!({"@type": "dctypes:Image"}));
        assert_eq!(node["type"], "Image");

        let (node, _) = resolve(json!({"@type": "cnt:ContentAsText"}));
        assert_eq!(node["type"], "ContentAsText");
    }

    #[test]
    fn test_renamed_types() {
        let (node, _) = resolve(json!({"@type": "sc:Layer"}));
        assert_eq!(node["type"], "AnnotationCollection");

        let (node, _) = resolve(json!({"@type": "sc:AnnotationList"}));
        assert_eq!(node["type"], "AnnotationPage");
    }

    #[test]
    fn test_multi_type_dispatches_generic() {
        let (node, _) = resolve(json!({"@type": ["sc:Manifest", "oa:Choice"]}));
        assert_eq!(node["type"], json!(["Manifest", "Choice"]));
        assert_eq!(ResourceType::of(&node), ResourceType::Generic);
    }

    #[test]
    fn test_image_service_context() {
        let (node, diagnostics) = resolve(json!({
            "@context": IMAGE_2_CONTEXT,
            "@id": "https://example.org/iiif/img1",
            "profile": "http://iiif.io/api/image/2/level1.json"
        }));
        assert_eq!(node["type"], "ImageService2");
        assert!(!node.contains_key("@context"));
        assert!(diagnostics.is_empty());

        let (node, _) = resolve(json!({"@context": IMAGE_1_CONTEXT}));
        assert_eq!(node["type"], "ImageService1");
    }

    #[test]
    fn test_auth_and_search_profiles() {
        let (node, diagnostics) = resolve(json!({
            "@context": AUTH_1_CONTEXT,
            "profile": "http://iiif.io/api/auth/1/login"
        }));
        assert_eq!(node["type"], "AuthCookieService1");
        assert!(diagnostics.is_empty());

        let (node, _) = resolve(json!({"profile": AUTH_TOKEN_PROFILE}));
        assert_eq!(node["type"], "AuthTokenService1");

        let (node, _) = resolve(json!({
            "@context": SEARCH_1_CONTEXT,
            "profile": [SEARCH_PROFILE]
        }));
        assert_eq!(node["type"], "SearchService1");

        let (node, _) = resolve(json!({"profile": AUTOCOMPLETE_PROFILE}));
        assert_eq!(node["type"], "AutoCompleteService1");
    }

    #[test]
    fn test_unknown_context_reported() {
        let (node, diagnostics) = resolve(json!({"@context": "http://example.org/ctx.json"}));
        assert!(!node.contains_key("type"));
        assert_eq!(diagnostics.of_kind(DiagnosticKind::UnknownContext).count(), 1);
    }

    #[test]
    fn test_existing_type_kept() {
        let (node, diagnostics) = resolve(json!({"id": "c1", "type": "Canvas"}));
        assert_eq!(node["type"], "Canvas");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_from_name_round_trip() {
        for t in [
            ResourceType::Collection,
            ResourceType::Choice,
            ResourceType::AutoCompleteService1,
            ResourceType::ImageService2,
        ] {
            assert_eq!(ResourceType::from_name(t.as_str()), t);
        }
        assert_eq!(ResourceType::from_name("TextualBody"), ResourceType::Generic);
    }
}
