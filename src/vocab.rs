//! Vocabulary definitions for the Presentation 2 to 3 upgrade
//!
//! Static tables driving type resolution, property normalization and
//! content-type inference. Nothing here changes during a run.

use crate::resource::ResourceType;

/// Presentation API 2.x context
pub const PRESENTATION_2_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";

/// Presentation API 3.0 context
pub const PRESENTATION_3_CONTEXT: &str = "http://iiif.io/api/presentation/3/context.json";

/// W3C Web Annotation context, listed before the Presentation 3 context
pub const WEB_ANNOTATION_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";

pub const IMAGE_1_CONTEXT: &str = "http://iiif.io/api/image/1/context.json";
pub const IMAGE_2_CONTEXT: &str = "http://iiif.io/api/image/2/context.json";
pub const SEARCH_1_CONTEXT: &str = "http://iiif.io/api/search/1/context.json";
pub const AUTH_1_CONTEXT: &str = "http://iiif.io/api/auth/1/context.json";

/// Language tag used for strings that carry no language of their own
pub const DEFAULT_LANGUAGE: &str = "none";

/// Label given to the metadata pair that receives a legacy `description`
pub const DESCRIPTION_LABEL: &str = "Description";

/// Label given to the `requiredStatement` built from a legacy `attribution`
pub const ATTRIBUTION_LABEL: &str = "Attribution";

/// Namespace prefixes carried by legacy `@type` and `motivation` values
pub const LEGACY_PREFIXES: &[&str] = &["sc:", "oa:", "dctypes:", "cnt:"];

/// Properties whose values are normalized into language maps
pub const LANGUAGE_PROPERTIES: &[&str] = &["label", "summary"];

/// Properties that must always be sequences
pub const SET_PROPERTIES: &[&str] = &[
    "thumbnail",
    "rights",
    "logo",
    "behavior",
    "related",
    "rendering",
    "service",
    "seeAlso",
    "within",
];

/// Properties holding object references, with the type assumed when a
/// reference does not declare one
pub const OBJECT_PROPERTY_TYPES: &[(&str, Option<ResourceType>)] = &[
    ("thumbnail", Some(ResourceType::Image)),
    ("logo", Some(ResourceType::Image)),
    ("related", None),
    ("rendering", None),
    ("service", Some(ResourceType::Service)),
    ("rights", None),
    ("seeAlso", Some(ResourceType::Dataset)),
    ("within", None),
];

/// Every property the upgrader knows how to place in a Presentation 3 node
pub const RECOGNIZED_PROPERTIES: &[&str] = &[
    "@context",
    "label",
    "metadata",
    "summary",
    "thumbnail",
    "navDate",
    "requiredStatement",
    "rights",
    "logo",
    "value",
    "id",
    "type",
    "format",
    "language",
    "profile",
    "timeMode",
    "height",
    "width",
    "duration",
    "viewingDirection",
    "behavior",
    "related",
    "rendering",
    "service",
    "seeAlso",
    "within",
    "start",
    "includes",
    "items",
    "structures",
    "annotations",
    "body",
    "target",
    "motivation",
];

/// Legacy profile URIs and their Presentation 3 short names
pub const PROFILE_MAP: &[(&str, &str)] = &[
    (
        "http://library.stanford.edu/iiif/image-api/1.1/conformance.html#level0",
        "level0",
    ),
    (
        "http://library.stanford.edu/iiif/image-api/1.1/conformance.html#level1",
        "level1",
    ),
    (
        "http://library.stanford.edu/iiif/image-api/1.1/conformance.html#level2",
        "level2",
    ),
    ("http://iiif.io/api/image/1/level0.json", "level0"),
    ("http://iiif.io/api/image/1/level1.json", "level1"),
    ("http://iiif.io/api/image/1/level2.json", "level2"),
    ("http://iiif.io/api/image/2/level0.json", "level0"),
    ("http://iiif.io/api/image/2/level1.json", "level1"),
    ("http://iiif.io/api/image/2/level2.json", "level2"),
    ("http://iiif.io/api/auth/1/kiosk", "kiosk"),
    ("http://iiif.io/api/auth/1/login", "login"),
    ("http://iiif.io/api/auth/1/clickthrough", "clickthrough"),
    ("http://iiif.io/api/auth/1/external", "external"),
];

/// Auth profiles that identify a cookie service
pub const AUTH_COOKIE_PROFILES: &[&str] = &[
    "http://iiif.io/api/auth/1/kiosk",
    "http://iiif.io/api/auth/1/login",
    "http://iiif.io/api/auth/1/clickthrough",
    "http://iiif.io/api/auth/1/external",
];

pub const AUTH_TOKEN_PROFILE: &str = "http://iiif.io/api/auth/1/token";
pub const SEARCH_PROFILE: &str = "http://iiif.io/api/search/1/search";
pub const AUTOCOMPLETE_PROFILE: &str = "http://iiif.io/api/search/1/autocomplete";

/// Content types (full media type or top-level type) and the resource type
/// they imply
pub const CONTENT_TYPE_MAP: &[(&str, ResourceType)] = &[
    ("image", ResourceType::Image),
    ("audio", ResourceType::Sound),
    ("video", ResourceType::Video),
    ("application/pdf", ResourceType::Text),
    ("text/html", ResourceType::Text),
    ("text/plain", ResourceType::Text),
    ("application/xml", ResourceType::Dataset),
    ("text/xml", ResourceType::Dataset),
];

/// Content types that announce a JSON document worth fetching
pub const JSON_CONTENT_TYPES: &[&str] = &["application/json", "application/ld+json"];

/// Look up the short name for a legacy profile URI
pub fn profile_short_name(profile: &str) -> Option<&'static str> {
    PROFILE_MAP
        .iter()
        .find(|(uri, _)| *uri == profile)
        .map(|(_, short)| *short)
}

/// Whether a profile value is already a Presentation 3 short name
pub fn is_profile_short_name(profile: &str) -> bool {
    PROFILE_MAP.iter().any(|(_, short)| *short == profile)
}

/// Check whether a property is one the upgrader recognizes
pub fn is_recognized_property(property: &str) -> bool {
    RECOGNIZED_PROPERTIES.contains(&property)
}

/// The `@context` value of an upgraded document
pub fn presentation_3_context() -> serde_json::Value {
    serde_json::json!([WEB_ANNOTATION_CONTEXT, PRESENTATION_3_CONTEXT])
}

/// Whether a context value already declares Presentation 3
pub fn is_presentation_3_context(context: &serde_json::Value) -> bool {
    match context {
        serde_json::Value::String(s) => s == PRESENTATION_3_CONTEXT,
        serde_json::Value::Array(items) => items
            .iter()
            .any(|c| c.as_str() == Some(PRESENTATION_3_CONTEXT)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_short_name() {
        assert_eq!(
            profile_short_name("http://iiif.io/api/image/2/level2.json"),
            Some("level2")
        );
        assert_eq!(
            profile_short_name("http://iiif.io/api/auth/1/login"),
            Some("login")
        );
        assert_eq!(profile_short_name("http://example.org/profile"), None);
        assert!(is_profile_short_name("level1"));
        assert!(!is_profile_short_name("http://iiif.io/api/image/2/level1.json"));
    }

    #[test]
    fn test_presentation_3_context() {
        let ctx = presentation_3_context();
        assert!(is_presentation_3_context(&ctx));
        assert!(!is_presentation_3_context(&serde_json::json!(
            PRESENTATION_2_CONTEXT
        )));
    }

    #[test]
    fn test_object_properties_are_sets() {
        for (property, _) in OBJECT_PROPERTY_TYPES {
            assert!(SET_PROPERTIES.contains(property));
        }
    }
}
