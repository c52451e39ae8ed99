//! Language map normalization
//!
//! Presentation 2 allows a bare string, a `{"@language", "@value"}` pair,
//! or a list mixing both for any human-readable value. Presentation 3 has a
//! single shape: a map from language tag to a list of strings.

use serde_json::{Map, Value};

/// Canonical multi-language value: language tag to ordered strings
pub type LanguageMap = Map<String, Value>;

/// Keys that mark a legacy value object rather than a language tag
const VALUE_OBJECT_KEYS: &[&str] = &["@value", "@language", "@type"];

/// Normalize any legacy value shape into a language map
///
/// Strings without a language go under `default_lang`. Values are always
/// appended, so repeated tags keep every string in encounter order. An
/// input that is already a language map comes back unchanged, whatever
/// its tags look like (`none`, `@none`, `en`, ...). Inputs without any
/// string give an empty map; callers decide what to do with that.
pub fn language_map(value: &Value, default_lang: &str) -> LanguageMap {
    let mut map = LanguageMap::new();

    match value {
        Value::Array(items) => {
            for item in items {
                push_value(&mut map, item, default_lang);
            }
        }
        Value::Object(obj) if is_language_map(obj) => {
            for (lang, strings) in obj {
                match strings {
                    Value::Array(items) => {
                        for s in items.iter().filter_map(Value::as_str) {
                            push_string(&mut map, lang, s);
                        }
                    }
                    Value::String(s) => push_string(&mut map, lang, s),
                    _ => {}
                }
            }
        }
        other => push_value(&mut map, other, default_lang),
    }

    map
}

/// Whether an object is already shaped like a language map
pub fn is_language_map(obj: &Map<String, Value>) -> bool {
    obj.iter().all(|(lang, strings)| {
        !lang.is_empty()
            && !VALUE_OBJECT_KEYS.contains(&lang.as_str())
            && match strings {
                Value::String(_) => true,
                Value::Array(items) => items.iter().all(Value::is_string),
                _ => false,
            }
    })
}

/// Normalize a label/value pair (a metadata entry or `requiredStatement`)
///
/// A side that holds no text is removed from the pair rather than left as
/// an empty map. The names of removed sides are returned.
pub fn language_pair(pair: Value, default_lang: &str) -> (Value, Vec<&'static str>) {
    let mut emptied = Vec::new();
    let pair = match pair {
        Value::Object(mut obj) => {
            for key in ["label", "value"] {
                if let Some(v) = obj.remove(key) {
                    let normalized = language_map(&v, default_lang);
                    if normalized.is_empty() {
                        emptied.push(key);
                    } else {
                        obj.insert(key.to_string(), Value::Object(normalized));
                    }
                }
            }
            Value::Object(obj)
        }
        other => other,
    };
    (pair, emptied)
}

fn push_value(map: &mut LanguageMap, value: &Value, default_lang: &str) {
    match value {
        Value::String(s) => push_string(map, default_lang, s),
        Value::Object(obj) => {
            if let Some(v) = obj.get("@value") {
                let lang = obj
                    .get("@language")
                    .and_then(Value::as_str)
                    .filter(|l| !l.is_empty())
                    .unwrap_or(default_lang);
                match v {
                    Value::String(s) => push_string(map, lang, s),
                    Value::Number(_) | Value::Bool(_) => push_string(map, lang, &v.to_string()),
                    _ => {}
                }
            }
        }
        Value::Number(_) | Value::Bool(_) => push_string(map, default_lang, &value.to_string()),
        Value::Null | Value::Array(_) => {}
    }
}

fn push_string(map: &mut LanguageMap, lang: &str, s: &str) {
    match map.get_mut(lang) {
        Some(Value::Array(strings)) => strings.push(Value::from(s)),
        _ => {
            map.insert(lang.to_string(), Value::Array(vec![Value::from(s)]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_string() {
        let map = language_map(&json!("Book 1"), "none");
        assert_eq!(Value::Object(map), json!({"none": ["Book 1"]}));
    }

    #[test]
    fn test_tagged_pair() {
        let map = language_map(&json!({"@language": "fr", "@value": "Livre 1"}), "none");
        assert_eq!(Value::Object(map), json!({"fr": ["Livre 1"]}));
    }

    #[test]
    fn test_mixed_sequence_appends_in_order() {
        let value = json!([
            "Untagged",
            {"@language": "en", "@value": "First"},
            {"@language": "fr", "@value": "Premier"},
            {"@language": "en", "@value": "Second"},
            "Also untagged"
        ]);
        let map = language_map(&value, "none");
        assert_eq!(
            Value::Object(map),
            json!({
                "none": ["Untagged", "Also untagged"],
                "en": ["First", "Second"],
                "fr": ["Premier"]
            })
        );
    }

    #[test]
    fn test_custom_default_language() {
        let map = language_map(&json!(["a", {"@value": "b"}]), "en");
        assert_eq!(Value::Object(map), json!({"en": ["a", "b"]}));
    }

    #[test]
    fn test_idempotent_on_canonical_shape() {
        for input in [
            json!("plain"),
            json!({"@language": "de", "@value": "Buch"}),
            json!(["x", {"@language": "en", "@value": "y"}, "z"]),
        ] {
            let once = Value::Object(language_map(&input, "none"));
            let twice = Value::Object(language_map(&once, "none"));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_numbers_stringified() {
        let map = language_map(&json!(1887), "none");
        assert_eq!(Value::Object(map), json!({"none": ["1887"]}));
    }

    #[test]
    fn test_null_is_empty() {
        assert!(language_map(&Value::Null, "none").is_empty());
    }

    #[test]
    fn test_language_pair() {
        let (pair, emptied) = language_pair(json!({"label": "Author", "value": "Anne"}), "none");
        assert_eq!(
            pair,
            json!({"label": {"none": ["Author"]}, "value": {"none": ["Anne"]}})
        );
        assert!(emptied.is_empty());
    }

    #[test]
    fn test_language_pair_drops_empty_side() {
        let (pair, emptied) = language_pair(json!({"label": "Date", "value": null}), "none");
        assert_eq!(pair, json!({"label": {"none": ["Date"]}}));
        assert_eq!(emptied, vec!["value"]);
    }

    #[test]
    fn test_at_prefixed_default_language_idempotent() {
        for input in [
            json!("Book 1"),
            json!(["a", {"@language": "en", "@value": "b"}]),
        ] {
            let once = Value::Object(language_map(&input, "@none"));
            let twice = Value::Object(language_map(&once, "@none"));
            assert_eq!(once, twice);
        }
        let once = Value::Object(language_map(&json!("Book 1"), "@none"));
        assert_eq!(once, json!({"@none": ["Book 1"]}));
    }

    #[test]
    fn test_value_object_without_text_is_empty() {
        assert!(language_map(&json!({"@language": "en"}), "none").is_empty());
        assert!(language_map(&json!({"@value": null, "@language": "en"}), "none").is_empty());
        assert!(language_map(&json!([null, []]), "none").is_empty());
    }

    #[test]
    fn test_value_object_not_mistaken_for_map() {
        let map = language_map(&json!({"@value": "Buch", "@language": "de"}), "none");
        assert_eq!(Value::Object(map), json!({"de": ["Buch"]}));
    }
}
