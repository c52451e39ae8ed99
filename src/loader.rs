//! Loading Presentation 2 documents from files or URLs

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::UpgradeError;

/// Source from which to load a Presentation 2 document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Local JSON file
    File(PathBuf),
    /// Remote manifest or collection URL
    Url(String),
}

impl DocumentSource {
    /// Interpret a command-line source string
    pub fn parse(source: &str) -> Self {
        if is_url(source) {
            DocumentSource::Url(source.to_string())
        } else {
            DocumentSource::File(PathBuf::from(source))
        }
    }

    /// Human-readable origin, used in error messages
    pub fn origin(&self) -> String {
        match self {
            DocumentSource::File(p) => p.display().to_string(),
            DocumentSource::Url(u) => u.clone(),
        }
    }
}

/// Check if a source string is a URL
fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load and parse a document from any source
pub fn load_document(source: &DocumentSource) -> Result<Value, UpgradeError> {
    let content = match source {
        DocumentSource::File(path) => read_file(path)?,
        DocumentSource::Url(url) => fetch_url(url)?,
    };
    parse_document(&content, &source.origin())
}

/// Parse document text, reporting where it came from on failure
pub fn parse_document(content: &str, origin: &str) -> Result<Value, UpgradeError> {
    serde_json::from_str(content).map_err(|e| UpgradeError::LoadError {
        path: origin.to_string(),
        reason: format!("Failed to parse JSON: {}", e),
    })
}

fn read_file(path: &PathBuf) -> Result<String, UpgradeError> {
    if !path.is_file() {
        return Err(UpgradeError::InvalidPath(path.clone()));
    }

    fs::read_to_string(path).map_err(|e| UpgradeError::LoadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Simple URL fetch
fn fetch_url(url: &str) -> Result<String, UpgradeError> {
    let response = reqwest::blocking::get(url).map_err(|e| UpgradeError::LoadError {
        path: url.to_string(),
        reason: format!("HTTP request failed: {}", e),
    })?;

    if !response.status().is_success() {
        return Err(UpgradeError::LoadError {
            path: url.to_string(),
            reason: format!("HTTP status {}", response.status()),
        });
    }

    response.text().map_err(|e| UpgradeError::LoadError {
        path: url.to_string(),
        reason: format!("Failed to read response: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            DocumentSource::parse("https://example.org/iiif/manifest.json"),
            DocumentSource::Url("https://example.org/iiif/manifest.json".to_string())
        );
        assert_eq!(
            DocumentSource::parse("./manifest.json"),
            DocumentSource::File(PathBuf::from("./manifest.json"))
        );
    }

    #[test]
    fn test_parse_document() {
        let value = parse_document(r#"{"@id": "m1"}"#, "inline").unwrap();
        assert_eq!(value["@id"], "m1");

        let err = parse_document("{not json", "broken.json").unwrap_err();
        assert!(matches!(err, UpgradeError::LoadError { ref path, .. } if path == "broken.json"));
    }

    #[test]
    fn test_missing_file() {
        let source = DocumentSource::File(PathBuf::from("/nonexistent/manifest.json"));
        assert!(matches!(
            load_document(&source),
            Err(UpgradeError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("iiif-upgrade-loader-test.json");
        fs::write(&path, r#"{"@type": "sc:Manifest"}"#).unwrap();

        let value = load_document(&DocumentSource::File(path.clone())).unwrap();
        assert_eq!(value["@type"], "sc:Manifest");

        fs::remove_file(path).unwrap();
    }
}
