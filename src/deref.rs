//! Dereferencing object references to learn their type
//!
//! When a reference carries no `type` and none can be assumed from the
//! property it sits in, the upgrader asks a [`Dereferencer`] what the
//! identifier points at.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::UpgradeError;
use crate::resource::ResourceType;
use crate::vocab::{CONTENT_TYPE_MAP, JSON_CONTENT_TYPES};

/// Trait for looking up the content behind an identifier
pub trait Dereferencer {
    /// Content type reported for the identifier (an HTTP HEAD)
    fn content_type(&self, uri: &str) -> Result<String, UpgradeError>;

    /// The identifier's content parsed as JSON (an HTTP GET)
    fn fetch_json(&self, uri: &str) -> Result<Value, UpgradeError>;
}

/// A dereferencer that never reaches anything (for offline runs)
pub struct NoOpDereferencer;

impl Dereferencer for NoOpDereferencer {
    fn content_type(&self, uri: &str) -> Result<String, UpgradeError> {
        Err(UpgradeError::Dereference {
            uri: uri.to_string(),
            reason: "NoOpDereferencer does not dereference links".to_string(),
        })
    }

    fn fetch_json(&self, uri: &str) -> Result<Value, UpgradeError> {
        self.content_type(uri).map(|_| Value::Null)
    }
}

/// Blocking HTTP dereferencer
pub struct HttpDereferencer {
    client: reqwest::blocking::Client,
}

impl HttpDereferencer {
    pub fn new() -> Result<Self, UpgradeError> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, UpgradeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpgradeError::Dereference {
                uri: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Only absolute http(s) identifiers are worth a round trip
    fn parse_uri(uri: &str) -> Result<Url, UpgradeError> {
        let url = Url::parse(uri)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(UpgradeError::Dereference {
                uri: uri.to_string(),
                reason: format!("Unsupported scheme '{}'", scheme),
            }),
        }
    }
}

impl Dereferencer for HttpDereferencer {
    fn content_type(&self, uri: &str) -> Result<String, UpgradeError> {
        let url = Self::parse_uri(uri)?;
        tracing::debug!(%url, "HEAD");

        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| UpgradeError::Dereference {
                uri: uri.to_string(),
                reason: format!("HTTP request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(UpgradeError::Dereference {
                uri: uri.to_string(),
                reason: format!("HTTP status {}", response.status()),
            });
        }

        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| UpgradeError::Dereference {
                uri: uri.to_string(),
                reason: "No Content-Type header".to_string(),
            })
    }

    fn fetch_json(&self, uri: &str) -> Result<Value, UpgradeError> {
        let url = Self::parse_uri(uri)?;
        tracing::debug!(%url, "GET");

        let content = self
            .client
            .get(url)
            .send()
            .map_err(|e| UpgradeError::Dereference {
                uri: uri.to_string(),
                reason: format!("HTTP request failed: {}", e),
            })?
            .text()
            .map_err(|e| UpgradeError::Dereference {
                uri: uri.to_string(),
                reason: format!("Failed to read response: {}", e),
            })?;

        Ok(serde_json::from_str(&content)?)
    }
}

/// What a content type tells us about the referenced resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// The content type maps straight to a resource type
    Resource(ResourceType),
    /// A JSON document that has to be fetched to learn its type
    Json,
    Unknown,
}

/// Classify a Content-Type header value
///
/// Parameters are ignored and matching is case-insensitive. An exact
/// media type match wins over a top-level match ("image/*").
pub fn classify_content_type(content_type: &str) -> ContentClass {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some((_, t)) = CONTENT_TYPE_MAP.iter().find(|(ct, _)| *ct == media_type) {
        return ContentClass::Resource(*t);
    }

    let top_level = media_type.split('/').next().unwrap_or_default();
    if let Some((_, t)) = CONTENT_TYPE_MAP.iter().find(|(ct, _)| *ct == top_level) {
        return ContentClass::Resource(*t);
    }

    if JSON_CONTENT_TYPES.contains(&media_type.as_str()) {
        return ContentClass::Json;
    }

    ContentClass::Unknown
}
