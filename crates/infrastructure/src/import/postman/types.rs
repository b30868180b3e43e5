//! Postman Collection v2.0 / v2.1 type definitions
//!
//! Only the parts of the export that map onto collections and requests are
//! typed. Headers, bodies and auth blocks are kept as raw JSON values and
//! stored as canonical JSON text. Every field is optional so that format
//! variations between exporter versions are tolerated.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root structure of an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: PostmanInfo,
    #[serde(default)]
    pub item: Vec<PostmanItem>,
}

/// Collection metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "_postman_id", default)]
    pub postman_id: Option<String>,
    #[serde(default)]
    pub description: Option<PostmanText>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub version: Option<PostmanVersion>,
}

/// A node of the item tree: a folder, a request, or neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<PostmanText>,
    #[serde(default)]
    pub item: Option<Vec<Self>>,
    #[serde(default)]
    pub request: Option<PostmanRequest>,
}

impl PostmanItem {
    /// Child items, empty when absent.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        self.item.as_deref().unwrap_or_default()
    }

    /// What the walker should do with this node.
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        if self.request.is_some() {
            ItemKind::Request
        } else if self.children().is_empty() {
            ItemKind::Empty
        } else {
            ItemKind::Folder
        }
    }
}

/// Classification of a [`PostmanItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// No request payload and at least one child.
    Folder,
    /// Carries a request payload. Children, if any, are ignored.
    Request,
    /// Neither payload nor children.
    Empty,
}

/// A request payload. Older exports allow a bare URL string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanRequest {
    Detailed(PostmanRequestDetails),
    UrlOnly(String),
}

impl PostmanRequest {
    /// HTTP method, `GET` when the export leaves it out.
    #[must_use]
    pub fn method(&self) -> String {
        match self {
            Self::Detailed(details) => details
                .method
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or("GET")
                .to_uppercase(),
            Self::UrlOnly(_) => "GET".to_string(),
        }
    }

    /// URL as a plain string or the `raw` field of a structured URL.
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Detailed(details) => details
                .url
                .as_ref()
                .map(|url| url.extract("raw"))
                .unwrap_or_default(),
            Self::UrlOnly(url) => url.clone(),
        }
    }

    /// Full payload, when the request is not a bare URL.
    #[must_use]
    pub const fn details(&self) -> Option<&PostmanRequestDetails> {
        match self {
            Self::Detailed(details) => Some(details),
            Self::UrlOnly(_) => None,
        }
    }
}

/// Structured request payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanRequestDetails {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<PostmanText>,
    #[serde(default)]
    pub header: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub auth: Option<Value>,
    #[serde(default)]
    pub description: Option<PostmanText>,
}

impl PostmanRequestDetails {
    /// Body mode (`raw`, `urlencoded`, `formdata`, `file`, `graphql`).
    #[must_use]
    pub fn body_mode(&self) -> Option<&str> {
        self.body.as_ref()?.get("mode")?.as_str()
    }

    /// Syntax of a raw body, from `options.raw.language`, in display form.
    #[must_use]
    pub fn body_language(&self) -> Option<String> {
        let language = self
            .body
            .as_ref()?
            .get("options")?
            .get("raw")?
            .get("language")?
            .as_str()?;
        Some(display_language(language))
    }
}

fn display_language(language: &str) -> String {
    match language.to_ascii_lowercase().as_str() {
        "json" => "JSON".to_string(),
        "xml" => "XML".to_string(),
        "html" => "HTML".to_string(),
        "javascript" => "JavaScript".to_string(),
        "text" => "Text".to_string(),
        _ => language.to_string(),
    }
}

/// A field that is either a plain string or an object holding the string
/// under a known key (`content` for descriptions, `raw` for URLs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanText {
    PlainText(String),
    Structured(Map<String, Value>),
    Other(Value),
}

impl PostmanText {
    /// Returns the plain string, or the string under `field`, or an empty string.
    #[must_use]
    pub fn extract(&self, field: &str) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::Structured(map) => map
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Self::Other(_) => String::new(),
        }
    }

    /// Extracts a description.
    #[must_use]
    pub fn content(&self) -> String {
        self.extract("content")
    }
}

/// Collection version, structured in v2.1 and a plain string in some exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanVersion {
    Structured {
        #[serde(default)]
        major: i64,
        #[serde(default)]
        minor: i64,
        #[serde(default)]
        patch: i64,
        #[serde(default)]
        identifier: Option<String>,
    },
    Text(String),
    Other(Value),
}

impl PostmanVersion {
    /// Returns `(major, minor, patch, identifier)`.
    ///
    /// A textual version such as `1.2.3-beta` is split on the first `-`;
    /// numeric components that fail to parse become zero.
    #[must_use]
    pub fn parts(&self) -> (i64, i64, i64, String) {
        match self {
            Self::Structured {
                major,
                minor,
                patch,
                identifier,
            } => (*major, *minor, *patch, identifier.clone().unwrap_or_default()),
            Self::Text(text) => {
                let (numbers, identifier) = text.split_once('-').unwrap_or((text.as_str(), ""));
                let mut components = numbers
                    .trim_start_matches('v')
                    .split('.')
                    .map(|part| part.trim().parse::<i64>().unwrap_or(0));
                (
                    components.next().unwrap_or(0),
                    components.next().unwrap_or(0),
                    components.next().unwrap_or(0),
                    identifier.to_string(),
                )
            }
            Self::Other(_) => (0, 0, 0, String::new()),
        }
    }
}
