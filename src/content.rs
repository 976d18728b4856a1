//! Content Resolution - Four-Shape Union
//!
//! A layer's content arrives in one of four wire shapes and must classify
//! without touching storage or the network. Unclassifiable payloads become
//! placeholders, never errors.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Classified layer content.
///
/// Wire forms (durable contract, do not rename fields):
/// - `Remote`: plain URL string
/// - `Inline`: `data:<media-type>;<encoding>,<payload>` string
/// - `Staged`: object with `tempPath` (plus upload metadata)
/// - `Permanent`: object with `filePath`
/// - `Unrenderable`: any other payload, carried verbatim
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    Remote(String),
    Inline(String),
    Staged {
        temp_path: String,
        original_file_name: Option<String>,
        byte_size: Option<u64>,
        uploaded_at: Option<DateTime<Utc>>,
    },
    Permanent {
        file_path: String,
        content_hash: Option<String>,
    },
    Unrenderable(Value),
}

impl LayerContent {
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote(url.into())
    }

    pub fn inline(data_uri: impl Into<String>) -> Self {
        Self::Inline(data_uri.into())
    }

    pub fn staged(temp_path: impl Into<String>) -> Self {
        Self::Staged {
            temp_path: temp_path.into(),
            original_file_name: None,
            byte_size: None,
            uploaded_at: None,
        }
    }

    pub fn permanent(file_path: impl Into<String>) -> Self {
        Self::Permanent {
            file_path: file_path.into(),
            content_hash: None,
        }
    }

    /// Classify a raw payload. Total: every input maps to a variant.
    pub fn classify(raw: &Value) -> Self {
        match raw {
            Value::String(s) if has_url_scheme(s) => Self::Remote(s.clone()),
            Value::String(s) if is_data_uri(s) => Self::Inline(s.clone()),
            Value::Object(map) => {
                if let Some(temp_path) = map.get("tempPath").and_then(Value::as_str) {
                    Self::Staged {
                        temp_path: temp_path.to_string(),
                        original_file_name: map
                            .get("originalFileName")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        byte_size: map.get("byteSize").and_then(Value::as_u64),
                        uploaded_at: map
                            .get("uploadedAt")
                            .and_then(Value::as_str)
                            .and_then(|s| s.parse().ok()),
                    }
                } else if let Some(file_path) = map.get("filePath").and_then(Value::as_str) {
                    Self::Permanent {
                        file_path: file_path.to_string(),
                        content_hash: map
                            .get("contentHash")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    }
                } else {
                    Self::Unrenderable(raw.clone())
                }
            }
            other => Self::Unrenderable(other.clone()),
        }
    }

    pub fn is_staged(&self) -> bool {
        matches!(self, Self::Staged { .. })
    }

    /// Whether a renderer can produce pixels from this content.
    pub fn is_renderable(&self) -> bool {
        !matches!(self, Self::Unrenderable(_))
    }

    /// Media type of an inline payload, e.g. `image/png`.
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Self::Inline(uri) => {
                let head = uri.strip_prefix("data:")?;
                let meta = head.split(',').next()?;
                meta.split(';').next().filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }

    /// Decode an inline base64 payload to bytes. Non-inline or non-base64
    /// content yields `None`.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Inline(uri) => {
                let head = uri.strip_prefix("data:")?;
                let (meta, payload) = head.split_once(',')?;
                if !meta.split(';').any(|part| part == "base64") {
                    return None;
                }
                base64::engine::general_purpose::STANDARD.decode(payload).ok()
            }
            _ => None,
        }
    }

    /// Wire form of this content.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Remote(url) => Value::String(url.clone()),
            Self::Inline(uri) => Value::String(uri.clone()),
            Self::Staged {
                temp_path,
                original_file_name,
                byte_size,
                uploaded_at,
            } => {
                let mut obj = json!({ "tempPath": temp_path });
                if let Some(name) = original_file_name {
                    obj["originalFileName"] = json!(name);
                }
                if let Some(size) = byte_size {
                    obj["byteSize"] = json!(size);
                }
                if let Some(at) = uploaded_at {
                    obj["uploadedAt"] = json!(at.to_rfc3339());
                }
                obj
            }
            Self::Permanent {
                file_path,
                content_hash,
            } => {
                let mut obj = json!({ "filePath": file_path });
                if let Some(hash) = content_hash {
                    obj["contentHash"] = json!(hash);
                }
                obj
            }
            Self::Unrenderable(raw) => raw.clone(),
        }
    }
}

fn has_url_scheme(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn is_data_uri(s: &str) -> bool {
    // data:<media-type>;<encoding>,<payload>
    match s.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((meta, _)) => meta.contains(';'),
            None => false,
        },
        None => false,
    }
}

impl Serialize for LayerContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LayerContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::classify(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_remote_url() {
        let c = LayerContent::classify(&json!("https://cdn.example.com/stickers/star.png"));
        assert_eq!(
            c,
            LayerContent::Remote("https://cdn.example.com/stickers/star.png".into())
        );
    }

    #[test]
    fn classifies_data_uri_and_decodes() {
        let c = LayerContent::classify(&json!("data:image/png;base64,AAAA"));
        assert_eq!(c.media_type(), Some("image/png"));
        assert_eq!(c.decoded_bytes(), Some(vec![0, 0, 0]));
    }

    #[test]
    fn garbage_is_unrenderable_not_error() {
        let c = LayerContent::classify(&json!("garbage"));
        assert!(!c.is_renderable());
        // Round-trips verbatim.
        assert_eq!(c.to_wire(), json!("garbage"));
    }

    #[test]
    fn bare_data_prefix_is_not_inline() {
        assert!(!LayerContent::classify(&json!("data:nonsense")).is_renderable());
    }

    #[test]
    fn staged_keeps_upload_metadata() {
        let raw = json!({
            "tempPath": "/t/sess-1/layer-1.png",
            "originalFileName": "cat.png",
            "byteSize": 2048
        });
        match LayerContent::classify(&raw) {
            LayerContent::Staged {
                temp_path,
                original_file_name,
                byte_size,
                ..
            } => {
                assert_eq!(temp_path, "/t/sess-1/layer-1.png");
                assert_eq!(original_file_name.as_deref(), Some("cat.png"));
                assert_eq!(byte_size, Some(2048));
            }
            other => panic!("expected staged, got {other:?}"),
        }
    }
}
