//! Clipboard payloads exchanged with the system clipboard.

use crate::shapes::Element;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current clipboard payload format version.
pub const CLIPBOARD_VERSION: u32 = 1;

/// Marker identifying payloads produced by this editor.
pub const CLIPBOARD_SOURCE: &str = "sketchboard";

/// Clipboard errors.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Clipboard payload contains no elements")]
    Empty,
    #[error("Unsupported clipboard version {0}")]
    UnsupportedVersion(u32),
}

/// Copied elements, in z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub source: String,
    pub version: u32,
    pub elements: Vec<Element>,
}

impl ClipboardPayload {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            source: CLIPBOARD_SOURCE.to_string(),
            version: CLIPBOARD_VERSION,
            elements,
        }
    }

    pub fn to_json(&self) -> Result<String, ClipboardError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ClipboardError> {
        let payload: Self = serde_json::from_str(json)?;
        if payload.version > CLIPBOARD_VERSION {
            return Err(ClipboardError::UnsupportedVersion(payload.version));
        }
        if payload.elements.is_empty() {
            return Err(ClipboardError::Empty);
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ElementKind, ElementStyle};

    #[test]
    fn test_payload_json() {
        let el = Element::new(ElementKind::Circle, 1.0, 2.0, 30.0, 30.0, ElementStyle::default());
        let payload = ClipboardPayload::new(vec![el]);
        let json = payload.to_json().unwrap();
        assert!(json.contains("\"source\":\"sketchboard\""));
        assert_eq!(ClipboardPayload::from_json(&json).unwrap(), payload);
    }

    #[test]
    fn test_rejects_empty_and_future_versions() {
        let empty = ClipboardPayload::new(Vec::new()).to_json().unwrap();
        assert!(matches!(ClipboardPayload::from_json(&empty), Err(ClipboardError::Empty)));

        let future = r#"{"source":"sketchboard","version":99,"elements":[]}"#;
        assert!(matches!(
            ClipboardPayload::from_json(future),
            Err(ClipboardError::UnsupportedVersion(99))
        ));

        assert!(matches!(
            ClipboardPayload::from_json("not json"),
            Err(ClipboardError::Serialization(_))
        ));
    }
}
