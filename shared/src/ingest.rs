use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marker::MarkerRecord;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("marker file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("marker file is empty")]
    Empty,
}

/// Generic marker dump: an optional generation timestamp and the records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markers: Vec<MarkerRecord>,
}

pub fn parse_marker_file(bytes: &[u8]) -> Result<MarkerFile, IngestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::Empty);
    }
    let file: MarkerFile = serde_json::from_slice(bytes)?;
    tracing::debug!(markers = file.markers.len(), "parsed marker file");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerKind;

    #[test]
    fn parses_mixed_records() {
        let json = br#"{
            "generated_at": "2026-03-01T12:00:00Z",
            "markers": [
                {"type": "entity", "frozen": true, "position": {"x": 1, "y": 2, "z": 3}},
                {"type": "chunk", "brick_count": 900, "position": {"x": 0, "y": 0}},
                {"type": "component", "category": "gate", "impact": 4, "active": true, "position": {"x": 5, "y": 5}},
                {"type": "generic", "tooltip": "spawn", "position": {"x": 9, "y": 9}}
            ]
        }"#;
        let file = parse_marker_file(json).unwrap();
        assert!(file.generated_at.is_some());
        let kinds: Vec<&str> = file.markers.iter().map(|m| m.kind.label()).collect();
        assert_eq!(kinds, ["entity", "chunk", "component", "generic"]);
        match &file.markers[2].kind {
            MarkerKind::Component(info) => {
                assert_eq!(info.impact.get(), 4);
                assert!(info.active);
            }
            other => panic!("expected component, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_default() {
        let file = parse_marker_file(b"{}").unwrap();
        assert!(file.markers.is_empty());
        assert!(file.generated_at.is_none());
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(parse_marker_file(b"  \n"), Err(IngestError::Empty)));
        assert!(matches!(parse_marker_file(b"{\"markers\": ["), Err(IngestError::Json(_))));
        assert!(matches!(
            parse_marker_file(br#"{"markers": [{"type": "entity"}]}"#),
            Err(IngestError::Json(_))
        ));
    }
}
