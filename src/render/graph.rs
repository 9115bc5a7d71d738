// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram-graph payloads: JSON validation and the base64 `div` attribute form.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::model::GraphPayload;

#[derive(Debug, Error)]
pub enum GraphPayloadError {
    #[error("graph attribute is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("graph attribute is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("graph payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("graph payload must be a JSON object")]
    NotAnObject,
    #[error("graph payload field `{0}` must be an array")]
    NotAnArray(&'static str),
}

fn graph_div_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<div\b[^>]*\bdata-(?:reactflow|diagram-graph)\s*=\s*["']([^"']*)["']"#)
            .expect("valid regex")
    })
}

/// Parses and shape-checks a graph payload. Nodes without a label are labelled by id.
pub fn parse_graph_payload(json: &str) -> Result<GraphPayload, GraphPayloadError> {
    let value = serde_json::from_str::<Value>(json.trim())?;
    let object = value.as_object().ok_or(GraphPayloadError::NotAnObject)?;
    for field in ["nodes", "edges"] {
        if !object.get(field).is_some_and(Value::is_array) {
            return Err(GraphPayloadError::NotAnArray(field));
        }
    }

    let mut payload = serde_json::from_value::<GraphPayload>(value)?;
    for node in &mut payload.nodes {
        if node.label.trim().is_empty() {
            node.label.clone_from(&node.id);
        }
    }
    let dangling = payload
        .edges
        .iter()
        .filter(|edge| {
            !payload.nodes.iter().any(|n| n.id == edge.source)
                || !payload.nodes.iter().any(|n| n.id == edge.target)
        })
        .count();
    if dangling > 0 {
        tracing::debug!(dangling, "graph payload has edges to unknown nodes");
    }
    Ok(payload)
}

/// The still-encoded graph attribute of a raw `<div>`, if it carries one.
pub fn graph_attribute(html: &str) -> Option<&str> {
    graph_div_re().captures(html).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

pub fn decode_graph_attribute(encoded: &str) -> Result<String, GraphPayloadError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Decodes and parses the graph carried by a raw `<div>`; `None` when there is no attribute.
pub fn parse_graph_div(html: &str) -> Option<Result<GraphPayload, GraphPayloadError>> {
    let encoded = graph_attribute(html)?;
    Some(decode_graph_attribute(encoded).and_then(|json| parse_graph_payload(&json)))
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use rstest::rstest;

    use super::{graph_attribute, parse_graph_div, parse_graph_payload, GraphPayloadError};

    const PAYLOAD: &str = r#"{"title":"Planta","direction":"LR",
        "nodes":[{"id":"in","label":"Pozo","type":"input"},{"id":"uf"}],
        "edges":[{"source":"in","target":"uf","label":"30 L/s"}]}"#;

    #[test]
    fn parses_payload_and_fills_missing_labels() {
        let payload = parse_graph_payload(PAYLOAD).expect("payload");
        assert_eq!(payload.title.as_deref(), Some("Planta"));
        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.nodes[1].label, "uf");
        assert_eq!(payload.edges[0].label.as_deref(), Some("30 L/s"));
    }

    #[rstest]
    #[case(r#"{"nodes": {}, "edges": []}"#, "nodes")]
    #[case(r#"{"nodes": []}"#, "edges")]
    fn rejects_non_array_fields(#[case] json: &str, #[case] field: &str) {
        match parse_graph_payload(json) {
            Err(GraphPayloadError::NotAnArray(name)) => assert_eq!(name, field),
            other => panic!("expected NotAnArray, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_objects_and_broken_json() {
        assert!(matches!(parse_graph_payload("[]"), Err(GraphPayloadError::NotAnObject)));
        assert!(matches!(parse_graph_payload("{\"nodes\": ["), Err(GraphPayloadError::Json(_))));
    }

    #[test]
    fn decodes_div_attribute() {
        let encoded = STANDARD.encode(PAYLOAD);
        let html = format!("<div class=\"graph\" data-reactflow=\"{encoded}\"></div>");
        let payload = parse_graph_div(&html).expect("attribute").expect("payload");
        assert_eq!(payload.edges.len(), 1);

        assert_eq!(graph_attribute("<div data-diagram-graph='abc'>"), Some("abc"));
        assert!(parse_graph_div("<div class=\"note\"></div>").is_none());
        assert!(matches!(
            parse_graph_div("<div data-reactflow=\"%%%\"></div>"),
            Some(Err(GraphPayloadError::Base64(_)))
        ));
    }
}
