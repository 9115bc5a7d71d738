// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Stateless content classifiers.
//!
//! The segmenter and the render dispatcher both call into this module so that a span is
//! classified the same way ahead of time and at render time.

mod chemistry;
mod flow;
mod mermaid;
mod water_balance;

pub use chemistry::{is_chemistry_block, is_chemistry_line};
pub use flow::{
    has_branch_glyph, is_branch_line, is_flow_line, is_multi_line_flow_block, normalize_arrows,
    BRANCH_GLYPHS,
};
pub(crate) use mermaid::mermaid_header;
pub use mermaid::{is_bare_mermaid, is_mermaid_content, mermaid_keyword, MERMAID_KEYWORDS};
pub use water_balance::{
    has_volumetric_unit, has_water_balance_keyword, is_water_balance_content,
    is_water_balance_header,
};

use serde_json::Value;

use crate::extract::{parse_placeholder, DiagramKind};

/// Result of the ReactFlow placeholder test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderTest {
    pub is_placeholder: bool,
    pub index: Option<usize>,
}

pub fn reactflow_placeholder(text: &str) -> PlaceholderTest {
    match parse_placeholder(text).filter(|found| found.kind == DiagramKind::ReactFlow) {
        Some(found) => PlaceholderTest { is_placeholder: true, index: Some(found.index) },
        None => PlaceholderTest { is_placeholder: false, index: None },
    }
}

/// A JSON object carrying `nodes` and `edges` arrays.
pub fn is_graph_json(text: &str) -> bool {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return false;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            map.get("nodes").is_some_and(Value::is_array)
                && map.get("edges").is_some_and(Value::is_array)
        }
        _ => false,
    }
}
