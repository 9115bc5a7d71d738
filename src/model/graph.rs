// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Node-graph payload consumed by the graph-diagram renderer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `"LR"` or `"TD"`; anything else lays out top-down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphPayload {
    pub fn layout_direction(&self) -> GraphDirection {
        match self.direction.as_deref().map(str::trim) {
            Some(dir) if dir.eq_ignore_ascii_case("LR") || dir.eq_ignore_ascii_case("RL") => {
                GraphDirection::LeftRight
            }
            _ => GraphDirection::TopDown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphDirection {
    LeftRight,
    TopDown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphNode {
    pub id: String,
    /// Falls back to `id` when the producer omitted it.
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

impl GraphNode {
    pub fn style(&self) -> NodeStyle {
        NodeStyle::from_type(self.node_type.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Visual style of a node. Unknown node types use [`NodeStyle::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStyle {
    Input,
    Process,
    Treatment,
    Storage,
    Decision,
    Output,
    Default,
}

impl NodeStyle {
    pub fn from_type(node_type: Option<&str>) -> Self {
        let Some(node_type) = node_type else {
            return Self::Default;
        };
        match node_type.trim().to_ascii_lowercase().as_str() {
            "input" | "source" | "intake" => Self::Input,
            "process" => Self::Process,
            "treatment" | "technology" => Self::Treatment,
            "storage" | "tank" => Self::Storage,
            "decision" => Self::Decision,
            "output" | "sink" | "discharge" => Self::Output,
            _ => Self::Default,
        }
    }
}

/// JSON schema of [`GraphPayload`], suitable for prompting or validating upstream producers.
pub fn graph_payload_schema() -> schemars::Schema {
    schemars::schema_for!(GraphPayload)
}
