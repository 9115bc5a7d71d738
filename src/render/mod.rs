// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rendering of segmented content into typed nodes.
//!
//! Plain-text segments go through the markdown dispatcher, which hands diagram-bearing
//! elements to the matching specialized renderer. Structured segments (water balances, flows)
//! render directly from their parsed form. Failures never escape: they become
//! [`RenderNode::Error`] in place of the diagram, so one bad block leaves its siblings intact.

use std::fmt;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::extract::BlockTables;
use crate::model::{FlowLine, GraphPayload, ParsedWaterBalance, Segment, SegmentKind};
use crate::segment::{parse_flow_lines, parse_water_balance};

mod dispatch;
pub mod graph;
pub mod lifecycle;

pub use dispatch::{dispatch, render_markdown, rule_names, DispatchRule, Element, RULES};
pub use graph::{decode_graph_attribute, parse_graph_div, parse_graph_payload, GraphPayloadError};
pub use lifecycle::{
    render_latest, retry_latest, DiagramEngine, DiagramView, RenderEngineError, RenderPhase,
    RenderTicket,
};

/// Pass-scoped inputs of a render: the extracted payload tables and the config they were
/// produced with. Borrowed, so a pass can never see another pass's tables.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    blocks: &'a BlockTables,
    config: &'a PipelineConfig,
}

impl<'a> RenderContext<'a> {
    pub fn new(blocks: &'a BlockTables, config: &'a PipelineConfig) -> Self {
        Self { blocks, config }
    }

    pub fn blocks(&self) -> &'a BlockTables {
        self.blocks
    }

    pub fn config(&self) -> &'a PipelineConfig {
        self.config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChemNotation {
    /// mhchem (`\ce{}`) or reaction-arrow notation.
    Chem,
    /// General TeX math.
    Equation,
}

/// A diagram that could not be rendered, shown inline where the diagram would have been.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramError {
    /// Block type, e.g. `reactflow` or `mermaid`.
    pub block: String,
    pub message: String,
    /// Raw diagram text for a "view source" fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl DiagramError {
    pub fn new(block: impl Into<String>, message: impl fmt::Display) -> Self {
        Self { block: block.into(), message: message.to_string(), source: None }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} diagram: {}", self.block, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderNode {
    /// Default markdown rendering.
    Html { html: String },
    Mermaid { source: String },
    Graph { payload: GraphPayload },
    FlowPipeline { lines: Vec<FlowLine> },
    WaterBalance { balance: ParsedWaterBalance },
    Chemistry { notation: ChemNotation, source: String },
    Error(DiagramError),
}

impl RenderNode {
    pub fn error(error: DiagramError) -> Self {
        tracing::warn!(block = %error.block, message = %error.message, "diagram rendered as error");
        Self::Error(error)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Renders one segment. Structured segments that fail to parse fall back to markdown.
pub fn render_segment(segment: &Segment, ctx: &RenderContext<'_>) -> Vec<RenderNode> {
    match segment.kind() {
        SegmentKind::PlainText => render_markdown(segment.content(), ctx),
        SegmentKind::WaterBalance => {
            let balance =
                parse_water_balance(segment.content(), ctx.config().water_balance.default_section);
            if balance.is_empty() {
                tracing::debug!("water-balance segment without entries, rendering as markdown");
                return render_markdown(segment.content(), ctx);
            }
            vec![RenderNode::WaterBalance { balance }]
        }
        SegmentKind::FlowDiagram | SegmentKind::MultiLineFlow => {
            let lines = match segment.lines() {
                Some(lines) => parse_flow_lines(lines),
                None => parse_flow_lines(&[segment.content()]),
            };
            if lines.is_empty() {
                return render_markdown(segment.content(), ctx);
            }
            vec![RenderNode::FlowPipeline { lines }]
        }
    }
}

pub fn render_segments(segments: &[Segment], ctx: &RenderContext<'_>) -> Vec<RenderNode> {
    segments.iter().flat_map(|segment| render_segment(segment, ctx)).collect()
}
