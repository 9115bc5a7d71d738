// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One full pass over an advisor reply: clean, normalize, extract, segment.
//!
//! A pass is recomputed from scratch on every streaming tick. Its [`ContentPass`] owns the
//! extracted payload tables, and rendering borrows them, so the tables stay fixed for as long
//! as any render of that pass is alive.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::extract::{extract_mermaid_blocks, extract_reactflow_blocks, BlockTables, DiagramKind};
use crate::model::Segment;
use crate::render::{render_segments, RenderContext, RenderNode};
use crate::segment::segment_with;
use crate::text::{clean, normalize_with};

/// The result of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPass {
    text: String,
    segments: Vec<Segment>,
    blocks: BlockTables,
    config: PipelineConfig,
}

pub fn process(content: &str) -> ContentPass {
    process_with(content, &PipelineConfig::default())
}

pub fn process_with(content: &str, config: &PipelineConfig) -> ContentPass {
    let cleaned = clean(content);
    let normalized = normalize_with(&cleaned, &config.normalize);
    let (text, reactflow) = extract_reactflow_blocks(&normalized).into_parts();
    let (text, mermaid) = extract_mermaid_blocks(&text).into_parts();
    let segments = segment_with(&text, config);
    tracing::debug!(
        input_len = content.len(),
        reactflow = reactflow.len(),
        mermaid = mermaid.len(),
        segments = segments.len(),
        "content pass complete"
    );
    ContentPass { text, segments, blocks: BlockTables::new(mermaid, reactflow), config: *config }
}

impl ContentPass {
    /// Text after extraction, with placeholder tokens in place of diagram fences.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn blocks(&self) -> &BlockTables {
        &self.blocks
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.blocks, &self.config)
    }

    pub fn render(&self) -> Vec<RenderNode> {
        render_segments(&self.segments, &self.context())
    }

    pub fn summary(&self) -> PassSummary {
        PassSummary {
            segments: self.segments.len(),
            mermaid_blocks: self.blocks.blocks(DiagramKind::Mermaid).len(),
            reactflow_blocks: self.blocks.blocks(DiagramKind::ReactFlow).len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub segments: usize,
    pub mermaid_blocks: usize,
    pub reactflow_blocks: usize,
}

#[cfg(test)]
mod tests {
    use super::{process, process_with, PassSummary};
    use crate::config::PipelineConfig;
    use crate::model::SegmentKind;
    use crate::render::RenderNode;

    const REPLY: &str = "## Propuesta\r\n\r\nEl tren de tratamiento:\r\n\r\n[Pozo] → [Filtro] → [Tanque]\r\n\r\n```mermaid\r\ngraph TD\r\nA-->B\r\n```\r\n\r\n```reactflow\r\n{\"nodes\":[{\"id\":\"a\",\"label\":\"A\"}],\"edges\":[]}\r\n```\r\n";

    #[test]
    fn pass_extracts_blocks_and_segments() {
        let pass = process(REPLY);
        assert_eq!(
            pass.summary(),
            PassSummary { segments: 3, mermaid_blocks: 1, reactflow_blocks: 1 }
        );
        assert!(pass.text().contains(":::mermaid-placeholder-0:::"));
        assert!(pass.text().contains(":::reactflow-placeholder-0:::"));
        assert!(!pass.text().contains('\r'));
        assert_eq!(
            pass.segments().iter().map(|s| s.kind()).collect::<Vec<_>>(),
            vec![SegmentKind::PlainText, SegmentKind::FlowDiagram, SegmentKind::PlainText]
        );
    }

    #[test]
    fn render_resolves_against_its_own_pass() {
        let nodes = process(REPLY).render();
        assert!(nodes.iter().any(|n| matches!(n, RenderNode::FlowPipeline { .. })));
        assert!(nodes
            .iter()
            .any(|n| matches!(n, RenderNode::Mermaid { source } if source == "graph TD\nA-->B")));
        assert!(nodes
            .iter()
            .any(|n| matches!(n, RenderNode::Graph { payload } if payload.nodes.len() == 1)));
        assert!(!nodes.iter().any(RenderNode::is_error));
    }

    #[test]
    fn bare_mermaid_is_fenced_then_extracted() {
        let reply = "Diagrama:\n\nsequenceDiagram\nAlice->>Bob: Hola\n\nFin.";
        let pass = process(reply);
        assert_eq!(pass.summary().mermaid_blocks, 1);

        let mut config = PipelineConfig::default();
        config.normalize.fence_bare_mermaid = false;
        let pass = process_with(reply, &config);
        assert_eq!(pass.summary().mermaid_blocks, 0);
        // The dispatcher still catches it as a bare paragraph.
        assert!(pass.render().iter().any(|n| matches!(n, RenderNode::Mermaid { .. })));
    }

    #[test]
    fn streaming_prefixes_never_panic() {
        let mut end = 0;
        while end <= REPLY.len() {
            if REPLY.is_char_boundary(end) {
                let pass = process(&REPLY[..end]);
                let _ = pass.render();
            }
            end += 1;
        }
    }
}
