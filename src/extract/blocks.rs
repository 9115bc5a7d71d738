// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

use crate::text::fence::{find_close, opening_fence};

use super::{placeholder_token, DiagramKind};

/// A fenced diagram payload replaced by a placeholder token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedBlock {
    index: usize,
    raw_payload: String,
    placeholder_token: String,
}

impl ExtractedBlock {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw_payload(&self) -> &str {
        &self.raw_payload
    }

    pub fn placeholder_token(&self) -> &str {
        &self.placeholder_token
    }
}

/// Placeholder-bearing text plus the payloads it refers to, in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    text: String,
    blocks: Vec<ExtractedBlock>,
}

impl Extraction {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blocks(&self) -> &[ExtractedBlock] {
        &self.blocks
    }

    pub fn payloads(&self) -> Vec<String> {
        self.blocks.iter().map(|block| block.raw_payload.clone()).collect()
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        let payloads = self.blocks.into_iter().map(|block| block.raw_payload).collect();
        (self.text, payloads)
    }
}

pub fn extract_reactflow_blocks(text: &str) -> Extraction {
    extract_blocks(text, DiagramKind::ReactFlow)
}

pub fn extract_mermaid_blocks(text: &str) -> Extraction {
    extract_blocks(text, DiagramKind::Mermaid)
}

/// Replaces every closed fence tagged `kind` with its placeholder, in document order.
///
/// Each token stands alone in its own paragraph so the markdown renderer hands it over as a
/// single element. The token keeps the fence's indentation, so a fence inside a list item stays
/// inside it. Unclosed fences and fences of other languages are kept verbatim.
pub fn extract_blocks(text: &str, kind: DiagramKind) -> Extraction {
    let lines = text.split('\n').collect::<Vec<_>>();
    let mut out = Vec::<String>::with_capacity(lines.len());
    let mut blocks = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let Some(fence) = opening_fence(lines[idx]) else {
            out.push(lines[idx].to_owned());
            idx += 1;
            continue;
        };
        let Some(close) = find_close(&lines, idx, &fence) else {
            out.extend(lines[idx..].iter().map(|line| (*line).to_owned()));
            break;
        };
        if fence.language().as_deref() != Some(kind.as_str()) {
            out.extend(lines[idx..=close].iter().map(|line| (*line).to_owned()));
            idx = close + 1;
            continue;
        }

        let index = blocks.len();
        let token = placeholder_token(kind, index);
        let opener = lines[idx];
        let indent = &opener[..opener.len() - opener.trim_start().len()];
        if out.last().is_some_and(|prev| !prev.trim().is_empty()) {
            out.push(String::new());
        }
        out.push(format!("{indent}{token}"));
        if lines.get(close + 1).is_some_and(|next| !next.trim().is_empty()) {
            out.push(String::new());
        }
        blocks.push(ExtractedBlock {
            index,
            raw_payload: lines[idx + 1..close].join("\n").trim().to_owned(),
            placeholder_token: token,
        });
        idx = close + 1;
    }

    if !blocks.is_empty() {
        tracing::debug!(kind = kind.as_str(), blocks = blocks.len(), "extracted diagram blocks");
    }
    Extraction { text: out.join("\n"), blocks }
}

#[cfg(test)]
mod tests {
    use super::{extract_mermaid_blocks, extract_reactflow_blocks};

    #[test]
    fn replaces_blocks_in_document_order() {
        let input = "Intro\n```mermaid\ngraph TD\nA-->B\n```\nmiddle\n\n```mermaid\n\n  pie\n\n```";
        let extraction = extract_mermaid_blocks(input);
        assert_eq!(
            extraction.text(),
            "Intro\n\n:::mermaid-placeholder-0:::\n\nmiddle\n\n:::mermaid-placeholder-1:::"
        );
        assert_eq!(extraction.payloads(), vec!["graph TD\nA-->B".to_owned(), "pie".to_owned()]);
        assert_eq!(extraction.blocks()[1].index(), 1);
        assert_eq!(extraction.blocks()[1].placeholder_token(), ":::mermaid-placeholder-1:::");
    }

    #[test]
    fn token_keeps_fence_indentation() {
        let input = "1. Paso uno\n   ```mermaid\n   graph TD\n   A-->B\n   ```\n2. Paso dos";
        let extraction = extract_mermaid_blocks(input);
        assert_eq!(
            extraction.text(),
            "1. Paso uno\n\n   :::mermaid-placeholder-0:::\n\n2. Paso dos"
        );
        assert_eq!(extraction.payloads(), vec!["graph TD\n   A-->B".to_owned()]);
    }

    #[test]
    fn leaves_other_languages_and_unclosed_fences() {
        let input = "```reactflow\n{}\n```\n\n```mermaid\ngraph TD";
        let extraction = extract_mermaid_blocks(input);
        assert_eq!(extraction.text(), input);
        assert!(extraction.blocks().is_empty());
    }

    #[test]
    fn extractors_compose_in_either_order() {
        let input = "```reactflow\n{\"nodes\":[],\"edges\":[]}\n```\n\n```mermaid\ngraph LR\nA-->B\n```";
        let (text, graphs) = extract_reactflow_blocks(input).into_parts();
        let (text, diagrams) = extract_mermaid_blocks(&text).into_parts();

        let (swapped, diagrams_first) = extract_mermaid_blocks(input).into_parts();
        let (swapped, graphs_second) = extract_reactflow_blocks(&swapped).into_parts();

        assert_eq!(text, swapped);
        assert_eq!(graphs, graphs_second);
        assert_eq!(diagrams, diagrams_first);
        assert_eq!(text, ":::reactflow-placeholder-0:::\n\n:::mermaid-placeholder-0:::");
    }
}
