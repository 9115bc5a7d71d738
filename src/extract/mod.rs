// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Placeholder-based extraction of diagram payloads.
//!
//! Fenced diagram blocks are swapped for `:::<kind>-placeholder-<N>:::` tokens so the
//! markdown renderer never sees the payloads. The token never looks like a fence, so the two
//! extractors can run in either order.

mod blocks;
mod resolve;

use std::fmt;

use serde::Serialize;

pub use blocks::{
    extract_blocks, extract_mermaid_blocks, extract_reactflow_blocks, ExtractedBlock, Extraction,
};
pub use resolve::{resolve, try_resolve, BlockTables, PlaceholderError};

const TOKEN_DELIMITER: &str = ":::";
const TOKEN_INFIX: &str = "-placeholder-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Mermaid,
    ReactFlow,
}

impl DiagramKind {
    /// Fence language and token prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::ReactFlow => "reactflow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mermaid" => Some(Self::Mermaid),
            "reactflow" => Some(Self::ReactFlow),
            _ => None,
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn placeholder_token(kind: DiagramKind, index: usize) -> String {
    let mut buf = itoa::Buffer::new();
    let digits = buf.format(index);
    let mut token = String::with_capacity(
        2 * TOKEN_DELIMITER.len() + kind.as_str().len() + TOKEN_INFIX.len() + digits.len(),
    );
    token.push_str(TOKEN_DELIMITER);
    token.push_str(kind.as_str());
    token.push_str(TOKEN_INFIX);
    token.push_str(digits);
    token.push_str(TOKEN_DELIMITER);
    token
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderMatch {
    pub kind: DiagramKind,
    pub index: usize,
}

/// Parses a placeholder token, tolerating surrounding whitespace and one layer of inline-code
/// backticks.
pub fn parse_placeholder(text: &str) -> Option<PlaceholderMatch> {
    let trimmed = text.trim();
    let unwrapped = trimmed
        .strip_prefix('`')
        .and_then(|inner| inner.strip_suffix('`'))
        .unwrap_or(trimmed)
        .trim();
    let body = unwrapped.strip_prefix(TOKEN_DELIMITER)?.strip_suffix(TOKEN_DELIMITER)?;
    let (kind, digits) = body.rsplit_once(TOKEN_INFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(PlaceholderMatch { kind: DiagramKind::from_name(kind)?, index: digits.parse().ok()? })
}
