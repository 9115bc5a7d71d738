// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use thiserror::Error;

use super::{parse_placeholder, DiagramKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    #[error("not a diagram placeholder: {token:?}")]
    Malformed { token: String },
    #[error("placeholder {index} is out of range ({len} blocks extracted)")]
    OutOfRange { index: usize, len: usize },
    #[error("placeholder {index} refers to an empty block")]
    EmptyPayload { index: usize },
}

/// Looks up the payload a placeholder token refers to.
pub fn try_resolve<'a, S: AsRef<str>>(
    token: &str,
    blocks: &'a [S],
) -> Result<&'a str, PlaceholderError> {
    let found = parse_placeholder(token)
        .ok_or_else(|| PlaceholderError::Malformed { token: token.trim().to_owned() })?;
    let payload = blocks
        .get(found.index)
        .ok_or(PlaceholderError::OutOfRange { index: found.index, len: blocks.len() })?
        .as_ref();
    if payload.trim().is_empty() {
        return Err(PlaceholderError::EmptyPayload { index: found.index });
    }
    Ok(payload)
}

/// Like [`try_resolve`], logging the failure. `None` must be rendered as a visible error.
pub fn resolve<'a, S: AsRef<str>>(token: &str, blocks: &'a [S]) -> Option<&'a str> {
    match try_resolve(token, blocks) {
        Ok(payload) => Some(payload),
        Err(err) => {
            tracing::warn!(error = %err, "unresolvable diagram placeholder");
            None
        }
    }
}

/// Payload arrays of one pipeline pass, one per diagram kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockTables {
    mermaid: Vec<String>,
    reactflow: Vec<String>,
}

impl BlockTables {
    pub fn new(mermaid: Vec<String>, reactflow: Vec<String>) -> Self {
        Self { mermaid, reactflow }
    }

    pub fn blocks(&self, kind: DiagramKind) -> &[String] {
        match kind {
            DiagramKind::Mermaid => &self.mermaid,
            DiagramKind::ReactFlow => &self.reactflow,
        }
    }

    pub fn len(&self) -> usize {
        self.mermaid.len() + self.reactflow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a token of either kind against the matching table.
    pub fn try_resolve(&self, token: &str) -> Result<(DiagramKind, &str), PlaceholderError> {
        let found = parse_placeholder(token)
            .ok_or_else(|| PlaceholderError::Malformed { token: token.trim().to_owned() })?;
        try_resolve(token, self.blocks(found.kind)).map(|payload| (found.kind, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, try_resolve, BlockTables, PlaceholderError};
    use crate::extract::DiagramKind;

    #[test]
    fn resolves_by_index() {
        let blocks = ["graph TD\nA-->B", "pie"];
        assert_eq!(resolve("`:::mermaid-placeholder-1:::`", &blocks), Some("pie"));
    }

    #[test]
    fn reports_why_resolution_failed() {
        let blocks = vec!["a".to_owned(), "  ".to_owned()];
        assert_eq!(
            try_resolve(":::reactflow-placeholder-5:::", &blocks),
            Err(PlaceholderError::OutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            try_resolve(":::reactflow-placeholder-1:::", &blocks),
            Err(PlaceholderError::EmptyPayload { index: 1 })
        );
        assert!(matches!(
            try_resolve("placeholder", &blocks),
            Err(PlaceholderError::Malformed { .. })
        ));
        assert_eq!(resolve(":::reactflow-placeholder-5:::", &blocks), None);
    }

    #[test]
    fn tables_route_tokens_by_kind() {
        let tables =
            BlockTables::new(vec!["graph TD".into()], vec!["{}".into(), "{\"a\":1}".into()]);
        assert_eq!(
            tables.try_resolve(":::reactflow-placeholder-1:::"),
            Ok((DiagramKind::ReactFlow, "{\"a\":1}"))
        );
        assert_eq!(
            tables.try_resolve(":::mermaid-placeholder-0:::"),
            Ok((DiagramKind::Mermaid, "graph TD"))
        );
        assert!(tables.try_resolve(":::mermaid-placeholder-1:::").is_err());
        assert_eq!(tables.len(), 3);
    }
}
