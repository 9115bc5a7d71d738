// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;

/// The kind of a segment produced by the section segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    PlainText,
    WaterBalance,
    FlowDiagram,
    MultiLineFlow,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain-text",
            Self::WaterBalance => "water-balance",
            Self::FlowDiagram => "flow-diagram",
            Self::MultiLineFlow => "multi-line-flow",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous run of source lines with a single semantic kind.
///
/// Segments of one pass partition their input: joining every segment's `content` with `\n`
/// reproduces the segmented text exactly (see [`reassemble`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    kind: SegmentKind,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<String>>,
}

impl Segment {
    pub fn plain_text(content: impl Into<String>) -> Self {
        Self { kind: SegmentKind::PlainText, content: content.into(), lines: None }
    }

    pub fn water_balance(content: impl Into<String>) -> Self {
        Self { kind: SegmentKind::WaterBalance, content: content.into(), lines: None }
    }

    pub fn flow_diagram(content: impl Into<String>) -> Self {
        Self { kind: SegmentKind::FlowDiagram, content: content.into(), lines: None }
    }

    /// Multi-line flows keep their line boundaries next to the joined content because branch
    /// detection works per line.
    pub fn multi_line_flow(lines: Vec<String>) -> Self {
        Self { kind: SegmentKind::MultiLineFlow, content: lines.join("\n"), lines: Some(lines) }
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn lines(&self) -> Option<&[String]> {
        self.lines.as_deref()
    }

    pub fn is_plain_text(&self) -> bool {
        self.kind == SegmentKind::PlainText
    }
}

/// Joins segments back into the text they were cut from.
pub fn reassemble(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(segment.content());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{reassemble, Segment, SegmentKind};

    #[test]
    fn multi_line_flow_joins_lines_and_keeps_them() {
        let segment = Segment::multi_line_flow(vec!["A → B".to_owned(), "└→ C".to_owned()]);
        assert_eq!(segment.kind(), SegmentKind::MultiLineFlow);
        assert_eq!(segment.content(), "A → B\n└→ C");
        assert_eq!(segment.lines().map(<[String]>::len), Some(2));
    }

    #[test]
    fn reassemble_reinserts_line_separators() {
        let segments = vec![
            Segment::plain_text("intro\n"),
            Segment::flow_diagram("[A] → [B]"),
            Segment::plain_text(""),
        ];
        assert_eq!(reassemble(&segments), "intro\n\n[A] → [B]\n");
    }

    #[test]
    fn kind_serializes_as_kebab_case() {
        let json = serde_json::to_string(&Segment::water_balance("x")).expect("json");
        assert!(json.contains("\"water-balance\""), "{json}");
        assert_eq!(SegmentKind::MultiLineFlow.to_string(), "multi-line-flow");
    }
}
