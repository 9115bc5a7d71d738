// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Diagram-type keywords that open a Mermaid document.
pub const MERMAID_KEYWORDS: &[&str] = &[
    "flowchart",
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "mindmap",
    "timeline",
    "sankey",
    "xychart",
    "block",
];

const DIRECTIONS: &[&str] = &["TD", "TB", "LR", "RL", "BT"];

/// The Mermaid keyword `line` starts with, ignoring case and `-v2`/`-beta` suffixes.
pub fn mermaid_keyword(line: &str) -> Option<&'static str> {
    let token = line.trim_start().split(|c: char| c.is_whitespace() || c == ';').next()?;
    let base = token.split('-').next().unwrap_or(token);
    MERMAID_KEYWORDS.iter().copied().find(|keyword| keyword.eq_ignore_ascii_case(base))
}

fn first_statement(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty() && !line.starts_with("%%"))
}

/// True when the first statement is a Mermaid header line (see [`mermaid_header`]).
///
/// Intended for spans already known to be code (fenced blocks); prose uses [`is_bare_mermaid`].
pub fn is_mermaid_content(text: &str) -> bool {
    first_statement(text).and_then(mermaid_header).is_some()
}

fn is_graph_keyword(keyword: &str) -> bool {
    keyword == "flowchart" || keyword == "graph"
}

fn has_edge_operator(line: &str) -> bool {
    line.contains("--") || line.contains("==") || line.contains("-.")
}

/// Words allowed right after a non-flowchart keyword on its header line.
const HEADER_OPTIONS: &[&str] = &["title", "showData"];

/// A Mermaid header line: the keyword followed by nothing, a direction, or a `title`.
///
/// Only `graph` and `flowchart` match case-insensitively. The other keywords are ordinary words
/// ("Block", "Pie", "Timeline") and must be written the way Mermaid spells them.
pub(crate) fn mermaid_header(line: &str) -> Option<&'static str> {
    let trimmed = line.trim();
    let keyword = mermaid_keyword(trimmed)?;
    let token = trimmed.split(|c: char| c.is_whitespace() || c == ';').next()?;
    let base = token.split('-').next().unwrap_or(token);
    if !is_graph_keyword(keyword) && base != keyword {
        return None;
    }
    let rest = trimmed[token.len()..].trim().trim_start_matches(';').trim();
    if rest.is_empty() {
        return Some(keyword);
    }
    let first_word = rest.split(|c: char| c.is_whitespace() || c == ';').next().unwrap_or(rest);
    if is_graph_keyword(keyword) && DIRECTIONS.iter().any(|dir| dir.eq_ignore_ascii_case(first_word))
    {
        return Some(keyword);
    }
    if !is_graph_keyword(keyword) && HEADER_OPTIONS.contains(&first_word) {
        return Some(keyword);
    }
    None
}

/// Fallback test for a paragraph holding Mermaid source without any fencing.
///
/// Stricter than [`is_mermaid_content`]: flowcharts also need an edge line, so a paragraph
/// that merely opens with "graph TD" stays prose.
pub fn is_bare_mermaid(text: &str) -> bool {
    let lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>();
    let Some(first) = lines.first() else {
        return false;
    };
    if let Some(keyword) = mermaid_keyword(first) {
        if lines.len() == 1 {
            // `graph TD; A-->B; B-->C`
            return is_graph_keyword(keyword) && first.contains(';') && has_edge_operator(first);
        }
    }
    let Some(keyword) = mermaid_header(first) else {
        return false;
    };
    if is_graph_keyword(keyword) {
        return lines[1..].iter().any(|line| has_edge_operator(line));
    }
    true
}
