// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arrow-pipeline parsing for flow segments.

use std::sync::OnceLock;

use regex::Regex;

use crate::classify::{normalize_arrows, BRANCH_GLYPHS};
use crate::model::{FlowLine, FlowStep};

const ARROWS: [char; 2] = ['→', '←'];
const HORIZONTAL_RULE: char = '─';
const LETTER_BRANCH: &str = "L→";

fn paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s*\(([^)]*)\)\s*(.*)$").expect("valid regex"))
}

fn ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)[.)]\s*(.*)$").expect("valid regex"))
}

/// Parses every line of a flow segment; lines without any step are skipped.
pub fn parse_flow_lines<S: AsRef<str>>(lines: &[S]) -> Vec<FlowLine> {
    lines.iter().filter_map(|line| parse_flow_line(line.as_ref())).collect()
}

/// Parses one line, recording a leading tree-branch prefix and its indentation.
pub fn parse_flow_line(line: &str) -> Option<FlowLine> {
    let normalized = normalize_arrows(line);
    let trimmed = normalized.trim_start();
    let indent = normalized[..normalized.len() - trimmed.len()].chars().count();
    let (branch, rest) = split_branch_prefix(trimmed);
    let steps = parse_flow_steps(rest);
    if steps.is_empty() {
        return None;
    }
    let flow_line = FlowLine::new(steps);
    Some(match branch {
        Some(symbol) => flow_line.with_branch(symbol, indent),
        None => flow_line,
    })
}

pub fn parse_flow_steps(line: &str) -> Vec<FlowStep> {
    normalize_arrows(line).split(ARROWS).filter_map(parse_step).collect()
}

fn split_branch_prefix(line: &str) -> (Option<&str>, &str) {
    if let Some(rest) = line.strip_prefix(LETTER_BRANCH) {
        return (Some(LETTER_BRANCH), rest);
    }
    if !line.starts_with(BRANCH_GLYPHS) {
        return (None, line);
    }
    let is_prefix_char =
        |c: char| BRANCH_GLYPHS.contains(&c) || c == HORIZONTAL_RULE || c.is_whitespace();
    let mut end =
        line.char_indices().find(|&(_, c)| !is_prefix_char(c)).map_or(line.len(), |(idx, _)| idx);
    if line[end..].starts_with(ARROWS[0]) {
        end += ARROWS[0].len_utf8();
    }
    (Some(line[..end].trim()), &line[end..])
}

fn strip_list_marker(text: &str) -> &str {
    for marker in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = text.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    text
}

fn strip_bold(text: &str) -> &str {
    text.strip_prefix("**")
        .and_then(|inner| inner.strip_suffix("**"))
        .map_or(text, str::trim)
}

fn strip_enclosing(text: &str) -> &str {
    for (open, close) in [('[', ']'), ('{', '}')] {
        if let Some(inner) = text.strip_prefix(open).and_then(|inner| inner.strip_suffix(close)) {
            return inner.trim();
        }
    }
    text
}

/// `label: detail`, split on the first colon that is not between two digits (`10:30`, `3:1`).
fn split_label_detail(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let colon = text.match_indices(':').map(|(idx, _)| idx).find(|&idx| {
        let digit_before = idx > 0 && bytes[idx - 1].is_ascii_digit();
        let digit_after = bytes.get(idx + 1).is_some_and(u8::is_ascii_digit);
        !(digit_before && digit_after)
    })?;
    let (label, detail) = (text[..colon].trim(), text[colon + 1..].trim());
    (!label.is_empty() && !detail.is_empty()).then_some((label, detail))
}

fn split_parenthetical(text: &str) -> (String, Option<String>) {
    let Some(caps) = paren_re().captures(text) else {
        return (text.to_owned(), None);
    };
    let (prefix, paren, suffix) = (caps[1].trim(), caps[2].trim(), caps[3].trim());
    if !suffix.is_empty() {
        // `Tank (T-1) overflow`: the parenthetical belongs to the label.
        return (text.to_owned(), None);
    }
    if prefix.is_empty() {
        return (paren.to_owned(), None);
    }
    (prefix.to_owned(), Some(paren.to_owned()))
}

fn split_ordinal(label: &str) -> (Option<&str>, &str) {
    let Some(caps) = ordinal_re().captures(label) else {
        return (None, label);
    };
    let (Some(number), Some(rest)) = (caps.get(1), caps.get(2)) else {
        return (None, label);
    };
    if rest.as_str().starts_with(|c: char| c.is_ascii_digit()) {
        // `1.5 m³/h` is a quantity, not an ordinal.
        return (None, label);
    }
    (Some(number.as_str()), rest.as_str().trim())
}

fn parse_step(part: &str) -> Option<FlowStep> {
    let text = strip_bold(strip_list_marker(part.trim()));
    let text = strip_bold(strip_enclosing(text));

    let (label, detail) = match split_label_detail(text) {
        Some((label, detail)) => (label.to_owned(), Some(detail.to_owned())),
        None => split_parenthetical(text),
    };
    let (number, label) = split_ordinal(&label);
    FlowStep::new(strip_bold(label)).map(|step| step.with_detail(detail).with_number(number))
}
