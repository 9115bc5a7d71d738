// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rewrites loosely fenced or unfenced diagram notations into tagged fenced blocks.
//!
//! Tagged fences are copied verbatim whatever they contain. Untagged fences only gain an
//! info string. Output of this pass is a fixpoint: running it twice changes nothing.

use crate::classify::{
    is_bare_mermaid, is_branch_line, is_chemistry_block, is_chemistry_line, is_flow_line,
    is_graph_json, is_mermaid_content, mermaid_header,
};
use crate::config::NormalizeConfig;

use super::fence::{find_close, opening_fence};

const MHCHEM_MARKER: &str = r"\ce{";
/// Bare JSON objects spanning more lines than this are left alone.
const MAX_JSON_LINES: usize = 400;

pub fn normalize(text: &str) -> String {
    normalize_with(text, &NormalizeConfig::default())
}

pub fn normalize_with(text: &str, config: &NormalizeConfig) -> String {
    let lines = text.split('\n').collect::<Vec<_>>();
    let mut out = Normalized::with_capacity(lines.len());
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];

        if let Some(fence) = opening_fence(line) {
            let Some(close) = find_close(&lines, idx, &fence) else {
                // An unclosed fence swallows the rest of the reply.
                out.verbatim(&lines[idx..]);
                break;
            };
            let inner = &lines[idx + 1..close];
            match infer_untagged_language(fence.info(), inner) {
                Some(lang) => {
                    out.tagged_line(fence.with_info(lang), lang);
                    out.verbatim(&lines[idx + 1..=close]);
                }
                None => out.verbatim(&lines[idx..=close]),
            }
            idx = close + 1;
            continue;
        }

        let at_block_start = idx == 0 || lines[idx - 1].trim().is_empty();

        if config.fence_chemistry {
            if let Some(next) = display_math(&lines, idx, &mut out) {
                idx = next;
                continue;
            }
            if let Some(body) = inline_mhchem(line) {
                out.wrap("chem", &[body]);
                idx += 1;
                continue;
            }
            if at_block_start {
                if let Some(end) = reaction_run_end(&lines, idx) {
                    out.wrap("chem", &lines[idx..end]);
                    idx = end;
                    continue;
                }
            }
        }

        if config.fence_bare_mermaid {
            if let Some(end) = bare_mermaid_end(&lines, idx, at_block_start) {
                out.wrap("mermaid", &lines[idx..end]);
                idx = end;
                continue;
            }
        }

        if config.fence_bare_json_graphs && line.trim_start().starts_with('{') {
            if let Some(end) = json_object_end(&lines, idx) {
                if is_graph_json(&lines[idx..=end].join("\n")) {
                    out.wrap("reactflow", &lines[idx..=end]);
                    idx = end + 1;
                    continue;
                }
            }
        }

        out.push(line);
        idx += 1;
    }

    out.finish()
}

struct Normalized {
    lines: Vec<String>,
    rewrites: usize,
}

impl Normalized {
    fn with_capacity(capacity: usize) -> Self {
        Self { lines: Vec::with_capacity(capacity), rewrites: 0 }
    }

    fn push(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }

    fn verbatim(&mut self, lines: &[&str]) {
        self.lines.extend(lines.iter().map(|line| (*line).to_owned()));
    }

    fn tagged_line(&mut self, line: String, lang: &str) {
        tracing::trace!(lang, "tagged untagged fence");
        self.rewrites += 1;
        self.lines.push(line);
    }

    fn wrap<S: AsRef<str>>(&mut self, lang: &str, body: &[S]) {
        tracing::trace!(lang, lines = body.len(), "fenced bare diagram");
        self.rewrites += 1;
        self.lines.push(format!("```{lang}"));
        self.lines.extend(body.iter().map(|line| line.as_ref().to_owned()));
        self.lines.push("```".to_owned());
    }

    fn finish(self) -> String {
        if self.rewrites > 0 {
            tracing::debug!(rewrites = self.rewrites, "normalized diagram notation");
        }
        self.lines.join("\n")
    }
}

fn infer_untagged_language(info: &str, inner: &[&str]) -> Option<&'static str> {
    if !info.is_empty() {
        return None;
    }
    let content = inner.join("\n");
    if content.trim().is_empty() {
        return None;
    }
    if is_graph_json(&content) {
        return Some("reactflow");
    }
    if is_mermaid_content(&content) {
        return Some("mermaid");
    }
    if is_chemistry_block(&content) {
        return Some("chem");
    }
    let mut non_empty = inner.iter().filter(|line| !line.trim().is_empty()).peekable();
    let all_flow = non_empty.peek().is_some()
        && non_empty.all(|line| is_flow_line(line) || is_branch_line(line));
    if all_flow && inner.iter().any(|line| is_flow_line(line)) {
        return Some("flow");
    }
    None
}

/// `$$ ... $$` blocks, single- or multi-line. Returns the index after the block.
fn display_math(lines: &[&str], idx: usize, out: &mut Normalized) -> Option<usize> {
    let trimmed = lines[idx].trim();
    if !trimmed.starts_with("$$") {
        return None;
    }
    if trimmed.len() > 4 && trimmed.ends_with("$$") {
        let body = trimmed[2..trimmed.len() - 2].trim();
        out.wrap(math_language(body), &[body]);
        return Some(idx + 1);
    }
    if trimmed != "$$" {
        return None;
    }
    let close = lines.iter().enumerate().skip(idx + 1).find(|(_, line)| line.trim() == "$$")?.0;
    let body = &lines[idx + 1..close];
    out.wrap(math_language(&body.join("\n")), body);
    Some(close + 1)
}

fn math_language(body: &str) -> &'static str {
    if body.contains(MHCHEM_MARKER) {
        "chem"
    } else {
        "equation"
    }
}

/// A line holding nothing but `$\ce{...}$`.
fn inline_mhchem(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let body = trimmed.strip_prefix('$')?.strip_suffix('$')?;
    (body.starts_with(MHCHEM_MARKER) && body.ends_with('}') && !body.contains('$')).then_some(body)
}

fn is_bare_reaction(line: &str) -> bool {
    !line.contains(MHCHEM_MARKER) && is_chemistry_line(line)
}

/// End (exclusive) of a run of reaction lines closed by a blank line or the end of text.
fn reaction_run_end(lines: &[&str], idx: usize) -> Option<usize> {
    let end = lines[idx..]
        .iter()
        .position(|line| !is_bare_reaction(line))
        .map_or(lines.len(), |offset| idx + offset);
    if end == idx {
        return None;
    }
    let isolated = end == lines.len() || lines[end].trim().is_empty();
    isolated.then_some(end)
}

fn has_direction(line: &str) -> bool {
    line.split_whitespace().nth(1).is_some()
}

/// End (exclusive) of an unfenced Mermaid diagram starting at `idx`.
///
/// Flowcharts with an explicit direction may start mid-paragraph; every other diagram type
/// must open a block.
fn bare_mermaid_end(lines: &[&str], idx: usize, at_block_start: bool) -> Option<usize> {
    let keyword = mermaid_header(lines[idx])?;
    let graph_with_direction =
        (keyword == "flowchart" || keyword == "graph") && has_direction(lines[idx]);
    if !at_block_start && !graph_with_direction {
        return None;
    }
    let end = lines[idx + 1..]
        .iter()
        .position(|line| line.trim().is_empty() || opening_fence(line).is_some())
        .map_or(lines.len(), |offset| idx + 1 + offset);
    if end - idx < 2 {
        return None;
    }
    is_bare_mermaid(&lines[idx..end].join("\n")).then_some(end)
}

/// Index of the line closing a brace-balanced JSON value that opens at `start`.
fn json_object_end(lines: &[&str], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, line) in lines[start..].iter().take(MAX_JSON_LINES).enumerate() {
        for (pos, c) in line.char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' | '[' => depth += 1,
                '}' | ']' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return line[pos + 1..].trim().is_empty().then_some(start + offset);
                    }
                }
                _ => {}
            }
        }
    }
    None
}
