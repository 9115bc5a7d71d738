// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Box-drawing glyphs that mark tree branches in multi-line flows.
pub const BRANCH_GLYPHS: &[char] = &['└', '├', '┌', '┐', '│', '┬', '┴', '┤'];

const FORWARD: char = '→';
const BACKWARD: char = '←';

fn ascii_arrow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<-{1,2}|-{1,2}>|=>").expect("valid regex"))
}

fn doubled_arrow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"→(?:\s*→)+").expect("valid regex"))
}

/// Rewrites `->`, `-->`, `=>` to `→` and `<-`, `<--` to `←`, then collapses doubled arrows.
pub fn normalize_arrows(line: &str) -> Cow<'_, str> {
    let replaced = ascii_arrow_re().replace_all(line, |caps: &regex::Captures<'_>| {
        if caps[0].starts_with('<') {
            BACKWARD.to_string()
        } else {
            FORWARD.to_string()
        }
    });
    match doubled_arrow_re().replace_all(&replaced, "→") {
        Cow::Borrowed(_) => replaced,
        Cow::Owned(collapsed) => Cow::Owned(collapsed),
    }
}

fn arrow_count(line: &str) -> usize {
    line.chars().filter(|&c| c == FORWARD || c == BACKWARD).count()
}

fn has_bracketed_token(line: &str) -> bool {
    match line.find('[') {
        Some(open) => line[open..].contains(']'),
        None => false,
    }
}

pub fn has_branch_glyph(line: &str) -> bool {
    line.contains(BRANCH_GLYPHS)
}

/// Heuristic single-line flow test.
///
/// An arrow alone is not enough: it must co-occur with a bracketed token, a second arrow, or
/// a tree-branch glyph.
pub fn is_flow_line(line: &str) -> bool {
    let normalized = normalize_arrows(line);
    let arrows = arrow_count(&normalized);
    if arrows == 0 {
        return false;
    }
    arrows > 1 || has_bracketed_token(&normalized) || has_branch_glyph(&normalized)
}

/// A line that starts (after whitespace) with a tree glyph or an `L→`-style branch prefix.
pub fn is_branch_line(line: &str) -> bool {
    let normalized = normalize_arrows(line);
    let trimmed = normalized.trim_start();
    trimmed.starts_with(BRANCH_GLYPHS) || trimmed.starts_with("L→")
}

pub fn is_multi_line_flow_block<S: AsRef<str>>(lines: &[S]) -> bool {
    let flow_lines = lines.iter().filter(|line| is_flow_line(line.as_ref())).count();
    flow_lines >= 2 || lines.iter().any(|line| has_branch_glyph(line.as_ref()))
}
