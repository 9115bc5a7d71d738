// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Repairs markdown artifacts that LLM replies commonly contain.
//!
//! Every rule is a pure `&str -> String` pass and every rule is a fixpoint on its own
//! output, which makes [`clean`] idempotent. Fenced code is never touched by the line rules.
//! Ambiguous input is passed through unchanged.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use super::fence::{opening_fence, FenceTracker};
use super::table::{
    format_row, is_separator_cell, is_separator_row, is_table_line, split_cells,
};

const INVISIBLE_CHARS: [char; 4] = ['\u{200B}', '\u{FEFF}', '\u{2060}', '\u{00AD}'];

/// Rules, in order:
/// 1. CRLF/CR to LF
/// 2. Strip zero-width characters and soft hyphens
/// 3. Unwrap a ```` ```markdown ```` fence around the whole reply
/// 4. `##Heading` to `## Heading`
/// 5. Drop a dangling `**` left by truncated bold text
/// 6. Collapse runs of 3+ blank lines to 2
/// 7. Repair pipe tables (blank line before, separator row, surplus cells)
pub fn clean(text: &str) -> String {
    let text = normalise_line_endings(text);
    let text = strip_invisible_chars(&text);
    let text = unwrap_outer_markdown_fence(&text);
    let text = map_unfenced_lines(&text, fix_heading_spacing);
    let text = map_unfenced_lines(&text, drop_dangling_bold);
    let text = collapse_blank_lines(&text);
    let cleaned = repair_tables(&text);
    if cleaned.len() != text.len() {
        tracing::trace!(before = text.len(), after = cleaned.len(), "repaired markdown tables");
    }
    cleaned
}

fn normalise_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn strip_invisible_chars(text: &str) -> String {
    text.replace(INVISIBLE_CHARS, "")
}

fn unwrap_outer_markdown_fence(text: &str) -> String {
    let mut current = Cow::Borrowed(text);
    loop {
        let trimmed = current.trim();
        let lines = trimmed.split('\n').collect::<Vec<_>>();
        let Some(fence) = lines.first().and_then(|line| opening_fence(line)) else {
            break;
        };
        let wraps_markdown = matches!(fence.language().as_deref(), Some("markdown" | "md"));
        let closed_at_end = lines.len() >= 2 && lines.last().is_some_and(|l| fence.closes(l));
        if !wraps_markdown || !closed_at_end {
            break;
        }
        let inner = lines[1..lines.len() - 1].join("\n");
        current = Cow::Owned(inner);
    }
    current.into_owned()
}

fn map_unfenced_lines(text: &str, rule: fn(&str) -> Cow<'_, str>) -> String {
    let mut fence = FenceTracker::new();
    let mut out = String::with_capacity(text.len());
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        if fence.observe(line).is_fenced() {
            out.push_str(line);
        } else {
            out.push_str(&rule(line));
        }
    }
    out
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s{0,3}#{2,6})([^#\s])").expect("valid regex"))
}

fn fix_heading_spacing(line: &str) -> Cow<'_, str> {
    heading_re().replace(line, "$1 $2")
}

/// Byte offsets of `**` markers outside inline code spans.
fn bold_markers(line: &str) -> Vec<usize> {
    let bytes = line.as_bytes();
    let mut markers = Vec::new();
    let mut in_code = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'`' => {
                in_code = !in_code;
                idx += 1;
            }
            b'*' if !in_code && bytes.get(idx + 1) == Some(&b'*') => {
                markers.push(idx);
                idx += 2;
            }
            _ => idx += 1,
        }
    }
    markers
}

fn drop_dangling_bold(line: &str) -> Cow<'_, str> {
    if line.trim().chars().all(|c| c == '*' || c.is_whitespace()) {
        // thematic breaks like `***`
        return Cow::Borrowed(line);
    }
    let mut current = Cow::Borrowed(line);
    loop {
        let markers = bold_markers(&current);
        let Some(&last) = markers.last().filter(|_| markers.len() % 2 == 1) else {
            return current;
        };
        let mut fixed = String::with_capacity(current.len());
        fixed.push_str(&current[..last]);
        fixed.push_str(&current[last + 2..]);
        current = Cow::Owned(fixed);
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut fence = FenceTracker::new();
    let mut blank_run = 0usize;
    let mut kept = Vec::new();
    for line in text.split('\n') {
        let fenced = fence.observe(line).is_fenced();
        if !fenced && line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        kept.push(line);
    }
    kept.join("\n")
}

fn starts_block_that_tables_may_follow(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#') || is_table_line(line)
}

fn repair_tables(text: &str) -> String {
    let lines = text.split('\n').collect::<Vec<_>>();
    let mut out = Vec::<String>::with_capacity(lines.len() + 4);
    let mut fence = FenceTracker::new();
    let mut idx = 0;
    while idx < lines.len() {
        let line = lines[idx];
        if fence.observe(line).is_fenced() || !is_table_line(line) {
            out.push(line.to_owned());
            idx += 1;
            continue;
        }

        let start = idx;
        while idx < lines.len() && is_table_line(lines[idx]) {
            idx += 1;
        }
        if out.last().is_some_and(|prev| !starts_block_that_tables_may_follow(prev)) {
            out.push(String::new());
        }
        out.extend(repair_table_run(&lines[start..idx]));
    }
    out.join("\n")
}

fn repair_table_run(rows: &[&str]) -> Vec<String> {
    let passthrough = || rows.iter().map(|row| (*row).to_owned()).collect::<Vec<_>>();
    if rows.len() < 2 {
        return passthrough();
    }
    let header = split_cells(rows[0]);
    if header.iter().all(|cell| is_separator_cell(cell)) {
        return passthrough();
    }
    let width = header.len();

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(rows[0].to_owned());

    let body_start = if is_separator_row(rows[1]) {
        let separator = split_cells(rows[1]);
        if separator.len() == width {
            out.push(rows[1].to_owned());
        } else {
            out.push(build_separator(&separator, width));
        }
        2
    } else {
        out.push(build_separator(&[], width));
        1
    };

    let body = rows[body_start..].iter().filter(|row| !is_separator_row(row)).collect::<Vec<_>>();
    // Every body row wider than the header means the header is short, not that cells
    // contain pipes.
    let consistent_wider = !body.is_empty() && {
        let first = split_cells(body[0]).len();
        first > width && body.iter().all(|row| split_cells(row).len() == first)
    };

    for row in body {
        let cells = split_cells(row);
        if consistent_wider || cells.len() <= width || width == 0 {
            out.push((*row).to_owned());
            continue;
        }
        let mut merged = cells[..width - 1].iter().map(|c| (*c).to_owned()).collect::<Vec<_>>();
        merged.push(cells[width - 1..].join(" \\| "));
        out.push(format_row(&merged));
    }
    out
}

fn build_separator(existing: &[&str], width: usize) -> String {
    let cells = (0..width)
        .map(|idx| match existing.get(idx) {
            Some(cell) if is_separator_cell(cell) => (*cell).to_owned(),
            _ => "---".to_owned(),
        })
        .collect::<Vec<_>>();
    format_row(&cells)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::clean;

    #[test]
    fn inserts_missing_separator_row() {
        let input = "| a | b |\n| 1 | 2 |";
        assert_eq!(clean(input), "| a | b |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn repairs_separator_width() {
        let input = "| a | b | c |\n|---|---|\n| 1 | 2 | 3 |";
        assert_eq!(clean(input), "| a | b | c |\n| --- | --- | --- |\n| 1 | 2 | 3 |");
    }

    #[test]
    fn keeps_alignment_markers_when_repairing_separator() {
        let input = "| a | b |\n|:--|\n| 1 | 2 |";
        assert_eq!(clean(input), "| a | b |\n| :-- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn escapes_surplus_pipes_into_last_cell() {
        let input = "| name | note |\n|---|---|\n| A | x | y |\n| B | z |";
        assert_eq!(clean(input), "| name | note |\n|---|---|\n| A | x \\| y |\n| B | z |");
    }

    #[test]
    fn leaves_tables_with_short_header_alone() {
        let input = "| name | note |\n|---|---|\n| A | x | y |\n| B | z | w |";
        assert_eq!(clean(input), input);
    }

    #[test]
    fn drops_mid_table_separators() {
        let input = "| a |\n|---|\n| 1 |\n|---|\n| 2 |";
        assert_eq!(clean(input), "| a |\n|---|\n| 1 |\n| 2 |");
    }

    #[test]
    fn separates_table_from_preceding_paragraph() {
        let input = "Results below:\n| a | b |\n|---|---|\n| 1 | 2 |";
        assert_eq!(clean(input), "Results below:\n\n| a | b |\n|---|---|\n| 1 | 2 |");
    }

    #[test]
    fn does_not_touch_fenced_content() {
        let input = "```text\n| a | b |\n| 1 | 2 |\n##x\n**open\n```";
        assert_eq!(clean(input), input);
    }

    #[test]
    fn unwraps_markdown_fence_around_reply() {
        let input = "```markdown\n# Title\n\nBody\n```\n";
        assert_eq!(clean(input), "# Title\n\nBody");
    }

    #[test]
    fn fixes_heading_spacing_and_dangling_bold() {
        assert_eq!(clean("##Resumen"), "## Resumen");
        assert_eq!(clean("**Nota: texto"), "Nota: texto");
        assert_eq!(clean("**ok** and `**code`"), "**ok** and `**code`");
        assert_eq!(clean("***"), "***");
    }

    #[test]
    fn normalises_line_endings_and_invisible_chars() {
        assert_eq!(clean("a\r\nb\u{200B}c\rd"), "a\nbc\nd");
    }

    #[test]
    fn collapses_long_blank_runs() {
        assert_eq!(clean("a\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[rstest]
    #[case("")]
    #[case("plain text\n")]
    #[case("| a | b |\n| 1 | 2 | 3 |\n| 4 |\n")]
    #[case("intro\n| h |\n|--|--|--|\n| x | y |\n|---|\n")]
    #[case("```markdown\n```md\n**x\n```\n```")]
    #[case("##A\n\n\n\n**b\n***c**d\n| p | q |\n| r |")]
    #[case("text *** more ** stuff")]
    #[case("```\nunclosed | a | b |\n| c | d |")]
    fn clean_is_idempotent(#[case] input: &str) {
        let once = clean(input);
        assert_eq!(clean(&once), once);
    }
}
