// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! GFM pipe-table helpers.

use smallvec::SmallVec;

pub(crate) type Cells<'a> = SmallVec<[&'a str; 8]>;

/// Byte offsets of `|` characters not escaped with a backslash.
pub(crate) fn unescaped_pipes(line: &str) -> impl Iterator<Item = usize> + '_ {
    let bytes = line.as_bytes();
    memchr::memchr_iter(b'|', bytes).filter(move |&idx| idx == 0 || bytes[idx - 1] != b'\\')
}

pub(crate) fn count_pipes(text: &str) -> usize {
    memchr::memchr_iter(b'|', text.as_bytes()).count()
}

/// A line that starts a pipe-table row (`| a | b |`).
pub(crate) fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && unescaped_pipes(trimmed).nth(1).is_some()
}

pub(crate) fn split_cells(line: &str) -> Cells<'_> {
    let trimmed = line.trim();
    let mut pipes = unescaped_pipes(trimmed).collect::<SmallVec<[usize; 16]>>();
    let mut start = 0;
    if pipes.first() == Some(&0) {
        start = 1;
        pipes.remove(0);
    }
    let mut end = trimmed.len();
    if let Some(&last) = pipes.last() {
        if last + 1 == trimmed.len() {
            end = last;
            pipes.pop();
        }
    }

    let mut cells = Cells::new();
    let mut cursor = start;
    for pipe in pipes {
        if pipe < cursor || pipe > end {
            continue;
        }
        cells.push(trimmed[cursor..pipe].trim());
        cursor = pipe + 1;
    }
    if cursor <= end {
        cells.push(trimmed[cursor..end].trim());
    }
    cells
}

pub(crate) fn is_separator_cell(cell: &str) -> bool {
    let inner = cell.trim();
    let inner = inner.strip_prefix(':').unwrap_or(inner);
    let inner = inner.strip_suffix(':').unwrap_or(inner);
    !inner.is_empty() && inner.chars().all(|c| c == '-')
}

pub(crate) fn is_separator_row(line: &str) -> bool {
    is_table_line(line) && split_cells(line).iter().all(|cell| is_separator_cell(cell))
}

pub(crate) fn format_row<S: AsRef<str>>(cells: &[S]) -> String {
    let mut out = String::from("|");
    for cell in cells {
        out.push(' ');
        out.push_str(cell.as_ref());
        out.push_str(" |");
    }
    out
}
