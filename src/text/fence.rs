// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Line-oriented fenced code block detection.
//!
//! Every text pass skips fenced content, so they all share this scanner. Leading indentation
//! is accepted at any depth because LLM output often nests fences inside list items.

/// An opening fence line (```` ```lang ```` or `~~~lang`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence<'a> {
    marker: char,
    len: usize,
    indent: &'a str,
    info: &'a str,
}

impl<'a> Fence<'a> {
    pub fn marker(&self) -> char {
        self.marker
    }

    pub fn indent(&self) -> &'a str {
        self.indent
    }

    pub fn info(&self) -> &'a str {
        self.info
    }

    /// Lowercased first word of the info string.
    pub fn language(&self) -> Option<String> {
        self.info.split_whitespace().next().map(str::to_ascii_lowercase)
    }

    pub fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let run = trimmed.chars().take_while(|&c| c == self.marker).count();
        run >= self.len && run == trimmed.chars().count()
    }

    /// Renders the fence line again with a different info string.
    pub fn with_info(&self, info: &str) -> String {
        let mut out = String::with_capacity(self.indent.len() + self.len + info.len());
        out.push_str(self.indent);
        for _ in 0..self.len {
            out.push(self.marker);
        }
        out.push_str(info);
        out
    }
}

pub fn opening_fence(line: &str) -> Option<Fence<'_>> {
    let rest = line.trim_start();
    let indent = &line[..line.len() - rest.len()];
    let marker = rest.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = rest.chars().take_while(|&c| c == marker).count();
    if len < 3 {
        return None;
    }
    let info = rest[len * marker.len_utf8()..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(Fence { marker, len, indent, info })
}

/// Index of the line closing the fence opened at `open_idx`.
pub fn find_close<S: AsRef<str>>(lines: &[S], open_idx: usize, fence: &Fence<'_>) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(open_idx + 1)
        .find(|(_, line)| fence.closes(line.as_ref()))
        .map(|(idx, _)| idx)
}

/// How a line relates to fenced code, as seen by [`FenceTracker::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceLine {
    Outside,
    Open,
    Inside,
    Close,
}

impl FenceLine {
    pub fn is_fenced(&self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Streaming fence state for passes that walk lines one at a time.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn observe(&mut self, line: &str) -> FenceLine {
        if let Some((marker, len)) = self.open {
            let probe = Fence { marker, len, indent: "", info: "" };
            if probe.closes(line) {
                self.open = None;
                return FenceLine::Close;
            }
            return FenceLine::Inside;
        }
        match opening_fence(line) {
            Some(fence) => {
                self.open = Some((fence.marker, fence.len));
                FenceLine::Open
            }
            None => FenceLine::Outside,
        }
    }
}
