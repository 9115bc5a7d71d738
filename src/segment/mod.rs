// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Line-based segmentation into plain text, water balances, and flow diagrams.
//!
//! Two passes: water balances are cut out first, then flow blocks are cut out of whatever
//! stayed plain. Both passes only move whole lines, so the output is always a partition of
//! the input (see [`crate::model::reassemble`]).

mod flow;
mod water_balance;

pub use flow::{parse_flow_line, parse_flow_lines, parse_flow_steps};
pub use water_balance::parse_water_balance;

use crate::classify::{
    is_branch_line, is_flow_line, is_multi_line_flow_block, is_water_balance_content,
    is_water_balance_header,
};
use crate::config::{FlowConfig, PipelineConfig};
use crate::model::{Segment, SegmentKind};
use crate::text::fence::{opening_fence, FenceTracker};
use crate::text::table::is_table_line;

use water_balance::is_section_label;

/// Lines before an inline table that may mention the balance.
const BALANCE_MENTION_WINDOW: usize = 2;
/// Lines pulled back in front of an inline balance table as its header.
const BALANCE_BACKFILL: usize = 3;

pub fn segment(text: &str) -> Vec<Segment> {
    segment_with(text, &PipelineConfig::default())
}

pub fn segment_with(text: &str, config: &PipelineConfig) -> Vec<Segment> {
    let lines = text.split('\n').collect::<Vec<_>>();
    let mut segments = Vec::new();
    for piece in water_balance_pass(&lines) {
        match piece {
            Piece::Plain(lines) => flow_pass(&lines, &config.flow, &mut segments),
            Piece::WaterBalance(lines) => segments.push(Segment::water_balance(lines.join("\n"))),
        }
    }
    if tracing::enabled!(tracing::Level::DEBUG) {
        let count = |kind: SegmentKind| segments.iter().filter(|s| s.kind() == kind).count();
        tracing::debug!(
            plain = count(SegmentKind::PlainText),
            water_balance = count(SegmentKind::WaterBalance),
            flow = count(SegmentKind::FlowDiagram),
            multi_line_flow = count(SegmentKind::MultiLineFlow),
            "segmented content"
        );
    }
    segments
}

enum Piece<'a> {
    Plain(Vec<&'a str>),
    WaterBalance(Vec<&'a str>),
}

fn push_plain<'a>(pieces: &mut Vec<Piece<'a>>, plain: &mut Vec<&'a str>) {
    if !plain.is_empty() {
        pieces.push(Piece::Plain(std::mem::take(plain)));
    }
}

fn is_bullet_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with(['-', '*', '+', '•']) {
        return trimmed.chars().nth(1).is_some_and(char::is_whitespace);
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with(['.', ')'])
}

/// Lines that keep a water-balance buffer open.
fn is_balance_body_line(line: &str) -> bool {
    line.trim().is_empty() || is_table_line(line) || is_bullet_line(line) || is_section_label(line)
}

fn mentions_balance(line: &str) -> bool {
    line.to_lowercase().contains("balance")
}

/// An unannounced table right below a line that talks about a balance.
fn starts_inline_balance(lines: &[&str], idx: usize) -> bool {
    if !is_table_line(lines[idx]) || (idx > 0 && is_table_line(lines[idx - 1])) {
        return false;
    }
    let window = &lines[idx.saturating_sub(BALANCE_MENTION_WINDOW)..idx];
    window.iter().any(|line| mentions_balance(line))
}

fn water_balance_pass<'a>(lines: &[&'a str]) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut plain = Vec::<&str>::new();
    let mut fence = FenceTracker::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        if fence.observe(line).is_fenced() {
            plain.push(line);
            idx += 1;
            continue;
        }

        let mut buffer = Vec::new();
        if is_water_balance_header(line) {
            buffer.push(line);
            idx += 1;
        } else if starts_inline_balance(lines, idx) {
            let backfill = plain
                .iter()
                .rev()
                .take(BALANCE_BACKFILL)
                .take_while(|line| opening_fence(line).is_none())
                .count();
            buffer.extend(plain.drain(plain.len() - backfill..));
        } else {
            plain.push(line);
            idx += 1;
            continue;
        }

        while idx < lines.len() && is_balance_body_line(lines[idx]) {
            buffer.push(lines[idx]);
            idx += 1;
        }
        let content_end =
            buffer.iter().rposition(|line| !line.trim().is_empty()).map_or(0, |last| last + 1);
        let trailing = buffer.split_off(content_end);

        if is_water_balance_content(&buffer.join("\n")) {
            push_plain(&mut pieces, &mut plain);
            pieces.push(Piece::WaterBalance(buffer));
        } else {
            tracing::trace!(lines = buffer.len(), "water-balance candidate rejected");
            plain.extend(buffer);
        }
        plain.extend(trailing);
    }

    push_plain(&mut pieces, &mut plain);
    pieces
}

fn is_flow_candidate(line: &str) -> bool {
    if is_table_line(line) || line.trim_start().starts_with('#') {
        return false;
    }
    is_flow_line(line) || is_branch_line(line)
}

fn flow_pass(lines: &[&str], config: &FlowConfig, out: &mut Vec<Segment>) {
    let mut plain = Vec::<&str>::new();
    let mut block = Vec::<&str>::new();
    let mut fence = FenceTracker::new();

    for (idx, &line) in lines.iter().enumerate() {
        let fenced = fence.observe(line).is_fenced();
        if !fenced && is_flow_candidate(line) {
            block.push(line);
            continue;
        }
        let bridges_blank = config.blank_line_lookahead
            && !fenced
            && !block.is_empty()
            && line.trim().is_empty()
            && block.last().is_some_and(|last| !last.trim().is_empty())
            && lines.get(idx + 1).is_some_and(|next| is_flow_candidate(next));
        if bridges_blank {
            block.push(line);
            continue;
        }
        finish_flow_block(&mut block, &mut plain, out);
        plain.push(line);
    }
    finish_flow_block(&mut block, &mut plain, out);
    if !plain.is_empty() {
        out.push(Segment::plain_text(plain.join("\n")));
    }
}

/// Emits the pending flow block, or folds it back into plain text when it does not hold up.
fn finish_flow_block<'a>(
    block: &mut Vec<&'a str>,
    plain: &mut Vec<&'a str>,
    out: &mut Vec<Segment>,
) {
    if block.is_empty() {
        return;
    }
    let lines = std::mem::take(block);
    let segment = match lines.as_slice() {
        [single] if is_flow_line(single) => Some(Segment::flow_diagram(*single)),
        [_] => None,
        _ if is_multi_line_flow_block(&lines) => {
            Some(Segment::multi_line_flow(lines.iter().map(|line| (*line).to_owned()).collect()))
        }
        _ => None,
    };
    match segment {
        Some(segment) => {
            if !plain.is_empty() {
                out.push(Segment::plain_text(plain.join("\n")));
                plain.clear();
            }
            out.push(segment);
        }
        None => plain.extend(lines),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{segment, segment_with};
    use crate::config::PipelineConfig;
    use crate::model::{reassemble, SegmentKind};

    fn kinds(text: &str) -> Vec<SegmentKind> {
        segment(text).iter().map(|segment| segment.kind()).collect()
    }

    #[test]
    fn water_balance_after_header() {
        let text = "Intro.\n\n## Balance hídrico\n| Concepto | Valor | Unidad |\n|---|---|---|\n| Red | 100 | m³ |\n| Total | 100 | m³ |\n\nCierre.";
        let segments = segment(text);
        assert_eq!(
            segments.iter().map(|s| s.kind()).collect::<Vec<_>>(),
            vec![SegmentKind::PlainText, SegmentKind::WaterBalance, SegmentKind::PlainText]
        );
        assert!(segments[1].content().starts_with("## Balance hídrico"));
        assert!(segments[1].content().ends_with("| Total | 100 | m³ |"));
        assert_eq!(segments[2].content(), "\nCierre.");
        assert_eq!(reassemble(&segments), text);
    }

    #[test]
    fn inline_balance_table_backfills_context() {
        let text = "Resumen del balance de la planta (m³/d):\n| Entradas | Salidas |\n|---|---|\n| 100 | 90 |\n| 10 | 20 |";
        let segments = segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind(), SegmentKind::WaterBalance);
    }

    #[test]
    fn header_without_structure_folds_back() {
        let text = "## Balance hídrico\nNo hay datos suficientes.";
        assert_eq!(kinds(text), vec![SegmentKind::PlainText]);
    }

    #[test]
    fn price_table_is_not_a_balance() {
        let text = "| Producto | Precio |\n|---|---|\n| A | 100 |\n| B | 200 |";
        assert_eq!(kinds(text), vec![SegmentKind::PlainText]);
    }

    #[test]
    fn flow_blocks_single_and_multi_line() {
        let text = "Proceso:\n[Pozo] → [Filtro] → [Tanque]\n\nRamas:\n[Intake] → [UF]\n└→ [Reject] → [Drain]\nFin.";
        let segments = segment(text);
        assert_eq!(
            segments.iter().map(|s| s.kind()).collect::<Vec<_>>(),
            vec![
                SegmentKind::PlainText,
                SegmentKind::FlowDiagram,
                SegmentKind::PlainText,
                SegmentKind::MultiLineFlow,
                SegmentKind::PlainText,
            ]
        );
        assert_eq!(segments[1].content(), "[Pozo] → [Filtro] → [Tanque]");
        assert_eq!(segments[3].lines().map(<[String]>::len), Some(2));
        assert_eq!(reassemble(&segments), text);
    }

    #[test]
    fn single_blank_line_does_not_break_a_flow() {
        let text = "[A] → [B]\n\n[C] → [D]";
        let segments = segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].lines().map(<[String]>::len), Some(3));

        let mut config = PipelineConfig::default();
        config.flow.blank_line_lookahead = false;
        let kinds = segment_with(text, &config).iter().map(|s| s.kind()).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![SegmentKind::FlowDiagram, SegmentKind::PlainText, SegmentKind::FlowDiagram]
        );
    }

    #[test]
    fn fenced_flow_stays_plain() {
        let text = "```\n[A] → [B] → [C]\n```";
        assert_eq!(kinds(text), vec![SegmentKind::PlainText]);
    }

    #[test]
    fn lone_branch_line_without_arrow_stays_plain() {
        assert_eq!(kinds("├── src\ntext"), vec![SegmentKind::PlainText]);
    }

    #[rstest]
    #[case("")]
    #[case("\n\n")]
    #[case("a\n[A] → [B]\n\n\n[C] → [D]\n")]
    #[case("Balance hídrico\n- Red: 10 m³\n- Riego: 5 m³\n\n\n```\n| x |\n```")]
    #[case("```\nunclosed\n## Balance hídrico\n| a | b |")]
    #[case("Balance:\n| a | b |\n|--|--|\n├ [A] → [B]\n\n")]
    fn segmentation_is_a_partition(#[case] text: &str) {
        assert_eq!(reassemble(&segment(text)), text);
    }
}
