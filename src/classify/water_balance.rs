// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use regex::Regex;

use crate::text::table::{count_pipes, is_table_line};

const MIN_LINES: usize = 3;
const MIN_PIPES: usize = 6;

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)balance\s+h[ií]drico|water\s+balance|balance\s+de\s+agua")
            .expect("valid regex")
    })
}

fn paired_keywords_re() -> &'static [Regex; 4] {
    static RE: OnceLock<[Regex; 4]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"(?i)\bentradas?\b").expect("valid regex"),
            Regex::new(r"(?i)\bsalidas?\b").expect("valid regex"),
            Regex::new(r"(?i)\bcaptaci[oó]n\b").expect("valid regex"),
            Regex::new(r"(?i)\befluentes?\b").expect("valid regex"),
        ]
    })
}

fn unit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)m³|\bm3\b|\bhm3\b|\blitros?\b|\blit(?:er|re)s?\b|\bl/(?:s|h|d|día|dia)\b|\bgpm\b|\bmgd\b|\bgal(?:ones|lons?)?\b",
        )
        .expect("valid regex")
    })
}

fn bullet_with_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*(?:[-*+•]|\d+[.)])\s+.*\d").expect("valid regex"))
}

/// Mentions a water balance by name, or pairs inputs with outputs.
pub fn has_water_balance_keyword(text: &str) -> bool {
    if keyword_re().is_match(text) {
        return true;
    }
    let [entradas, salidas, captacion, efluente] = paired_keywords_re();
    (entradas.is_match(text) && salidas.is_match(text))
        || (captacion.is_match(text) && efluente.is_match(text))
}

pub fn has_volumetric_unit(text: &str) -> bool {
    unit_re().is_match(text)
}

/// True for a span shaped like a water balance: the keyword, a volumetric unit, at least
/// three lines, and tabular or bulleted numeric structure. All four must hold.
pub fn is_water_balance_content(text: &str) -> bool {
    let line_count = text.lines().filter(|line| !line.trim().is_empty()).count();
    if line_count < MIN_LINES || !has_water_balance_keyword(text) || !has_volumetric_unit(text) {
        return false;
    }
    count_pipes(text) >= MIN_PIPES || bullet_with_digit_re().is_match(text)
}

/// A heading or label line introducing a water balance.
pub fn is_water_balance_header(line: &str) -> bool {
    !is_table_line(line) && keyword_re().is_match(line)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{has_volumetric_unit, is_water_balance_content, is_water_balance_header};

    const TABLE: &str = "## Balance hídrico\n\n| Concepto | Valor | Unidad |\n|---|---|---|\n| Red | 100 | m³ |\n| Riego | 40 | m³ |";

    #[rstest]
    #[case(TABLE, true)]
    #[case("Water balance\n- Intake: 120 m3/d\n- Losses: 20 m3/d", true)]
    #[case("Entradas y salidas\n- Pozo: 30 L/s\n- Vertido: 25 L/s", true)]
    #[case("| Producto | Precio |\n|---|---|\n| A | 100 |\n| B | 200 |", false)]
    #[case("El balance hídrico es 100 m³.", false)]
    #[case("Balance hídrico\n| a | b |\n| 1 | 2 |\n| 3 | 4 |", false)]
    fn water_balance_content(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_water_balance_content(text), expected);
    }

    #[test]
    fn units_and_headers() {
        assert!(has_volumetric_unit("15 gpm"));
        assert!(has_volumetric_unit("2.5 litros"));
        assert!(!has_volumetric_unit("3 kg"));
        assert!(is_water_balance_header("### Balance de agua anual"));
        assert!(!is_water_balance_header("| Balance hídrico | 100 |"));
    }
}
