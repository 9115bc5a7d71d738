// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use regex::Regex;

const MHCHEM_MARKER: &str = r"\ce{";

/// Longest operators first so `<=>` is not read as `=`.
const REACTION_ARROWS: &[&str] = &["<=>", "⇌", "⟶", "→", "->", "="];

fn term_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\d*(?:[A-Z][a-z]?[0-9₀-₉]*|\([A-Za-z0-9₀-₉]+\)[0-9₀-₉]*)+(?:\^?[0-9]*[+\-⁺⁻]|[⁰¹²³⁴-⁹]*[⁺⁻])?(?:\((?:s|l|g|aq)\))?$",
        )
        .expect("valid regex")
    })
}

fn looks_like_formula(term: &str) -> bool {
    term_re().is_match(term)
}

/// A bare `CaCO₃` is just a word; digits, subscripts, or charges make it chemistry.
fn carries_chemical_detail(term: &str) -> bool {
    term.chars().any(|c| c.is_ascii_digit() || ('₀'..='₉').contains(&c) || "⁺⁻+-".contains(c))
}

fn split_reaction(line: &str) -> Option<(&str, &str)> {
    REACTION_ARROWS.iter().find_map(|arrow| {
        let idx = line.find(arrow)?;
        Some((&line[..idx], &line[idx + arrow.len()..]))
    })
}

fn side_terms(side: &str) -> Vec<&str> {
    side.split(" + ").map(str::trim).filter(|term| !term.is_empty()).collect()
}

/// A single reaction equation such as `CaCO3 + 2HCl → CaCl2 + H2O + CO2`, or any `\ce{}`
/// expression.
pub fn is_chemistry_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.contains(MHCHEM_MARKER) {
        return true;
    }
    let Some((left, right)) = split_reaction(trimmed) else {
        return false;
    };
    let mut terms = side_terms(left);
    terms.extend(side_terms(right));
    terms.len() >= 2
        && terms.iter().all(|term| looks_like_formula(term))
        && terms.iter().any(|term| carries_chemical_detail(term))
}

pub fn is_chemistry_block(text: &str) -> bool {
    if text.contains(MHCHEM_MARKER) {
        return true;
    }
    let mut lines = text.lines().filter(|line| !line.trim().is_empty()).peekable();
    lines.peek().is_some() && lines.all(is_chemistry_line)
}
