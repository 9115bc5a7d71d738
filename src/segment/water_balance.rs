// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Water-balance table and list parsing.
//!
//! Entries go to the list named by the most recent section header. Without one, the entry's
//! own label decides, and failing that the configured default list.

use std::sync::OnceLock;

use regex::Regex;

use crate::classify::has_water_balance_keyword;
use crate::model::{BalanceSection, ParsedWaterBalance, WaterBalanceEntry};
use crate::text::table::{is_separator_row, is_table_line, split_cells, Cells};

const SECTION_HEADER_MAX_WORDS: usize = 4;
const TITLE_MAX_CHARS: usize = 80;

const VALUE_HEADERS: &[&str] =
    &["valor", "caudal", "volumen", "cantidad", "value", "flow", "volume", "amount"];

const INPUT_SECTION_WORDS: &[&str] =
    &["entrada", "entradas", "input", "inputs", "fuentes", "suministro", "abastecimiento"];
const CONSUMPTION_SECTION_WORDS: &[&str] =
    &["consumo", "consumos", "usos", "consumption", "consumptions", "demanda", "demandas"];
const OUTPUT_SECTION_WORDS: &[&str] =
    &["salida", "salidas", "output", "outputs", "pérdidas", "perdidas", "losses", "descargas"];

const INPUT_LABEL_WORDS: &[&str] = &[
    "red", "pozo", "pozos", "lluvia", "pluvial", "captación", "captacion", "intake", "supply",
    "municipal", "río", "rio", "acueducto", "suministro", "well", "rain",
];
const OUTPUT_LABEL_WORDS: &[&str] = &[
    "vertido", "efluente", "descarga", "evaporación", "evaporacion", "pérdida", "perdida",
    "purga", "rechazo", "discharge", "effluent", "loss", "losses", "evaporation", "blowdown",
];
const CONSUMPTION_LABEL_WORDS: &[&str] = &[
    "riego", "proceso", "consumo", "limpieza", "sanitario", "sanitarios", "irrigation",
    "process", "cleaning", "cocina", "lavado",
];

fn value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([~≈]?\s*-?\d[\d.,]*(?:\s\d{3})*)\s*(.*)$").expect("valid regex")
    })
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\s*(-?\d[\d.,]*)\s*%\s*\)").expect("valid regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+(.+?)\s*:\s*(.*)$").expect("valid regex")
    })
}

fn header_unit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("valid regex"))
}

/// Column positions detected from a table header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Columns {
    label: usize,
    value: Option<usize>,
    unit: Option<usize>,
    percent: Option<usize>,
    /// Unit carried by the value header, as in `Caudal (m³/d)`.
    header_unit: Option<String>,
}

impl Columns {
    fn detect(cells: &Cells<'_>) -> Self {
        let mut columns = Self::default();
        let mut label = None;
        for (idx, cell) in cells.iter().enumerate() {
            let name = clean_label(cell).to_lowercase();
            if name.contains('%') || name.contains("porcentaje") || name.contains("percent") {
                columns.percent.get_or_insert(idx);
            } else if name.starts_with("unidad") || name.starts_with("unit") {
                columns.unit.get_or_insert(idx);
            } else if VALUE_HEADERS.iter().any(|key| name.contains(key)) {
                if columns.value.is_none() {
                    columns.value = Some(idx);
                    columns.header_unit =
                        header_unit_re().captures(cell).map(|caps| caps[1].trim().to_owned());
                }
            } else if label.is_none() {
                label = Some(idx);
            }
        }
        columns.label = label.unwrap_or(0);
        columns
    }

    /// Positional fallback when the table has no recognisable header.
    fn positional() -> Self {
        Self { label: 0, value: Some(1), unit: Some(2), percent: None, header_unit: None }
    }
}

/// Parses a water-balance segment into its three entry lists.
pub fn parse_water_balance(text: &str, default_section: BalanceSection) -> ParsedWaterBalance {
    let mut parser = Parser::new(default_section);
    for line in text.lines() {
        parser.line(line);
    }
    parser.balance
}

struct Parser {
    balance: ParsedWaterBalance,
    default_section: BalanceSection,
    current: Option<BalanceSection>,
    last_entry: Option<BalanceSection>,
    columns: Option<Columns>,
}

impl Parser {
    fn new(default_section: BalanceSection) -> Self {
        Self {
            balance: ParsedWaterBalance::default(),
            default_section,
            current: None,
            last_entry: None,
            columns: None,
        }
    }

    fn line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        if is_table_line(trimmed) {
            self.table_row(trimmed);
            return;
        }
        // A table ended; the next one brings its own header.
        self.columns = None;

        if let Some(caps) = bullet_re().captures(trimmed) {
            let (label, rest) = (clean_label(&caps[1]), caps[2].trim());
            if rest.is_empty() {
                self.section_or_title(label);
            } else if let Some((value, unit, percent)) = split_quantity(rest) {
                self.record(label, value, unit, percent);
            }
            return;
        }
        self.section_or_title(trimmed);
    }

    fn section_or_title(&mut self, text: &str) {
        let text = clean_label(text);
        if let Some(section) = section_header(text) {
            self.current = Some(section);
        } else if self.balance.title.is_none()
            && (text.chars().count() <= TITLE_MAX_CHARS || has_water_balance_keyword(text))
        {
            self.balance.title = Some(text.to_owned());
        }
    }

    fn table_row(&mut self, row: &str) {
        if is_separator_row(row) {
            return;
        }
        let cells = split_cells(row);
        let has_number = cells.iter().any(|cell| split_quantity(cell).is_some());

        if self.columns.is_none() && !has_number {
            if let Some(section) = single_section_cell(&cells) {
                self.current = Some(section);
                return;
            }
            self.columns = Some(Columns::detect(&cells));
            return;
        }
        if !has_number {
            if let Some(section) = single_section_cell(&cells) {
                self.current = Some(section);
            }
            return;
        }

        let columns = self.columns.get_or_insert_with(Columns::positional).clone();
        let label = cells.get(columns.label).map(|cell| clean_label(cell)).unwrap_or_default();
        let value_cell = columns
            .value
            .and_then(|idx| cells.get(idx).copied())
            .filter(|cell| split_quantity(cell).is_some())
            .or_else(|| {
                cells
                    .iter()
                    .enumerate()
                    .find(|(idx, cell)| *idx != columns.label && split_quantity(cell).is_some())
                    .map(|(_, cell)| *cell)
            });
        let Some((value, inline_unit, inline_percent)) = value_cell.and_then(split_quantity) else {
            return;
        };

        let unit = columns
            .unit
            .and_then(|idx| cells.get(idx))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_owned)
            .or(inline_unit)
            .or_else(|| columns.header_unit.clone());
        let percent = columns
            .percent
            .and_then(|idx| cells.get(idx))
            .map(|cell| cell.trim().trim_end_matches('%').trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_owned)
            .or(inline_percent);

        self.record(label, value, unit, percent);
    }

    fn record(&mut self, label: &str, value: String, unit: Option<String>, percent: Option<String>) {
        if is_total_label(label) {
            let section = section_keyword(label)
                .or(self.current)
                .or(self.last_entry)
                .unwrap_or(BalanceSection::Inputs);
            if !self.balance.set_total(section, value) {
                tracing::trace!(%section, "ignored repeated water-balance total");
            }
            return;
        }
        if label.is_empty() {
            return;
        }
        let section = self
            .current
            .or_else(|| infer_section_from_label(label))
            .unwrap_or(self.default_section);
        self.last_entry = Some(section);
        let entry = WaterBalanceEntry::new(label, value).with_unit(unit).with_percent(percent);
        self.balance.push(section, entry);
    }
}

/// Strips heading hashes, bold markers, and a trailing colon.
fn clean_label(text: &str) -> &str {
    let text = text.trim().trim_start_matches('#').trim();
    let text = text.strip_prefix("**").unwrap_or(text);
    let text = text.strip_suffix("**").unwrap_or(text).trim();
    let text = text.strip_suffix(':').unwrap_or(text).trim();
    let text = text.strip_suffix("**").unwrap_or(text);
    text.trim()
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

fn section_keyword(text: &str) -> Option<BalanceSection> {
    words(text).find_map(|word| {
        if INPUT_SECTION_WORDS.contains(&word.as_str()) {
            Some(BalanceSection::Inputs)
        } else if CONSUMPTION_SECTION_WORDS.contains(&word.as_str()) {
            Some(BalanceSection::Consumptions)
        } else if OUTPUT_SECTION_WORDS.contains(&word.as_str()) {
            Some(BalanceSection::Outputs)
        } else {
            None
        }
    })
}

/// A short, number-free line naming one of the three lists (`### Entradas`, `**Salidas:**`).
fn section_header(text: &str) -> Option<BalanceSection> {
    if text.chars().any(|c| c.is_ascii_digit())
        || words(text).count() > SECTION_HEADER_MAX_WORDS
        || is_total_label(text)
    {
        return None;
    }
    section_keyword(text)
}

/// A short line naming one of the three lists, as found between the tables of a balance.
pub(crate) fn is_section_label(line: &str) -> bool {
    !is_table_line(line) && section_header(clean_label(line)).is_some()
}

fn single_section_cell(cells: &Cells<'_>) -> Option<BalanceSection> {
    let mut filled = cells.iter().map(|cell| clean_label(cell)).filter(|cell| !cell.is_empty());
    let first = filled.next()?;
    if filled.next().is_some() {
        return None;
    }
    section_header(first)
}

fn is_total_label(label: &str) -> bool {
    words(label).any(|word| word == "total" || word == "totales")
}

fn infer_section_from_label(label: &str) -> Option<BalanceSection> {
    words(label).find_map(|word| {
        if INPUT_LABEL_WORDS.contains(&word.as_str()) {
            Some(BalanceSection::Inputs)
        } else if OUTPUT_LABEL_WORDS.contains(&word.as_str()) {
            Some(BalanceSection::Outputs)
        } else if CONSUMPTION_LABEL_WORDS.contains(&word.as_str()) {
            Some(BalanceSection::Consumptions)
        } else {
            None
        }
    })
}

/// Splits `"100 m³/d (40%)"` into value, unit, and percent.
fn split_quantity(text: &str) -> Option<(String, Option<String>, Option<String>)> {
    let text = clean_label(text);
    let caps = value_re().captures(text)?;
    let value = caps[1].trim().to_owned();
    let rest = caps[2].trim();
    if rest.starts_with('%') {
        return None;
    }
    let percent = percent_re().captures(rest).map(|pct| pct[1].to_owned());
    let unit = percent_re().replace(rest, "").trim().to_owned();
    let unit = (!unit.is_empty()).then_some(unit);
    Some((value, unit, percent))
}
