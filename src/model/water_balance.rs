// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the three water-balance lists an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSection {
    Inputs,
    #[default]
    Consumptions,
    Outputs,
}

impl fmt::Display for BalanceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inputs => "inputs",
            Self::Consumptions => "consumptions",
            Self::Outputs => "outputs",
        })
    }
}

/// One row of a water balance. `value` keeps the source formatting (`"1.250,5"` stays as is).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaterBalanceEntry {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<String>,
}

impl WaterBalanceEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into(), unit: None, percent: None }
    }

    pub fn with_unit<T: Into<String>>(mut self, unit: Option<T>) -> Self {
        self.unit = unit.map(Into::into);
        self
    }

    pub fn with_percent<T: Into<String>>(mut self, percent: Option<T>) -> Self {
        self.percent = percent.map(Into::into);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WaterBalanceTotals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl WaterBalanceTotals {
    pub fn get(&self, section: BalanceSection) -> Option<&str> {
        match section {
            BalanceSection::Inputs => self.input.as_deref(),
            BalanceSection::Consumptions => self.consumption.as_deref(),
            BalanceSection::Outputs => self.output.as_deref(),
        }
    }

    fn slot_mut(&mut self, section: BalanceSection) -> &mut Option<String> {
        match section {
            BalanceSection::Inputs => &mut self.input,
            BalanceSection::Consumptions => &mut self.consumption,
            BalanceSection::Outputs => &mut self.output,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedWaterBalance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub inputs: Vec<WaterBalanceEntry>,
    pub consumptions: Vec<WaterBalanceEntry>,
    pub outputs: Vec<WaterBalanceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<WaterBalanceTotals>,
}

impl ParsedWaterBalance {
    pub fn entries(&self, section: BalanceSection) -> &[WaterBalanceEntry] {
        match section {
            BalanceSection::Inputs => &self.inputs,
            BalanceSection::Consumptions => &self.consumptions,
            BalanceSection::Outputs => &self.outputs,
        }
    }

    pub fn push(&mut self, section: BalanceSection, entry: WaterBalanceEntry) {
        match section {
            BalanceSection::Inputs => self.inputs.push(entry),
            BalanceSection::Consumptions => self.consumptions.push(entry),
            BalanceSection::Outputs => self.outputs.push(entry),
        }
    }

    /// Records a total for `section`. The first total seen for a list wins.
    pub fn set_total(&mut self, section: BalanceSection, value: impl Into<String>) -> bool {
        let totals = self.totals.get_or_insert_with(WaterBalanceTotals::default);
        let slot = totals.slot_mut(section);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.into());
        true
    }

    pub fn entry_count(&self) -> usize {
        self.inputs.len() + self.consumptions.len() + self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0 && self.totals.is_none()
    }
}
