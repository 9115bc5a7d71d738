// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

/// One node of an arrow pipeline such as `[1. Intake] → Filtration (UF)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number: Option<String>,
}

impl FlowStep {
    /// Returns `None` for a blank label; steps are never kept with an empty label.
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(Self { label: label.to_owned(), detail: None, number: None })
    }

    pub fn with_detail<T: Into<String>>(mut self, detail: Option<T>) -> Self {
        self.detail = detail.map(Into::into).filter(|detail| !detail.trim().is_empty());
        self
    }

    pub fn with_number<T: Into<String>>(mut self, number: Option<T>) -> Self {
        self.number = number.map(Into::into);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn is_numbered(&self) -> bool {
        self.number.is_some()
    }
}

/// A parsed source line of a flow block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    branch_symbol: Option<String>,
    indent: usize,
    steps: Vec<FlowStep>,
}

impl FlowLine {
    pub fn new(steps: Vec<FlowStep>) -> Self {
        Self { branch_symbol: None, indent: 0, steps }
    }

    pub fn with_branch(mut self, symbol: impl Into<String>, indent: usize) -> Self {
        self.branch_symbol = Some(symbol.into());
        self.indent = indent;
        self
    }

    /// The tree glyph or `L→`-style prefix the line started with, if it was a branch line.
    pub fn branch_symbol(&self) -> Option<&str> {
        self.branch_symbol.as_deref()
    }

    pub fn is_branch(&self) -> bool {
        self.branch_symbol.is_some()
    }

    /// Leading whitespace width (in chars) of a branch line; used for nesting depth.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }
}
