// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pipeline tuning knobs, loadable from a JSON file. Every field has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::BalanceSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub fence_bare_mermaid: bool,
    pub fence_bare_json_graphs: bool,
    /// `\ce{}` lines, `$$` display blocks, and bare reaction equations.
    pub fence_chemistry: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self { fence_bare_mermaid: true, fence_bare_json_graphs: true, fence_chemistry: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterBalanceConfig {
    /// List for entries with neither a section header above them nor a telling label.
    pub default_section: BalanceSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Let a single blank line sit inside a flow block when flow content follows it.
    pub blank_line_lookahead: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self { blank_line_lookahead: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub normalize: NormalizeConfig,
    pub water_balance: WaterBalanceConfig,
    pub flow: FlowConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
