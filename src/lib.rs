// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Advisor content pipeline.
//!
//! Turns raw LLM advisor replies (markdown mixed with Mermaid, graph JSON, flow arrows,
//! water-balance tables, and chemistry) into typed segments and render nodes:
//! clean → normalize → extract → segment, then dispatch at render time.

pub mod classify;
pub mod config;
pub mod extract;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod segment;
pub mod text;

pub use config::PipelineConfig;
pub use pipeline::{process, process_with, ContentPass, PassSummary};
