// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// A citation attached to an advisor reply by the surrounding chat UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceBucket {
    /// Knowledge-base documents, case studies, technology sheets.
    Internal,
    /// Web search results.
    External,
}

impl Source {
    pub fn bucket(&self) -> SourceBucket {
        match self.source_type.trim().to_ascii_lowercase().as_str() {
            "web" | "external" | "internet" | "website" | "web_search" => SourceBucket::External,
            _ => SourceBucket::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SourceGroups {
    pub internal: Vec<Source>,
    pub external: Vec<Source>,
}

/// Splits sources into the two display buckets, keeping input order inside each bucket.
pub fn group_sources(sources: &[Source]) -> SourceGroups {
    let mut groups = SourceGroups::default();
    for source in sources {
        match source.bucket() {
            SourceBucket::Internal => groups.internal.push(source.clone()),
            SourceBucket::External => groups.external.push(source.clone()),
        }
    }
    groups
}
