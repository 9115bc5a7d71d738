// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text passes that run before extraction: markdown repair and diagram fencing.

pub mod clean;
pub mod fence;
pub mod normalize;
pub(crate) mod table;

pub use clean::clean;
pub use normalize::{normalize, normalize_with};
