// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Data model shared by the pipeline stages.
//!
//! Segments are produced per pass and never outlive it; flow steps and water balances are
//! rebuilt from segment text whenever a segment is rendered.

pub mod flow;
pub mod graph;
pub mod ids;
pub mod segment;
pub mod source;
pub mod water_balance;

pub use flow::{FlowLine, FlowStep};
pub use graph::{
    graph_payload_schema, GraphDirection, GraphEdge, GraphNode, GraphPayload, NodeStyle,
};
pub use ids::{IdError, IdGenerator, InstanceId, SequentialIds};
pub use segment::{reassemble, Segment, SegmentKind};
pub use source::{group_sources, Source, SourceBucket, SourceGroups};
pub use water_balance::{BalanceSection, ParsedWaterBalance, WaterBalanceEntry, WaterBalanceTotals};
