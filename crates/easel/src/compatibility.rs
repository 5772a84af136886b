// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::chart_type::ChartType;
use crate::field::{analyze, FieldAnalysis, FieldSelection};
use serde::Serialize;

/// Whether a chart can show the selected fields, and how well (0-100).
/// The score only ranks charts against each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityResult {
    pub compatible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_warning: Option<String>,
}
impl CompatibilityResult {
    fn fits(score: u8) -> Self {
        Self {
            compatible: true,
            reason: None,
            score: Some(score),
            scale_warning: None,
        }
    }
    fn rejects(reason: impl Into<String>) -> Self {
        Self {
            compatible: false,
            reason: Some(reason.into()),
            score: None,
            scale_warning: None,
        }
    }
    fn because(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
    fn warning(mut self, warning: impl Into<String>) -> Self {
        self.scale_warning = Some(warning.into());
        self
    }
    pub fn score_or_zero(&self) -> u8 {
        self.score.unwrap_or(0)
    }
}

mod messages {
    pub const NEEDS_NUMERIC: &str = "Requires at least one numeric field";
    pub const NEEDS_TWO_NUMERIC: &str = "Requires at least two numeric fields";
    pub const PIE_TIME: &str = "Pie charts cannot show time series; use Line/Area instead";
    pub const PIE_MIXED: &str = "Pie charts cannot combine values on different scales";
    pub const PIE_MULTIPLE: &str = "Pie charts work best with a single numeric field";
    pub const STACKED_MIXED: &str = "Stacking values on different scales is misleading";
    pub const DUAL_AXIS_HINT: &str =
        "Values use different scales; consider a dual-axis chart or separate charts";
    pub const COMBO_MIXED: &str = "Combo charts show different scales side by side";
    pub const SCATTER_MIXED: &str = "Each scale gets its own axis, so the correlation stays readable";
}

pub fn is_compatible(chart: ChartType, selection: &FieldSelection) -> CompatibilityResult {
    is_compatible_with_analysis(chart, &analyze(selection))
}

pub fn is_compatible_with_analysis(
    chart: ChartType,
    analysis: &FieldAnalysis,
) -> CompatibilityResult {
    // Nothing selected yet: every chart is shown, unranked.
    if analysis.total_fields == 0 {
        return CompatibilityResult::fits(0);
    }
    let numeric = analysis.numeric_count();
    let mixed = analysis.has_mixed_scales;
    match chart {
        ChartType::PieChart | ChartType::DonutChart => {
            if analysis.has_time() {
                CompatibilityResult::rejects(messages::PIE_TIME)
            } else if numeric == 0 {
                CompatibilityResult::rejects(messages::NEEDS_NUMERIC)
            } else if mixed {
                CompatibilityResult::rejects(messages::PIE_MIXED)
            } else if numeric > 1 {
                CompatibilityResult::fits(50).because(messages::PIE_MULTIPLE)
            } else {
                CompatibilityResult::fits(90)
            }
        }
        ChartType::BarChart | ChartType::HorizontalBar => {
            if numeric == 0 {
                CompatibilityResult::rejects(messages::NEEDS_NUMERIC)
            } else if mixed {
                CompatibilityResult::fits(40).warning(messages::DUAL_AXIS_HINT)
            } else {
                CompatibilityResult::fits(85)
            }
        }
        ChartType::GroupedBar => {
            if numeric < 2 {
                CompatibilityResult::rejects(messages::NEEDS_TWO_NUMERIC)
            } else if mixed {
                CompatibilityResult::fits(50).warning(messages::DUAL_AXIS_HINT)
            } else {
                CompatibilityResult::fits(95)
            }
        }
        ChartType::StackedBar => {
            if numeric == 0 {
                CompatibilityResult::rejects(messages::NEEDS_NUMERIC)
            } else if mixed {
                CompatibilityResult::rejects(messages::STACKED_MIXED)
            } else {
                CompatibilityResult::fits(80)
            }
        }
        ChartType::ComboChart => {
            if numeric < 2 {
                CompatibilityResult::rejects(messages::NEEDS_TWO_NUMERIC)
            } else if mixed {
                CompatibilityResult::fits(85).because(messages::COMBO_MIXED)
            } else {
                CompatibilityResult::fits(90)
            }
        }
        ChartType::LineChart | ChartType::AreaChart => {
            if numeric == 0 {
                CompatibilityResult::rejects(messages::NEEDS_NUMERIC)
            } else if mixed {
                CompatibilityResult::fits(40).warning(messages::DUAL_AXIS_HINT)
            } else if analysis.has_time() {
                CompatibilityResult::fits(95)
            } else {
                CompatibilityResult::fits(70)
            }
        }
        ChartType::Scatter => {
            if numeric < 2 {
                CompatibilityResult::rejects(messages::NEEDS_TWO_NUMERIC)
            } else if mixed && numeric == 2 {
                CompatibilityResult::fits(85).because(messages::SCATTER_MIXED)
            } else {
                CompatibilityResult::fits(90)
            }
        }
        ChartType::Table => {
            let score = if mixed {
                90
            } else if analysis.total_fields >= 3 {
                80
            } else {
                50
            };
            CompatibilityResult::fits(score)
        }
        ChartType::KpiCard
        | ChartType::Heatmap
        | ChartType::Gauge
        | ChartType::DualAxisBar => CompatibilityResult::fits(50),
    }
}
