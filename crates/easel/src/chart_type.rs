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

use crate::error::ChartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed catalog of chart types the dashboard can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    KpiCard,
    PieChart,
    DonutChart,
    BarChart,
    HorizontalBar,
    GroupedBar,
    DualAxisBar,
    StackedBar,
    ComboChart,
    LineChart,
    AreaChart,
    Scatter,
    Heatmap,
    Table,
    Gauge,
}
impl ChartType {
    pub const ALL: [ChartType; 15] = [
        ChartType::KpiCard,
        ChartType::PieChart,
        ChartType::DonutChart,
        ChartType::BarChart,
        ChartType::HorizontalBar,
        ChartType::GroupedBar,
        ChartType::DualAxisBar,
        ChartType::StackedBar,
        ChartType::ComboChart,
        ChartType::LineChart,
        ChartType::AreaChart,
        ChartType::Scatter,
        ChartType::Heatmap,
        ChartType::Table,
        ChartType::Gauge,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::KpiCard => "kpi-card",
            ChartType::PieChart => "pie-chart",
            ChartType::DonutChart => "donut-chart",
            ChartType::BarChart => "bar-chart",
            ChartType::HorizontalBar => "horizontal-bar",
            ChartType::GroupedBar => "grouped-bar",
            ChartType::DualAxisBar => "dual-axis-bar",
            ChartType::StackedBar => "stacked-bar",
            ChartType::ComboChart => "combo-chart",
            ChartType::LineChart => "line-chart",
            ChartType::AreaChart => "area-chart",
            ChartType::Scatter => "scatter",
            ChartType::Heatmap => "heatmap",
            ChartType::Table => "table",
            ChartType::Gauge => "gauge",
        }
    }
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::KpiCard => "KPI Card",
            ChartType::PieChart => "Pie Chart",
            ChartType::DonutChart => "Donut Chart",
            ChartType::BarChart => "Bar Chart",
            ChartType::HorizontalBar => "Horizontal Bar",
            ChartType::GroupedBar => "Grouped Bar",
            ChartType::DualAxisBar => "Dual-Axis Bar",
            ChartType::StackedBar => "Stacked Bar",
            ChartType::ComboChart => "Combo Chart",
            ChartType::LineChart => "Line Chart",
            ChartType::AreaChart => "Area Chart",
            ChartType::Scatter => "Scatter Plot",
            ChartType::Heatmap => "Heatmap",
            ChartType::Table => "Table",
            ChartType::Gauge => "Gauge",
        }
    }
    /// Pie and donut share one set of rules.
    pub fn is_part_of_whole(&self) -> bool {
        matches!(self, ChartType::PieChart | ChartType::DonutChart)
    }
}
impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for ChartType {
    type Err = ChartError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ChartType::ALL
            .iter()
            .copied()
            .find(|chart| chart.as_str() == needle)
            .ok_or_else(|| ChartError::UnknownChartType {
                name: s.to_string(),
            })
    }
}
