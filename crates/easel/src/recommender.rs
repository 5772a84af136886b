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
use crate::compatibility::{is_compatible_with_analysis, CompatibilityResult};
use crate::field::{analyze, FieldAnalysis, FieldSelection};
use itertools::Itertools;
use serde::Serialize;
use std::fmt::Write;

/// Chart types suggested for the selection, first suggestion first.
pub fn recommend(selection: &FieldSelection) -> Vec<ChartType> {
    recommend_for_analysis(&analyze(selection))
}

pub fn recommend_for_analysis(analysis: &FieldAnalysis) -> Vec<ChartType> {
    let total = analysis.total_fields;
    if total == 0 {
        return Vec::new();
    }
    let numeric = analysis.numeric_count();
    let dimensions = analysis.dimensions.len();
    let mut recommendations = Vec::new();
    if numeric == 1 && dimensions == 0 {
        recommendations.extend([ChartType::BarChart, ChartType::Table]);
    }
    if numeric >= 1 {
        recommendations.push(ChartType::BarChart);
    }
    if numeric >= 2 {
        recommendations.extend([ChartType::GroupedBar, ChartType::Scatter]);
    }
    if !analysis.percentages.is_empty() && numeric <= 2 {
        recommendations.push(ChartType::PieChart);
    }
    if dimensions >= 2 && numeric >= 1 {
        recommendations.extend([ChartType::StackedBar, ChartType::Heatmap]);
    }
    if total >= 3 && !recommendations.contains(&ChartType::Table) {
        recommendations.push(ChartType::Table);
    }
    if numeric >= 1 && total >= 2 {
        recommendations.extend([ChartType::LineChart, ChartType::AreaChart]);
    }
    recommendations.into_iter().unique().collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedChart {
    pub chart: ChartType,
    pub recommended: bool,
    pub compatibility: CompatibilityResult,
}
impl RankedChart {
    pub fn score(&self) -> u8 {
        self.compatibility.score_or_zero()
    }
}

/// Every compatible chart in the catalog, best score first. Equal scores
/// keep catalog order.
pub fn rank(selection: &FieldSelection) -> Vec<RankedChart> {
    rank_analysis(&analyze(selection))
}

pub fn rank_analysis(analysis: &FieldAnalysis) -> Vec<RankedChart> {
    let recommended = recommend_for_analysis(analysis);
    let mut ranked: Vec<RankedChart> = ChartType::ALL
        .iter()
        .map(|&chart| RankedChart {
            chart,
            recommended: recommended.contains(&chart),
            compatibility: is_compatible_with_analysis(chart, analysis),
        })
        .filter(|ranked| ranked.compatibility.compatible)
        .collect();
    ranked.sort_by(|a, b| b.score().cmp(&a.score()));
    ranked
}

pub fn get_recommendation_summary(analysis: &FieldAnalysis) -> String {
    let ranked = rank_analysis(analysis);
    let mut summary = String::new();
    let _ = writeln!(
        summary,
        "Selection: {} fields ({} dimensions, {} metrics, {} percentages, {} indexes, {} time)",
        analysis.total_fields,
        analysis.dimensions.len(),
        analysis.metrics.len(),
        analysis.percentages.len(),
        analysis.indexes.len(),
        analysis.times.len()
    );
    if let Some(warning) = &analysis.scale_warning {
        let _ = writeln!(summary, "Warning: {warning}");
    }
    let _ = writeln!(summary, "Found {} compatible charts:", ranked.len());
    for entry in ranked.iter().take(5) {
        let marker = if entry.recommended { "*" } else { " " };
        let _ = writeln!(
            summary,
            "  {marker} {}: {}% match",
            entry.chart.label(),
            entry.score()
        );
    }
    if ranked.len() > 5 {
        let _ = writeln!(summary, "  ... and {} more", ranked.len() - 5);
    }
    summary
}
