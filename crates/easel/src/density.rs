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
use crate::config::{ChartLimits, EaselConfig};
use crate::series::{apply_others, Row};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DensityVerdict {
    pub is_high: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_chart: Option<ChartType>,
}

fn others_message(shown: usize, rest: usize) -> String {
    format!("Showing top {shown} items; the remaining {rest} are grouped as \"Others\".")
}

pub fn check_density(row_count: usize, chart: ChartType) -> DensityVerdict {
    check_density_with(row_count, chart, &ChartLimits::density_defaults())
}

pub fn check_density_with(row_count: usize, chart: ChartType, limits: &ChartLimits) -> DensityVerdict {
    let Some(limit) = limits.get(chart) else {
        return DensityVerdict::default();
    };
    let verdict = if row_count > limit.saturating_mul(2) {
        DensityVerdict {
            is_high: true,
            message: Some(format!(
                "Data volume is very high ({row_count} rows) for a {}. Switching to Table view.",
                chart.label()
            )),
            suggested_chart: Some(ChartType::Table),
        }
    } else if row_count > limit {
        DensityVerdict {
            is_high: true,
            message: Some(others_message(limit, row_count - limit)),
            suggested_chart: None,
        }
    } else {
        DensityVerdict::default()
    };
    if verdict.is_high {
        debug!(%chart, row_count, limit, suggested = ?verdict.suggested_chart, "dense series");
    }
    verdict
}

/// Rows ready for a charting library, plus what happened to them.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedSeries {
    pub requested_chart: ChartType,
    pub chart: ChartType,
    pub verdict: DensityVerdict,
    pub rows: Vec<Row>,
}
impl PreparedSeries {
    pub fn switched_to_table(&self) -> bool {
        self.chart != self.requested_chart
    }
    pub fn has_others(&self) -> bool {
        self.rows.last().is_some_and(|row| row.is_other)
    }
}

/// Density check, then either a switch to Table or an Others collapse.
///
/// The collapse uses the chart's render limit, or `others.max_items` for
/// charts without one. Tables are never collapsed. When rows are collapsed
/// the verdict message describes the rows actually kept.
pub fn prepare_series(rows: Vec<Row>, chart: ChartType, config: &EaselConfig) -> PreparedSeries {
    let verdict = check_density_with(rows.len(), chart, &config.density_limits);
    if let Some(suggested) = verdict.suggested_chart {
        return PreparedSeries {
            requested_chart: chart,
            chart: suggested,
            verdict,
            rows,
        };
    }
    let cap = match chart {
        ChartType::Table => None,
        _ => Some(
            config
                .render_limits
                .get(chart)
                .unwrap_or(config.others.max_items),
        ),
    };
    let (rows, verdict) = match cap {
        Some(limit) if rows.len() > limit => {
            let rest = rows.len() - limit;
            debug!(%chart, limit, rest, "collapsing rows at render limit");
            let verdict = DensityVerdict {
                is_high: true,
                message: Some(others_message(limit, rest)),
                suggested_chart: None,
            };
            (apply_others(rows, limit, &config.others.value_key), verdict)
        }
        _ => (rows, verdict),
    };
    PreparedSeries {
        requested_chart: chart,
        chart,
        verdict,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row::new(format!("market-{i}")).with_value("spend", (n - i) as f64))
            .collect()
    }

    #[test]
    fn pie_thresholds() {
        let very_high = check_density(41, ChartType::PieChart);
        assert!(very_high.is_high);
        assert_eq!(very_high.suggested_chart, Some(ChartType::Table));

        let high = check_density(15, ChartType::PieChart);
        assert!(high.is_high);
        assert_eq!(high.suggested_chart, None);
        assert!(high.message.unwrap().contains("remaining 5"));

        assert!(!check_density(5, ChartType::PieChart).is_high);
        assert!(!check_density(10, ChartType::PieChart).is_high);
        assert!(check_density(20, ChartType::PieChart).suggested_chart.is_none());
    }

    #[test]
    fn unlisted_charts_are_never_dense() {
        assert_eq!(
            check_density(10_000, ChartType::Scatter),
            DensityVerdict::default()
        );
        assert!(!check_density(10_000, ChartType::Table).is_high);
    }

    #[test]
    fn prepare_collapses_at_render_limit() {
        let prepared = prepare_series(rows(12), ChartType::PieChart, &EaselConfig::default());
        assert_eq!(prepared.chart, ChartType::PieChart);
        assert!(prepared.verdict.is_high);
        assert_eq!(prepared.rows.len(), 10);
        assert!(prepared.has_others());
        assert_eq!(prepared.rows[9].value("spend"), Some(6.0));
    }

    #[test]
    fn prepare_switches_very_dense_series_to_table() {
        let prepared = prepare_series(rows(50), ChartType::BarChart, &EaselConfig::default());
        assert!(prepared.switched_to_table());
        assert_eq!(prepared.chart, ChartType::Table);
        assert_eq!(prepared.rows.len(), 50);
        assert!(!prepared.has_others());
    }

    #[test]
    fn prepared_message_describes_kept_rows() {
        let prepared = prepare_series(rows(15), ChartType::PieChart, &EaselConfig::default());
        assert_eq!(prepared.rows.len(), 10);
        let kept = prepared.rows.iter().filter(|row| !row.is_other).count();
        assert_eq!(kept, 9);
        let message = prepared.verdict.message.unwrap();
        assert!(message.contains("top 9 items"), "{message}");
        assert!(message.contains("remaining 6"), "{message}");
        // The density check on its own still reports against the density table.
        let raw = check_density(15, ChartType::PieChart).message.unwrap();
        assert!(raw.contains("top 10 items"));
    }

    #[test]
    fn charts_without_render_limit_fall_back_to_max_items() {
        let mut config = EaselConfig::default();
        config.others.max_items = 4;
        let scatter = prepare_series(rows(12), ChartType::Scatter, &config);
        assert_eq!(scatter.rows.len(), 5);
        assert!(scatter.has_others());
        assert!(scatter.verdict.is_high);

        let pie = prepare_series(rows(12), ChartType::PieChart, &config);
        assert_eq!(pie.rows.len(), 10);

        let table = prepare_series(rows(12), ChartType::Table, &config);
        assert_eq!(table.rows.len(), 12);
        assert!(!table.verdict.is_high);
    }

    #[test]
    fn prepare_leaves_sparse_series_alone() {
        let input = rows(4);
        let prepared = prepare_series(input.clone(), ChartType::LineChart, &EaselConfig::default());
        assert_eq!(prepared.rows, input);
        assert!(!prepared.verdict.is_high);
    }
}
