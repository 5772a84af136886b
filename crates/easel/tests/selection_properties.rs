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

use easel::{analyze, classify, is_compatible, rank, recommend, ChartType, FieldKind, FieldSelection};
use proptest::prelude::*;
use std::collections::HashSet;

fn field_id() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("market".to_string()),
        Just("client_name".to_string()),
        Just("total_spend".to_string()),
        Just("cpu".to_string()),
        Just("savings".to_string()),
        Just("savings_pct".to_string()),
        Just("share_percentage".to_string()),
        Just("cost_index".to_string()),
        Just("media_idx".to_string()),
        Just("month".to_string()),
        Just("fiscal_quarter".to_string()),
        "[a-z_]{1,12}",
    ]
}

fn selection() -> impl Strategy<Value = FieldSelection> {
    prop::collection::vec(("[a-c]", field_id()), 0..10).prop_map(|picks| {
        let mut selection = FieldSelection::new();
        for (group, field) in picks {
            selection.select(&group, &field);
        }
        selection
    })
}

proptest! {
    #[test]
    fn savings_pct_is_always_a_percentage(prefix in "[a-z_]{0,8}", suffix in "[a-z_]{0,8}") {
        let id = format!("{prefix}savings_pct{suffix}");
        prop_assert_eq!(classify(&id), FieldKind::Percentage);
    }

    #[test]
    fn recommendations_never_repeat(selection in selection()) {
        let charts = recommend(&selection);
        let unique: HashSet<_> = charts.iter().collect();
        prop_assert_eq!(unique.len(), charts.len());
    }

    #[test]
    fn metrics_with_percentages_are_mixed(
        metrics in prop::collection::hash_set("[b-h]{1,6}_spend", 2..4),
        pcts in prop::collection::hash_set("[b-h]{1,6}_pct", 2..4),
    ) {
        let mut selection = FieldSelection::new();
        for field in metrics.iter().chain(pcts.iter()) {
            selection.select("kpis", field);
        }
        prop_assert!(analyze(&selection).has_mixed_scales);
        prop_assert!(!is_compatible(ChartType::StackedBar, &selection).compatible);
    }

    #[test]
    fn scores_stay_in_range(selection in selection()) {
        for chart in ChartType::ALL {
            let result = is_compatible(chart, &selection);
            if let Some(score) = result.score {
                prop_assert!(score <= 100);
            }
            prop_assert_eq!(result.compatible, result.score.is_some());
        }
    }

    #[test]
    fn count_based_recommendations_are_compatible(selection in selection()) {
        let ranked: HashSet<ChartType> = rank(&selection).into_iter().map(|r| r.chart).collect();
        for chart in recommend(&selection) {
            // Pie and stacked bar are recommended on field counts alone; the
            // scorer still rejects them for time fields or mixed scales.
            if chart.is_part_of_whole() || chart == ChartType::StackedBar {
                continue;
            }
            prop_assert!(ranked.contains(&chart), "{chart} recommended but not compatible");
        }
    }
}

#[test]
fn empty_selection_shows_whole_catalog_unranked() {
    let empty = FieldSelection::new();
    assert!(recommend(&empty).is_empty());
    for chart in ChartType::ALL {
        let result = is_compatible(chart, &empty);
        assert!(result.compatible);
        assert_eq!(result.score, Some(0));
    }
}

#[test]
fn scatter_with_two_scales() {
    let mixed = FieldSelection::new().with("kpis", &["total_spend", "cost_index"]);
    let result = is_compatible(ChartType::Scatter, &mixed);
    assert!(result.compatible);
    assert_eq!(result.score, Some(85));

    let single = FieldSelection::new().with("kpis", &["total_spend"]);
    assert!(!is_compatible(ChartType::Scatter, &single).compatible);
}
