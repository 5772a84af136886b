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

pub mod chart_type;
pub mod compatibility;
pub mod config;
pub mod density;
pub mod error;
pub mod field;
pub mod recommender;
pub mod series;
pub mod session;

pub use chart_type::ChartType;
pub use compatibility::{is_compatible, is_compatible_with_analysis, CompatibilityResult};
pub use config::{ChartLimits, EaselConfig, OthersConfig};
pub use density::{check_density, check_density_with, prepare_series, DensityVerdict, PreparedSeries};
pub use error::{ChartError, ConfigError, DataError, EaselError, Result, SerialisationError};
pub use field::{
    analyze, analyze_with, classify, FieldAnalysis, FieldCatalog, FieldKind, FieldKindResolver,
    FieldSelection, NameHeuristics,
};
pub use recommender::{get_recommendation_summary, rank, recommend, RankedChart};
pub use series::{apply_others, decode_csv_rows, decode_json_rows, Row, RowSchema};
pub use session::{DashboardSession, FetchTicket, JsonCodec, SessionCodec, SessionSnapshot};

use std::path::Path;

/// Configuration and field catalog bundled for callers that want one handle.
pub struct ChartAdvisor {
    config: EaselConfig,
    catalog: FieldCatalog,
}
impl ChartAdvisor {
    pub fn new() -> Self {
        Self {
            config: EaselConfig::default(),
            catalog: FieldCatalog::new(),
        }
    }
    pub fn with_config(config: EaselConfig, catalog: FieldCatalog) -> Self {
        Self { config, catalog }
    }
    pub fn from_files(config_path: Option<&Path>, catalog_path: Option<&Path>) -> Result<Self> {
        let config = EaselConfig::load(config_path)?;
        let catalog = match catalog_path {
            Some(path) => FieldCatalog::from_yaml_file(path)?,
            None => FieldCatalog::new(),
        };
        Ok(Self { config, catalog })
    }
    pub fn config(&self) -> &EaselConfig {
        &self.config
    }
    pub fn analyze(&self, selection: &FieldSelection) -> FieldAnalysis {
        analyze_with(selection, &self.catalog)
    }
    pub fn compatibility(&self, chart: ChartType, selection: &FieldSelection) -> CompatibilityResult {
        is_compatible_with_analysis(chart, &self.analyze(selection))
    }
    pub fn recommend(&self, selection: &FieldSelection) -> Vec<ChartType> {
        recommender::recommend_for_analysis(&self.analyze(selection))
    }
    pub fn rank(&self, selection: &FieldSelection) -> Vec<RankedChart> {
        recommender::rank_analysis(&self.analyze(selection))
    }
    pub fn check_density(&self, row_count: usize, chart: ChartType) -> DensityVerdict {
        check_density_with(row_count, chart, &self.config.density_limits)
    }
    pub fn prepare(&self, rows: Vec<Row>, chart: ChartType) -> PreparedSeries {
        prepare_series(rows, chart, &self.config)
    }
}
impl Default for ChartAdvisor {
    fn default() -> Self {
        Self::new()
    }
}
