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
use crate::error::{ConfigError, ConfigResult};
use crate::series::{DEFAULT_MAX_ITEMS, DEFAULT_VALUE_KEY};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const ENV_OTHERS_MAX_ITEMS: &str = "EASEL_OTHERS_MAX_ITEMS";
pub const ENV_OTHERS_VALUE_KEY: &str = "EASEL_OTHERS_VALUE_KEY";

/// Per-chart row caps. Charts without an entry are uncapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartLimits(BTreeMap<ChartType, usize>);
impl ChartLimits {
    pub fn new(entries: impl IntoIterator<Item = (ChartType, usize)>) -> Self {
        Self(entries.into_iter().collect())
    }
    pub fn get(&self, chart: ChartType) -> Option<usize> {
        self.0.get(&chart).copied()
    }
    pub fn set(&mut self, chart: ChartType, limit: usize) {
        self.0.insert(chart, limit);
    }
    pub fn iter(&self) -> impl Iterator<Item = (ChartType, usize)> + '_ {
        self.0.iter().map(|(c, l)| (*c, *l))
    }
    /// Row counts above which a chart stops reading well; drives warnings.
    pub fn density_defaults() -> Self {
        Self::new([
            (ChartType::PieChart, 10),
            (ChartType::BarChart, 20),
            (ChartType::GroupedBar, 15),
            (ChartType::StackedBar, 12),
            (ChartType::LineChart, 25),
            (ChartType::AreaChart, 20),
        ])
    }
    /// Rows actually drawn before the tail collapses into Others.
    pub fn render_defaults() -> Self {
        Self::new([
            (ChartType::PieChart, 9),
            (ChartType::BarChart, 20),
            (ChartType::GroupedBar, 15),
            (ChartType::DualAxisBar, 15),
            (ChartType::StackedBar, 12),
            (ChartType::LineChart, 25),
            (ChartType::AreaChart, 20),
        ])
    }
    /// Entries in `overrides` replace ours; the rest are kept.
    pub fn merged(mut self, overrides: ChartLimits) -> Self {
        self.0.extend(overrides.0);
        self
    }
    fn validate(&self) -> ConfigResult<()> {
        match self.iter().find(|(_, limit)| *limit == 0) {
            Some((chart, _)) => Err(ConfigError::InvalidLimit {
                chart: chart.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OthersConfig {
    pub max_items: usize,
    pub value_key: String,
}
impl Default for OthersConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            value_key: DEFAULT_VALUE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaselConfig {
    #[serde(deserialize_with = "density_over_defaults")]
    pub density_limits: ChartLimits,
    #[serde(deserialize_with = "render_over_defaults")]
    pub render_limits: ChartLimits,
    pub others: OthersConfig,
}

fn density_over_defaults<'de, D>(deserializer: D) -> Result<ChartLimits, D::Error>
where
    D: Deserializer<'de>,
{
    ChartLimits::deserialize(deserializer)
        .map(|limits| ChartLimits::density_defaults().merged(limits))
}

fn render_over_defaults<'de, D>(deserializer: D) -> Result<ChartLimits, D::Error>
where
    D: Deserializer<'de>,
{
    ChartLimits::deserialize(deserializer)
        .map(|limits| ChartLimits::render_defaults().merged(limits))
}

impl Default for EaselConfig {
    fn default() -> Self {
        Self {
            density_limits: ChartLimits::density_defaults(),
            render_limits: ChartLimits::render_defaults(),
            others: OthersConfig::default(),
        }
    }
}
impl EaselConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::ConfigFileError {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        Self::from_yaml_string(&content)
    }
    pub fn from_yaml_string(yaml_content: &str) -> ConfigResult<Self> {
        let config: EaselConfig = serde_yaml::from_str(yaml_content)?;
        config.validate()?;
        Ok(config)
    }
    /// File (or defaults), then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => {
                info!("Loading easel configuration from {}", path.display());
                Self::from_yaml_file(path)?
            }
            None => Self::default(),
        };
        let config = config.with_env_overrides()?;
        if let Err(err) = config.validate() {
            warn!("Rejected easel configuration: {err}");
            return Err(err);
        }
        Ok(config)
    }
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
    pub fn apply_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_OTHERS_MAX_ITEMS) {
            self.others.max_items =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnvOverride {
                        key: ENV_OTHERS_MAX_ITEMS.to_string(),
                        value: raw.clone(),
                    })?;
        }
        if let Some(raw) = lookup(ENV_OTHERS_VALUE_KEY) {
            self.others.value_key = raw.trim().to_string();
        }
        Ok(self)
    }
    pub fn validate(&self) -> ConfigResult<()> {
        self.density_limits.validate()?;
        self.render_limits.validate()?;
        if self.others.max_items == 0 {
            return Err(ConfigError::InvalidOthers {
                field: "max_items".to_string(),
                value: "0".to_string(),
            });
        }
        if self.others.value_key.trim().is_empty() {
            return Err(ConfigError::InvalidOthers {
                field: "value_key".to_string(),
                value: self.others.value_key.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_limit_tables() {
        let config = EaselConfig::default();
        assert_eq!(config.density_limits.get(ChartType::PieChart), Some(10));
        assert_eq!(config.render_limits.get(ChartType::PieChart), Some(9));
        assert_eq!(config.render_limits.get(ChartType::DualAxisBar), Some(15));
        assert_eq!(config.density_limits.get(ChartType::Table), None);
        assert_eq!(config.others.max_items, 9);
        assert_eq!(config.others.value_key, "spend");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = EaselConfig::from_yaml_string(
            "density_limits:\n  pie-chart: 6\nothers:\n  max_items: 5\n  value_key: cost\n",
        )
        .unwrap();
        assert_eq!(config.density_limits.get(ChartType::PieChart), Some(6));
        assert_eq!(config.density_limits.get(ChartType::BarChart), Some(20));
        assert_eq!(config.density_limits.get(ChartType::AreaChart), Some(20));
        assert_eq!(config.render_limits, ChartLimits::render_defaults());
        assert_eq!(config.others.value_key, "cost");
    }

    #[test]
    fn yaml_limits_extend_default_tables() {
        let config = EaselConfig::from_yaml_string(
            "density_limits:\n  scatter: 30\nrender_limits:\n  pie-chart: 6\n",
        )
        .unwrap();
        assert_eq!(config.density_limits.get(ChartType::Scatter), Some(30));
        assert_eq!(config.density_limits.get(ChartType::PieChart), Some(10));
        assert_eq!(config.render_limits.get(ChartType::PieChart), Some(6));
        assert_eq!(config.render_limits.get(ChartType::DualAxisBar), Some(15));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = EaselConfig::from_yaml_string("render_limits:\n  bar-chart: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLimit { ref chart } if chart == "bar-chart"));
    }

    #[test]
    fn unknown_chart_in_yaml_fails_to_parse() {
        let err = EaselConfig::from_yaml_string("density_limits:\n  radar: 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::YamlParseError { .. }));
    }

    #[test]
    fn overrides_replace_others_settings() {
        let config = EaselConfig::default()
            .apply_overrides(|key| match key {
                ENV_OTHERS_MAX_ITEMS => Some(" 4 ".to_string()),
                ENV_OTHERS_VALUE_KEY => Some("savings".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.others.max_items, 4);
        assert_eq!(config.others.value_key, "savings");

        let err = EaselConfig::default()
            .apply_overrides(|_| Some("many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvOverride { .. }));
    }
}
