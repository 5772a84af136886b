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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum EaselError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Row data error: {0}")]
    Data(#[from] DataError),
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] SerialisationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse YAML configuration: {source}")]
    YamlParseError {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Row limit for '{chart}' must be greater than 0")]
    InvalidLimit { chart: String },
    #[error("Invalid Others configuration: {field} = {value}")]
    InvalidOthers { field: String, value: String },
    #[error("Environment override {key} has invalid value '{value}'")]
    InvalidEnvOverride { key: String, value: String },
}
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Row {row} is not a JSON object")]
    NotAnObject { row: usize },
    #[error("Row {row} is missing the name key '{key}'")]
    MissingName { row: usize, key: String },
    #[error("Row {row} has non-numeric value '{value}' for metric '{key}'")]
    NonNumericMetric {
        row: usize,
        key: String,
        value: String,
    },
    #[error("CSV header has no column '{column}'")]
    MissingColumn { column: String },
    #[error("CSV parsing failed: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Unknown chart type '{name}'")]
    UnknownChartType { name: String },
}
#[derive(Error, Debug)]
pub enum SerialisationError {
    #[error("JSON serialisation failed: {source}")]
    JsonSerialisationError {
        #[from]
        source: serde_json::Error,
    },
    #[error("Unsupported session snapshot version: {version}")]
    UnsupportedVersion { version: u32 },
}
pub type Result<T> = std::result::Result<T, EaselError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type DataResult<T> = std::result::Result<T, DataError>;

impl From<serde_json::Error> for EaselError {
    fn from(err: serde_json::Error) -> Self {
        EaselError::Serialisation(SerialisationError::JsonSerialisationError { source: err })
    }
}
impl EaselError {
    pub fn category(&self) -> &'static str {
        match self {
            EaselError::Config(_) => "Configuration",
            EaselError::Data(_) => "Data",
            EaselError::Chart(_) => "Chart",
            EaselError::Serialisation(_) => "Serialisation",
            EaselError::Io(_) => "I/O",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            EaselError::Chart(ChartError::UnknownChartType { name }) => {
                format!("'{name}' is not a supported chart. Pick one from the chart catalog.")
            }
            EaselError::Config(ConfigError::ConfigFileError { path, .. }) => {
                format!("Unable to load configuration from '{path}'. Check the file exists.")
            }
            EaselError::Serialisation(SerialisationError::UnsupportedVersion { .. }) => {
                "The saved dashboard was written by a newer version and cannot be restored."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_variant() {
        let err: EaselError = ChartError::UnknownChartType {
            name: "radar".into(),
        }
        .into();
        assert_eq!(err.category(), "Chart");
        assert!(err.user_message().contains("radar"));

        let err: EaselError = DataError::MissingColumn {
            column: "name".into(),
        }
        .into();
        assert_eq!(err.category(), "Data");
        assert_eq!(err.user_message(), err.to_string());
    }
}
