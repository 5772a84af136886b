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

//! Typed chart rows, decoding them at the fetch boundary, and collapsing the
//! long tail into an "Others" row.

use crate::error::{DataError, DataResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::io::Read;

pub const OTHERS_LABEL: &str = "Others";
pub const DEFAULT_MAX_ITEMS: usize = 9;
pub const DEFAULT_VALUE_KEY: &str = "spend";

/// One category's aggregated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub name: String,
    #[serde(default)]
    pub values: IndexMap<String, f64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_other: bool,
}
impl Row {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
            attributes: IndexMap::new(),
            is_other: false,
        }
    }
    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
    fn sort_value(&self, key: &str) -> f64 {
        self.value(key).filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Keeps the `max_items` largest rows by `value_key` and sums the rest into
/// one Others row. Short inputs come back untouched.
///
/// The sort is stable: rows with equal values keep their input order, which
/// decides who lands in Others at the cutoff. Missing and non-finite values
/// sort as zero and are left out of the Others totals.
pub fn apply_others(mut rows: Vec<Row>, max_items: usize, value_key: &str) -> Vec<Row> {
    if rows.len() <= max_items {
        return rows;
    }
    rows.sort_by(|a, b| {
        b.sort_value(value_key)
            .partial_cmp(&a.sort_value(value_key))
            .unwrap_or(Ordering::Equal)
    });
    let rest = rows.split_off(max_items);
    let mut totals: IndexMap<String, f64> = IndexMap::new();
    for row in &rest {
        for (key, value) in row.values.iter().filter(|(_, v)| v.is_finite()) {
            *totals.entry(key.clone()).or_insert(0.0) += value;
        }
    }
    tracing::debug!(
        kept = rows.len(),
        collapsed = rest.len(),
        value_key,
        "collapsed long tail into Others"
    );
    rows.push(Row {
        name: OTHERS_LABEL.to_string(),
        values: totals,
        attributes: IndexMap::new(),
        is_other: true,
    });
    rows
}

/// Declares which keys of a fetched record hold what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSchema {
    pub name_key: String,
    #[serde(default)]
    pub metric_keys: Vec<String>,
    #[serde(default)]
    pub attribute_keys: Vec<String>,
}
impl RowSchema {
    pub fn new(name_key: impl Into<String>) -> Self {
        Self {
            name_key: name_key.into(),
            metric_keys: Vec::new(),
            attribute_keys: Vec::new(),
        }
    }
    pub fn metric(mut self, key: impl Into<String>) -> Self {
        self.metric_keys.push(key.into());
        self
    }
    pub fn attribute(mut self, key: impl Into<String>) -> Self {
        self.attribute_keys.push(key.into());
        self
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_metric(row: usize, key: &str, raw: &str) -> DataResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DataError::NonNumericMetric {
            row,
            key: key.to_string(),
            value: raw.to_string(),
        })
}

pub fn decode_json_rows(records: &[Value], schema: &RowSchema) -> DataResult<Vec<Row>> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let object = record.as_object().ok_or(DataError::NotAnObject { row: idx })?;
            let name = object
                .get(&schema.name_key)
                .and_then(scalar_text)
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| DataError::MissingName {
                    row: idx,
                    key: schema.name_key.clone(),
                })?;
            let mut row = Row::new(name);
            for key in &schema.metric_keys {
                let value = match object.get(key) {
                    None | Some(Value::Null) => continue,
                    Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                    Some(Value::String(s)) => parse_metric(idx, key, s)?,
                    Some(other) => {
                        return Err(DataError::NonNumericMetric {
                            row: idx,
                            key: key.clone(),
                            value: other.to_string(),
                        })
                    }
                };
                row.values.insert(key.clone(), value);
            }
            for key in &schema.attribute_keys {
                if let Some(text) = object.get(key).and_then(scalar_text) {
                    row.attributes.insert(key.clone(), text);
                }
            }
            Ok(row)
        })
        .collect()
}

pub fn decode_csv_rows<R: Read>(reader: R, schema: &RowSchema) -> DataResult<Vec<Row>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let column = |key: &str| {
        headers
            .iter()
            .position(|h| h.trim() == key)
            .ok_or_else(|| DataError::MissingColumn {
                column: key.to_string(),
            })
    };
    let name_idx = column(&schema.name_key)?;
    let metric_idx = schema
        .metric_keys
        .iter()
        .map(|key| column(key).map(|i| (key, i)))
        .collect::<DataResult<Vec<_>>>()?;
    let attribute_idx = schema
        .attribute_keys
        .iter()
        .map(|key| column(key).map(|i| (key, i)))
        .collect::<DataResult<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let name = record
            .get(name_idx)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DataError::MissingName {
                row: idx,
                key: schema.name_key.clone(),
            })?;
        let mut row = Row::new(name);
        for (key, i) in &metric_idx {
            match record.get(*i) {
                Some(raw) if !raw.trim().is_empty() => {
                    row.values
                        .insert((*key).clone(), parse_metric(idx, key, raw)?);
                }
                _ => {}
            }
        }
        for (key, i) in &attribute_idx {
            if let Some(raw) = record.get(*i).filter(|s| !s.is_empty()) {
                row.attributes.insert((*key).clone(), raw.to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spend_rows(spends: &[f64]) -> Vec<Row> {
        spends
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Row::new(format!("item-{i}"))
                    .with_value("spend", *s)
                    .with_value("savings", s / 10.0)
                    .with_attribute("region", "EMEA")
            })
            .collect()
    }

    #[test]
    fn short_input_is_returned_as_is() {
        let rows = spend_rows(&[3.0, 1.0, 2.0]);
        let out = apply_others(rows.clone(), DEFAULT_MAX_ITEMS, DEFAULT_VALUE_KEY);
        assert_eq!(out, rows);
    }

    #[test]
    fn long_tail_is_summed_key_by_key() {
        let rows = spend_rows(&[5.0, 50.0, 1.0, 20.0, 2.0]);
        let out = apply_others(rows, 2, "spend");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].name, "item-1");
        assert_eq!(out[1].name, "item-3");
        let others = &out[2];
        assert_eq!(others.name, OTHERS_LABEL);
        assert!(others.is_other);
        assert_eq!(others.value("spend"), Some(8.0));
        assert!((others.value("savings").unwrap() - 0.8).abs() < 1e-9);
        assert!(others.attributes.is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let rows = spend_rows(&[1.0, 1.0, 1.0]);
        let out = apply_others(rows, 1, "spend");
        assert_eq!(out[0].name, "item-0");
        assert_eq!(out[1].value("spend"), Some(2.0));
    }

    #[test]
    fn missing_and_nan_values_sort_as_zero() {
        let rows = vec![
            Row::new("nan").with_value("spend", f64::NAN),
            Row::new("missing"),
            Row::new("small").with_value("spend", 0.5),
        ];
        let out = apply_others(rows, 1, "spend");
        assert_eq!(out[0].name, "small");
        assert!(out[1].is_other);
        assert_eq!(out[1].value("spend"), None);
    }

    #[test]
    fn zero_max_items_collapses_everything() {
        let out = apply_others(spend_rows(&[1.0, 2.0]), 0, "spend");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value("spend"), Some(3.0));
    }

    #[test]
    fn json_rows_follow_schema() {
        let schema = RowSchema::new("market")
            .metric("spend")
            .metric("savings_pct")
            .attribute("client_id");
        let rows = decode_json_rows(
            &[
                json!({"market": "UK", "spend": 120.5, "savings_pct": "4.5", "client_id": 7, "ignored": true}),
                json!({"market": "FR", "spend": null}),
            ],
            &schema,
        )
        .unwrap();
        assert_eq!(rows[0].value("spend"), Some(120.5));
        assert_eq!(rows[0].value("savings_pct"), Some(4.5));
        assert_eq!(rows[0].attributes.get("client_id").map(String::as_str), Some("7"));
        assert!(rows[1].values.is_empty());
    }

    #[test]
    fn json_rows_reject_bad_records() {
        let schema = RowSchema::new("market").metric("spend");
        let err = decode_json_rows(&[json!({"spend": 1})], &schema).unwrap_err();
        assert!(matches!(err, DataError::MissingName { row: 0, .. }));
        let err = decode_json_rows(&[json!({"market": "UK", "spend": "lots"})], &schema)
            .unwrap_err();
        assert!(matches!(err, DataError::NonNumericMetric { .. }));
        let err = decode_json_rows(&[json!({"market": "  ", "spend": 1})], &schema).unwrap_err();
        assert!(matches!(err, DataError::MissingName { row: 0, .. }));
        let err = decode_json_rows(&[json!([1, 2])], &schema).unwrap_err();
        assert!(matches!(err, DataError::NotAnObject { row: 0 }));
    }

    #[test]
    fn csv_rows_follow_schema() {
        let data = "market,spend,channel\nUK,10.5,TV\nFR,,Radio\n";
        let schema = RowSchema::new("market").metric("spend").attribute("channel");
        let rows = decode_csv_rows(data.as_bytes(), &schema).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value("spend"), Some(10.5));
        assert_eq!(rows[1].value("spend"), None);
        assert_eq!(rows[1].attributes["channel"], "Radio");
    }

    #[test]
    fn csv_requires_declared_columns() {
        let schema = RowSchema::new("market").metric("cpu");
        let err = decode_csv_rows("market,spend\nUK,1\n".as_bytes(), &schema).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column } if column == "cpu"));
    }
}
