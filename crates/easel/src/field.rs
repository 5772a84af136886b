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

//! Field kinds, the user's field selection and the analysis derived from it.

use crate::error::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Dimension,
    Metric,
    Percentage,
    Index,
    Time,
}
impl FieldKind {
    /// Metrics, percentages and indexes are plotted as values.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldKind::Metric | FieldKind::Percentage | FieldKind::Index
        )
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Dimension => "dimension",
            FieldKind::Metric => "metric",
            FieldKind::Percentage => "percentage",
            FieldKind::Index => "index",
            FieldKind::Time => "time",
        }
    }
}

// Checked top to bottom; "savings_pct" has to hit percentage before metric.
const KIND_PATTERNS: [(FieldKind, &[&str]); 4] = [
    (FieldKind::Percentage, &["pct", "percentage"]),
    (FieldKind::Index, &["index", "idx"]),
    (FieldKind::Time, &["month", "quarter", "year", "period"]),
    (FieldKind::Metric, &["spend", "value", "cpu", "savings"]),
];

/// Classifies a field identifier by the substrings it contains.
pub fn classify(field_id: &str) -> FieldKind {
    let name_lower = field_id.to_ascii_lowercase();
    KIND_PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| name_lower.contains(n)))
        .map_or(FieldKind::Dimension, |(kind, _)| *kind)
}

pub trait FieldKindResolver {
    fn kind_of(&self, field_id: &str) -> FieldKind;
}

/// Resolver backed purely by [`classify`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NameHeuristics;
impl FieldKindResolver for NameHeuristics {
    fn kind_of(&self, field_id: &str) -> FieldKind {
        classify(field_id)
    }
}

/// Fields declared with an explicit kind. Undeclared ids fall back to the
/// name heuristics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldCatalog {
    #[serde(default)]
    fields: HashMap<String, FieldKind>,
}
impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn declare(mut self, field_id: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(field_id.into(), kind);
        self
    }
    pub fn declared(&self, field_id: &str) -> Option<FieldKind> {
        self.fields.get(field_id).copied()
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::ConfigFileError {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        Self::from_yaml_string(&content)
    }
    pub fn from_yaml_string(yaml_content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml_content)?)
    }
}
impl FieldKindResolver for FieldCatalog {
    fn kind_of(&self, field_id: &str) -> FieldKind {
        self.declared(field_id)
            .unwrap_or_else(|| classify(field_id))
    }
}

/// Fields picked by the user, grouped the way the query builder shows them.
/// A field appears at most once within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Vec<String>>", into = "IndexMap<String, Vec<String>>")]
pub struct FieldSelection {
    groups: IndexMap<String, Vec<String>>,
}
impl FieldSelection {
    pub fn new() -> Self {
        Self::default()
    }
    /// Adds `field` to `group`; returns false if it was already selected there.
    pub fn select(&mut self, group: &str, field: &str) -> bool {
        let fields = self.groups.entry(group.to_string()).or_default();
        if fields.iter().any(|f| f == field) {
            return false;
        }
        fields.push(field.to_string());
        true
    }
    pub fn deselect(&mut self, group: &str, field: &str) -> bool {
        let Some(fields) = self.groups.get_mut(group) else {
            return false;
        };
        let before = fields.len();
        fields.retain(|f| f != field);
        let removed = fields.len() != before;
        if fields.is_empty() {
            self.groups.shift_remove(group);
        }
        removed
    }
    /// Returns whether the field is selected afterwards.
    pub fn toggle(&mut self, group: &str, field: &str) -> bool {
        if self.deselect(group, field) {
            false
        } else {
            self.select(group, field)
        }
    }
    pub fn clear_group(&mut self, group: &str) {
        self.groups.shift_remove(group);
    }
    pub fn with(mut self, group: &str, fields: &[&str]) -> Self {
        for field in fields {
            self.select(group, field);
        }
        self
    }
    pub fn group(&self, group: &str) -> &[String] {
        self.groups.get(group).map_or(&[], |v| v.as_slice())
    }
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(g, f)| (g.as_str(), f.as_slice()))
    }
    /// All selected fields, group order first, then selection order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.groups.values().flatten().map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl From<IndexMap<String, Vec<String>>> for FieldSelection {
    fn from(raw: IndexMap<String, Vec<String>>) -> Self {
        let mut selection = FieldSelection::new();
        for (group, fields) in raw {
            for field in fields {
                selection.select(&group, &field);
            }
        }
        selection
    }
}
impl From<FieldSelection> for IndexMap<String, Vec<String>> {
    fn from(selection: FieldSelection) -> Self {
        selection.groups
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldAnalysis {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub percentages: Vec<String>,
    pub indexes: Vec<String>,
    pub times: Vec<String>,
    pub total_fields: usize,
    pub has_mixed_scales: bool,
    pub scale_warning: Option<String>,
}
impl FieldAnalysis {
    pub fn numeric_count(&self) -> usize {
        self.metrics.len() + self.percentages.len() + self.indexes.len()
    }
    pub fn has_time(&self) -> bool {
        !self.times.is_empty()
    }
    fn push(&mut self, kind: FieldKind, field: &str) {
        let bucket = match kind {
            FieldKind::Dimension => &mut self.dimensions,
            FieldKind::Metric => &mut self.metrics,
            FieldKind::Percentage => &mut self.percentages,
            FieldKind::Index => &mut self.indexes,
            FieldKind::Time => &mut self.times,
        };
        bucket.push(field.to_string());
        self.total_fields += 1;
    }
    fn detect_mixed_scales(&mut self) {
        let present: Vec<&str> = [
            (!self.metrics.is_empty(), "absolute values"),
            (!self.percentages.is_empty(), "percentages"),
            (!self.indexes.is_empty(), "indices"),
        ]
        .into_iter()
        .filter_map(|(present, label)| present.then_some(label))
        .collect();
        self.has_mixed_scales = present.len() >= 2;
        self.scale_warning = self.has_mixed_scales.then(|| {
            format!(
                "Mixed scales selected: {} are plotted on different scales",
                present.join(" and ")
            )
        });
    }
}

pub fn analyze(selection: &FieldSelection) -> FieldAnalysis {
    analyze_with(selection, &NameHeuristics)
}

pub fn analyze_with<R: FieldKindResolver + ?Sized>(
    selection: &FieldSelection,
    resolver: &R,
) -> FieldAnalysis {
    let mut analysis = FieldAnalysis::default();
    for field in selection.fields() {
        analysis.push(resolver.kind_of(field), field);
    }
    analysis.detect_mixed_scales();
    debug!(
        total = analysis.total_fields,
        numeric = analysis.numeric_count(),
        dimensions = analysis.dimensions.len(),
        mixed = analysis.has_mixed_scales,
        "analysed field selection"
    );
    analysis
}
