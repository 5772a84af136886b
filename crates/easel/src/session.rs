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

//! Per-user dashboard state: the field selection, the chosen chart, the
//! charts picked for presentation export and the latest fetched rows.

use crate::chart_type::ChartType;
use crate::compatibility::{is_compatible, CompatibilityResult};
use crate::config::EaselConfig;
use crate::density::{prepare_series, PreparedSeries};
use crate::error::{Result, SerialisationError};
use crate::field::FieldSelection;
use crate::series::Row;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Issued when a row fetch starts. Only the newest ticket may apply rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone)]
pub struct DashboardSession {
    id: Uuid,
    selection: FieldSelection,
    chart: Option<ChartType>,
    export: IndexSet<String>,
    rows: Vec<Row>,
    latest_ticket: u64,
}
impl Default for DashboardSession {
    fn default() -> Self {
        Self::new()
    }
}
impl DashboardSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            selection: FieldSelection::new(),
            chart: None,
            export: IndexSet::new(),
            rows: Vec::new(),
            latest_ticket: 0,
        }
    }
    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn selection(&self) -> &FieldSelection {
        &self.selection
    }
    pub fn chart(&self) -> Option<ChartType> {
        self.chart
    }
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn select_field(&mut self, group: &str, field: &str) -> bool {
        let changed = self.selection.select(group, field);
        if changed {
            self.invalidate_fetches();
        }
        changed
    }
    pub fn deselect_field(&mut self, group: &str, field: &str) -> bool {
        let changed = self.selection.deselect(group, field);
        if changed {
            self.invalidate_fetches();
        }
        changed
    }
    pub fn toggle_field(&mut self, group: &str, field: &str) -> bool {
        let selected = self.selection.toggle(group, field);
        self.invalidate_fetches();
        selected
    }
    pub fn choose_chart(&mut self, chart: ChartType) -> CompatibilityResult {
        self.chart = Some(chart);
        is_compatible(chart, &self.selection)
    }

    pub fn add_to_export(&mut self, chart_key: impl Into<String>) -> bool {
        self.export.insert(chart_key.into())
    }
    pub fn remove_from_export(&mut self, chart_key: &str) -> bool {
        self.export.shift_remove(chart_key)
    }
    pub fn export_keys(&self) -> impl Iterator<Item = &str> {
        self.export.iter().map(String::as_str)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        FetchTicket(self.latest_ticket)
    }
    /// Replaces the rows wholesale if `ticket` is still the newest fetch.
    /// Returns false, leaving the current rows in place, for stale results.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, rows: Vec<Row>) -> bool {
        if ticket.0 != self.latest_ticket {
            warn!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "dropping stale fetch result"
            );
            return false;
        }
        self.rows = rows;
        true
    }
    fn invalidate_fetches(&mut self) {
        self.latest_ticket += 1;
    }

    pub fn prepared(&self, config: &EaselConfig) -> Option<PreparedSeries> {
        self.chart
            .map(|chart| prepare_series(self.rows.clone(), chart, config))
    }

    pub fn persist<C: SessionCodec + ?Sized>(&self, codec: &C) -> Result<String> {
        codec.encode(&SessionSnapshot::capture(self))
    }
    pub fn hydrate<C: SessionCodec + ?Sized>(codec: &C, payload: &str) -> Result<Self> {
        let snapshot = codec.decode(payload)?;
        info!(
            session = %snapshot.session_id,
            saved_at = %snapshot.saved_at,
            "restored dashboard session"
        );
        Ok(snapshot.restore())
    }
}

/// The persisted part of a session. Rows are always refetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub session_id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub selection: FieldSelection,
    pub chart: Option<ChartType>,
    pub export: IndexSet<String>,
}
impl SessionSnapshot {
    pub fn capture(session: &DashboardSession) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session_id: session.id,
            saved_at: Utc::now(),
            selection: session.selection.clone(),
            chart: session.chart,
            export: session.export.clone(),
        }
    }
    pub fn restore(self) -> DashboardSession {
        DashboardSession {
            id: self.session_id,
            selection: self.selection,
            chart: self.chart,
            export: self.export,
            rows: Vec::new(),
            latest_ticket: 0,
        }
    }
}

pub trait SessionCodec {
    fn encode(&self, snapshot: &SessionSnapshot) -> Result<String>;
    fn decode(&self, payload: &str) -> Result<SessionSnapshot>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pub pretty: bool,
}
impl SessionCodec for JsonCodec {
    fn encode(&self, snapshot: &SessionSnapshot) -> Result<String> {
        let payload = if self.pretty {
            serde_json::to_string_pretty(snapshot)?
        } else {
            serde_json::to_string(snapshot)?
        };
        Ok(payload)
    }
    fn decode(&self, payload: &str) -> Result<SessionSnapshot> {
        let raw: serde_json::Value = serde_json::from_str(payload)?;
        let version = raw
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if version != u64::from(SNAPSHOT_VERSION) {
            return Err(SerialisationError::UnsupportedVersion {
                version: u32::try_from(version).unwrap_or(u32::MAX),
            }
            .into());
        }
        Ok(serde_json::from_value(raw)?)
    }
}
