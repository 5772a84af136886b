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

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use easel::{
    classify, decode_csv_rows, decode_json_rows, get_recommendation_summary, ChartAdvisor,
    ChartType, FieldSelection, Row, RowSchema,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "easel-demo",
    about = "Chart recommendation and data density checks from the command line"
)]
struct Cli {
    /// YAML file with density limits, render limits and Others settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// YAML field catalog declaring field kinds explicitly
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the kind each field id resolves to
    Classify {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Rank charts for a grouped field selection (YAML or JSON)
    Recommend {
        #[arg(long)]
        selection: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check whether a row count is too dense for a chart
    Density {
        #[arg(long)]
        rows: usize,
        #[arg(long)]
        chart: ChartType,
    },
    /// Decode rows, check density and fold the tail into Others
    Prepare {
        /// JSON array of objects, or CSV with a header row
        #[arg(long)]
        rows: PathBuf,
        #[arg(long)]
        chart: ChartType,
        #[arg(long, default_value = "name")]
        name_key: String,
        #[arg(long = "metric")]
        metrics: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let filter = if args.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let advisor = ChartAdvisor::from_files(args.config.as_deref(), args.catalog.as_deref())
        .map_err(|e| anyhow::anyhow!("{}: {}", e.category(), e.user_message()))?;
    info!("Easel demo ready");

    match args.command {
        Commands::Classify { fields } => {
            let selection = fields
                .iter()
                .fold(FieldSelection::new(), |mut selection, field| {
                    selection.select("fields", field);
                    selection
                });
            let analysis = advisor.analyze(&selection);
            for field in &fields {
                let heuristic = classify(field);
                let resolved = kind_in(&analysis, field).unwrap_or(heuristic.as_str());
                if resolved == heuristic.as_str() {
                    println!("{field}: {resolved}");
                } else {
                    println!("{field}: {resolved} (declared; name suggests {})", heuristic.as_str());
                }
            }
        }
        Commands::Recommend { selection, json } => {
            let selection = load_selection(&selection)?;
            let analysis = advisor.analyze(&selection);
            if json {
                let out = json!({
                    "analysis": analysis,
                    "recommended": advisor.recommend(&selection),
                    "ranked": advisor.rank(&selection),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", get_recommendation_summary(&analysis));
            }
        }
        Commands::Density { rows, chart } => {
            let verdict = advisor.check_density(rows, chart);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Commands::Prepare {
            rows,
            chart,
            name_key,
            metrics,
        } => {
            let metrics = if metrics.is_empty() {
                vec![advisor.config().others.value_key.clone()]
            } else {
                metrics
            };
            let schema = metrics
                .into_iter()
                .fold(RowSchema::new(name_key), |schema, key| schema.metric(key));
            let decoded = load_rows(&rows, &schema)?;
            info!(rows = decoded.len(), %chart, "Preparing series");
            let prepared = advisor.prepare(decoded, chart);
            if let Some(message) = &prepared.verdict.message {
                info!("{message}");
            }
            println!("{}", serde_json::to_string_pretty(&prepared)?);
        }
    }

    Ok(())
}

fn kind_in<'a>(analysis: &'a easel::FieldAnalysis, field: &str) -> Option<&'a str> {
    let buckets = [
        (&analysis.dimensions, "dimension"),
        (&analysis.metrics, "metric"),
        (&analysis.percentages, "percentage"),
        (&analysis.indexes, "index"),
        (&analysis.times, "time"),
    ];
    buckets
        .into_iter()
        .find(|(ids, _)| ids.iter().any(|id| id == field))
        .map(|(_, kind)| kind)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn load_selection(path: &Path) -> Result<FieldSelection> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading selection {}", path.display()))?;
    let selection = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    debug!(?selection, "Loaded selection");
    Ok(selection)
}

fn load_rows(path: &Path, schema: &RowSchema) -> Result<Vec<Row>> {
    if is_json(path) {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading rows {}", path.display()))?;
        let records: Vec<Value> = serde_json::from_str(&content)?;
        Ok(decode_json_rows(&records, schema)?)
    } else {
        let file =
            fs::File::open(path).with_context(|| format!("opening rows {}", path.display()))?;
        Ok(decode_csv_rows(file, schema)?)
    }
}
