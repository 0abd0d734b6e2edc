//! JSON output format for footprint reports

use crate::analysis::AnalysisReport;
use crate::classify::Band;
use crate::kpi::{Kpi, KpiValues};
use crate::report::ScatterSeries;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One classified footprint value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonPoint {
    /// Footprint label (e.g., "0010 -> 0020")
    pub footprint: String,
    pub predecessor: String,
    pub successor: String,
    /// Footprint-level KPI mean
    pub value: f64,
    /// Difference to the population baseline
    pub delta: f64,
    #[serde(flatten)]
    pub band: Band,
    pub color: String,
}

/// Classified values of one KPI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSeries {
    pub kpi: Kpi,
    /// Display name (e.g., "Lead Time")
    pub label: String,
    pub unit: String,
    pub mean: f64,
    pub spread: f64,
    pub upper_line: f64,
    pub lower_line: f64,
    pub outliers: usize,
    pub points: Vec<JsonPoint>,
}

impl JsonSeries {
    fn from_series(series: &ScatterSeries, outliers_only: bool) -> Self {
        let points = series
            .visible_points(outliers_only)
            .map(|p| JsonPoint {
                footprint: p.label.clone(),
                predecessor: p.footprint.predecessor.clone(),
                successor: p.footprint.successor.clone(),
                value: p.value,
                delta: p.delta,
                band: p.band,
                color: p.color.to_string(),
            })
            .collect();

        Self {
            kpi: series.kpi,
            label: series.kpi.label().to_string(),
            unit: series.kpi.unit().to_string(),
            mean: series.mean,
            spread: series.spread,
            upper_line: series.upper_line,
            lower_line: series.lower_line,
            outliers: series.outlier_count(),
            points,
        }
    }
}

/// Summary counts for the analysed population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    pub events: usize,
    pub contracts: usize,
    pub footprints: usize,
    pub dfg_edges: usize,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub summary: JsonSummary,
    /// Population KPI means
    pub baseline: KpiValues,
    /// Std dev over footprint-level means
    pub spread: KpiValues,
    pub series: Vec<JsonSeries>,
    /// Footprint label → contracts exhibiting it
    pub footprint_contracts: IndexMap<String, Vec<String>>,
}

impl JsonReport {
    pub fn from_analysis(report: &AnalysisReport, outliers_only: bool) -> Self {
        let footprint_contracts = report
            .footprints
            .contracts
            .iter()
            .map(|(fp, contracts)| (fp.label(), contracts.clone()))
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "huella-json-v1".to_string(),
            summary: JsonSummary {
                events: report.event_count,
                contracts: report.contracts.len(),
                footprints: report.footprints.len(),
                dfg_edges: report.population_dfg.edge_count(),
            },
            baseline: report.baseline,
            spread: report.spread,
            series: report
                .series
                .iter()
                .map(|s| JsonSeries::from_series(s, outliers_only))
                .collect(),
            footprint_contracts,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
