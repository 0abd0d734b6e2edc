//! Presentation boundary: scatter series and edge markings
//!
//! Every color handed to a presentation adapter is derived through
//! [`crate::classify::classify`]; adapters never re-implement banding.

use crate::classify::{classify, Band, Bounds};
use crate::footprint::{Footprint, FootprintAnalysis};
use crate::kpi::{Kpi, KpiValues};
use serde::Serialize;

/// One classified footprint value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFootprint {
    pub footprint: Footprint,
    pub label: String,
    pub value: f64,
    /// Difference to the population baseline
    pub delta: f64,
    pub band: Band,
    pub color: &'static str,
}

/// Labeled values of one KPI with the statistics they are judged against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub kpi: Kpi,
    pub mean: f64,
    pub spread: f64,
    /// Upper inner-band line
    pub upper_line: f64,
    /// Lower inner-band line, clamped at zero
    pub lower_line: f64,
    pub points: Vec<ScoredFootprint>,
}

impl ScatterSeries {
    /// Classify every footprint value of `kpi`
    pub fn from_analysis(analysis: &FootprintAnalysis, kpi: Kpi, mean: f64, spread: f64) -> Self {
        let reversed = kpi.reversed();
        let bounds = Bounds::new(mean, spread, reversed);

        let points = analysis
            .footprints
            .iter()
            .map(|f| {
                let value = f.means.get(kpi);
                let band = classify(value, mean, spread, reversed);
                ScoredFootprint {
                    footprint: f.footprint.clone(),
                    label: f.footprint.label(),
                    value,
                    delta: f.deltas.get(kpi),
                    band,
                    color: band.color(),
                }
            })
            .collect();

        Self {
            kpi,
            mean,
            spread,
            upper_line: bounds.upper,
            lower_line: bounds.lower.max(0.0),
            points,
        }
    }

    /// One series per KPI in `kpis`
    pub fn for_kpis(
        analysis: &FootprintAnalysis,
        kpis: &[Kpi],
        baseline: &KpiValues,
        spread: &KpiValues,
    ) -> Vec<Self> {
        kpis.iter()
            .map(|&kpi| Self::from_analysis(analysis, kpi, baseline.get(kpi), spread.get(kpi)))
            .collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn colors(&self) -> Vec<&'static str> {
        self.points.iter().map(|p| p.color).collect()
    }

    pub fn outlier_count(&self) -> usize {
        self.points.iter().filter(|p| !p.band.is_neutral()).count()
    }

    /// Points to show, optionally skipping neutral ones
    pub fn visible_points(&self, outliers_only: bool) -> impl Iterator<Item = &ScoredFootprint> {
        self.points
            .iter()
            .filter(move |p| !outliers_only || !p.band.is_neutral())
    }
}

/// Non-neutral footprints of a series with their bands
pub fn calculate_outlier_footprints(series: &ScatterSeries) -> Vec<(Footprint, Band)> {
    series
        .points
        .iter()
        .filter(|p| !p.band.is_neutral())
        .map(|p| (p.footprint.clone(), p.band))
        .collect()
}

/// Directed DFG edge with an overlay color
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeMarking {
    pub src: String,
    pub dest: String,
    pub color: String,
}

/// Edge markings for classified outlier footprints
pub fn extract_edge_markings(outliers: &[(Footprint, Band)]) -> Vec<EdgeMarking> {
    outliers
        .iter()
        .map(|(fp, band)| EdgeMarking {
            src: fp.predecessor.clone(),
            dest: fp.successor.clone(),
            color: band.color().to_string(),
        })
        .collect()
}
