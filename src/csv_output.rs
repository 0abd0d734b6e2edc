//! CSV output format for footprint reports
//!
//! One row per (KPI, footprint) for spreadsheet analysis and machine parsing

use crate::report::{ScatterSeries, ScoredFootprint};

/// CSV output formatter
#[derive(Debug)]
pub struct CsvReport<'a> {
    series: Vec<&'a ScatterSeries>,
    outliers_only: bool,
}

impl<'a> CsvReport<'a> {
    /// Create a new CSV output formatter
    pub fn new(outliers_only: bool) -> Self {
        Self {
            series: Vec::new(),
            outliers_only,
        }
    }

    /// Add one KPI series to the output
    pub fn add_series(&mut self, series: &'a ScatterSeries) {
        self.series.push(series);
    }

    fn header() -> &'static str {
        "kpi,footprint,predecessor,successor,value,delta,mean,spread,band,color"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_point(series: &ScatterSeries, point: &ScoredFootprint) -> String {
        let fields = [
            Self::escape_field(series.kpi.label()),
            Self::escape_field(&point.label),
            Self::escape_field(&point.footprint.predecessor),
            Self::escape_field(&point.footprint.successor),
            point.value.to_string(),
            point.delta.to_string(),
            series.mean.to_string(),
            series.spread.to_string(),
            Self::escape_field(&point.band.to_string()),
            Self::escape_field(point.color),
        ];
        fields.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(Self::header());
        output.push('\n');

        for series in &self.series {
            for point in series.visible_points(self.outliers_only) {
                output.push_str(&Self::format_point(series, point));
                output.push('\n');
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Band;
    use crate::footprint::{Footprint, FootprintAnalysis, FootprintKpis};
    use crate::kpi::{Kpi, KpiValues};

    fn series() -> ScatterSeries {
        let analysis = FootprintAnalysis {
            footprints: vec![
                FootprintKpis {
                    footprint: Footprint::new("0010", "0020"),
                    means: KpiValues { rejected_quantity: 2.0, ..Default::default() },
                    deltas: KpiValues { rejected_quantity: 0.0, ..Default::default() },
                    contract_count: 1,
                },
                FootprintKpis {
                    footprint: Footprint::new("0020", "Pack, ship"),
                    means: KpiValues { rejected_quantity: 10.0, ..Default::default() },
                    deltas: KpiValues { rejected_quantity: 8.0, ..Default::default() },
                    contract_count: 1,
                },
            ],
            contracts: Default::default(),
        };
        ScatterSeries::from_analysis(&analysis, Kpi::RejectedQuantity, 2.0, 1.0)
    }

    #[test]
    fn test_csv_escape_field_simple() {
        assert_eq!(CsvReport::escape_field("hello"), "hello");
    }

    #[test]
    fn test_csv_escape_field_with_comma() {
        assert_eq!(CsvReport::escape_field("hello,world"), "\"hello,world\"");
    }

    #[test]
    fn test_csv_escape_field_with_quote() {
        assert_eq!(CsvReport::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_rows() {
        let s = series();
        assert_eq!(s.points[0].band, Band::Neutral);

        let mut report = CsvReport::new(false);
        report.add_series(&s);
        let csv = report.to_csv();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CsvReport::header());
        assert_eq!(
            lines[1],
            "Rejected Materials,0010 -> 0020,0010,0020,2,0,2,1,NEUTRAL,blue"
        );
        assert!(lines[2].contains("\"0020 -> Pack, ship\",0020,\"Pack, ship\",10,8"));
        assert!(lines[2].ends_with("DEGRADED LEVEL_4,#850000"));
    }

    #[test]
    fn test_csv_outliers_only() {
        let s = series();
        let mut report = CsvReport::new(true);
        report.add_series(&s);

        let csv = report.to_csv();
        assert_eq!(csv.lines().count(), 2);
        assert!(!csv.contains("NEUTRAL"));
    }
}
