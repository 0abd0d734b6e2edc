//! Plain-text output: one table per KPI

use crate::analysis::AnalysisReport;
use crate::report::ScatterSeries;
use std::fmt::Write;

/// Text table formatter
#[derive(Debug)]
pub struct TextReport<'a> {
    report: &'a AnalysisReport,
    outliers_only: bool,
}

impl<'a> TextReport<'a> {
    pub fn new(report: &'a AnalysisReport, outliers_only: bool) -> Self {
        Self {
            report,
            outliers_only,
        }
    }

    fn render_series(&self, out: &mut String, series: &ScatterSeries) {
        let _ = writeln!(
            out,
            "== {} [{}] mean={:.4} spread={:.4} band=[{:.4}, {:.4}] outliers={}",
            series.kpi.label(),
            series.kpi.unit(),
            series.mean,
            series.spread,
            series.lower_line,
            series.upper_line,
            series.outlier_count()
        );

        let width = series
            .points
            .iter()
            .map(|p| p.label.chars().count())
            .max()
            .unwrap_or(0)
            .max("footprint".len());

        let _ = writeln!(
            out,
            "{:<width$}  {:>14}  {:>14}  band",
            "footprint",
            "value",
            "delta",
            width = width
        );

        for point in series.visible_points(self.outliers_only) {
            let _ = writeln!(
                out,
                "{:<width$}  {:>14.4}  {:>+14.4}  {}",
                point.label,
                point.value,
                point.delta,
                point.band,
                width = width
            );
        }
    }

    pub fn to_text(&self) -> String {
        let r = self.report;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} events, {} contracts, {} footprints",
            r.event_count,
            r.contracts.len(),
            r.footprints.len()
        );

        for series in &r.series {
            out.push('\n');
            self.render_series(&mut out, series);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FootprintAnalyzer;
    use crate::config::AnalysisConfig;
    use crate::event::EventRecord;
    use crate::kpi::Kpi;
    use chrono::NaiveDate;

    fn report() -> AnalysisReport {
        let day = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let events = vec![
            EventRecord::new("c1", "0010", day.and_hms_opt(8, 0, 0)),
            EventRecord::new("c1", "0020", day.and_hms_opt(9, 0, 0)),
        ];
        FootprintAnalyzer::new(AnalysisConfig::default())
            .with_kpis(&[Kpi::Oee, Kpi::RejectedQuantity])
            .analyze(&events)
            .unwrap()
    }

    #[test]
    fn test_text_report() {
        let text = TextReport::new(&report(), false).to_text();

        assert!(text.starts_with("2 events, 1 contracts, 1 footprints"));
        assert!(text.contains("== OEE [ratio]"));
        assert!(text.contains("== Rejected Materials [pcs]"));
        assert!(text.contains("0010 -> 0020"));
        assert!(text.contains("NEUTRAL"));
    }

    #[test]
    fn test_text_outliers_only() {
        let text = TextReport::new(&report(), true).to_text();
        assert!(!text.contains("0010 -> 0020"));
        assert!(text.contains("outliers=0"));
    }
}
