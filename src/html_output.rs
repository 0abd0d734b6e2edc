//! HTML output format for footprint reports
//!
//! Styled tables with embedded CSS; each value cell is colored by its band.

use crate::analysis::AnalysisReport;
use crate::classify::Band;
use crate::report::{ScatterSeries, ScoredFootprint};

/// HTML output formatter
#[derive(Debug)]
pub struct HtmlReport<'a> {
    report: &'a AnalysisReport,
    outliers_only: bool,
}

impl<'a> HtmlReport<'a> {
    pub fn new(report: &'a AnalysisReport, outliers_only: bool) -> Self {
        Self {
            report,
            outliers_only,
        }
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 8px;
            text-align: left;
        }
        th {
            background-color: #4a90d9;
            color: white;
            font-weight: bold;
        }
        tr:nth-child(even) {
            background-color: #f9f9f9;
        }
        .footprint {
            font-family: monospace;
            font-weight: bold;
        }
        .value {
            font-family: monospace;
        }
        .band-neutral {
            color: #0066cc;
        }
        .band-outlier {
            color: white;
            font-weight: bold;
        }
        .summary-table th {
            background-color: #5cb85c;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
    }

    fn format_point_row(point: &ScoredFootprint) -> String {
        let band_cell = match point.band {
            Band::Neutral => format!(
                r#"<td class="band-neutral">{}</td>"#,
                Self::escape_html(&point.band.to_string())
            ),
            Band::Outlier { .. } => format!(
                r#"<td class="band-outlier" style="background-color: {}">{}</td>"#,
                Self::escape_html(point.color),
                Self::escape_html(&point.band.to_string())
            ),
        };

        format!(
            r#"<tr><td class="footprint">{}</td><td class="value">{:.4}</td><td class="value">{:+.4}</td>{}</tr>"#,
            Self::escape_html(&point.label),
            point.value,
            point.delta,
            band_cell
        )
    }

    fn render_series(&self, series: &ScatterSeries) -> String {
        let mut html = String::new();

        html.push_str(&format!(
            "    <h2>{} ({})</h2>\n",
            Self::escape_html(series.kpi.label()),
            Self::escape_html(series.kpi.unit())
        ));
        html.push_str(&format!(
            "    <p>Mean {:.4}, spread {:.4}, band [{:.4}, {:.4}], {} outliers</p>\n",
            series.mean,
            series.spread,
            series.lower_line,
            series.upper_line,
            series.outlier_count()
        ));
        html.push_str("    <table>\n");
        html.push_str("        <tr><th>Footprint</th><th>Value</th><th>Delta</th><th>Band</th></tr>\n");

        for point in series.visible_points(self.outliers_only) {
            html.push_str("        ");
            html.push_str(&Self::format_point_row(point));
            html.push('\n');
        }

        html.push_str("    </table>\n");
        html
    }

    fn render_summary(&self) -> String {
        let r = self.report;
        let mut html = String::new();

        html.push_str("    <table class=\"summary-table\">\n");
        html.push_str("        <tr><th>Events</th><th>Contracts</th><th>Footprints</th><th>DFG edges</th></tr>\n");
        html.push_str(&format!(
            "        <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            r.event_count,
            r.contracts.len(),
            r.footprints.len(),
            r.population_dfg.edge_count()
        ));
        html.push_str("    </table>\n");
        html
    }

    /// Generate complete HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str("    <title>Footprint KPI Report</title>\n");
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str("    <h1>Footprint KPI Report</h1>\n");
        html.push_str(&self.render_summary());

        for series in &self.report.series {
            html.push_str(&self.render_series(series));
        }

        html.push_str("    <div class=\"footer\">\n");
        html.push_str("        Generated by huella\n");
        html.push_str("    </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        html
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

    fn analyze(paths: &[(&str, &[&str], i64)]) -> AnalysisReport {
        let day = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let mut events = Vec::new();
        for (contract, ops, lead_secs) in paths {
            for (i, op) in ops.iter().enumerate() {
                let mut e = EventRecord::new(contract, op, day.and_hms_opt(8 + i as u32, 0, 0));
                e.lead_time = chrono::Duration::seconds(*lead_secs);
                events.push(e);
            }
        }
        FootprintAnalyzer::new(AnalysisConfig::default())
            .with_kpis(&[Kpi::LeadTime])
            .analyze(&events)
            .unwrap()
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(HtmlReport::escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(HtmlReport::escape_html("a&b"), "a&amp;b");
        assert_eq!(HtmlReport::escape_html("\"test\""), "&quot;test&quot;");
        assert_eq!(HtmlReport::escape_html("'test'"), "&#39;test&#39;");
    }

    #[test]
    fn test_html_basic_structure() {
        let report = analyze(&[("c1", &["A", "B"], 60)]);
        let html = HtmlReport::new(&report, false).to_html();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("<h2>Lead Time (s)</h2>"));
        assert!(html.contains("A -&gt; B"));
        assert!(html.contains("band-neutral"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn test_html_outlier_cell_colored() {
        let report = analyze(&[
            ("c1", &["A", "B"], 60),
            ("c2", &["A", "B"], 60),
            ("c3", &["A", "C"], 600),
            ("c4", &["B", "D"], 60),
        ]);
        let html = HtmlReport::new(&report, false).to_html();

        assert!(html.contains("band-outlier"));
        assert!(html.contains("style=\"background-color: #"));
    }

    #[test]
    fn test_html_escape_xss() {
        let report = analyze(&[("c1", &["<script>alert('xss')</script>", "B"], 60)]);
        let html = HtmlReport::new(&report, false).to_html();

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_html_outliers_only() {
        let report = analyze(&[("c1", &["A", "B"], 60)]);
        let html = HtmlReport::new(&report, true).to_html();

        assert!(!html.contains("A -&gt; B"));
    }
}
