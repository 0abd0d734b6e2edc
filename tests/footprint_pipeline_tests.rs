// End-to-end library tests: CSV text → events → analysis → presentation

use huella::classify::{classify, Band, Direction, Severity};
use huella::config::AnalysisConfig;
use huella::dot_output::render_dot;
use huella::footprint::{accumulate, extract_footprints, FieldMapping, Footprint};
use huella::ingest::parse_event_log;
use huella::kpi::{aggregate_by_contract, Kpi, KpiValues};
use huella::report::{calculate_outlier_footprints, extract_edge_markings};
use huella::FootprintAnalyzer;
use indexmap::IndexMap;

const HEADER: &str = "Contract;Operation RelNr;Material Number;Setup Duration Actual;Processing Duration Actual;Teardown Duration Actual;Downtime Actual;Scrap Quantity Actual (Recording Unit);Start Date Actual;End Date Actual;Availability;Performance;Quality";

fn log(rows: &[&str]) -> String {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// Contracts X (OEE 0.9) and Y (OEE 0.7) share A -> B
#[test]
fn test_shared_footprint_scenario_from_csv() {
    let content = log(&[
        "X;A;M;0;10;0;0;0;;01/01/2023 08:00:00;0,9;1;1",
        "X;B;M;0;10;0;0;0;;01/01/2023 09:00:00;0,9;1;1",
        "Y;A;M;0;10;0;0;0;;02/01/2023 08:00:00;0,7;1;1",
        "Y;B;M;0;10;0;0;0;;02/01/2023 09:00:00;0,7;1;1",
    ]);
    let events = parse_event_log(&content, &AnalysisConfig::default()).unwrap();

    let universe = extract_footprints(&events, &FieldMapping::production());
    let kpis = aggregate_by_contract(&events).unwrap();
    let mut per_contract = IndexMap::new();
    for contract in ["X", "Y"] {
        let rows = events.iter().filter(|e| e.contract_id == contract);
        per_contract.insert(
            contract.to_string(),
            extract_footprints(rows, &FieldMapping::production()),
        );
    }

    let baseline = KpiValues {
        oee: 0.75,
        ..Default::default()
    };
    let analysis = accumulate(&universe, &kpis, &per_contract, &baseline).unwrap();
    let ab = analysis.get(&Footprint::new("A", "B")).unwrap();

    assert!((ab.means.oee - 0.8).abs() < 1e-9);
    assert!((ab.deltas.oee - 0.05).abs() < 1e-9);
    assert_eq!(
        classify(0.8, 0.75, 0.05, Kpi::Oee.reversed()),
        Band::Outlier {
            direction: Direction::Improved,
            severity: Severity::Level1
        }
    );
}

/// Slow detour route is flagged and highlighted in the graph
#[test]
fn test_detour_flagged_and_marked() {
    let content = log(&[
        "1;10;M;0:05:00;0:30:00;0:05:00;0;0;;01/01/2023 08:00:00;1;1;1",
        "1;20;M;0:05:00;0:30:00;0:05:00;0;0;;01/01/2023 09:00:00;1;1;1",
        "2;10;M;0:05:00;0:30:00;0:05:00;0;0;;02/01/2023 08:00:00;1;1;1",
        "2;20;M;0:05:00;0:30:00;0:05:00;0;0;;02/01/2023 09:00:00;1;1;1",
        "3;10;M;0:05:00;0:30:00;0:05:00;0;0;;03/01/2023 08:00:00;1;1;1",
        "3;20;M;0:05:00;0:30:00;0:05:00;0;0;;03/01/2023 09:00:00;1;1;1",
        "4;10;M;1:00:00;8:00:00;1:00:00;0;0;;04/01/2023 08:00:00;1;1;1",
        "4;15;M;1:00:00;8:00:00;1:00:00;0;0;;04/01/2023 18:00:00;1;1;1",
        "4;20;M;1:00:00;8:00:00;1:00:00;0;0;;05/01/2023 04:00:00;1;1;1",
    ]);
    let events = parse_event_log(&content, &AnalysisConfig::default()).unwrap();

    let report = FootprintAnalyzer::new(AnalysisConfig::default())
        .with_kpis(&[Kpi::LeadTime])
        .analyze(&events)
        .unwrap();

    let series = report.series_for(Kpi::LeadTime).unwrap();
    let outliers = calculate_outlier_footprints(series);

    let degraded: Vec<String> = outliers
        .iter()
        .filter(|(_, band)| band.direction() == Some(Direction::Degraded))
        .map(|(fp, _)| fp.label())
        .collect();
    assert_eq!(degraded, vec!["10 -> 15".to_string(), "15 -> 20".to_string()]);

    // The regular route sits below the lower bound and counts as improvement
    let regular = series
        .points
        .iter()
        .find(|p| p.label == "10 -> 20")
        .unwrap();
    assert_eq!(regular.band.direction(), Some(Direction::Improved));

    let dot = render_dot(&report.population_dfg, &extract_edge_markings(&outliers));
    assert!(dot.contains("\"10\" -> \"15\" [label=\"1\", color=\"#F15A59\", penwidth=2.5];"));
    assert!(dot.contains("\"10\" -> \"20\" [label=\"3\", color=\"#D0E7D2\", penwidth=2.5];"));
}
