//! Analysis driver: population baseline → footprint attribution → classification
//!
//! The population is every event handed to [`FootprintAnalyzer::analyze`]. Its
//! KPI means are the baseline and its footprints form the reporting universe.
//! Contracts in scope (all of them, or those matching a regex) are then
//! aggregated per contract and their footprints extracted in parallel; results
//! are merged in contract order so the output does not depend on scheduling.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::event::{contract_ids, EventRecord};
use crate::footprint::{
    accumulate, DirectlyFollowsGraph, FieldMapping, FootprintAnalysis, FootprintExtractor,
    FootprintSet,
};
use crate::kpi::{aggregate_baseline, aggregate_by_contract, spread, ContractKpis, Kpi, KpiValues};
use crate::report::ScatterSeries;
use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;

/// Everything one analysis run produces
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Population KPI means
    pub baseline: KpiValues,
    /// Population std dev over footprint-level means
    pub spread: KpiValues,
    /// Number of events in the population
    pub event_count: usize,
    /// Per-contract KPI means, scope order
    pub contracts: IndexMap<String, ContractKpis>,
    pub footprints: FootprintAnalysis,
    /// One series per selected KPI
    pub series: Vec<ScatterSeries>,
    pub population_dfg: DirectlyFollowsGraph,
}

impl AnalysisReport {
    pub fn series_for(&self, kpi: Kpi) -> Option<&ScatterSeries> {
        self.series.iter().find(|s| s.kpi == kpi)
    }
}

/// Runs footprint KPI analysis over an event population
pub struct FootprintAnalyzer {
    config: AnalysisConfig,
    kpis: Vec<Kpi>,
    mapping: FieldMapping,
    scope: Option<Regex>,
}

impl FootprintAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            kpis: Kpi::ALL.to_vec(),
            mapping: FieldMapping::production(),
            scope: None,
        }
    }

    /// Restrict the reported series; an empty list keeps all KPIs
    pub fn with_kpis(mut self, kpis: &[Kpi]) -> Self {
        if !kpis.is_empty() {
            let mut selected: Vec<Kpi> = Vec::with_capacity(kpis.len());
            for kpi in kpis {
                if !selected.contains(kpi) {
                    selected.push(*kpi);
                }
            }
            self.kpis = selected;
        }
        self
    }

    /// Only attribute contracts whose id matches `pattern`
    pub fn with_contract_scope(mut self, pattern: Regex) -> Self {
        self.scope = Some(pattern);
        self
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn kpis(&self) -> &[Kpi] {
        &self.kpis
    }

    /// Run the full pipeline
    ///
    /// # Errors
    /// `AnalysisError::InvalidConfig` if the configuration does not validate.
    /// `AnalysisError::InsufficientData` if the population is empty, fewer
    /// contracts than `min_contracts` are in scope, or no footprint could be
    /// attributed.
    pub fn analyze(&self, events: &[EventRecord]) -> Result<AnalysisReport> {
        self.config.validate().map_err(AnalysisError::InvalidConfig)?;

        if events.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "event population is empty".to_string(),
            ));
        }

        let baseline = aggregate_baseline(events)?;
        let extractor = FootprintExtractor::new(self.mapping);
        let universe = extractor.extract_footprints(events);
        tracing::info!(
            "Population: {} events, {} footprints",
            events.len(),
            universe.len()
        );

        let scope = self.contracts_in_scope(events);
        if scope.len() < self.config.min_contracts {
            return Err(AnalysisError::InsufficientData(format!(
                "{} contracts in scope, at least {} required",
                scope.len(),
                self.config.min_contracts
            )));
        }

        let (contract_kpis, contract_footprints) = self.per_contract(events, &scope, &extractor)?;
        let footprints = accumulate(&universe, &contract_kpis, &contract_footprints, &baseline)?;
        if footprints.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no footprints found for {} contracts",
                scope.len()
            )));
        }
        tracing::info!(
            "Attributed {} contracts to {} footprints",
            contract_kpis.len(),
            footprints.len()
        );

        // Non-empty footprints guarantee at least one sample
        let spread = spread(&footprints.means()).unwrap_or_default();
        let series = ScatterSeries::for_kpis(&footprints, &self.kpis, &baseline, &spread);

        for s in &series {
            tracing::debug!(
                "{}: mean {:.4}, spread {:.4}, {} outliers",
                s.kpi.label(),
                s.mean,
                s.spread,
                s.outlier_count()
            );
        }

        let population_dfg = extractor.discover(events);

        Ok(AnalysisReport {
            baseline,
            spread,
            event_count: events.len(),
            contracts: contract_kpis,
            footprints,
            series,
            population_dfg,
        })
    }

    fn contracts_in_scope(&self, events: &[EventRecord]) -> Vec<String> {
        let all = contract_ids(events);
        match &self.scope {
            Some(pattern) => {
                let scoped: Vec<String> = all.into_iter().filter(|c| pattern.is_match(c)).collect();
                tracing::debug!(
                    "{} contracts match scope '{}'",
                    scoped.len(),
                    pattern.as_str()
                );
                scoped
            }
            None => all,
        }
    }

    /// Per-contract KPI means and footprints of the contracts in `scope`
    ///
    /// Footprint extraction runs in parallel per contract; results are
    /// collected in scope order.
    #[allow(clippy::type_complexity)]
    fn per_contract(
        &self,
        events: &[EventRecord],
        scope: &[String],
        extractor: &FootprintExtractor,
    ) -> Result<(IndexMap<String, ContractKpis>, IndexMap<String, FootprintSet>)> {
        let mut groups: IndexMap<&str, Vec<&EventRecord>> =
            scope.iter().map(|c| (c.as_str(), Vec::new())).collect();
        for event in events {
            if let Some(rows) = groups.get_mut(event.contract_id.as_str()) {
                rows.push(event);
            }
        }

        let kpis = aggregate_by_contract(groups.values().flatten().copied())?;

        let groups: Vec<(&str, Vec<&EventRecord>)> = groups.into_iter().collect();
        let extracted: Vec<(String, FootprintSet)> = groups
            .par_iter()
            .map(|(contract, rows)| {
                (
                    contract.to_string(),
                    extractor.extract_footprints(rows.iter().copied()),
                )
            })
            .collect();

        Ok((kpis, extracted.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Band, Direction, Severity};
    use crate::footprint::Footprint;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2023, 6, 1).and_then(|d| d.and_hms_opt(hour, 0, 0))
    }

    fn op(contract: &str, operation: &str, hour: u32, oee: f64) -> EventRecord {
        let mut e = EventRecord::new(contract, operation, at(hour));
        e.oee = oee;
        e
    }

    fn population() -> Vec<EventRecord> {
        vec![
            op("X", "A", 1, 0.9),
            op("X", "B", 2, 0.9),
            op("Y", "A", 1, 0.7),
            op("Y", "B", 2, 0.7),
            op("Z", "A", 1, 0.2),
            op("Z", "C", 2, 0.2),
        ]
    }

    #[test]
    fn test_analyze_population() {
        let report = FootprintAnalyzer::new(AnalysisConfig::default())
            .analyze(&population())
            .unwrap();

        assert_eq!(report.event_count, 6);
        assert!((report.baseline.oee - 0.6).abs() < 1e-12);
        assert_eq!(report.contracts.len(), 3);
        assert_eq!(report.footprints.len(), 2);
        assert_eq!(report.series.len(), 4);

        // Footprint means 0.8 and 0.2 → spread 0.3
        assert!((report.spread.oee - 0.3).abs() < 1e-12);

        let oee = report.series_for(Kpi::Oee).unwrap();
        let ac = oee
            .points
            .iter()
            .find(|p| p.footprint == Footprint::new("A", "C"))
            .unwrap();
        assert_eq!(
            ac.band,
            Band::Outlier {
                direction: Direction::Degraded,
                severity: Severity::Level1
            }
        );
        assert_eq!(report.population_dfg.edge_count(), 2);
    }

    #[test]
    fn test_contract_scope_keeps_population_baseline() {
        let report = FootprintAnalyzer::new(AnalysisConfig::default())
            .with_contract_scope(Regex::new("^[XY]$").unwrap())
            .analyze(&population())
            .unwrap();

        assert!((report.baseline.oee - 0.6).abs() < 1e-12);
        assert_eq!(report.contracts.len(), 2);
        assert_eq!(report.footprints.labels(), vec!["A -> B".to_string()]);
    }

    #[test]
    fn test_contract_means_match_per_contract_aggregation() {
        let events = population();
        let report = FootprintAnalyzer::new(AnalysisConfig::default())
            .with_contract_scope(Regex::new("^[XZ]$").unwrap())
            .analyze(&events)
            .unwrap();

        let scoped: Vec<&EventRecord> = events.iter().filter(|e| e.contract_id != "Y").collect();
        let expected = aggregate_by_contract(scoped).unwrap();
        assert_eq!(report.contracts, expected);
        assert_eq!(
            report.contracts.keys().collect::<Vec<_>>(),
            vec!["X", "Z"]
        );
    }

    #[test]
    fn test_kpi_selection_deduplicates() {
        let analyzer = FootprintAnalyzer::new(AnalysisConfig::default())
            .with_kpis(&[Kpi::LeadTime, Kpi::Oee, Kpi::LeadTime]);
        assert_eq!(analyzer.kpis(), &[Kpi::LeadTime, Kpi::Oee]);

        let report = analyzer.analyze(&population()).unwrap();
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.series[0].kpi, Kpi::LeadTime);
    }

    #[test]
    fn test_empty_population_is_insufficient() {
        let err = FootprintAnalyzer::new(AnalysisConfig::default())
            .analyze(&[])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn test_too_few_contracts_is_insufficient() {
        let err = FootprintAnalyzer::new(AnalysisConfig::strict())
            .analyze(&population())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn test_no_footprints_is_insufficient() {
        let events = vec![op("X", "A", 1, 0.5), op("Y", "A", 1, 0.5)];
        let err = FootprintAnalyzer::new(AnalysisConfig::default())
            .analyze(&events)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            min_contracts: 0,
            ..AnalysisConfig::default()
        };
        let err = FootprintAnalyzer::new(config)
            .analyze(&population())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_scope_without_matches_is_insufficient() {
        let err = FootprintAnalyzer::new(AnalysisConfig::default())
            .with_contract_scope(Regex::new("^nomatch$").unwrap())
            .analyze(&population())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }
}
