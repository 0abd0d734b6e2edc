use crate::error::{AnalysisError, Result};
use crate::footprint::discovery::FootprintSet;
use crate::footprint::Footprint;
use crate::kpi::{ContractKpis, Kpi, KpiValues};
use indexmap::IndexMap;
use serde::Serialize;

/// Running KPI sums for one footprint
///
/// Created on the first contribution, so `count >= 1` always holds. Means are
/// only computed by [`FootprintKpiAccumulator::mean`], never updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FootprintKpiAccumulator {
    sums: KpiValues,
    count: usize,
}

impl FootprintKpiAccumulator {
    fn first(values: &KpiValues) -> Self {
        Self {
            sums: *values,
            count: 1,
        }
    }

    /// Add one contract's means (all four fields at once)
    fn add(&mut self, values: &KpiValues) {
        self.sums = self.sums.add(values);
        self.count += 1;
    }

    pub fn sums(&self) -> &KpiValues {
        &self.sums
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> KpiValues {
        self.sums.div(self.count)
    }
}

/// Finalized KPI attribution of one footprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootprintKpis {
    pub footprint: Footprint,
    /// Mean of the contributing contracts' KPI means
    pub means: KpiValues,
    /// `means - population baseline`
    pub deltas: KpiValues,
    /// Number of contributing contracts
    pub contract_count: usize,
}

/// Result of footprint KPI attribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FootprintAnalysis {
    /// One entry per footprint with at least one contribution, universe order
    pub footprints: Vec<FootprintKpis>,
    /// Footprint → contracts exhibiting it, in processing order
    pub contracts: IndexMap<Footprint, Vec<String>>,
}

impl FootprintAnalysis {
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    pub fn get(&self, footprint: &Footprint) -> Option<&FootprintKpis> {
        self.footprints.iter().find(|f| &f.footprint == footprint)
    }

    /// Plot labels, index-aligned with [`Self::values`]
    pub fn labels(&self) -> Vec<String> {
        self.footprints.iter().map(|f| f.footprint.label()).collect()
    }

    pub fn values(&self, kpi: Kpi) -> Vec<f64> {
        self.footprints.iter().map(|f| f.means.get(kpi)).collect()
    }

    pub fn deltas(&self, kpi: Kpi) -> Vec<f64> {
        self.footprints.iter().map(|f| f.deltas.get(kpi)).collect()
    }

    /// Footprint-level means, one sample per footprint
    pub fn means(&self) -> Vec<KpiValues> {
        self.footprints.iter().map(|f| f.means).collect()
    }
}

/// Per-invocation accumulation state, keyed by footprint
#[derive(Debug, Clone)]
pub struct FootprintAccumulator {
    universe: FootprintSet,
    accumulators: IndexMap<Footprint, FootprintKpiAccumulator>,
    contracts: IndexMap<Footprint, Vec<String>>,
}

impl FootprintAccumulator {
    /// Start accumulating over the population footprints
    pub fn new(universe: FootprintSet) -> Self {
        Self {
            universe,
            accumulators: IndexMap::new(),
            contracts: IndexMap::new(),
        }
    }

    /// Attribute one contract's KPI means to its universe footprints
    ///
    /// Footprints not in the universe are discarded. Returns the number of
    /// footprints the contract contributed to.
    pub fn record_contract(
        &mut self,
        contract_id: &str,
        means: &KpiValues,
        footprints: &FootprintSet,
    ) -> usize {
        let mut attributed = 0;

        for fp in footprints.iter().filter(|fp| self.universe.contains(*fp)) {
            match self.accumulators.get_mut(fp) {
                Some(acc) => acc.add(means),
                None => {
                    self.accumulators
                        .insert(fp.clone(), FootprintKpiAccumulator::first(means));
                }
            }
            self.contracts
                .entry(fp.clone())
                .or_default()
                .push(contract_id.to_string());
            attributed += 1;
        }

        attributed
    }

    pub fn accumulator(&self, footprint: &Footprint) -> Option<&FootprintKpiAccumulator> {
        self.accumulators.get(footprint)
    }

    /// Compute means and deltas against the population baseline
    ///
    /// Universe footprints that never received a contribution are omitted.
    pub fn finalize(mut self, baseline: &KpiValues) -> FootprintAnalysis {
        let mut analysis = FootprintAnalysis::default();

        for fp in &self.universe {
            let Some(acc) = self.accumulators.get(fp) else {
                continue;
            };

            let means = acc.mean();
            analysis.footprints.push(FootprintKpis {
                footprint: fp.clone(),
                means,
                deltas: means.sub(baseline),
                contract_count: acc.count(),
            });

            if let Some(contracts) = self.contracts.swap_remove(fp) {
                analysis.contracts.insert(fp.clone(), contracts);
            }
        }

        analysis
    }
}

/// Attribute per-contract KPI means to the population footprints
///
/// Contracts are processed in `per_contract_footprints` order.
///
/// # Errors
/// `AnalysisError::UnknownContract` if a contract with footprints has no KPI
/// record.
pub fn accumulate(
    baseline_footprints: &FootprintSet,
    per_contract_kpis: &IndexMap<String, ContractKpis>,
    per_contract_footprints: &IndexMap<String, FootprintSet>,
    baseline: &KpiValues,
) -> Result<FootprintAnalysis> {
    let mut accumulator = FootprintAccumulator::new(baseline_footprints.clone());

    for (contract, footprints) in per_contract_footprints {
        let kpis = per_contract_kpis
            .get(contract)
            .ok_or_else(|| AnalysisError::UnknownContract(contract.clone()))?;

        let attributed = accumulator.record_contract(contract, &kpis.means, footprints);
        tracing::trace!(
            "Contract {} contributed to {} footprints",
            contract,
            attributed
        );
    }

    Ok(accumulator.finalize(baseline))
}
