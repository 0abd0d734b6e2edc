// Footprint mining and KPI attribution
//
// A footprint is a directly-follows pair of operations (A → B) observed within
// one contract's chronological event sequence. Footprints are discovered once
// for the whole population (the reporting universe) and once per contract; each
// contract's KPI means are then attributed to every universe footprint it
// exhibits.
//
// Key Insight: a contract's route through the shop floor, not just its
// operation counts, explains its KPIs. Footprints whose attributed KPIs sit far
// from the population mean point at problematic transitions.

mod accumulator;
mod discovery;
mod extractor;

pub use accumulator::{
    accumulate, FootprintAccumulator, FootprintAnalysis, FootprintKpiAccumulator, FootprintKpis,
};
pub use discovery::{
    DirectlyFollowsGraph, DirectlyFollowsMiner, DiscoveryPrimitive, FootprintSet, TracedEvent,
};
pub use extractor::{extract_dfg_for_contracts, extract_footprints, FieldMapping, FootprintExtractor};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered pair of operations observed as directly consecutive
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Footprint {
    pub predecessor: String,
    pub successor: String,
}

impl Footprint {
    pub fn new(predecessor: impl Into<String>, successor: impl Into<String>) -> Self {
        Self {
            predecessor: predecessor.into(),
            successor: successor.into(),
        }
    }

    /// Plot label, e.g. `0010 -> 0020`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.predecessor, self.successor)
    }
}
