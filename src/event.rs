//! Production execution event records and record-level filters

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// One row of production execution data
///
/// KPI fields are per-row values; the aggregator averages them per contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Case identifier (production order)
    pub contract_id: String,
    /// Activity label
    pub operation_id: String,
    /// Material produced by the contract
    pub material_number: String,
    /// Actual start of the operation
    pub start_timestamp: Option<NaiveDateTime>,
    /// Actual end of the operation (`None` while the operation is in progress)
    pub end_timestamp: Option<NaiveDateTime>,
    /// Overall equipment effectiveness (0.0 - 1.0)
    pub oee: f64,
    /// Setup + processing + teardown time
    #[serde(serialize_with = "serialize_duration_secs")]
    pub lead_time: Duration,
    /// Downtime caused by malfunctions
    #[serde(serialize_with = "serialize_duration_secs")]
    pub malfunction_duration: Duration,
    /// Scrap quantity
    pub rejected_quantity: f64,
}

impl EventRecord {
    /// Create a completed event with zeroed KPIs (test and fixture helper)
    pub fn new(contract_id: &str, operation_id: &str, end_timestamp: Option<NaiveDateTime>) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            operation_id: operation_id.to_string(),
            material_number: String::new(),
            start_timestamp: None,
            end_timestamp,
            oee: 0.0,
            lead_time: Duration::zero(),
            malfunction_duration: Duration::zero(),
            rejected_quantity: 0.0,
        }
    }

    /// Whether the operation has finished
    pub fn is_complete(&self) -> bool {
        self.end_timestamp.is_some()
    }
}

/// Convert a duration to fractional seconds
pub fn duration_secs(duration: Duration) -> f64 {
    duration.num_seconds() as f64 + f64::from(duration.subsec_nanos()) / 1e9
}

fn serialize_duration_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration_secs(*duration))
}

/// Drop unplanned rework records (operation id starting with `prefix`)
pub fn exclude_rework(events: Vec<EventRecord>, prefix: &str) -> Vec<EventRecord> {
    let before = events.len();
    let kept: Vec<EventRecord> = events
        .into_iter()
        .filter(|e| !e.operation_id.starts_with(prefix))
        .collect();

    tracing::debug!(
        "Excluded {} rework records (prefix '{}')",
        before - kept.len(),
        prefix
    );
    kept
}

/// Keep only records for one material number
pub fn filter_by_material(events: Vec<EventRecord>, material_number: &str) -> Vec<EventRecord> {
    events
        .into_iter()
        .filter(|e| e.material_number == material_number)
        .collect()
}

/// Keep completed records belonging to any of `contracts`
pub fn filter_by_contracts<'a, S: AsRef<str>>(
    events: &'a [EventRecord],
    contracts: &[S],
) -> Vec<&'a EventRecord> {
    let wanted: indexmap::IndexSet<&str> = contracts.iter().map(AsRef::as_ref).collect();
    events
        .iter()
        .filter(|e| e.is_complete() && wanted.contains(e.contract_id.as_str()))
        .collect()
}

/// Contract ids in first-seen order
pub fn contract_ids(events: &[EventRecord]) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    for event in events {
        seen.insert(event.contract_id.as_str());
    }
    seen.into_iter().map(str::to_string).collect()
}
