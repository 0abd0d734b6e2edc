use crate::event::EventRecord;
use crate::footprint::discovery::{
    DirectlyFollowsGraph, DirectlyFollowsMiner, DiscoveryPrimitive, FootprintSet, TracedEvent,
};
use chrono::NaiveDateTime;

/// Maps event records onto the time, case and activity fields discovery needs
///
/// Keeps the field selection local to the extractor so the event model never
/// has to be reshaped for a particular discovery algorithm.
#[derive(Clone, Copy)]
pub struct FieldMapping {
    pub time: fn(&EventRecord) -> Option<NaiveDateTime>,
    pub case: fn(&EventRecord) -> &str,
    pub activity: fn(&EventRecord) -> &str,
}

fn end_time(e: &EventRecord) -> Option<NaiveDateTime> {
    e.end_timestamp
}

fn start_time(e: &EventRecord) -> Option<NaiveDateTime> {
    e.start_timestamp
}

fn contract(e: &EventRecord) -> &str {
    &e.contract_id
}

fn operation(e: &EventRecord) -> &str {
    &e.operation_id
}

impl FieldMapping {
    /// End timestamp / contract / operation
    pub fn production() -> Self {
        Self {
            time: end_time,
            case: contract,
            activity: operation,
        }
    }

    /// Start timestamp / contract / operation
    pub fn by_start_time() -> Self {
        Self {
            time: start_time,
            ..Self::production()
        }
    }

    /// Project completed events, ordered by the mapped time
    ///
    /// An event without an end timestamp never takes part in discovery, even
    /// when ordering by another time field. Completed events lacking the
    /// mapped time are dropped as well.
    fn project<'a, I>(&self, events: I) -> Vec<TracedEvent<'a>>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut skipped = 0usize;
        let traced: Vec<TracedEvent<'a>> = events
            .into_iter()
            .filter_map(|e| match (self.time)(e).filter(|_| e.is_complete()) {
                Some(timestamp) => Some(TracedEvent {
                    case: (self.case)(e),
                    activity: (self.activity)(e),
                    timestamp,
                }),
                None => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            tracing::debug!("Skipped {} incomplete or untimed events", skipped);
        }
        traced
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::production()
    }
}

/// Footprint extraction over a pluggable discovery primitive
pub struct FootprintExtractor<D = DirectlyFollowsMiner> {
    mapping: FieldMapping,
    discovery: D,
}

impl FootprintExtractor<DirectlyFollowsMiner> {
    pub fn new(mapping: FieldMapping) -> Self {
        Self {
            mapping,
            discovery: DirectlyFollowsMiner,
        }
    }
}

impl Default for FootprintExtractor<DirectlyFollowsMiner> {
    fn default() -> Self {
        Self::new(FieldMapping::production())
    }
}

impl<D: DiscoveryPrimitive> FootprintExtractor<D> {
    pub fn with_discovery(mapping: FieldMapping, discovery: D) -> Self {
        Self { mapping, discovery }
    }

    /// Directly-follows graph of completed events
    pub fn discover<'a, I>(&self, events: I) -> DirectlyFollowsGraph
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let traced = self.mapping.project(events);
        self.discovery.discover(&traced)
    }

    /// Set of directly-follows pairs of completed events
    pub fn extract_footprints<'a, I>(&self, events: I) -> FootprintSet
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        self.discover(events).footprints()
    }
}

/// Extract footprints with the built-in directly-follows miner
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use huella::event::EventRecord;
/// use huella::footprint::{extract_footprints, FieldMapping, Footprint};
///
/// let day = NaiveDate::from_ymd_opt(2023, 1, 9).unwrap();
/// let events = vec![
///     EventRecord::new("c1", "0010", day.and_hms_opt(8, 0, 0)),
///     EventRecord::new("c1", "0020", day.and_hms_opt(9, 0, 0)),
///     EventRecord::new("c1", "0030", None), // still running
/// ];
///
/// let fps = extract_footprints(&events, &FieldMapping::production());
/// assert_eq!(fps.len(), 1);
/// assert!(fps.contains(&Footprint::new("0010", "0020")));
/// ```
pub fn extract_footprints<'a, I>(events: I, mapping: &FieldMapping) -> FootprintSet
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    FootprintExtractor::new(*mapping).extract_footprints(events)
}

/// Directly-follows graph restricted to `contracts`
pub fn extract_dfg_for_contracts<S: AsRef<str>>(
    events: &[EventRecord],
    contracts: &[S],
    mapping: &FieldMapping,
) -> DirectlyFollowsGraph {
    let selected = crate::event::filter_by_contracts(events, contracts);
    FootprintExtractor::new(*mapping).discover(selected)
}
