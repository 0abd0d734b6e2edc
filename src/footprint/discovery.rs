use crate::footprint::Footprint;
use chrono::NaiveDateTime;
use indexmap::{IndexMap, IndexSet};

/// Insertion-ordered set of footprints
pub type FootprintSet = IndexSet<Footprint>;

/// Event projected onto the three fields discovery needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracedEvent<'a> {
    pub case: &'a str,
    pub activity: &'a str,
    pub timestamp: NaiveDateTime,
}

/// Directly-follows graph: edge frequencies plus start/end activity counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectlyFollowsGraph {
    /// Footprint → number of times observed across all cases
    pub edges: IndexMap<Footprint, usize>,
    /// Activity → number of cases starting with it
    pub start_activities: IndexMap<String, usize>,
    /// Activity → number of cases ending with it
    pub end_activities: IndexMap<String, usize>,
}

impl DirectlyFollowsGraph {
    /// Deduplicated footprints in first-observed order
    pub fn footprints(&self) -> FootprintSet {
        self.edges.keys().cloned().collect()
    }

    /// All activities appearing as node in the graph
    pub fn activities(&self) -> IndexSet<&str> {
        let mut nodes = IndexSet::new();
        for activity in self.start_activities.keys() {
            nodes.insert(activity.as_str());
        }
        for fp in self.edges.keys() {
            nodes.insert(fp.predecessor.as_str());
            nodes.insert(fp.successor.as_str());
        }
        for activity in self.end_activities.keys() {
            nodes.insert(activity.as_str());
        }
        nodes
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.start_activities.is_empty()
    }
}

/// Process discovery algorithm turning traced events into a directly-follows graph
pub trait DiscoveryPrimitive {
    fn discover(&self, events: &[TracedEvent<'_>]) -> DirectlyFollowsGraph;
}

/// Plain directly-follows discovery
///
/// Groups events by case, orders each case by timestamp (stable, so equal
/// timestamps keep input order) and emits every adjacent activity pair.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use huella::footprint::{DirectlyFollowsMiner, DiscoveryPrimitive, Footprint, TracedEvent};
///
/// let day = NaiveDate::from_ymd_opt(2023, 1, 9).unwrap();
/// let events = vec![
///     TracedEvent { case: "c1", activity: "B", timestamp: day.and_hms_opt(9, 0, 0).unwrap() },
///     TracedEvent { case: "c1", activity: "A", timestamp: day.and_hms_opt(8, 0, 0).unwrap() },
/// ];
///
/// let dfg = DirectlyFollowsMiner.discover(&events);
/// assert_eq!(dfg.edges.get(&Footprint::new("A", "B")), Some(&1));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectlyFollowsMiner;

impl DiscoveryPrimitive for DirectlyFollowsMiner {
    fn discover(&self, events: &[TracedEvent<'_>]) -> DirectlyFollowsGraph {
        let mut cases: IndexMap<&str, Vec<&TracedEvent<'_>>> = IndexMap::new();
        for event in events {
            cases.entry(event.case).or_default().push(event);
        }

        let mut dfg = DirectlyFollowsGraph::default();

        for trace in cases.values_mut() {
            trace.sort_by_key(|e| e.timestamp);

            if let Some(first) = trace.first() {
                *dfg.start_activities.entry(first.activity.to_string()).or_insert(0) += 1;
            }
            if let Some(last) = trace.last() {
                *dfg.end_activities.entry(last.activity.to_string()).or_insert(0) += 1;
            }

            // Sliding window of size 2
            for pair in trace.windows(2) {
                let fp = Footprint::new(pair[0].activity, pair[1].activity);
                *dfg.edges.entry(fp).or_insert(0) += 1;
            }
        }

        dfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 9)
            .and_then(|d| d.and_hms_opt(8, minute, 0))
            .unwrap()
    }

    fn ev<'a>(case: &'a str, activity: &'a str, minute: u32) -> TracedEvent<'a> {
        TracedEvent {
            case,
            activity,
            timestamp: at(minute),
        }
    }

    #[test]
    fn test_discover_basic_chain() {
        let events = vec![ev("c1", "A", 0), ev("c1", "B", 1), ev("c1", "C", 2)];

        let dfg = DirectlyFollowsMiner.discover(&events);

        assert_eq!(dfg.edge_count(), 2);
        assert_eq!(dfg.edges.get(&Footprint::new("A", "B")), Some(&1));
        assert_eq!(dfg.edges.get(&Footprint::new("B", "C")), Some(&1));
        assert_eq!(dfg.start_activities.get("A"), Some(&1));
        assert_eq!(dfg.end_activities.get("C"), Some(&1));
    }

    #[test]
    fn test_discover_orders_by_timestamp() {
        let events = vec![ev("c1", "C", 5), ev("c1", "A", 1), ev("c1", "B", 3)];

        let dfg = DirectlyFollowsMiner.discover(&events);
        let fps: Vec<_> = dfg.footprints().into_iter().collect();

        assert_eq!(fps, vec![Footprint::new("A", "B"), Footprint::new("B", "C")]);
    }

    #[test]
    fn test_discover_does_not_cross_cases() {
        let events = vec![ev("c1", "A", 0), ev("c2", "B", 1)];

        let dfg = DirectlyFollowsMiner.discover(&events);

        assert!(dfg.edges.is_empty());
        assert_eq!(dfg.start_activities.len(), 2);
        assert_eq!(dfg.end_activities.len(), 2);
    }

    #[test]
    fn test_discover_counts_repeated_pairs_across_cases() {
        let events = vec![
            ev("c1", "A", 0),
            ev("c1", "B", 1),
            ev("c2", "A", 0),
            ev("c2", "B", 1),
        ];

        let dfg = DirectlyFollowsMiner.discover(&events);

        assert_eq!(dfg.edges.len(), 1);
        assert_eq!(dfg.edges.get(&Footprint::new("A", "B")), Some(&2));
        assert_eq!(dfg.start_activities.get("A"), Some(&2));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let events = vec![ev("c1", "X", 0), ev("c1", "Y", 0)];

        let dfg = DirectlyFollowsMiner.discover(&events);
        assert!(dfg.edges.contains_key(&Footprint::new("X", "Y")));
        assert!(!dfg.edges.contains_key(&Footprint::new("Y", "X")));
    }

    #[test]
    fn test_activities_include_isolated_nodes() {
        let events = vec![ev("c1", "A", 0), ev("c1", "B", 1), ev("c2", "Z", 0)];

        let dfg = DirectlyFollowsMiner.discover(&events);
        let nodes = dfg.activities();

        assert!(nodes.contains("A"));
        assert!(nodes.contains("B"));
        assert!(nodes.contains("Z"));
    }
}
