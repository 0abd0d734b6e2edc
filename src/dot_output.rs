//! Graphviz DOT rendering of directly-follows graphs
//!
//! Edges carry their observation count as label. Outlier footprints are
//! highlighted by [`EdgeMarking`]s, matched on the exact predecessor and
//! successor labels.

use crate::footprint::{DirectlyFollowsGraph, Footprint};
use crate::report::EdgeMarking;
use std::fmt::Write;

const START_NODE: &str = "@@start";
const END_NODE: &str = "@@end";
const DEFAULT_EDGE_COLOR: &str = "black";

/// Render `dfg` as a DOT digraph with `markings` applied
///
/// # Example
/// ```
/// use huella::dot_output::render_dot;
/// use huella::footprint::{DirectlyFollowsGraph, Footprint};
/// use huella::report::EdgeMarking;
///
/// let mut dfg = DirectlyFollowsGraph::default();
/// dfg.edges.insert(Footprint::new("0010", "0020"), 3);
///
/// let marking = EdgeMarking {
///     src: "0010".to_string(),
///     dest: "0020".to_string(),
///     color: "#850000".to_string(),
/// };
/// let dot = render_dot(&dfg, &[marking]);
/// assert!(dot.contains("\"0010\" -> \"0020\" [label=\"3\", color=\"#850000\""));
/// ```
pub fn render_dot(dfg: &DirectlyFollowsGraph, markings: &[EdgeMarking]) -> String {
    let mut out = String::new();

    out.push_str("digraph dfg {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box, style=\"rounded,filled\", fillcolor=\"#F5F5F5\", fontname=\"Helvetica\"];\n");
    out.push_str("  edge [fontname=\"Helvetica\"];\n");

    if !dfg.start_activities.is_empty() {
        let _ = writeln!(
            out,
            "  \"{}\" [label=\"\", shape=circle, style=filled, fillcolor=\"#32CD32\", width=0.3];",
            START_NODE
        );
    }
    if !dfg.end_activities.is_empty() {
        let _ = writeln!(
            out,
            "  \"{}\" [label=\"\", shape=doublecircle, style=filled, fillcolor=\"#FFA500\", width=0.3];",
            END_NODE
        );
    }

    for activity in dfg.activities() {
        let _ = writeln!(out, "  \"{}\";", escape_id(activity));
    }

    for (activity, count) in &dfg.start_activities {
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{}\", style=dashed];",
            START_NODE,
            escape_id(activity),
            count
        );
    }

    for (fp, count) in &dfg.edges {
        match marking_for(fp, markings) {
            Some(color) => {
                let _ = writeln!(
                    out,
                    "  \"{}\" -> \"{}\" [label=\"{}\", color=\"{}\", penwidth=2.5];",
                    escape_id(&fp.predecessor),
                    escape_id(&fp.successor),
                    count,
                    escape_id(color)
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "  \"{}\" -> \"{}\" [label=\"{}\", color=\"{}\"];",
                    escape_id(&fp.predecessor),
                    escape_id(&fp.successor),
                    count,
                    DEFAULT_EDGE_COLOR
                );
            }
        }
    }

    for (activity, count) in &dfg.end_activities {
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{}\", style=dashed];",
            escape_id(activity),
            END_NODE,
            count
        );
    }

    out.push_str("}\n");
    out
}

/// Color of the first marking matching `fp` exactly
fn marking_for<'m>(fp: &Footprint, markings: &'m [EdgeMarking]) -> Option<&'m str> {
    markings
        .iter()
        .find(|m| m.src == fp.predecessor && m.dest == fp.successor)
        .map(|m| m.color.as_str())
}

/// Escape text for a double-quoted DOT identifier
fn escape_id(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
