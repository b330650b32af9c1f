//! Flow-graph rendering.
//!
//! Provides two output formats:
//! - DOT (Graphviz): publication-quality graphs
//! - JSON: machine-readable via serde

use std::fmt::Write as _;

use rustc_hash::FxHashSet;

use crate::cfg::graph::{FlowGraph, NodeId};
use crate::error::Result;

/// Escape special characters for DOT labels.
///
/// - `\` -> `\\` (must be first to avoid double escaping)
/// - `"` -> `\"` (labels are quoted)
/// - `\n` -> `\n` escape sequence (multi-line declaration labels)
/// - `\r` -> removed
/// - record/HTML metacharacters are backslash-escaped
fn escape_dot_label(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('|', "\\|")
}

/// Render the graph reachable from `entry` as Graphviz DOT.
///
/// Traversal is depth-first with the true branch explored before the
/// false branch, so output is deterministic for a given graph. A node
/// whose two slots point at the same successor gets one unlabeled edge;
/// otherwise each occupied slot is emitted with a `true`/`false` label.
pub fn to_dot(graph: &FlowGraph, entry: NodeId) -> String {
    let mut out = String::from("digraph FlowGraph {\n");
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut stack = vec![entry];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let node = graph.node(id);
        let _ = writeln!(
            out,
            "  {} [shape={}, label=\"{}\"];",
            id,
            node.kind.shape(),
            escape_dot_label(&node.kind.label())
        );
        match (node.true_edge, node.false_edge) {
            (Some(t), Some(f)) if t == f => {
                let _ = writeln!(out, "  {} -> {};", id, t);
            }
            (t, f) => {
                if let Some(t) = t {
                    let _ = writeln!(out, "  {} -> {} [label=\"true\"];", id, t);
                }
                if let Some(f) = f {
                    let _ = writeln!(out, "  {} -> {} [label=\"false\"];", id, f);
                }
            }
        }
        // False pushed first so the true branch is visited first.
        if let Some(f) = node.false_edge {
            stack.push(f);
        }
        if let Some(t) = node.true_edge {
            stack.push(t);
        }
    }

    out.push_str("}\n");
    out
}

/// Serialize the whole arena as pretty-printed JSON.
pub fn to_json(graph: &FlowGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::graph::FlowGraph;

    #[test]
    fn test_escape_dot_label() {
        assert_eq!(escape_dot_label("a < b"), "a \\< b");
        assert_eq!(escape_dot_label("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_dot_label("a = 1\nb = 2"), "a = 1\\nb = 2");
        assert_eq!(escape_dot_label("p\\q"), "p\\\\q");
    }

    #[test]
    fn test_dot_shapes_and_edge_labels() {
        let mut g = FlowGraph::new();
        let entry = g.add_entry("f", vec![]);
        let cond = g.add_condition("x < 1");
        let a = g.add_statement("a = 1");
        let b = g.add_statement("b = 2");
        g.assign(entry, cond);
        g.assign_true(cond, a).unwrap();
        g.assign_false(cond, b).unwrap();
        let dot = to_dot(&g, entry);
        assert!(dot.starts_with("digraph FlowGraph {"));
        assert!(dot.contains("[shape=ellipse, label=\"f()\"];"));
        assert!(dot.contains("[shape=diamond, label=\"x \\< 1\"];"));
        assert!(dot.contains("[shape=rectangle, label=\"a = 1\"];"));
        assert!(dot.contains(&format!("{} -> {} [label=\"true\"];", cond, a)));
        assert!(dot.contains(&format!("{} -> {} [label=\"false\"];", cond, b)));
    }

    #[test]
    fn test_dot_merges_parallel_edges() {
        let mut g = FlowGraph::new();
        let cond = g.add_condition("c");
        let next = g.add_statement("n");
        g.assign_true(cond, next).unwrap();
        g.assign_false(cond, next).unwrap();
        let dot = to_dot(&g, cond);
        assert!(dot.contains(&format!("{} -> {};", cond, next)));
        assert!(!dot.contains("label=\"true\""));
    }

    #[test]
    fn test_dot_handles_cycles() {
        let mut g = FlowGraph::new();
        let cond = g.add_condition("i < 10");
        let body = g.add_statement("i++");
        g.assign_true(cond, body).unwrap();
        g.assign(body, cond);
        let dot = to_dot(&g, cond);
        // Each node rendered exactly once.
        assert_eq!(dot.matches("[shape=diamond").count(), 1);
        assert_eq!(dot.matches("[shape=rectangle").count(), 1);
    }

    #[test]
    fn test_dot_is_deterministic() {
        let mut g = FlowGraph::new();
        let entry = g.add_entry("f", vec![]);
        let a = g.add_statement("a");
        let b = g.add_statement("b");
        g.assign(entry, a);
        g.assign(a, b);
        assert_eq!(to_dot(&g, entry), to_dot(&g, entry));
    }

    #[test]
    fn test_json_round_trips() {
        let mut g = FlowGraph::new();
        let entry = g.add_entry("f", vec!["x".into()]);
        let s = g.add_statement("x = 1");
        g.assign(entry, s);
        let json = to_json(&g).unwrap();
        let back: FlowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.node(entry).true_edge, Some(s));
    }
}
