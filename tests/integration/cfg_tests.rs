//! Control-flow graph integration tests.
//!
//! Exercise the full pipeline: temp file on disk, tree-sitter parse,
//! lowering, rendering.

use std::io::Write;

use flowmood::cfg::{self, FunctionCfg, NodeId};
use flowmood::FlowError;

fn temp_c_file(source: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".c")
        .tempfile()
        .expect("temp file");
    f.write_all(source.as_bytes()).expect("write");
    f
}

fn node_by_label(cfg: &FunctionCfg, label: &str) -> NodeId {
    cfg.graph
        .iter()
        .find(|n| n.kind.label() == label)
        .unwrap_or_else(|| panic!("no node labeled {label:?}"))
        .id
}

const LOOP_FN: &str = r#"
int sum(int n) {
    int total = 0;
    for (int i = 0; i < n; i++) {
        if (i == 3) {
            continue;
        }
        total = total + i;
    }
    return total;
}
"#;

#[test]
fn test_loop_function_end_to_end() {
    let f = temp_c_file(LOOP_FN);
    let cfg = cfg::extract_from_file(f.path(), "sum").expect("extract");
    assert_eq!(cfg.name, "sum");
    assert_eq!(cfg.graph.node(cfg.entry).kind.label(), "sum(n)");

    let loop_cond = node_by_label(&cfg, "i < n");
    let if_cond = node_by_label(&cfg, "i == 3");
    let inc = node_by_label(&cfg, "i++");
    let body = node_by_label(&cfg, "total = total + i");
    let ret = node_by_label(&cfg, "return total");

    assert_eq!(cfg.graph.node(loop_cond).true_edge, Some(if_cond));
    assert_eq!(cfg.graph.node(loop_cond).false_edge, Some(ret));
    assert_eq!(cfg.graph.node(if_cond).true_edge, Some(inc));
    assert_eq!(cfg.graph.node(if_cond).false_edge, Some(body));
    assert_eq!(cfg.graph.node(body).true_edge, Some(inc));
    assert_eq!(cfg.graph.node(inc).true_edge, Some(loop_cond));
}

#[test]
fn test_dot_output_shape() {
    let f = temp_c_file(LOOP_FN);
    let cfg = cfg::extract_from_file(f.path(), "sum").expect("extract");
    let dot = cfg::to_dot(&cfg.graph, cfg.entry);

    assert!(dot.starts_with("digraph FlowGraph {"));
    assert!(dot.trim_end().ends_with('}'));
    assert!(dot.contains("[shape=ellipse, label=\"sum(n)\"];"));
    assert!(dot.contains("[shape=diamond, label=\"i \\< n\"];"));
    assert!(dot.contains("[shape=rectangle, label=\"i++\"];"));
    assert!(dot.contains("[label=\"true\"]"));
    assert!(dot.contains("[label=\"false\"]"));
    // Rendering twice gives the same bytes.
    assert_eq!(dot, cfg::to_dot(&cfg.graph, cfg.entry));
}

#[test]
fn test_break_jumps_past_loop() {
    let src = r#"
void find(int n) {
    int i;
    for (i = 0; i < n; i++) {
        if (i == 5) {
            break;
        }
    }
    log(i);
}
"#;
    let f = temp_c_file(src);
    let cfg = cfg::extract_from_file(f.path(), "find").expect("extract");
    let if_cond = node_by_label(&cfg, "i == 5");
    let after = node_by_label(&cfg, "log(i)");
    let inc = node_by_label(&cfg, "i++");
    assert_eq!(cfg.graph.node(if_cond).true_edge, Some(after));
    assert_eq!(cfg.graph.node(if_cond).false_edge, Some(inc));
}

#[test]
fn test_json_output_parses() {
    let f = temp_c_file(LOOP_FN);
    let cfg = cfg::extract_from_file(f.path(), "sum").expect("extract");
    let json = cfg::to_json(&cfg.graph).expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let nodes = value["nodes"].as_array().expect("nodes array");
    assert_eq!(nodes.len(), cfg.graph.len());
}

#[test]
fn test_malformed_for_reports_parse_error() {
    let f = temp_c_file("void spin(void) { for (;;) { tick(); } }");
    let err = cfg::extract_from_file(f.path(), "spin").unwrap_err();
    assert!(matches!(err, FlowError::Parse { .. }));
}

#[test]
fn test_extract_all_isolates_failures() {
    let src = r#"
void spin(void) { for (;;) { tick(); } }
int ok(void) { return 1; }
"#;
    let f = temp_c_file(src);
    let cfgs = cfg::extract_all_from_file(f.path()).expect("extract all");
    assert_eq!(cfgs.len(), 1);
    assert_eq!(cfgs[0].name, "ok");
}

#[test]
fn test_function_not_found() {
    let f = temp_c_file("int f(void) { return 0; }");
    let err = cfg::extract_from_file(f.path(), "missing").unwrap_err();
    assert!(matches!(err, FlowError::FunctionNotFound(_)));
}
