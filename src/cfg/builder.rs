//! Flow-graph extraction from source files.
//!
//! Locates function definitions with a tree-sitter query and lowers each
//! body into its own [`FlowGraph`].

use std::fs;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tracing::{debug, warn};
use tree_sitter::{Node, Query, QueryCursor, Tree};

use crate::cfg::graph::{FlowGraph, NodeId};
use crate::cfg::lower::lower_function;
use crate::error::{FlowError, Result};
use crate::lang::traits::node_text;
use crate::lang::{Language, LanguageRegistry};

/// A lowered function: its name, the node arena, and the entry node.
#[derive(Debug, Clone)]
pub struct FunctionCfg {
    pub name: String,
    pub graph: FlowGraph,
    pub entry: NodeId,
}

/// Extract the flow graph of `function_name` from a source file.
pub fn extract_from_file(path: &Path, function_name: &str) -> Result<FunctionCfg> {
    let lang = detect(path)?;
    let source = fs::read_to_string(path).map_err(|e| FlowError::io_with_path(e, path))?;
    extract_with_language(lang, &source, function_name).map_err(|e| contextualize(e, path))
}

/// Extract the flow graph of `function_name` from C source text.
pub fn extract_from_source(source: &str, function_name: &str) -> Result<FunctionCfg> {
    extract_with_language(&crate::lang::c::C, source, function_name)
}

/// Extract flow graphs for every function in a source file.
///
/// A function whose body cannot be lowered is logged and skipped; it
/// never takes the other functions down with it.
pub fn extract_all_from_file(path: &Path) -> Result<Vec<FunctionCfg>> {
    let lang = detect(path)?;
    let source = fs::read_to_string(path).map_err(|e| FlowError::io_with_path(e, path))?;
    let (tree, query) = parse_and_query(lang, &source)?;
    let mut cfgs = Vec::new();
    for (func, name) in function_matches(&tree, &query, &source) {
        match lower_one(func, &source, &name) {
            Ok(cfg) => cfgs.push(cfg),
            Err(e) => warn!(function = %name, error = %e, "skipping function"),
        }
    }
    Ok(cfgs)
}

fn detect(path: &Path) -> Result<&'static dyn Language> {
    LanguageRegistry::global()
        .detect_language(path)
        .ok_or_else(|| FlowError::UnsupportedLanguage(path.display().to_string()))
}

fn contextualize(e: FlowError, path: &Path) -> FlowError {
    match e {
        FlowError::MalformedStatement(msg) => FlowError::Parse {
            file: path.display().to_string(),
            message: msg,
        },
        other => other,
    }
}

fn parse_and_query(lang: &dyn Language, source: &str) -> Result<(Tree, Query)> {
    let mut parser = lang.parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| FlowError::TreeSitter("parser returned no tree".into()))?;
    let ts_lang = parser
        .language()
        .ok_or_else(|| FlowError::TreeSitter("parser has no language".into()))?;
    let query = Query::new(&ts_lang, lang.function_query())
        .map_err(|e| FlowError::TreeSitter(e.to_string()))?;
    Ok((tree, query))
}

/// Collect `(function_node, name)` pairs for every query match.
fn function_matches<'t>(tree: &'t Tree, query: &Query, source: &str) -> Vec<(Node<'t>, String)> {
    let fn_idx = query.capture_index_for_name("function");
    let name_idx = query.capture_index_for_name("name");
    let mut out = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());
    while let Some(m) = matches.next() {
        let mut func = None;
        let mut name = None;
        for cap in m.captures {
            if Some(cap.index) == fn_idx {
                func = Some(cap.node);
            } else if Some(cap.index) == name_idx {
                name = Some(node_text(cap.node, source.as_bytes()).to_string());
            }
        }
        if let (Some(f), Some(n)) = (func, name) {
            out.push((f, n));
        }
    }
    out
}

fn lower_one(func: Node, source: &str, name: &str) -> Result<FunctionCfg> {
    let params = crate::lang::c::parameter_names(func, source.as_bytes());
    debug!(function = name, params = params.len(), "lowering function");
    let mut graph = FlowGraph::new();
    let entry = lower_function(&mut graph, func, source.as_bytes(), name, params)?;
    Ok(FunctionCfg {
        name: name.to_string(),
        graph,
        entry,
    })
}

fn extract_with_language(
    lang: &dyn Language,
    source: &str,
    function_name: &str,
) -> Result<FunctionCfg> {
    let (tree, query) = parse_and_query(lang, source)?;
    for (func, name) in function_matches(&tree, &query, source) {
        if name == function_name {
            return lower_one(func, source, &name);
        }
    }
    Err(FlowError::FunctionNotFound(function_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_c_file(source: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new()
            .suffix(".c")
            .tempfile()
            .expect("temp file");
        f.write_all(source.as_bytes()).expect("write");
        f
    }

    #[test]
    fn test_extract_from_source_by_name() {
        let src = "int one(void) { return 1; }\nint two(void) { return 2; }";
        let cfg = extract_from_source(src, "two").unwrap();
        assert_eq!(cfg.name, "two");
        assert!(cfg.graph.iter().any(|n| n.kind.label() == "return 2"));
    }

    #[test]
    fn test_extract_missing_function() {
        let err = extract_from_source("int f(void) { return 0; }", "g").unwrap_err();
        assert!(matches!(err, FlowError::FunctionNotFound(_)));
    }

    #[test]
    fn test_extract_from_file() {
        let f = temp_c_file("int main(int argc, char **argv) { return argc; }");
        let cfg = extract_from_file(f.path(), "main").unwrap();
        assert_eq!(cfg.graph.node(cfg.entry).kind.label(), "main(argc, argv)");
    }

    #[test]
    fn test_extract_all_skips_broken_function() {
        let src = "void bad(void) { for (;;) { x = 1; } }\nint good(void) { return 0; }";
        let f = temp_c_file(src);
        let cfgs = extract_all_from_file(f.path()).unwrap();
        assert_eq!(cfgs.len(), 1);
        assert_eq!(cfgs[0].name, "good");
    }

    #[test]
    fn test_unsupported_extension() {
        let f = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
        let err = extract_from_file(f.path(), "f").unwrap_err();
        assert!(matches!(err, FlowError::UnsupportedLanguage(_)));
    }
}
