//! Language abstraction for tree-sitter based source analysis.

use std::path::Path;

use tree_sitter::Parser;

use crate::error::{FlowError, Result};

/// A language front end backed by a tree-sitter grammar.
///
/// Implementations supply a configured parser plus the queries used to
/// locate functions and class-like declarations in a parsed tree.
pub trait Language: Send + Sync {
    /// Canonical lowercase name, e.g. "c" or "cpp".
    fn name(&self) -> &'static str;

    /// File extensions (with leading dot) this language claims.
    fn extensions(&self) -> &[&'static str];

    /// A parser configured with this language's grammar.
    fn parser(&self) -> Result<Parser>;

    /// Query matching function definitions, capturing `@function` and `@name`.
    fn function_query(&self) -> &'static str;

    /// Query matching class-like definitions, capturing `@class` and `@name`.
    fn class_query(&self) -> &'static str;

    /// Whether a path should be skipped during directory walks.
    fn should_skip_file(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        name.starts_with('.')
    }
}

/// Boxed language handle stored in the registry.
pub type BoxedLanguage = Box<dyn Language>;

/// Read a node's source text as a borrowed str.
#[inline]
pub fn node_text<'a>(node: tree_sitter::Node, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.start_byte()..node.end_byte()]).unwrap_or("")
}

/// Map a tree-sitter language error into our error type.
pub fn ts_error(e: tree_sitter::LanguageError) -> FlowError {
    FlowError::TreeSitter(e.to_string())
}
