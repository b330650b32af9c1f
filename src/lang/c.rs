//! C language support.

use tree_sitter::{Node, Parser};

use crate::error::Result;
use crate::lang::traits::{node_text, ts_error, Language};

/// C language implementation.
pub struct C;

impl Language for C {
    fn name(&self) -> &'static str {
        "c"
    }

    fn extensions(&self) -> &[&'static str] {
        &[".c", ".h"]
    }

    fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(ts_error)?;
        Ok(parser)
    }

    fn function_query(&self) -> &'static str {
        r#"[
            (function_definition
                declarator: (function_declarator
                    declarator: (identifier) @name)) @function
            (function_definition
                declarator: (pointer_declarator
                    declarator: (function_declarator
                        declarator: (identifier) @name))) @function
        ]"#
    }

    fn class_query(&self) -> &'static str {
        r#"(struct_specifier name: (type_identifier) @name) @class"#
    }
}

/// Locate the `function_declarator` inside a `function_definition`,
/// unwrapping pointer declarators for pointer-returning functions.
pub fn function_declarator<'a>(function: Node<'a>) -> Option<Node<'a>> {
    let mut decl = function.child_by_field_name("declarator")?;
    while decl.kind() == "pointer_declarator" {
        decl = decl.child_by_field_name("declarator")?;
    }
    if decl.kind() == "function_declarator" {
        Some(decl)
    } else {
        None
    }
}

/// Extract parameter names from a `function_definition` node, in
/// declaration order. Unnamed parameters (e.g. `void`) are skipped.
pub fn parameter_names(function: Node, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let Some(decl) = function_declarator(function) else {
        return names;
    };
    let Some(params) = decl.child_by_field_name("parameters") else {
        return names;
    };
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        if child.kind() == "parameter_declaration" {
            if let Some(name) = declarator_name(child, source) {
                names.push(name);
            }
        }
    }
    names
}

/// Drill into a declarator chain until a plain identifier is found.
/// Handles pointer, array and parenthesized declarators.
fn declarator_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" => Some(node_text(node, source).to_string()),
        _ => {
            if let Some(inner) = node.child_by_field_name("declarator") {
                return declarator_name(inner, source);
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if let Some(name) = declarator_name(child, source) {
                    return Some(name);
                }
            }
            None
        }
    }
}
