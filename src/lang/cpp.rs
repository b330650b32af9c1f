//! C++ language support.

use tree_sitter::Parser;

use crate::error::Result;
use crate::lang::traits::{ts_error, Language};

/// C++ language implementation.
pub struct Cpp;

impl Language for Cpp {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn extensions(&self) -> &[&'static str] {
        &[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".hxx"]
    }

    fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(ts_error)?;
        Ok(parser)
    }

    fn function_query(&self) -> &'static str {
        r#"[
            (function_definition
                declarator: (function_declarator
                    declarator: (identifier) @name)) @function
            (function_definition
                declarator: (function_declarator
                    declarator: (qualified_identifier) @name)) @function
        ]"#
    }

    fn class_query(&self) -> &'static str {
        r#"[
            (class_specifier
                name: (type_identifier) @name
                body: (field_declaration_list)) @class
            (struct_specifier
                name: (type_identifier) @name
                body: (field_declaration_list)) @class
        ]"#
    }
}
