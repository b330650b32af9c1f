//! C++ class collection.
//!
//! Walks class and struct definitions with tree-sitter and builds
//! [`ClassModel`]s: access-tracked methods and data members, direct base
//! names, and the named field types used later for coupling. Getter/setter
//! method pairs are folded into attributes here, before any hierarchy
//! analysis runs.

use std::fs;
use std::path::Path;

use ignore::WalkBuilder;
use rustc_hash::FxHashMap;
use streaming_iterator::StreamingIterator;
use tracing::{debug, warn};
use tree_sitter::{Node, Query, QueryCursor};

use crate::error::{FlowError, Result};
use crate::lang::traits::{node_text, Language};
use crate::mood::types::{Access, Attribute, ClassModel, Method};

/// Extensions accepted when walking a directory for C++ sources.
const CPP_EXTENSIONS: &[&str] = &[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".hxx", ".h"];

/// Collect classes from a file or a directory tree, honoring ignore
/// files during the walk.
pub fn collect_path(path: &Path) -> Result<Vec<ClassModel>> {
    collect_path_with(path, false)
}

/// Like [`collect_path`], with ignore-file handling switchable off.
pub fn collect_path_with(path: &Path, no_ignore: bool) -> Result<Vec<ClassModel>> {
    if path.is_dir() {
        collect_dir(path, no_ignore)
    } else {
        let source = fs::read_to_string(path).map_err(|e| FlowError::io_with_path(e, path))?;
        collect_source(&source)
    }
}

fn collect_dir(root: &Path, no_ignore: bool) -> Result<Vec<ClassModel>> {
    let mut by_name: FxHashMap<String, ClassModel> = FxHashMap::default();
    let mut order = Vec::new();
    let mut walker = WalkBuilder::new(root);
    if no_ignore {
        walker.standard_filters(false);
    }
    for entry in walker.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !has_cpp_extension(path) {
            continue;
        }
        let source = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        for class in collect_source(&source)? {
            if by_name.contains_key(&class.name) {
                debug!(class = %class.name, "duplicate class definition ignored");
                continue;
            }
            order.push(class.name.clone());
            by_name.insert(class.name.clone(), class);
        }
    }
    Ok(order
        .into_iter()
        .filter_map(|n| by_name.remove(&n))
        .collect())
}

fn has_cpp_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CPP_EXTENSIONS.contains(&format!(".{}", e.to_lowercase()).as_str()))
        .unwrap_or(false)
}

/// Collect every class and struct definition in a source string.
pub fn collect_source(source: &str) -> Result<Vec<ClassModel>> {
    let lang = crate::lang::cpp::Cpp;
    let mut parser = lang.parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| FlowError::TreeSitter("parser returned no tree".into()))?;
    let ts_lang = parser
        .language()
        .ok_or_else(|| FlowError::TreeSitter("parser has no language".into()))?;
    let query = Query::new(&ts_lang, lang.class_query())
        .map_err(|e| FlowError::TreeSitter(e.to_string()))?;
    let class_idx = query.capture_index_for_name("class");
    let name_idx = query.capture_index_for_name("name");

    let mut classes = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());
    while let Some(m) = matches.next() {
        let mut class_node = None;
        let mut name = None;
        for cap in m.captures {
            if Some(cap.index) == class_idx {
                class_node = Some(cap.node);
            } else if Some(cap.index) == name_idx {
                name = Some(node_text(cap.node, source.as_bytes()).to_string());
            }
        }
        if let (Some(node), Some(name)) = (class_node, name) {
            classes.push(collect_class(node, source.as_bytes(), &name));
        }
    }
    Ok(classes)
}

fn collect_class(node: Node, source: &[u8], name: &str) -> ClassModel {
    let mut model = ClassModel {
        name: name.to_string(),
        ..Default::default()
    };

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "base_class_clause" {
            collect_bases(child, source, &mut model.bases);
        }
    }

    // struct members default to public, class members to private.
    let default_access = if node.kind() == "struct_specifier" {
        Access::Public
    } else {
        Access::Private
    };

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut access = default_access;
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "access_specifier" => {
                    access = match node_text(member, source) {
                        "public" => Access::Public,
                        "protected" => Access::Protected,
                        _ => Access::Private,
                    };
                }
                "function_definition" | "field_declaration" | "declaration" => {
                    if let Some(method) = extract_method(member, source, access) {
                        methods.push(method);
                    } else if member.kind() != "function_definition" {
                        extract_fields(member, source, access, &mut model);
                    }
                }
                _ => {}
            }
        }
    }

    model.methods = pair_accessors(methods, &mut model.attributes);
    model
}

fn collect_bases(clause: Node, source: &[u8], bases: &mut Vec<String>) {
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "type_identifier" | "qualified_identifier" => {
                bases.push(node_text(child, source).to_string());
            }
            "template_type" => {
                if let Some(n) = child.child_by_field_name("name") {
                    bases.push(node_text(n, source).to_string());
                }
            }
            _ => {}
        }
    }
}

/// Pull a [`Method`] out of a member declaration, or `None` when the
/// member is not function-shaped.
fn extract_method(member: Node, source: &[u8], access: Access) -> Option<Method> {
    let mut decl = member.child_by_field_name("declarator")?;
    while matches!(decl.kind(), "pointer_declarator" | "reference_declarator") {
        decl = decl.child_by_field_name("declarator").or_else(|| {
            let mut c = decl.walk();
            decl.named_children(&mut c).last()
        })?;
    }
    if decl.kind() != "function_declarator" {
        return None;
    }

    let name_node = decl.child_by_field_name("declarator")?;
    let name = node_text(name_node, source).to_string();
    let params = decl
        .child_by_field_name("parameters")
        .map(|p| parameter_types(p, source))
        .unwrap_or_default();

    let mut is_const = false;
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        if child.kind() == "type_qualifier" && node_text(child, source) == "const" {
            is_const = true;
        }
    }

    Some(Method {
        name,
        params,
        is_const,
        access,
    })
}

/// Canonical parameter type spellings for a `parameter_list`.
fn parameter_types(params: Node, source: &[u8]) -> Vec<String> {
    let mut types = Vec::new();
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        match child.kind() {
            "parameter_declaration" | "optional_parameter_declaration" => {
                let base = child
                    .child_by_field_name("type")
                    .map(|t| node_text(t, source))
                    .unwrap_or("");
                let suffix = child
                    .child_by_field_name("declarator")
                    .map(|d| declarator_suffix(d, source))
                    .unwrap_or_default();
                types.push(canonical_type(&format!("{base}{suffix}")));
            }
            "variadic_parameter_declaration" => types.push("...".to_string()),
            _ => {}
        }
    }
    types
}

/// Pointer and reference marks contributed by a declarator, e.g. `**` for
/// `char **argv`.
fn declarator_suffix(decl: Node, source: &[u8]) -> String {
    match decl.kind() {
        "pointer_declarator" | "abstract_pointer_declarator" => {
            let inner = decl
                .child_by_field_name("declarator")
                .map(|d| declarator_suffix(d, source))
                .unwrap_or_default();
            format!("*{inner}")
        }
        "reference_declarator" | "abstract_reference_declarator" => {
            let mut cursor = decl.walk();
            let inner = decl
                .named_children(&mut cursor)
                .next()
                .map(|d| declarator_suffix(d, source))
                .unwrap_or_default();
            format!("&{inner}")
        }
        _ => String::new(),
    }
}

/// Collapse whitespace so that `const  char *` and `const char*` compare
/// equal.
fn canonical_type(s: &str) -> String {
    let mut out = String::new();
    for tok in s.split_whitespace() {
        if !out.is_empty() && !tok.starts_with('*') && !tok.starts_with('&') {
            out.push(' ');
        }
        out.push_str(tok);
    }
    out
}

/// Record the data members of a `field_declaration`.
fn extract_fields(member: Node, source: &[u8], access: Access, model: &mut ClassModel) {
    let mut found_any = false;
    let mut cursor = member.walk();
    for decl in member.children_by_field_name("declarator", &mut cursor) {
        if let Some(name) = field_name(decl, source) {
            model.attributes.push(Attribute { name, access });
            found_any = true;
        }
    }
    if !found_any {
        return;
    }
    if let Some(type_name) = named_field_type(member, source) {
        model.field_types.push(type_name);
    }
}

fn field_name(decl: Node, source: &[u8]) -> Option<String> {
    match decl.kind() {
        "field_identifier" | "identifier" => Some(node_text(decl, source).to_string()),
        "pointer_declarator" | "array_declarator" | "reference_declarator" | "init_declarator" => {
            let inner = decl.child_by_field_name("declarator").or_else(|| {
                let mut c = decl.walk();
                let first = decl.named_children(&mut c).next();
                first
            })?;
            field_name(inner, source)
        }
        _ => None,
    }
}

/// The bare type name of a field when it is a user-named type, directly
/// or through a pointer. Primitive types return `None`.
fn named_field_type(member: Node, source: &[u8]) -> Option<String> {
    let ty = member.child_by_field_name("type")?;
    match ty.kind() {
        "type_identifier" | "qualified_identifier" => Some(node_text(ty, source).to_string()),
        "template_type" => ty
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string()),
        _ => None,
    }
}

/// Fold `getX`/`setX` method pairs into attributes named `X`. The getter
/// must take no parameters and the setter exactly one; the folded
/// attribute takes the stricter of the two access levels. Unpaired
/// accessors stay plain methods.
fn pair_accessors(methods: Vec<Method>, attributes: &mut Vec<Attribute>) -> Vec<Method> {
    let mut used = vec![false; methods.len()];
    for i in 0..methods.len() {
        let getter = &methods[i];
        if used[i] || !getter.params.is_empty() {
            continue;
        }
        let Some(prop) = getter.name.strip_prefix("get") else {
            continue;
        };
        if prop.is_empty() {
            continue;
        }
        let setter_name = format!("set{prop}");
        let Some(j) = methods.iter().enumerate().position(|(j, m)| {
            !used[j] && j != i && m.name == setter_name && m.params.len() == 1
        }) else {
            continue;
        };
        used[i] = true;
        used[j] = true;
        attributes.push(Attribute {
            name: prop.to_string(),
            access: getter.access.max(methods[j].access),
        });
    }
    methods
        .into_iter()
        .zip(used)
        .filter_map(|(m, u)| (!u).then_some(m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: &str = r#"
        class Shape {
        public:
            int getArea() const;
            void setArea(int a);
            virtual void draw();
        protected:
            int width;
        private:
            int height;
            Shape *next;
        };
    "#;

    fn one(source: &str) -> ClassModel {
        let classes = collect_source(source).unwrap();
        assert_eq!(classes.len(), 1);
        classes.into_iter().next().unwrap()
    }

    #[test]
    fn test_accessor_pair_becomes_attribute() {
        let shape = one(SHAPE);
        assert!(shape
            .attributes
            .iter()
            .any(|a| a.name == "Area" && a.access == Access::Public));
        assert!(!shape.methods.iter().any(|m| m.name == "getArea"));
        assert!(shape.methods.iter().any(|m| m.name == "draw"));
    }

    #[test]
    fn test_access_sections_tracked() {
        let shape = one(SHAPE);
        let width = shape.attributes.iter().find(|a| a.name == "width").unwrap();
        let height = shape.attributes.iter().find(|a| a.name == "height").unwrap();
        assert_eq!(width.access, Access::Protected);
        assert_eq!(height.access, Access::Private);
    }

    #[test]
    fn test_self_typed_field_recorded() {
        let shape = one(SHAPE);
        assert!(shape.field_types.contains(&"Shape".to_string()));
    }

    #[test]
    fn test_accessor_with_mismatched_arity_stays_method() {
        let src = r#"
            class Box {
            public:
                int getSize();
                void setSize(int a, int b);
            };
        "#;
        let class = one(src);
        assert!(class.attributes.is_empty());
        assert_eq!(class.methods.len(), 2);
    }

    #[test]
    fn test_bases_and_struct_default_access() {
        let src = r#"
            struct Derived : public Base, private Mixin {
                int x;
            };
        "#;
        let class = one(src);
        assert_eq!(class.bases, vec!["Base", "Mixin"]);
        assert_eq!(class.attributes[0].access, Access::Public);
    }

    #[test]
    fn test_const_overload_signature() {
        let src = r#"
            class Buf {
            public:
                char *data(int idx);
                const char *data(int idx) const;
            };
        "#;
        let class = one(src);
        assert_eq!(class.methods.len(), 2);
        assert!(!class.methods[0].signature_eq(&class.methods[1]));
    }
}
