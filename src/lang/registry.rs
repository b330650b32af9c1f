//! Language registry for extension-to-language mapping.
//!
//! Provides a singleton registry that maps file extensions to their
//! corresponding [`Language`] implementations.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::lang::traits::{BoxedLanguage, Language};
use crate::lang::{c, cpp};

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

/// Registry mapping file extensions to language implementations.
pub struct LanguageRegistry {
    by_name: HashMap<&'static str, BoxedLanguage>,
    by_ext: HashMap<&'static str, &'static str>,
    aliases: HashMap<&'static str, &'static str>,
}

impl LanguageRegistry {
    /// Get the global language registry singleton.
    pub fn global() -> &'static Self {
        REGISTRY.get_or_init(Self::new)
    }

    /// Create a new registry with all supported languages.
    fn new() -> Self {
        let mut registry = Self {
            by_name: HashMap::new(),
            by_ext: HashMap::new(),
            aliases: HashMap::new(),
        };

        registry.register(Box::new(c::C));
        registry.register(Box::new(cpp::Cpp));

        // "c++" resolves to the cpp handler for callers that spell it out.
        registry.register_alias("c++", "cpp");
        registry.register_alias("cxx", "cpp");

        registry
    }

    /// Register an alias for a language name.
    fn register_alias(&mut self, alias: &'static str, target: &'static str) {
        self.aliases.insert(alias, target);
    }

    /// Register a language implementation.
    fn register(&mut self, lang: BoxedLanguage) {
        let name = lang.name();
        for ext in lang.extensions() {
            self.by_ext.insert(*ext, name);
        }
        self.by_name.insert(name, lang);
    }

    /// Get a language by name (e.g., "c").
    pub fn get_by_name(&self, name: &str) -> Option<&dyn Language> {
        let canonical = self.aliases.get(name).copied().unwrap_or(name);
        self.by_name.get(canonical).map(|b| b.as_ref())
    }

    /// Get a language by file extension (e.g., ".c").
    pub fn get_by_extension(&self, ext: &str) -> Option<&dyn Language> {
        self.by_ext.get(ext).and_then(|name| self.get_by_name(name))
    }

    /// Auto-detect language from file path extension.
    pub fn detect_language(&self, path: &Path) -> Option<&dyn Language> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .and_then(|ext| self.get_by_extension(&ext))
    }
}
