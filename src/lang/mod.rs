//! Language abstraction layer.
//!
//! Provides a unified interface over the tree-sitter grammars used by the
//! crate via the [`Language`] trait.

pub mod registry;
pub mod traits;

// Language implementations
pub mod c;
pub mod cpp;

// Re-exports for the crate's public API (used by lib.rs)
pub use registry::LanguageRegistry;
pub use traits::{BoxedLanguage, Language};
