//! MOOD object-oriented design metrics for C++ sources.
//!
//! - [`types`]: class models and the report struct
//! - [`collect`]: tree-sitter based class collection
//! - [`metrics`]: the six MOOD factors

pub mod collect;
pub mod metrics;
pub mod types;

pub use collect::{collect_path, collect_path_with, collect_source};
pub use metrics::compute;
pub use types::{Access, Attribute, ClassModel, Method, MoodReport};
