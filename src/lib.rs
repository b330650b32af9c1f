//! flowmood - control-flow graphs and MOOD design metrics for C/C++.
//!
//! Two analyses share a tree-sitter front end:
//!
//! - [`cfg`] lowers C function bodies into flow-node graphs and renders
//!   them as Graphviz DOT or JSON.
//! - [`mood`] collects C++ class models and computes the six Abreu MOOD
//!   factors over them.

pub mod cfg;
pub mod error;
pub mod lang;
pub mod mood;

pub use cfg::{extract_all_from_file, extract_from_file, extract_from_source, FunctionCfg};
pub use error::{FlowError, Result};
pub use mood::{ClassModel, MoodReport};
