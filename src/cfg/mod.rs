//! Control-flow graph construction and rendering.
//!
//! Lowers C statement trees into flow-node graphs and serializes them.
//!
//! # Modules
//!
//! - [`graph`]: the flow-node arena and successor-slot rules
//! - [`lower`]: statement lowering with break/continue backpatching
//! - [`builder`]: extraction from source files
//! - [`render`]: DOT and JSON output

pub mod builder;
pub mod graph;
pub mod lower;
pub mod render;

pub use builder::{extract_all_from_file, extract_from_file, extract_from_source, FunctionCfg};
pub use graph::{FlowGraph, FlowNode, NodeId, NodeKind};
pub use render::{to_dot, to_json};
