//! Callis keypath engine - dotted-path navigation over dynamic object graphs
//!
//! Resolves path expressions such as `order.customer.address.street`,
//! `items.3.price` or `tags.#keys` against a [`callis_model::Value`] graph,
//! with three null-handling modes, auto-creation of missing intermediates,
//! pluggable named functions as path segments, type-only resolution, and a
//! memoizing per-root cache.
//!
//! # Architecture Overview
//!
//! ```text
//! Path String
//!      |
//!   PathExpression (parse, last-separator decomposition)
//!      |
//! Navigator.get/set/get_type -> recursive parent resolution
//!      |
//! Per-segment dispatch (function / keyed / indexed / property)
//!      |
//! Conversion Bridge (optional) -> Cache Graph (memoize) -> Result
//! ```
//!
//! All mutable state lives in the caller's [`NavigationContext`]; the engine
//! itself is stateless between calls.

pub mod context;
mod convert;
pub mod engine;
pub mod error;
pub mod functions;
pub mod graph;
pub mod path;

// Re-export main types
pub use context::{NavigationContext, NodeObserver};
pub use engine::{NavigationMode, Navigator};
pub use error::{Error, Result};
pub use functions::{FunctionRegistry, PathFunction};
pub use graph::{CacheGraph, ResolvedNode, RootKey};
pub use path::{PathExpression, SegmentKind, FUNCTION_SIGIL, SEPARATOR};
