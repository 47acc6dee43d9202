//! Hierarchical type resolution
//!
//! Answers "which loader reachable from this type can load that name", the
//! question behind checking that a service object really implements the
//! interface it is registered under.

pub mod error;
pub mod graph;
pub mod node;
pub mod resolver;

pub use error::{GraphError, HierarchyBound, ResolutionError, ResolutionResult};
pub use graph::{GraphLoader, GraphNode, LoadedType, TypeGraph, TypeSpec};
pub use node::{Resolved, TypeLoader, TypeNode};
pub use resolver::TypeResolver;

/// Resolve `name` from `root` with no system loader and the default limits
pub fn resolve<N: TypeNode>(root: &N, name: &str) -> ResolutionResult<Resolved<N>> {
    TypeResolver::<N::Loader>::new().resolve(root, name)
}
