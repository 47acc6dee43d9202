//! Error types for type resolution and type graph loading

use crate::logging::codes::{self, Severity};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Which defensive bound a malformed hierarchy ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyBound {
    /// Path length from the root, counting interface and superclass steps
    Depth,
    /// Total nodes visited in one search
    Visits,
}

impl fmt::Display for HierarchyBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyBound::Depth => write!(f, "depth"),
            HierarchyBound::Visits => write!(f, "visit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No loader reachable from the root can see the type. An expected outcome.
    #[error("Type '{name}' not visible from the hierarchy of '{root}'")]
    NotFound { name: String, root: String },

    /// The descriptors are cyclic or unreasonably deep; a bug in the embedder
    #[error("Malformed type hierarchy at '{type_name}': {bound} limit {limit} exceeded (depth {depth})")]
    MalformedHierarchy {
        type_name: String,
        bound: HierarchyBound,
        depth: usize,
        limit: usize,
    },

    #[error("Type name too long: {length} bytes (max {max})")]
    NameTooLong { length: usize, max: usize },
}

impl ResolutionError {
    pub fn not_found(name: &str, root: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
            root: root.to_string(),
        }
    }

    pub fn malformed(type_name: &str, bound: HierarchyBound, depth: usize, limit: usize) -> Self {
        Self::MalformedHierarchy {
            type_name: type_name.to_string(),
            bound,
            depth,
            limit,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedHierarchy { .. })
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::NotFound { .. } => codes::resolution::TYPE_NOT_FOUND,
            Self::MalformedHierarchy { .. } => codes::resolution::MALFORMED_HIERARCHY,
            Self::NameTooLong { .. } => codes::resolution::TYPE_NAME_TOO_LONG,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::severity(self.error_code())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code())
    }
}

/// Errors loading a type graph description
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Type '{type_name}' uses undeclared loader '{loader}'")]
    UnknownLoader { type_name: String, loader: String },

    #[error("Type '{referenced_by}' refers to undeclared type '{type_name}'")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },

    #[error("Invalid type graph: {message}")]
    InvalidGraph { message: String },

    #[error("Failed to read type graph {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraphError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::UnknownLoader { .. } => codes::resolution::UNKNOWN_LOADER,
            Self::UnknownType { .. } => codes::resolution::UNKNOWN_TYPE,
            Self::InvalidGraph { .. } | Self::ReadFailed { .. } => {
                codes::resolution::INVALID_GRAPH
            }
        }
    }
}

impl From<toml::de::Error> for GraphError {
    fn from(error: toml::de::Error) -> Self {
        Self::InvalidGraph {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_malformed_are_distinct() {
        let not_found = ResolutionError::not_found("org.acme.Api", "org.acme.Impl");
        let malformed =
            ResolutionError::malformed("org.acme.Loop", HierarchyBound::Depth, 257, 256);

        assert!(not_found.is_not_found());
        assert!(!not_found.is_malformed());
        assert!(malformed.is_malformed());
        assert!(!malformed.is_not_found());

        assert!(not_found.is_recoverable());
        assert!(!malformed.is_recoverable());
        assert_eq!(malformed.severity(), Severity::High);
    }

    #[test]
    fn test_messages() {
        let malformed =
            ResolutionError::malformed("org.acme.Loop", HierarchyBound::Visits, 3, 100);
        assert_eq!(
            malformed.to_string(),
            "Malformed type hierarchy at 'org.acme.Loop': visit limit 100 exceeded (depth 3)"
        );

        let unknown = GraphError::UnknownLoader {
            type_name: "a.B".to_string(),
            loader: "missing".to_string(),
        };
        assert_eq!(unknown.error_code(), codes::resolution::UNKNOWN_LOADER);
        assert!(unknown.to_string().contains("missing"));
    }
}
