//! Depth-first type lookup across a hierarchy of loaders
//!
//! At every node the node's own loader is asked first, then each directly
//! implemented interface is searched recursively in declaration order, and
//! only then does the search move up to the superclass. A service object
//! whose own loader cannot see its service interface still resolves it when
//! an interface or superclass from another bundle can.

use super::error::{HierarchyBound, ResolutionError, ResolutionResult};
use super::node::{TypeLoader, TypeNode};
use crate::config::compile_time::resolution::*;
use crate::config::runtime::{runtime_config, ResolutionPreferences};
use crate::logging::codes;
use crate::{log_debug, log_error, log_info, log_success};

/// Per-search bookkeeping
struct Search<'a> {
    name: &'a str,
    visits: usize,
}

pub struct TypeResolver<'l, L: TypeLoader> {
    system_loader: Option<&'l L>,
    max_depth: usize,
    max_visits: usize,
    preferences: ResolutionPreferences,
}

impl<'l, L: TypeLoader> TypeResolver<'l, L> {
    /// Resolver without a system loader: bootstrap-owned nodes never resolve
    pub fn new() -> Self {
        Self {
            system_loader: None,
            max_depth: MAX_SEARCH_DEPTH,
            max_visits: MAX_VISITED_NODES,
            preferences: runtime_config().resolution.clone(),
        }
    }

    /// Resolver that asks `loader` for nodes without a loader of their own
    pub fn with_system_loader(loader: &'l L) -> Self {
        Self {
            system_loader: Some(loader),
            ..Self::new()
        }
    }

    /// Tighten the defensive bounds; values above the compile-time limits are clamped
    pub fn with_limits(mut self, max_depth: usize, max_visits: usize) -> Self {
        self.max_depth = max_depth.min(MAX_SEARCH_DEPTH);
        self.max_visits = max_visits.min(MAX_VISITED_NODES);
        self
    }

    pub fn with_preferences(mut self, preferences: ResolutionPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_visits(&self) -> usize {
        self.max_visits
    }

    /// Find the first loader in the hierarchy of `root` that can load `name`
    pub fn resolve<N>(&self, root: &N, name: &str) -> ResolutionResult<L::Type>
    where
        N: TypeNode<Loader = L>,
    {
        if name.len() > MAX_TYPE_NAME_LENGTH {
            let error = ResolutionError::NameTooLong {
                length: name.len(),
                max: MAX_TYPE_NAME_LENGTH,
            };
            log_error!(error.error_code(), "Type name exceeds length limit",
                "length" => name.len(),
                "limit" => MAX_TYPE_NAME_LENGTH
            );
            return Err(error);
        }

        let mut search = Search { name, visits: 0 };

        match self.search_chain(root, 0, &mut search) {
            Ok(Some(found)) => {
                log_success!(codes::success::TYPE_RESOLVED, "Type resolved",
                    "name" => name,
                    "root" => root.type_name(),
                    "visited" => search.visits
                );
                Ok(found)
            }
            Ok(None) => {
                if self.preferences.log_not_found {
                    log_info!("Type not visible from hierarchy",
                        "name" => name,
                        "root" => root.type_name(),
                        "visited" => search.visits
                    );
                }
                Err(ResolutionError::not_found(name, root.type_name()))
            }
            Err(error) => {
                log_error!(error.error_code(), "Malformed type hierarchy",
                    "name" => name,
                    "root" => root.type_name(),
                    "visited" => search.visits
                );
                Err(error)
            }
        }
    }

    /// Whether the service object rooted at `root` can see `interface_name`.
    ///
    /// Not being able to see it is a normal answer; a malformed hierarchy is
    /// still an error.
    pub fn is_service_compatible<N>(&self, root: &N, interface_name: &str) -> ResolutionResult<bool>
    where
        N: TypeNode<Loader = L>,
    {
        match self.resolve(root, interface_name) {
            Ok(_) => Ok(true),
            Err(ResolutionError::NotFound { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Whether `name` resolves from `root` to the same type the caller sees as `expected`
    pub fn resolves_to<N>(&self, root: &N, name: &str, expected: &L::Type) -> ResolutionResult<bool>
    where
        N: TypeNode<Loader = L>,
        L::Type: PartialEq,
    {
        match self.resolve(root, name) {
            Ok(found) => Ok(found == *expected),
            Err(ResolutionError::NotFound { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Visit `start` and then each superclass in turn
    fn search_chain<N>(
        &self,
        start: &N,
        depth: usize,
        search: &mut Search<'_>,
    ) -> ResolutionResult<Option<L::Type>>
    where
        N: TypeNode<Loader = L>,
    {
        if let Some(found) = self.visit(start, depth, search)? {
            return Ok(Some(found));
        }

        let mut depth = depth;
        let mut next = start.superclass();
        while let Some(node) = next {
            depth += 1;
            if let Some(found) = self.visit(&node, depth, search)? {
                return Ok(Some(found));
            }
            next = node.superclass();
        }

        Ok(None)
    }

    /// Own loader first, then every interface's whole chain
    fn visit<N>(
        &self,
        node: &N,
        depth: usize,
        search: &mut Search<'_>,
    ) -> ResolutionResult<Option<L::Type>>
    where
        N: TypeNode<Loader = L>,
    {
        if depth > self.max_depth {
            return Err(ResolutionError::malformed(
                node.type_name(),
                HierarchyBound::Depth,
                depth,
                self.max_depth,
            ));
        }
        if search.visits >= self.max_visits {
            return Err(ResolutionError::malformed(
                node.type_name(),
                HierarchyBound::Visits,
                depth,
                self.max_visits,
            ));
        }
        search.visits += 1;

        if self.preferences.log_search_steps {
            log_debug!("Visiting type",
                "type" => node.type_name(),
                "name" => search.name,
                "depth" => depth,
                "own_loader" => node.loader().is_some()
            );
        }

        let loader = node.loader().or(self.system_loader);
        if let Some(found) = loader.and_then(|l| l.load_type(search.name)) {
            return Ok(Some(found));
        }

        for interface in node.interfaces() {
            if let Some(found) = self.search_chain(&interface, depth + 1, search)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }
}

impl<L: TypeLoader> Default for TypeResolver<'_, L> {
    fn default() -> Self {
        Self::new()
    }
}
