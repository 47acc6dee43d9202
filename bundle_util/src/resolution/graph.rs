//! Declarative type hierarchies loaded from TOML
//!
//! ```toml
//! system = "system"
//!
//! [loaders.system]
//! visible = ["java.lang.Runnable"]
//!
//! [loaders.api]
//! visible = ["org.acme.Greeter"]
//!
//! [types."org.acme.Greeter"]
//! loader = "api"
//!
//! [types."org.acme.GreeterImpl"]
//! loader = "impl"
//! interfaces = ["org.acme.Greeter"]
//! superclass = "java.lang.Object"
//! ```
//!
//! Types without a `loader` belong to the bootstrap loader and resolve
//! through the `system` loader. Cycles are accepted here and reported by the
//! resolver as a malformed hierarchy.

use super::error::{GraphError, ResolutionResult};
use super::node::{TypeLoader, TypeNode};
use super::resolver::TypeResolver;
use crate::config::runtime::ResolutionPreferences;
use crate::logging::codes;
use crate::{log_error, log_success};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphFile {
    #[serde(default)]
    system: Option<String>,
    #[serde(default)]
    loaders: BTreeMap<String, LoaderSpec>,
    #[serde(default)]
    types: BTreeMap<String, TypeSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoaderSpec {
    #[serde(default)]
    visible: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    #[serde(default)]
    pub loader: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub superclass: Option<String>,
}

/// A type as seen through a particular loader
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LoadedType {
    pub name: String,
    pub loader: String,
}

/// Named loader that can see a fixed set of type names
#[derive(Debug, Clone)]
pub struct GraphLoader {
    name: String,
    visible: BTreeSet<String>,
}

impl GraphLoader {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_see(&self, type_name: &str) -> bool {
        self.visible.contains(type_name)
    }
}

impl TypeLoader for GraphLoader {
    type Type = LoadedType;

    fn load_type(&self, name: &str) -> Option<LoadedType> {
        self.can_see(name).then(|| LoadedType {
            name: name.to_string(),
            loader: self.name.clone(),
        })
    }
}

/// Validated set of loaders and type descriptors
#[derive(Debug)]
pub struct TypeGraph {
    system: Option<String>,
    loaders: BTreeMap<String, GraphLoader>,
    types: BTreeMap<String, TypeSpec>,
}

impl TypeGraph {
    pub fn from_toml_str(content: &str) -> Result<Self, GraphError> {
        let file: GraphFile = toml::from_str(content).map_err(|e| {
            let error = GraphError::from(e);
            log_error!(error.error_code(), "Type graph is not valid TOML",
                "error" => error
            );
            error
        })?;

        let graph = Self {
            system: file.system,
            loaders: file
                .loaders
                .into_iter()
                .map(|(name, spec)| {
                    let loader = GraphLoader {
                        name: name.clone(),
                        visible: spec.visible,
                    };
                    (name, loader)
                })
                .collect(),
            types: file.types,
        };

        if let Err(error) = graph.validate() {
            log_error!(error.error_code(), "Type graph rejected", "error" => error);
            return Err(error);
        }

        log_success!(codes::success::GRAPH_LOADED, "Type graph loaded",
            "loaders" => graph.loaders.len(),
            "types" => graph.types.len(),
            "system_loader" => graph.system.as_deref().unwrap_or("<none>")
        );

        Ok(graph)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GraphError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), GraphError> {
        if let Some(system) = &self.system {
            if !self.loaders.contains_key(system) {
                return Err(GraphError::InvalidGraph {
                    message: format!("system loader '{}' is not declared", system),
                });
            }
        }

        for (type_name, spec) in &self.types {
            if let Some(loader) = &spec.loader {
                if !self.loaders.contains_key(loader) {
                    return Err(GraphError::UnknownLoader {
                        type_name: type_name.clone(),
                        loader: loader.clone(),
                    });
                }
            }

            for referenced in spec.interfaces.iter().chain(spec.superclass.iter()) {
                if !self.types.contains_key(referenced) {
                    return Err(GraphError::UnknownType {
                        type_name: referenced.clone(),
                        referenced_by: type_name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn system_loader(&self) -> Option<&GraphLoader> {
        self.system.as_ref().and_then(|name| self.loaders.get(name))
    }

    pub fn loader(&self, name: &str) -> Option<&GraphLoader> {
        self.loaders.get(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn node(&self, name: &str) -> Result<GraphNode<'_>, GraphError> {
        self.types
            .get_key_value(name)
            .map(|(name, spec)| GraphNode {
                graph: self,
                name,
                spec,
            })
            .ok_or_else(|| GraphError::UnknownType {
                type_name: name.to_string(),
                referenced_by: "<request>".to_string(),
            })
    }

    /// Resolver using this graph's system loader
    pub fn resolver(&self) -> TypeResolver<'_, GraphLoader> {
        match self.system_loader() {
            Some(system) => TypeResolver::with_system_loader(system),
            None => TypeResolver::new(),
        }
    }

    pub fn resolver_with_preferences(
        &self,
        preferences: ResolutionPreferences,
    ) -> TypeResolver<'_, GraphLoader> {
        self.resolver().with_preferences(preferences)
    }

    /// Resolve `name` starting from the type called `root`
    pub fn resolve(&self, root: &str, name: &str) -> Result<ResolutionResult<LoadedType>, GraphError> {
        let node = self.node(root)?;
        Ok(self.resolver().resolve(&node, name))
    }
}

/// Borrowed view of one type in a [`TypeGraph`]
#[derive(Debug, Clone, Copy)]
pub struct GraphNode<'g> {
    graph: &'g TypeGraph,
    name: &'g str,
    spec: &'g TypeSpec,
}

impl<'g> GraphNode<'g> {
    fn related(&self, name: &str) -> Option<GraphNode<'g>> {
        self.graph.node(name).ok()
    }
}

impl<'g> TypeNode for GraphNode<'g> {
    type Loader = GraphLoader;

    fn type_name(&self) -> &str {
        self.name
    }

    fn loader(&self) -> Option<&GraphLoader> {
        self.spec
            .loader
            .as_ref()
            .and_then(|name| self.graph.loaders.get(name))
    }

    fn interfaces(&self) -> Vec<Self> {
        self.spec
            .interfaces
            .iter()
            .filter_map(|name| self.related(name))
            .collect()
    }

    fn superclass(&self) -> Option<Self> {
        self.spec
            .superclass
            .as_deref()
            .and_then(|name| self.related(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::{HierarchyBound, ResolutionError};
    use assert_matches::assert_matches;
    use std::io::Write;

    const SERVICE_GRAPH: &str = r#"
system = "system"

[loaders.system]
visible = ["java.lang.Object", "java.lang.Runnable"]

[loaders.api]
visible = ["org.acme.Greeter"]

[loaders.ext]
visible = ["org.acme.ExtGreeter", "org.acme.Greeter"]

[loaders.impl]
visible = ["org.acme.GreeterImpl", "org.acme.ExtGreeter"]

[types."java.lang.Object"]

[types."org.acme.Greeter"]
loader = "api"

[types."org.acme.ExtGreeter"]
loader = "ext"
interfaces = ["org.acme.Greeter"]

[types."org.acme.BaseGreeter"]
loader = "api"
superclass = "java.lang.Object"

[types."org.acme.GreeterImpl"]
loader = "impl"
interfaces = ["org.acme.ExtGreeter"]
superclass = "org.acme.BaseGreeter"
"#;

    fn graph(content: &str) -> TypeGraph {
        crate::logging::init_test_logging();
        TypeGraph::from_toml_str(content).unwrap()
    }

    #[test]
    fn test_interface_loader_resolves_service_interface() {
        let graph = graph(SERVICE_GRAPH);
        let found = graph
            .resolve("org.acme.GreeterImpl", "org.acme.Greeter")
            .unwrap()
            .unwrap();

        assert_eq!(
            found,
            LoadedType {
                name: "org.acme.Greeter".to_string(),
                loader: "ext".to_string()
            }
        );
    }

    #[test]
    fn test_bootstrap_types_use_system_loader() {
        let graph = graph(SERVICE_GRAPH);
        let found = graph
            .resolve("java.lang.Object", "java.lang.Runnable")
            .unwrap()
            .unwrap();

        assert_eq!(found.loader, "system");
    }

    #[test]
    fn test_not_found_is_not_a_graph_error() {
        let graph = graph(SERVICE_GRAPH);
        let result = graph.resolve("org.acme.Greeter", "org.other.Missing").unwrap();

        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_cyclic_superclasses_are_malformed() {
        let graph = graph(
            r#"
[loaders.a]
[types.A]
loader = "a"
superclass = "B"
[types.B]
loader = "a"
superclass = "A"
"#,
        );

        let result = graph.resolve("A", "Missing").unwrap();
        assert_matches!(
            result,
            Err(ResolutionError::MalformedHierarchy { bound: HierarchyBound::Depth, .. })
        );
    }

    #[test]
    fn test_cyclic_interfaces_are_malformed() {
        let graph = graph(
            r#"
[loaders.a]
[types.I]
loader = "a"
interfaces = ["J"]
[types.J]
loader = "a"
interfaces = ["I"]
"#,
        );

        let node = graph.node("I").unwrap();
        let result = graph.resolver().is_service_compatible(&node, "Missing");
        assert!(result.unwrap_err().is_malformed());
    }

    #[test]
    fn test_cycle_does_not_hide_earlier_match() {
        let graph = graph(
            r#"
[loaders.a]
visible = ["Wanted"]
[types.A]
loader = "a"
superclass = "A"
"#,
        );

        assert_eq!(graph.resolve("A", "Wanted").unwrap().unwrap().loader, "a");
    }

    #[test]
    fn test_unknown_loader_rejected() {
        crate::logging::init_test_logging();
        let result = TypeGraph::from_toml_str("[types.A]\nloader = \"missing\"\n");

        assert_matches!(
            result,
            Err(GraphError::UnknownLoader { ref type_name, ref loader })
                if type_name == "A" && loader == "missing"
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        crate::logging::init_test_logging();
        let result = TypeGraph::from_toml_str("[types.A]\ninterfaces = [\"Nope\"]\n");

        assert_matches!(
            result,
            Err(GraphError::UnknownType { ref type_name, ref referenced_by })
                if type_name == "Nope" && referenced_by == "A"
        );
    }

    #[test]
    fn test_undeclared_system_loader_rejected() {
        crate::logging::init_test_logging();
        let result = TypeGraph::from_toml_str("system = \"sys\"\n");

        assert_matches!(result, Err(GraphError::InvalidGraph { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        crate::logging::init_test_logging();
        assert_matches!(
            TypeGraph::from_toml_str("[types.A\n"),
            Err(GraphError::InvalidGraph { .. })
        );
        assert_matches!(
            TypeGraph::from_toml_str("[types.A]\nparent = \"B\"\n"),
            Err(GraphError::InvalidGraph { .. })
        );
    }

    #[test]
    fn test_unknown_root() {
        let graph = graph(SERVICE_GRAPH);
        assert_matches!(
            graph.resolve("org.nowhere.Type", "org.acme.Greeter"),
            Err(GraphError::UnknownType { .. })
        );
    }

    #[test]
    fn test_from_file() {
        crate::logging::init_test_logging();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SERVICE_GRAPH.as_bytes()).unwrap();

        let graph = TypeGraph::from_file(file.path()).unwrap();
        assert_eq!(graph.type_names().count(), 5);
        assert_eq!(graph.system_loader().map(GraphLoader::name), Some("system"));
        assert!(graph.loader("impl").unwrap().can_see("org.acme.GreeterImpl"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TypeGraph::from_file(dir.path().join("absent.toml"));

        assert_matches!(result, Err(GraphError::ReadFailed { .. }));
    }
}
