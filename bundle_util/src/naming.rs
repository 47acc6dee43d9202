//! Module identifier and class/resource name helpers
//!
//! Module identifiers have the form `<bundle-id>.<revision>`, e.g. `12.0`.

/// Bundle id portion of a module id; the whole id is used when it has no `.`
pub fn bundle_id_from_module_id(id: &str) -> Option<u64> {
    let bundle_id = id.split_once('.').map_or(id, |(bundle, _)| bundle);
    bundle_id.parse().ok()
}

/// Revision portion of a module id; the whole id is used when it has no `.`
pub fn module_revision_from_module_id(id: &str) -> Option<u32> {
    let revision = id.split_once('.').map_or(id, |(_, revision)| revision);
    revision.parse().ok()
}

/// Simple name of a fully qualified class: `org.acme.Greeter` gives `Greeter`.
///
/// A name without a package yields an empty string.
pub fn class_simple_name(class_name: &str) -> &str {
    class_name
        .rsplit_once('.')
        .map_or("", |(_, simple)| simple)
}

/// Package of a fully qualified class, empty for the default package
pub fn class_package(class_name: &str) -> &str {
    class_name
        .rsplit_once('.')
        .map_or("", |(package, _)| package)
}

/// Package a resource path belongs to: everything up to the last `/`, dotted.
///
/// A single leading `/` is ignored, so `/org/acme/messages.properties` and
/// `org/acme/messages.properties` both give `org.acme`.
pub fn resource_package(resource: &str) -> String {
    let path = resource.strip_prefix('/').unwrap_or(resource);
    path.rsplit_once('/')
        .map_or_else(String::new, |(dir, _)| dir.replace('/', "."))
}
