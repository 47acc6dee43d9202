//! Capabilities the embedding system supplies to the resolver

/// Something that can turn a type name into a loaded type
pub trait TypeLoader {
    type Type;

    fn load_type(&self, name: &str) -> Option<Self::Type>;
}

/// Descriptor of one type in a hierarchy.
///
/// `loader` returns `None` for types owned by the bootstrap loader; the
/// resolver then falls back to its system loader. Interfaces are returned in
/// declaration order.
pub trait TypeNode: Sized {
    type Loader: TypeLoader;

    fn type_name(&self) -> &str;

    fn loader(&self) -> Option<&Self::Loader>;

    fn interfaces(&self) -> Vec<Self>;

    fn superclass(&self) -> Option<Self>;
}

/// The value a successful search returns for nodes of type `N`
pub type Resolved<N> = <<N as TypeNode>::Loader as TypeLoader>::Type;
