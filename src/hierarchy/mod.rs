//! Type hierarchy discovery through injected collaborators.
//!
//! The remapper never reads class files on its own initiative. It asks a [`BytesProvider`]
//! for a type's compiled bytes by its *mapped* name (the host environment only knows the
//! developer-facing names) and a [`HeaderReader`] to extract the structural header from them.
//! [`TypeHierarchyResolver`] memoizes the result per queried name, including "nothing found".
//!
//! # Key Components
//!
//! - [`BytesProvider`] - Fetches compiled bytes by symbolic name
//! - [`HeaderReader`] - Extracts a [`TypeHeader`] from compiled bytes
//! - [`TypeHierarchyResolver`] - Cached `type → (super, interfaces)` lookups
//! - [`MemoryProvider`], [`DirectoryProvider`], [`ChainProvider`] - Provider implementations
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use jremap::{
//!     classfile::ClassHeaderReader,
//!     hierarchy::{MemoryProvider, TypeHierarchyResolver},
//!     mapping::TypeTable,
//! };
//!
//! let provider = Arc::new(MemoryProvider::new());
//! let resolver = TypeHierarchyResolver::new(
//!     Arc::new(TypeTable::new()),
//!     provider,
//!     Arc::new(ClassHeaderReader),
//! );
//!
//! // Unknown types have no parents, and the miss is cached
//! assert!(resolver.resolve("a").is_empty());
//! assert!(resolver.resolve("a").is_empty());
//! assert_eq!(resolver.fetch_count(), 1);
//! ```

mod provider;
mod resolver;

pub use provider::{ChainProvider, DirectoryProvider, MemoryProvider};
pub use resolver::{Parents, TypeHierarchyResolver};

use crate::{model::AccessFlags, Result};

/// Source of compiled type bytes, queried by mapped internal name.
///
/// Implementations must be safe to call concurrently. `Ok(None)` means the type is unknown;
/// errors are logged by callers and treated the same way.
pub trait BytesProvider: Send + Sync {
    /// Returns the compiled bytes of `type_name`, if available.
    ///
    /// # Errors
    ///
    /// Implementation-defined, typically I/O failures.
    fn fetch(&self, type_name: &str) -> Result<Option<Vec<u8>>>;
}

/// Extracts the structural header from compiled bytes.
pub trait HeaderReader: Send + Sync {
    /// Reads the header without decoding method bodies.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a valid compiled type.
    fn read(&self, bytes: &[u8]) -> Result<TypeHeader>;
}

/// A declared field as seen in a type header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHeader {
    /// Access flags
    pub access: AccessFlags,
    /// Field name
    pub name: String,
    /// Field descriptor
    pub descriptor: String,
}

/// The structural header of a compiled type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHeader {
    /// Internal name as declared in the bytes
    pub name: String,
    /// Type access flags
    pub access: AccessFlags,
    /// Direct super type, absent for the hierarchy root
    pub super_type: Option<String>,
    /// Directly implemented interfaces, in declaration order
    pub interfaces: Vec<String>,
    /// Declared fields
    pub fields: Vec<FieldHeader>,
}

impl TypeHeader {
    /// Descriptor of the declared field `name`, if present.
    #[must_use]
    pub fn field_descriptor(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.descriptor.as_str())
    }
}
