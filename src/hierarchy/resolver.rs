use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use dashmap::DashMap;

use crate::{
    hierarchy::{BytesProvider, HeaderReader, TypeHeader},
    mapping::TypeTable,
};

/// Direct ancestors of a type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parents {
    /// Direct super type
    pub super_type: Option<String>,
    /// Directly implemented interfaces, in declaration order
    pub interfaces: Vec<String>,
}

impl Parents {
    /// Returns `true` if there is neither a super type nor an interface.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.super_type.is_none() && self.interfaces.is_empty()
    }

    /// Iterates over the super type first, then the interfaces in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.super_type
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }
}

/// Cached `type → header` resolution through a [`BytesProvider`] and a [`HeaderReader`].
///
/// The provider is queried with the *mapped* spelling of the requested name, and results are
/// cached under that spelling. A type queried by its raw name and by its mapped name shares
/// one entry and one fetch. Misses (unknown type, provider failure, unreadable bytes) are
/// cached too and read as "no parents".
///
/// The check → fetch → populate sequence runs under a mutex with a second cache check
/// inside, so concurrent first queries of a name invoke the provider once.
///
/// Headers of types the provider cannot see (e.g. classes only present in a patched binary)
/// can be supplied with [`TypeHierarchyResolver::declare`].
pub struct TypeHierarchyResolver {
    types: Arc<TypeTable>,
    provider: Arc<dyn BytesProvider>,
    reader: Arc<dyn HeaderReader>,
    headers: DashMap<String, Option<Arc<TypeHeader>>>,
    fetch_lock: Mutex<()>,
    fetches: AtomicUsize,
}

impl TypeHierarchyResolver {
    /// Creates a resolver using `types` to compute the spelling handed to `provider`.
    pub fn new(
        types: Arc<TypeTable>,
        provider: Arc<dyn BytesProvider>,
        reader: Arc<dyn HeaderReader>,
    ) -> Self {
        TypeHierarchyResolver {
            types,
            provider,
            reader,
            headers: DashMap::new(),
            fetch_lock: Mutex::new(()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Returns the header of `type_name`, fetching it on first use.
    #[must_use]
    pub fn header(&self, type_name: &str) -> Option<Arc<TypeHeader>> {
        let mapped = self.types.map(type_name);
        if let Some(cached) = self.headers.get(&mapped) {
            return cached.value().clone();
        }

        let _guard = lock_recover!(self.fetch_lock);
        if let Some(cached) = self.headers.get(&mapped) {
            return cached.value().clone();
        }

        let header = self.load(type_name, &mapped);
        self.headers.insert(mapped, header.clone());
        header
    }

    /// Supplies the header of `type_name` unless the provider already yielded one.
    ///
    /// `header` is expected in the provider's (mapped) spelling. A cached miss is replaced
    /// and a type never queried is not fetched. Returns `true` if the header was stored.
    pub fn declare(&self, type_name: &str, header: TypeHeader) -> bool {
        let mapped = self.types.map(type_name);
        let _guard = lock_recover!(self.fetch_lock);
        if matches!(self.headers.get(&mapped).as_deref(), Some(Some(_))) {
            return false;
        }

        tracing::trace!(type_name, %mapped, super_type = ?header.super_type, "declared type header");
        self.headers.insert(mapped, Some(Arc::new(header)));
        true
    }

    /// Returns the direct ancestors of `type_name`; empty when nothing is known about it.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Parents {
        match self.header(type_name) {
            Some(header) => Parents {
                super_type: header.super_type.clone(),
                interfaces: header.interfaces.clone(),
            },
            None => Parents::default(),
        }
    }

    /// Returns the declared descriptor of field `name` in `owner`.
    #[must_use]
    pub fn field_descriptor(&self, owner: &str, name: &str) -> Option<String> {
        self.header(owner)?
            .field_descriptor(name)
            .map(str::to_string)
    }

    /// Number of provider invocations so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Number of cached names, positive and negative.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.headers.len()
    }

    fn load(&self, type_name: &str, mapped: &str) -> Option<Arc<TypeHeader>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let bytes = match self.provider.fetch(mapped) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::trace!(type_name, %mapped, "no bytes for type");
                return None;
            }
            Err(error) => {
                tracing::warn!(type_name, %mapped, %error, "failed to fetch type bytes");
                return None;
            }
        };

        match self.reader.read(&bytes) {
            Ok(header) => {
                tracing::trace!(type_name, super_type = ?header.super_type, "read type header");
                Some(Arc::new(header))
            }
            Err(error) => {
                tracing::warn!(type_name, %mapped, %error, "failed to read type header");
                None
            }
        }
    }
}

impl std::fmt::Debug for TypeHierarchyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeHierarchyResolver")
            .field("cached", &self.headers.len())
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}
