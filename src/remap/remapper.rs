use std::{borrow::Cow, sync::Arc};

use rayon::prelude::*;

use crate::{
    classfile::ClassHeaderReader,
    config::RemapperConfig,
    hierarchy::{
        BytesProvider, FieldHeader, HeaderReader, MemoryProvider, TypeHeader,
        TypeHierarchyResolver,
    },
    mapping::{descriptor, MappingStage, TypeTable},
    model::ClassNode,
    remap::{overrides::MemberOverrides, resolver::SymbolTableResolver},
    Result,
};

/// Translates type, field and method names from the source naming space of a mapping into
/// its target naming space.
///
/// Type lookups are answered from the composed [`TypeTable`]. Member lookups go through the
/// owner's inheritance-merged symbol table, so a member declared on an ancestor is found when
/// queried through a descendant. Every operation is the identity for names that are not
/// mapped.
///
/// A `Remapper` is `Send + Sync` and meant to be shared through an [`Arc`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use jremap::{
///     classfile::ClassHeaderReader, hierarchy::MemoryProvider, mapping::MappingStage, Remapper,
/// };
///
/// let stage = MappingStage::from_lines([
///     "CL: a/B net/example/Widget",
///     "FD: a/B/x net/example/Widget/count",
///     "MD: a/B/go (I)V net/example/Widget/run (I)V",
/// ])?;
/// let remapper = Remapper::new(stage, Arc::new(MemoryProvider::new()), Arc::new(ClassHeaderReader));
///
/// assert_eq!(remapper.map_type("a/B"), "net/example/Widget");
/// assert_eq!(remapper.map_field("a/B", "x", None), "count");
/// assert_eq!(remapper.map_method("a/B", "go", "(I)V"), "run");
/// assert_eq!(remapper.map_type("z/Q"), "z/Q");
/// # Ok::<(), jremap::Error>(())
/// ```
pub struct Remapper {
    types: Arc<TypeTable>,
    hierarchy: Arc<TypeHierarchyResolver>,
    symbols: SymbolTableResolver,
    overrides: MemberOverrides,
    initialized: bool,
}

impl Remapper {
    /// Creates a remapper over `stage` with the default configuration.
    pub fn new(
        stage: MappingStage,
        provider: Arc<dyn BytesProvider>,
        reader: Arc<dyn HeaderReader>,
    ) -> Self {
        Remapper::with_config(stage, provider, reader, &RemapperConfig::default())
    }

    /// Creates a remapper over an already loaded `stage`.
    ///
    /// An empty type table means no mapping was loaded; the remapper then passes every name
    /// through unchanged.
    pub fn with_config(
        stage: MappingStage,
        provider: Arc<dyn BytesProvider>,
        reader: Arc<dyn HeaderReader>,
        config: &RemapperConfig,
    ) -> Self {
        let (mut types, raw) = stage.into_parts();
        types.set_max_nesting(config.max_nesting_depth);

        let initialized = !types.is_empty();
        if initialized {
            tracing::debug!(types = types.len(), owners = raw.len(), "remapper ready");
        } else {
            tracing::warn!("uninitialized mapping, all names pass through unchanged");
        }

        let types = Arc::new(types);
        let hierarchy = Arc::new(TypeHierarchyResolver::new(types.clone(), provider, reader));
        let symbols = SymbolTableResolver::new(types.clone(), hierarchy.clone(), raw)
            .with_retrofit(config.retrofit_field_descriptors)
            .with_max_depth(config.max_hierarchy_depth);

        Remapper {
            types,
            hierarchy,
            symbols,
            overrides: config.effective_overrides(),
            initialized,
        }
    }

    /// Loads the stages named in `config` and builds a remapper over them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MappingConflict`] if a stage file is inconsistent. Unreadable
    /// stage files are not an error.
    pub fn from_config(
        config: &RemapperConfig,
        provider: Arc<dyn BytesProvider>,
        reader: Arc<dyn HeaderReader>,
    ) -> Result<Self> {
        let stage = config.load_stage()?;
        Ok(Remapper::with_config(stage, provider, reader, config))
    }

    /// A remapper that maps nothing.
    #[must_use]
    pub fn identity() -> Self {
        Remapper::with_config(
            MappingStage::new(),
            Arc::new(MemoryProvider::new()),
            Arc::new(ClassHeaderReader),
            &RemapperConfig::minimal(),
        )
    }

    /// Makes the ancestors and fields of `class` known to member lookups.
    ///
    /// Classes handed to the remapper are often absent from the bytes provider (new or patched
    /// classes). Declaring them lets members inherited through their super type and interfaces
    /// resolve. A header the provider already yielded is kept.
    pub fn declare_class(&self, class: &ClassNode) {
        if !self.initialized {
            return;
        }

        let header = TypeHeader {
            name: self.map_type(&class.name),
            access: class.access,
            super_type: class.super_name.as_deref().map(|name| self.map_type(name)),
            interfaces: class
                .interfaces
                .iter()
                .map(|name| self.map_type(name))
                .collect(),
            fields: class
                .fields
                .iter()
                .map(|field| FieldHeader {
                    access: field.access,
                    name: field.name.clone(),
                    descriptor: self.map_descriptor(&field.descriptor),
                })
                .collect(),
        };
        if self.hierarchy.declare(&class.name, header) {
            self.symbols.evict(&class.name);
        }
    }

    /// Returns `false` if no mapping was loaded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Maps an internal type name, nested-suffix aware; identity on miss.
    #[must_use]
    pub fn map_type(&self, name: &str) -> String {
        self.types.map(name)
    }

    /// Maps an internal type name backwards; identity on miss.
    #[must_use]
    pub fn unmap_type(&self, name: &str) -> String {
        self.types.unmap(name)
    }

    /// Exact inverse lookup, `None` unless `name` is itself a mapping target.
    #[must_use]
    pub fn unmap_exact(&self, name: &str) -> Option<&str> {
        self.types.get_inverse(name)
    }

    /// Returns `true` if `name` maps to a different name.
    #[must_use]
    pub fn is_remapped(&self, name: &str) -> bool {
        self.types.lookup(name).is_some_and(|mapped| mapped != name)
    }

    /// Maps a field name of `owner`.
    ///
    /// The owner's merged table is searched for `(name, descriptor)` and then for the
    /// descriptor-less entry.
    #[must_use]
    pub fn map_field(&self, owner: &str, name: &str, descriptor: Option<&str>) -> String {
        if !self.initialized || owner.starts_with('[') {
            return name.to_string();
        }

        let name = self.override_field(owner, name, descriptor);
        match self.symbols.resolve(owner) {
            Some(table) => table
                .field(&name, descriptor)
                .map_or_else(|| name.into_owned(), str::to_string),
            None => name.into_owned(),
        }
    }

    /// Maps a method name of `owner`; only an exact `(name, descriptor)` entry matches.
    ///
    /// Array owners (e.g. `clone` on `[I`) are never mapped.
    #[must_use]
    pub fn map_method(&self, owner: &str, name: &str, descriptor: &str) -> String {
        if !self.initialized || owner.starts_with('[') {
            return name.to_string();
        }

        let name = self.override_method(owner, name, descriptor);
        match self.symbols.resolve(owner) {
            Some(table) => table
                .method(&name, descriptor)
                .map_or_else(|| name.into_owned(), str::to_string),
            None => name.into_owned(),
        }
    }

    /// Maps the name of a field *declared* on `owner`.
    ///
    /// Only the owner's own raw table is consulted, so a field hiding an inherited one keeps
    /// its own mapping. The result is recorded back into the raw table under both keys, so
    /// later lookups through `owner` or its descendants resolve this declaration rather than
    /// an inherited field of the same name.
    #[must_use]
    pub fn map_member_field_name(&self, owner: &str, name: &str, descriptor: &str) -> String {
        if !self.initialized {
            return name.to_string();
        }

        let name = self.override_field(owner, name, Some(descriptor));
        let mapped = self
            .symbols
            .raw_field(owner, &name, Some(descriptor))
            .unwrap_or_else(|| name.to_string());
        self.symbols
            .record_field(owner, &name, Some(descriptor), &mapped);
        mapped
    }

    /// Maps a record component, whose accessor may be mapped either as a method or a field.
    #[must_use]
    pub fn map_record_component(&self, owner: &str, name: &str, descriptor: &str) -> String {
        let accessor = format!("(){descriptor}");
        let mapped = self.map_method(owner, name, &accessor);
        if mapped != name {
            return mapped;
        }
        self.map_field(owner, name, Some(descriptor))
    }

    /// Maps every class type in a field or method descriptor.
    #[must_use]
    pub fn map_descriptor(&self, descriptor: &str) -> String {
        descriptor::map_descriptor(descriptor, |name| self.map_type(name))
    }

    /// Maps every class type in a method descriptor.
    #[must_use]
    pub fn map_method_descriptor(&self, descriptor: &str) -> String {
        self.map_descriptor(descriptor)
    }

    /// Maps a generic signature; `None` if the signature cannot be remapped.
    #[must_use]
    pub fn map_signature(&self, signature: &str) -> Option<String> {
        descriptor::map_signature(signature, |name| self.map_type(name))
    }

    /// Maps an operand that is an internal name or an array descriptor.
    #[must_use]
    pub fn map_internal_or_array(&self, name: &str) -> String {
        descriptor::map_internal_or_array(name, |name| self.map_type(name))
    }

    /// Declared descriptor of a static field in the provider's view of `owner`.
    ///
    /// `owner` and `name` are expected in the target naming space. Used to repair
    /// `getstatic` descriptors after a field changed its declared type between versions.
    #[must_use]
    pub fn static_field_type(&self, owner: &str, name: &str) -> Option<String> {
        self.hierarchy.field_descriptor(owner, name)
    }

    /// All mapped types as sorted `(from, to)` pairs.
    #[must_use]
    pub fn remapped_types(&self) -> Vec<(String, String)> {
        let mut types: Vec<(String, String)> = self
            .types
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        types.sort_unstable();
        types
    }

    /// Resolves the symbol tables of `types` in parallel.
    ///
    /// Returns the number of types that have a non-empty merged table.
    pub fn preload(&self, types: &[&str]) -> usize {
        let resolved = types
            .par_iter()
            .filter(|name| self.symbols.resolve(name).is_some())
            .count();
        tracing::debug!(requested = types.len(), resolved, "preloaded symbol tables");
        resolved
    }

    /// The composed type table.
    #[must_use]
    pub fn type_table(&self) -> &TypeTable {
        &self.types
    }

    /// The hierarchy resolver backing member lookups.
    #[must_use]
    pub fn hierarchy(&self) -> &TypeHierarchyResolver {
        &self.hierarchy
    }

    /// The symbol table resolver backing member lookups.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTableResolver {
        &self.symbols
    }

    fn override_field<'a>(
        &self,
        owner: &str,
        name: &'a str,
        descriptor: Option<&str>,
    ) -> Cow<'a, str> {
        if self.overrides.is_empty() {
            return Cow::Borrowed(name);
        }
        let replacement = self
            .overrides
            .field(owner, name, descriptor)
            .or_else(|| self.overrides.field(&self.map_type(owner), name, descriptor));
        match replacement {
            Some(replacement) => Cow::Owned(replacement.to_string()),
            None => Cow::Borrowed(name),
        }
    }

    fn override_method<'a>(&self, owner: &str, name: &'a str, descriptor: &str) -> Cow<'a, str> {
        if self.overrides.is_empty() {
            return Cow::Borrowed(name);
        }
        let replacement = self
            .overrides
            .method(owner, name, descriptor)
            .or_else(|| self.overrides.method(&self.map_type(owner), name, descriptor));
        match replacement {
            Some(replacement) => Cow::Owned(replacement.to_string()),
            None => Cow::Borrowed(name),
        }
    }
}

impl std::fmt::Debug for Remapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remapper")
            .field("types", &self.types.len())
            .field("initialized", &self.initialized)
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}
