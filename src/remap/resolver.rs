//! Inheritance-aware merging of per-type member tables.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, RwLock},
};

use dashmap::{DashMap, DashSet};

use crate::{
    hierarchy::TypeHierarchyResolver,
    mapping::{descriptor::map_descriptor, RawTable, ResolvedTable, TypeTable},
};

/// Default limit on the ancestor chain length followed while merging.
pub const MAX_HIERARCHY_DEPTH: usize = 256;

/// Builds and caches the [`ResolvedTable`] of each type.
///
/// A resolved table is the overlay of every ancestor's resolved table (super type first, then
/// interfaces in declaration order, later entries overwriting earlier ones) with the type's
/// own [`RawTable`] on top. Types are keyed by their raw spelling; queries with a mapped
/// spelling are canonicalized through the type table first.
///
/// Types whose merge produced nothing are remembered in a negative cache, so that repeated
/// lookups on unmapped types touch neither the hierarchy nor the merge lock again. Any
/// mutation of a raw table evicts that type's resolved and negative entries. Tables already
/// merged into descendants are left as they are.
pub struct SymbolTableResolver {
    types: Arc<TypeTable>,
    hierarchy: Arc<TypeHierarchyResolver>,
    raw: RwLock<HashMap<String, RawTable>>,
    resolved: DashMap<String, Arc<ResolvedTable>>,
    negative: DashSet<String>,
    retrofitted: DashSet<String>,
    merge_lock: Mutex<()>,
    retrofit_descriptors: bool,
    max_depth: usize,
}

impl SymbolTableResolver {
    /// Creates a resolver over the raw member tables of a stage.
    pub fn new(
        types: Arc<TypeTable>,
        hierarchy: Arc<TypeHierarchyResolver>,
        raw: HashMap<String, RawTable>,
    ) -> Self {
        SymbolTableResolver {
            types,
            hierarchy,
            raw: RwLock::new(raw),
            resolved: DashMap::new(),
            negative: DashSet::new(),
            retrofitted: DashSet::new(),
            merge_lock: Mutex::new(()),
            retrofit_descriptors: true,
            max_depth: MAX_HIERARCHY_DEPTH,
        }
    }

    /// Enables or disables descriptor retrofitting of descriptor-less field entries.
    #[must_use]
    pub fn with_retrofit(mut self, enabled: bool) -> Self {
        self.retrofit_descriptors = enabled;
        self
    }

    /// Sets the maximum ancestor chain length.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// The raw spelling of `type_name`.
    #[must_use]
    pub fn canonical(&self, type_name: &str) -> String {
        self.types.unmap(type_name)
    }

    /// Returns the merged table of `type_name`, or `None` if nothing is mapped on it or any
    /// of its ancestors.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<Arc<ResolvedTable>> {
        let canonical = self.canonical(type_name);
        if let Some(table) = self.resolved.get(&canonical) {
            return Some(table.clone());
        }
        if self.negative.contains(&canonical) {
            return None;
        }

        let _guard = lock_recover!(self.merge_lock);
        let mut visiting = HashSet::new();
        self.build(&canonical, &mut visiting, 0)
    }

    /// Field lookup in the raw table declared on `owner`.
    #[must_use]
    pub fn raw_field(&self, owner: &str, name: &str, descriptor: Option<&str>) -> Option<String> {
        let canonical = self.canonical(owner);
        with_read!(self.raw, |raw: &HashMap<String, RawTable>| {
            raw.get(&canonical)
                .and_then(|table| table.field(name, descriptor))
                .map(str::to_string)
        })
    }

    /// Records `name → target` on `owner` under the descriptor key (if given) and the
    /// descriptor-less key, keeping existing entries. Evicts `owner` if anything was added.
    pub fn record_field(&self, owner: &str, name: &str, descriptor: Option<&str>, target: &str) {
        let canonical = self.canonical(owner);
        let _guard = lock_recover!(self.merge_lock);

        let added = with_write!(self.raw, |raw: &mut HashMap<String, RawTable>| {
            let table = raw.entry(canonical.clone()).or_default();
            let mut added = false;
            if let Some(descriptor) = descriptor {
                added |= table.fields.insert_if_absent(name, Some(descriptor), target);
            }
            added | table.fields.insert_if_absent(name, None, target)
        });

        if added {
            self.evict_locked(&canonical);
        }
    }

    /// Applies `update` to the raw table of `owner` and evicts it.
    pub fn update_raw<F>(&self, owner: &str, update: F)
    where
        F: FnOnce(&mut RawTable),
    {
        let canonical = self.canonical(owner);
        let _guard = lock_recover!(self.merge_lock);
        with_write!(self.raw, |raw: &mut HashMap<String, RawTable>| {
            update(raw.entry(canonical.clone()).or_default());
        });
        self.evict_locked(&canonical);
    }

    /// Drops the cached resolved and negative entries of `type_name`.
    pub fn evict(&self, type_name: &str) {
        let canonical = self.canonical(type_name);
        let _guard = lock_recover!(self.merge_lock);
        self.evict_locked(&canonical);
    }

    /// Number of cached resolved tables.
    #[must_use]
    pub fn resolved_len(&self) -> usize {
        self.resolved.len()
    }

    /// Number of cached negative entries.
    #[must_use]
    pub fn negative_len(&self) -> usize {
        self.negative.len()
    }

    /// Number of types with a raw table.
    #[must_use]
    pub fn raw_len(&self) -> usize {
        with_read!(self.raw, |raw: &HashMap<String, RawTable>| raw.len())
    }

    fn evict_locked(&self, canonical: &str) {
        self.resolved.remove(canonical);
        self.negative.remove(canonical);
        tracing::trace!(type_name = canonical, "evicted resolved table");
    }

    fn build(
        &self,
        canonical: &str,
        visiting: &mut HashSet<String>,
        depth: usize,
    ) -> Option<Arc<ResolvedTable>> {
        if let Some(table) = self.resolved.get(canonical) {
            return Some(table.clone());
        }
        if self.negative.contains(canonical) {
            return None;
        }
        if depth > self.max_depth {
            tracing::warn!(
                type_name = canonical,
                max_depth = self.max_depth,
                "hierarchy too deep, ignoring further ancestors"
            );
            return None;
        }
        if !visiting.insert(canonical.to_string()) {
            tracing::debug!(type_name = canonical, "cyclic hierarchy");
            return None;
        }

        let mut merged = ResolvedTable::new();
        for parent in self.parents_of(canonical) {
            if let Some(table) = self.build(&parent, visiting, depth + 1) {
                merged.overlay(&table);
            }
        }

        if self.retrofit_descriptors {
            self.retrofit(canonical);
        }
        with_read!(self.raw, |raw: &HashMap<String, RawTable>| {
            if let Some(own) = raw.get(canonical) {
                merged.overlay(own);
            }
        });

        visiting.remove(canonical);

        if merged.is_empty() {
            self.negative.insert(canonical.to_string());
            tracing::trace!(type_name = canonical, "no symbols, cached negative");
            return None;
        }

        let merged = Arc::new(merged);
        self.resolved.insert(canonical.to_string(), merged.clone());
        tracing::trace!(
            type_name = canonical,
            fields = merged.fields.len(),
            methods = merged.methods.len(),
            "resolved symbol table"
        );
        Some(merged)
    }

    /// Canonical direct ancestors of `canonical`, without duplicates or itself.
    fn parents_of(&self, canonical: &str) -> Vec<String> {
        // the hierarchy resolver translates to the provider's spelling itself
        let parents = self.hierarchy.resolve(canonical);

        let mut result: Vec<String> = Vec::new();
        for parent in parents.iter() {
            let parent = self.canonical(parent);
            if parent != canonical && !result.contains(&parent) {
                result.push(parent);
            }
        }
        result
    }

    /// Adds descriptor-qualified keys to fields that were mapped without a descriptor.
    ///
    /// Descriptors are read from the type's header in the provider's (mapped) view, looking
    /// the field up by its source name and then by its target name.
    fn retrofit(&self, canonical: &str) {
        if !self.retrofitted.insert(canonical.to_string()) {
            return;
        }

        let pending: Vec<(String, String)> =
            with_read!(self.raw, |raw: &HashMap<String, RawTable>| {
                let Some(table) = raw.get(canonical) else {
                    return Vec::new();
                };
                let mut qualified = HashSet::new();
                for (name, descriptor, _) in table.fields.iter() {
                    if descriptor.is_some() {
                        qualified.insert(name.to_string());
                    }
                }
                table
                    .fields
                    .iter()
                    .filter(|(name, descriptor, _)| {
                        descriptor.is_none() && !qualified.contains(*name)
                    })
                    .map(|(name, _, target)| (name.to_string(), target.to_string()))
                    .collect()
            });
        if pending.is_empty() {
            return;
        }

        let mut found = Vec::new();
        for (name, target) in pending {
            let descriptor = self
                .hierarchy
                .field_descriptor(canonical, &name)
                .or_else(|| self.hierarchy.field_descriptor(canonical, &target));
            if let Some(descriptor) = descriptor {
                let descriptor = map_descriptor(&descriptor, |name| self.types.unmap(name));
                found.push((name, descriptor, target));
            }
        }
        if found.is_empty() {
            return;
        }

        tracing::trace!(type_name = canonical, count = found.len(), "retrofitted field descriptors");
        with_write!(self.raw, |raw: &mut HashMap<String, RawTable>| {
            let table = raw.entry(canonical.to_string()).or_default();
            for (name, descriptor, target) in &found {
                table
                    .fields
                    .insert_if_absent(name, Some(descriptor), target.as_str());
            }
        });
    }
}

impl std::fmt::Debug for SymbolTableResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTableResolver")
            .field("raw", &self.raw_len())
            .field("resolved", &self.resolved.len())
            .field("negative", &self.negative.len())
            .field("retrofit_descriptors", &self.retrofit_descriptors)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
