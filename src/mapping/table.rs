//! Type and member lookup tables.

use std::{collections::HashMap, fmt};

use crate::{Error::MappingConflict, Result};

/// Maximum number of `$` suffixes stripped when looking up a nested type name.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Bidirectional type-name table for one stage.
///
/// Lookups are nested-aware: `Outer$Inner$1` that is not mapped itself resolves through the
/// longest mapped qualifier, re-appending the unmapped suffix unchanged.
///
/// ```rust
/// use jremap::mapping::TypeTable;
///
/// let mut table = TypeTable::new();
/// table.insert("a", "net/minecraft/world/Widget")?;
/// assert_eq!(table.map("a$1"), "net/minecraft/world/Widget$1");
/// assert_eq!(table.unmap("net/minecraft/world/Widget$1"), "a$1");
/// assert_eq!(table.map("b"), "b");
/// # Ok::<(), jremap::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTable {
    forward: HashMap<String, String>,
    inverse: HashMap<String, String>,
    max_nesting: usize,
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable {
            forward: HashMap::new(),
            inverse: HashMap::new(),
            max_nesting: MAX_NESTING_DEPTH,
        }
    }
}

impl TypeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        TypeTable::default()
    }

    /// Inserts a `from → to` pair.
    ///
    /// Re-inserting an identical pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MappingConflict`] if `from` is already mapped elsewhere or `to`
    /// is already the target of a different name.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> Result<()> {
        let from = from.into();
        let to = to.into();

        if let Some(existing) = self.forward.get(&from) {
            if *existing == to {
                return Ok(());
            }
            return Err(MappingConflict {
                from,
                existing: existing.clone(),
                to,
            });
        }
        if let Some(existing) = self.inverse.get(&to) {
            return Err(MappingConflict {
                from: to,
                existing: existing.clone(),
                to: from,
            });
        }

        self.inverse.insert(to.clone(), from.clone());
        self.forward.insert(from, to);
        Ok(())
    }

    /// Limits how many `$` suffixes a lookup strips before giving up.
    pub fn set_max_nesting(&mut self, depth: usize) {
        self.max_nesting = depth;
    }

    /// Number of type pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns `true` if no types are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Exact forward lookup, without nested-name handling.
    #[must_use]
    pub fn get(&self, from: &str) -> Option<&str> {
        self.forward.get(from).map(String::as_str)
    }

    /// Exact inverse lookup, without nested-name handling.
    #[must_use]
    pub fn get_inverse(&self, to: &str) -> Option<&str> {
        self.inverse.get(to).map(String::as_str)
    }

    /// Nested-aware forward lookup; `None` when neither the name nor any qualifier is mapped.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<String> {
        translate(&self.forward, name, self.max_nesting)
    }

    /// Nested-aware inverse lookup; `None` when neither the name nor any qualifier is mapped.
    #[must_use]
    pub fn lookup_inverse(&self, name: &str) -> Option<String> {
        translate(&self.inverse, name, self.max_nesting)
    }

    /// Maps a name forward, identity on miss.
    #[must_use]
    pub fn map(&self, name: &str) -> String {
        self.lookup(name).unwrap_or_else(|| name.to_string())
    }

    /// Maps a name backward, identity on miss.
    #[must_use]
    pub fn unmap(&self, name: &str) -> String {
        self.lookup_inverse(name).unwrap_or_else(|| name.to_string())
    }

    /// Iterates over `(from, to)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }
}

fn translate(lookup: &HashMap<String, String>, name: &str, max_nesting: usize) -> Option<String> {
    if lookup.is_empty() {
        return None;
    }

    let mut qualifier = name;
    for _ in 0..=max_nesting {
        if let Some(mapped) = lookup.get(qualifier) {
            let suffix = &name[qualifier.len()..];
            let mut result = String::with_capacity(mapped.len() + suffix.len());
            result.push_str(mapped);
            result.push_str(suffix);
            return Some(result);
        }

        qualifier = &qualifier[..qualifier.rfind('$')?];
    }

    tracing::trace!(name, "nesting depth exceeded, leaving name unmapped");
    None
}

/// Key of a member table entry: a name and an optional descriptor.
///
/// Fields are stored under both `(name, Some(descriptor))` and the fallback `(name, None)`;
/// methods are always keyed with their descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    /// Member name
    pub name: String,
    /// Member descriptor, absent for descriptor-less field fallbacks
    pub descriptor: Option<String>,
}

impl MemberKey {
    /// Creates a key.
    pub fn new(name: impl Into<String>, descriptor: Option<&str>) -> Self {
        MemberKey {
            name: name.into(),
            descriptor: descriptor.map(str::to_string),
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.descriptor {
            Some(descriptor) => write!(f, "{}:{}", self.name, descriptor),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Member renames keyed by [`MemberKey`].
///
/// Stored as name → overloads so that lookups never allocate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberTable {
    entries: HashMap<String, Vec<(Option<String>, String)>>,
}

impl MemberTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        MemberTable::default()
    }

    /// Inserts or replaces the target for `(name, descriptor)`, returning the previous target.
    pub fn insert(
        &mut self,
        name: &str,
        descriptor: Option<&str>,
        target: impl Into<String>,
    ) -> Option<String> {
        let target = target.into();
        let overloads = self.entries.entry(name.to_string()).or_default();
        if let Some(slot) = overloads
            .iter_mut()
            .find(|(existing, _)| existing.as_deref() == descriptor)
        {
            return Some(std::mem::replace(&mut slot.1, target));
        }
        overloads.push((descriptor.map(str::to_string), target));
        None
    }

    /// Inserts only if `(name, descriptor)` has no entry yet; returns `true` if inserted.
    pub fn insert_if_absent(
        &mut self,
        name: &str,
        descriptor: Option<&str>,
        target: impl Into<String>,
    ) -> bool {
        if self.get(name, descriptor).is_some() {
            return false;
        }
        self.insert(name, descriptor, target);
        true
    }

    /// Exact lookup of `(name, descriptor)`.
    #[must_use]
    pub fn get(&self, name: &str, descriptor: Option<&str>) -> Option<&str> {
        self.entries.get(name).and_then(|overloads| {
            overloads
                .iter()
                .find(|(existing, _)| existing.as_deref() == descriptor)
                .map(|(_, target)| target.as_str())
        })
    }

    /// Returns `true` if the exact key exists.
    #[must_use]
    pub fn contains(&self, name: &str, descriptor: Option<&str>) -> bool {
        self.get(name, descriptor).is_some()
    }

    /// Copies every entry of `other` into this table, overwriting on key collision.
    pub fn overlay(&mut self, other: &MemberTable) {
        for (name, descriptor, target) in other.iter() {
            self.insert(name, descriptor, target);
        }
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, descriptor, target)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>, &str)> {
        self.entries.iter().flat_map(|(name, overloads)| {
            overloads
                .iter()
                .map(move |(descriptor, target)| (name.as_str(), descriptor.as_deref(), target.as_str()))
        })
    }
}

/// Field and method renames for one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// Field renames, keyed with and without descriptor
    pub fields: MemberTable,
    /// Method renames, keyed with descriptor
    pub methods: MemberTable,
}

/// Renames declared directly on a type, as loaded from a stage.
pub type RawTable = SymbolTable;

/// Renames visible on a type: its own entries merged over all of its ancestors'.
pub type ResolvedTable = SymbolTable;

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Returns `true` if there are neither field nor method entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }

    /// Overlays `other` on top of this table.
    pub fn overlay(&mut self, other: &SymbolTable) {
        self.fields.overlay(&other.fields);
        self.methods.overlay(&other.methods);
    }

    /// Field lookup: `(name, descriptor)` first, then the descriptor-less fallback.
    #[must_use]
    pub fn field(&self, name: &str, descriptor: Option<&str>) -> Option<&str> {
        descriptor
            .and_then(|descriptor| self.fields.get(name, Some(descriptor)))
            .or_else(|| self.fields.get(name, None))
    }

    /// Method lookup: exact `(name, descriptor)` only.
    #[must_use]
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&str> {
        self.methods.get(name, Some(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_round_trip() {
        let mut table = TypeTable::new();
        table.insert("a", "net/minecraft/world/Widget").unwrap();
        table.insert("b", "net/minecraft/world/Gadget").unwrap();

        for name in ["a", "b"] {
            assert_eq!(table.unmap(&table.map(name)), name);
        }
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some("net/minecraft/world/Widget"));
        assert_eq!(table.get_inverse("net/minecraft/world/Gadget"), Some("b"));
    }

    #[test]
    fn nested_suffix_is_preserved() {
        let mut table = TypeTable::new();
        table.insert("a", "Outer").unwrap();
        table.insert("a$b", "Outer$Named").unwrap();

        assert_eq!(table.map("a$1"), "Outer$1");
        assert_eq!(table.map("a$1$2"), "Outer$1$2");
        assert_eq!(table.map("a$b$1"), "Outer$Named$1");
        assert_eq!(table.unmap("Outer$Named$1"), "a$b$1");
        assert_eq!(table.map("z$1"), "z$1");
        assert!(table.lookup("z$1").is_none());
        assert_eq!(table.map("a$"), "Outer$");

        table.set_max_nesting(1);
        assert_eq!(table.map("a$1"), "Outer$1");
        assert_eq!(table.map("a$1$2"), "a$1$2");
    }

    #[test]
    fn empty_table_is_identity() {
        let table = TypeTable::new();
        assert!(table.is_empty());
        assert_eq!(table.map("a$1"), "a$1");
        assert_eq!(table.unmap("Foo"), "Foo");
    }

    #[test]
    fn conflicts() {
        let mut table = TypeTable::new();
        table.insert("a", "Foo").unwrap();
        table.insert("a", "Foo").unwrap();

        match table.insert("a", "Bar") {
            Err(crate::Error::MappingConflict { from, existing, to }) => {
                assert_eq!((from.as_str(), existing.as_str(), to.as_str()), ("a", "Foo", "Bar"));
            }
            other => panic!("Expected MappingConflict, got {other:?}"),
        }
        assert!(table.insert("b", "Foo").is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn member_table_keys() {
        let mut table = MemberTable::new();
        assert!(table.insert("b", Some("I"), "count").is_none());
        table.insert("b", Some("J"), "total");
        table.insert("b", None, "count");

        assert_eq!(table.get("b", Some("J")), Some("total"));
        assert_eq!(table.get("b", None), Some("count"));
        assert_eq!(table.get("b", Some("Z")), None);
        assert_eq!(table.len(), 3);

        assert_eq!(table.insert("b", None, "total"), Some("count".to_string()));
        assert!(!table.insert_if_absent("b", Some("I"), "other"));
        assert!(table.insert_if_absent("c", None, "other"));
    }

    #[test]
    fn field_overload_disambiguation() {
        let mut table = SymbolTable::new();
        table.fields.insert("b", Some("I"), "count");
        table.fields.insert("b", Some("J"), "total");
        table.fields.insert("b", None, "total");

        assert_eq!(table.field("b", Some("I")), Some("count"));
        assert_eq!(table.field("b", Some("J")), Some("total"));
        assert_eq!(table.field("b", Some("Z")), Some("total"));
        assert_eq!(table.field("b", None), Some("total"));
    }

    #[test]
    fn overlay_overwrites() {
        let mut base = SymbolTable::new();
        base.methods.insert("c", Some("()V"), "parentName");
        base.fields.insert("d", None, "kept");

        let mut derived = SymbolTable::new();
        derived.methods.insert("c", Some("()V"), "childName");

        base.overlay(&derived);
        assert_eq!(base.method("c", "()V"), Some("childName"));
        assert_eq!(base.field("d", Some("I")), Some("kept"));
        assert_eq!(base.method("c", "(I)V"), None);
    }

    #[test]
    fn member_key_display() {
        assert_eq!(MemberKey::new("b", Some("I")).to_string(), "b:I");
        assert_eq!(MemberKey::new("b", None).to_string(), "b");
    }
}
