//! Flat member-name dictionary.
//!
//! Intermediate (SRG-style) member names such as `field_70170_p` or `func_71410_x` are
//! globally unique, so a dictionary keyed by the bare name is enough to translate them without
//! knowing the owner. This serves string constants that embed member names (reflection
//! lookups) and record components, whose accessor may be mapped as a method or a field.

use std::collections::HashMap;

use strum::Display;

use crate::mapping::record::MappingRecord;

/// Member domain for a dictionary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Domain {
    /// Field names only
    Field,
    /// Method names only
    Method,
    /// Method names first, then field names
    Any,
}

/// Owner-independent member name map, built from `FD`/`MD` records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDictionary {
    fields: HashMap<String, String>,
    methods: HashMap<String, String>,
}

impl NameDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        NameDictionary::default()
    }

    /// Builds a dictionary from records, keeping the last segment of each name.
    ///
    /// Identity renames are skipped; type records are ignored.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a MappingRecord>,
    {
        let mut dictionary = NameDictionary::new();
        for record in records {
            match record {
                MappingRecord::Field { from, to, .. } if from.name != to.name => {
                    dictionary.fields.insert(from.name.clone(), to.name.clone());
                }
                MappingRecord::Method { from, to, .. } if from.name != to.name => {
                    dictionary.methods.insert(from.name.clone(), to.name.clone());
                }
                _ => {}
            }
        }
        dictionary
    }

    /// Adds a single entry.
    pub fn insert(&mut self, domain: Domain, from: impl Into<String>, to: impl Into<String>) {
        match domain {
            Domain::Field => self.fields.insert(from.into(), to.into()),
            Domain::Method | Domain::Any => self.methods.insert(from.into(), to.into()),
        };
    }

    /// Looks up a bare member name in `domain`.
    #[must_use]
    pub fn lookup(&self, domain: Domain, name: &str) -> Option<&str> {
        match domain {
            Domain::Field => self.fields.get(name),
            Domain::Method => self.methods.get(name),
            Domain::Any => self.methods.get(name).or_else(|| self.fields.get(name)),
        }
        .map(String::as_str)
    }

    /// Translates a bare member name in any domain, identity on miss.
    #[must_use]
    pub fn translate(&self, name: &str) -> String {
        self.lookup(Domain::Any, name)
            .unwrap_or(name)
            .to_string()
    }

    /// Number of entries across both domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len() + self.methods.len()
    }

    /// Returns `true` if the dictionary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }
}
