use std::{collections::HashMap, path::Path};

use crate::{
    file::File,
    mapping::{
        compose::compose,
        record::{MappingRecord, MappingRecordParser},
        table::{RawTable, TypeTable},
    },
    Result,
};

/// One directional rename stage (e.g. obfuscated → intermediate).
///
/// Holds the stage's [`TypeTable`] and, per source type, the [`RawTable`] of member renames
/// declared directly on that type. Member tables are keyed by the *source* spelling of the
/// owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingStage {
    types: TypeTable,
    members: HashMap<String, RawTable>,
}

impl MappingStage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        MappingStage::default()
    }

    /// Builds a stage from parsed records.
    ///
    /// Field records are stored under the descriptor-less fallback key and, when the record
    /// carries one, under the descriptor-qualified key as well.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MappingConflict`] if two type records disagree.
    pub fn from_records<I>(records: I) -> Result<MappingStage>
    where
        I: IntoIterator<Item = MappingRecord>,
    {
        let mut stage = MappingStage::new();
        for record in records {
            stage.insert_record(record)?;
        }
        Ok(stage)
    }

    /// Parses mapping lines and builds a stage; malformed lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MappingConflict`] if two type records disagree.
    pub fn from_lines<I, S>(lines: I) -> Result<MappingStage>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = MappingRecordParser::new().parse(lines);
        MappingStage::from_records(parsed.records)
    }

    /// Loads a mapping file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be read and
    /// [`crate::Error::MappingConflict`] if two type records disagree.
    pub fn from_path(path: &Path) -> Result<MappingStage> {
        let file = File::from_file(path)?;
        let stage = MappingStage::from_lines(file.text().lines())?;
        tracing::info!(
            path = %path.display(),
            types = stage.types.len(),
            owners = stage.members.len(),
            "loaded mapping stage"
        );
        Ok(stage)
    }

    /// Composes a chain of stages left to right; an empty chain yields an empty stage.
    #[must_use]
    pub fn compose_all(stages: &[MappingStage]) -> MappingStage {
        let mut stages = stages.iter();
        let Some(first) = stages.next() else {
            return MappingStage::new();
        };
        stages.fold(first.clone(), |composed, next| compose(&composed, next))
    }

    fn insert_record(&mut self, record: MappingRecord) -> Result<()> {
        match record {
            MappingRecord::Type { from, to } => self.types.insert(from, to)?,
            MappingRecord::Field {
                from,
                from_descriptor,
                to,
                ..
            } => {
                let table = self.members.entry(from.owner).or_default();
                if let Some(descriptor) = from_descriptor.as_deref() {
                    table.fields.insert(&from.name, Some(descriptor), to.name.clone());
                }
                table.fields.insert(&from.name, None, to.name);
            }
            MappingRecord::Method {
                from,
                from_descriptor,
                to,
                ..
            } => {
                self.members
                    .entry(from.owner)
                    .or_default()
                    .methods
                    .insert(&from.name, Some(&from_descriptor), to.name);
            }
        }
        Ok(())
    }

    /// The stage's type table.
    #[must_use]
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// Mutable access to the type table.
    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    /// All raw member tables, keyed by source owner name.
    #[must_use]
    pub fn members(&self) -> &HashMap<String, RawTable> {
        &self.members
    }

    /// The raw member table declared on `owner`.
    #[must_use]
    pub fn raw(&self, owner: &str) -> Option<&RawTable> {
        self.members.get(owner)
    }

    /// The raw member table declared on `owner`, created if missing.
    pub fn raw_mut(&mut self, owner: &str) -> &mut RawTable {
        self.members.entry(owner.to_string()).or_default()
    }

    /// Returns `true` if the stage has neither type nor member entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.members.values().all(RawTable::is_empty)
    }

    /// Splits the stage into its type table and raw member tables.
    #[must_use]
    pub fn into_parts(self) -> (TypeTable, HashMap<String, RawTable>) {
        (self.types, self.members)
    }
}
