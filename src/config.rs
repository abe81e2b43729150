//! Remapper configuration
//!
//! This module collects everything needed to build a [`crate::Remapper`]: the ordered list
//! of mapping stage files, member overrides and the tuning knobs of the symbol resolver.

use std::path::PathBuf;

use crate::{
    mapping::{MappingStage, MAX_NESTING_DEPTH},
    remap::{MemberOverrides, MAX_HIERARCHY_DEPTH},
    Result,
};

/// Configuration for building a [`crate::Remapper`]
///
/// Stage files are composed left to right, so `[notch → srg, srg → mcp]` yields a
/// `notch → mcp` remapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapperConfig {
    /// Mapping stage files, applied in order
    pub stages: Vec<PathBuf>,

    /// Add descriptor-qualified keys to fields mapped without a descriptor, using the
    /// declared field types from the byte provider
    pub retrofit_field_descriptors: bool,

    /// Ignore the member overrides entirely
    pub skip_member_overrides: bool,

    /// Member renames applied before table lookups
    pub overrides: MemberOverrides,

    /// Maximum ancestor chain length followed while merging symbol tables (default: 256)
    pub max_hierarchy_depth: usize,

    /// Maximum number of `$` suffixes stripped during nested type lookups (default: 64)
    pub max_nesting_depth: usize,
}

impl Default for RemapperConfig {
    fn default() -> Self {
        Self {
            stages: Vec::new(),
            retrofit_field_descriptors: true,
            skip_member_overrides: false,
            overrides: MemberOverrides::conflict_resolution(),
            max_hierarchy_depth: MAX_HIERARCHY_DEPTH,
            max_nesting_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl RemapperConfig {
    /// Creates a configuration without overrides or descriptor retrofitting
    ///
    /// Lookups are answered from the mapping tables alone, which keeps tests and tools
    /// independent of what the byte provider can see.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            retrofit_field_descriptors: false,
            skip_member_overrides: true,
            overrides: MemberOverrides::new(),
            ..Self::default()
        }
    }

    /// Creates the default configuration for the given stage files
    #[must_use]
    pub fn with_stages<I, P>(stages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            stages: stages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Appends a stage file
    #[must_use]
    pub fn stage(mut self, path: impl Into<PathBuf>) -> Self {
        self.stages.push(path.into());
        self
    }

    /// Replaces the member overrides
    #[must_use]
    pub fn overrides(mut self, overrides: MemberOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Enables or disables the member overrides
    #[must_use]
    pub fn skip_member_overrides(mut self, skip: bool) -> Self {
        self.skip_member_overrides = skip;
        self
    }

    /// Enables or disables field descriptor retrofitting
    #[must_use]
    pub fn retrofit_field_descriptors(mut self, enabled: bool) -> Self {
        self.retrofit_field_descriptors = enabled;
        self
    }

    /// The overrides in effect, taking `skip_member_overrides` into account
    #[must_use]
    pub fn effective_overrides(&self) -> MemberOverrides {
        if self.skip_member_overrides {
            MemberOverrides::new()
        } else {
            self.overrides.clone()
        }
    }

    /// Loads and composes the configured stage files
    ///
    /// A stage file that cannot be read contributes an empty stage, which leaves the composed
    /// mapping empty as well; the remapper then runs as the identity. The condition is logged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MappingConflict`] if a stage file maps two types to the same
    /// name.
    pub fn load_stage(&self) -> Result<MappingStage> {
        let mut stages = Vec::with_capacity(self.stages.len());
        for path in &self.stages {
            match MappingStage::from_path(path) {
                Ok(stage) => stages.push(stage),
                Err(crate::Error::FileError(error)) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "mapping file unreadable, continuing with an empty stage"
                    );
                    stages.push(MappingStage::new());
                }
                Err(error) => return Err(error),
            }
        }

        let mut stage = MappingStage::compose_all(&stages);
        stage.types_mut().set_max_nesting(self.max_nesting_depth);
        Ok(stage)
    }
}
