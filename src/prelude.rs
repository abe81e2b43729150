//! # jremap Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the jremap library. Import it to get quick access to everything needed to load
//! mappings, build a remapper and rewrite classes.
//!
//! ```rust
//! use jremap::prelude::*;
//!
//! let remapper = Remapper::identity();
//! assert_eq!(remapper.map_type("a"), "a");
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jremap operations
pub use crate::Error;

/// The result type used throughout jremap
pub use crate::Result;

/// Options for building a remapper
pub use crate::RemapperConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Inheritance-aware name translation
pub use crate::Remapper;

/// Whole-class rewriting
pub use crate::remap::ClassRemapper;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Mappings
// ================================================================================================

/// Stages, records and composition
pub use crate::mapping::{compose, MappingRecord, MappingRecordParser, MappingStage, MemberPath};

/// Tables
pub use crate::mapping::{MemberKey, RawTable, SymbolTable, TypeTable};

/// Name dictionary for reflective string translation
pub use crate::mapping::{Domain, NameDictionary};

/// Member renames applied before lookup
pub use crate::remap::{MemberOverrides, MemberRule, OwnerPattern};

// ================================================================================================
// Hierarchy Discovery
// ================================================================================================

/// Collaborator traits and the header model
pub use crate::hierarchy::{BytesProvider, HeaderReader, TypeHeader};

/// Provider implementations
pub use crate::hierarchy::{ChainProvider, DirectoryProvider, MemoryProvider};

/// Class-file backed header reader
pub use crate::classfile::ClassHeaderReader;

// ================================================================================================
// Class Model
// ================================================================================================

/// Class trees and flags
pub use crate::model::{AccessFlags, ClassNode, FieldNode, MethodNode, Visibility};

/// Class-file decoding
pub use crate::classfile::{read_class, read_header};

// ================================================================================================
// Access Reconciliation
// ================================================================================================

/// Access flag diffing and application
pub use crate::access::{reconcile, AccessChange, ApplyReport, ChangeTarget, FinalityEdit};
