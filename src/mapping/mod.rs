//! Mapping tables: parsing, per-stage tables and stage composition.
//!
//! A mapping *stage* renames types and members from one naming space to another, e.g. raw
//! obfuscated names to stable intermediate names. Stages are loaded from line-oriented
//! mapping tables and chained by composition into the single table the
//! [`crate::Remapper`] works with.
//!
//! # Key Components
//!
//! - [`MappingRecordParser`] - Tokenizes `CL`/`FD`/`MD` lines into [`MappingRecord`]s
//! - [`MappingStage`] - One directional stage: a [`TypeTable`] plus per-type [`RawTable`]s
//! - [`compose`] - Joins `X → Y` with `Y → Z` into `X → Z`
//! - [`descriptor`] - Type remapping inside descriptors and generic signatures
//! - [`NameDictionary`] - Owner-independent member name lookup
//!
//! # Examples
//!
//! ```rust
//! use jremap::mapping::{compose, MappingStage};
//!
//! let notch_srg = MappingStage::from_lines([
//!     "CL: a net/minecraft/world/Widget",
//!     "FD: a/b net/minecraft/world/Widget/field_1_b",
//! ])?;
//! let srg_mcp = MappingStage::from_lines([
//!     "CL: net/minecraft/world/Widget net/minecraft/world/Widget",
//!     "FD: net/minecraft/world/Widget/field_1_b net/minecraft/world/Widget/size",
//! ])?;
//!
//! let notch_mcp = compose(&notch_srg, &srg_mcp);
//! assert_eq!(notch_mcp.raw("a").unwrap().field("b", None), Some("size"));
//! # Ok::<(), jremap::Error>(())
//! ```

mod compose;
pub mod descriptor;
mod dictionary;
mod record;
mod stage;
mod table;

pub use compose::compose;
pub use dictionary::{Domain, NameDictionary};
pub use record::{
    LineOutcome, MappingKind, MappingRecord, MappingRecordParser, MemberPath, ParsedRecords,
};
pub use stage::MappingStage;
pub use table::{
    MemberKey, MemberTable, RawTable, ResolvedTable, SymbolTable, TypeTable, MAX_NESTING_DEPTH,
};
