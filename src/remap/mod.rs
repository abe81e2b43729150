//! Name translation between naming spaces.
//!
//! This module turns a loaded [`crate::mapping::MappingStage`] into a queryable
//! [`Remapper`]. Member lookups are inheritance-aware: the symbol table of a type is the merge
//! of its own renames over those of all its ancestors, with the hierarchy discovered on demand
//! through the [`crate::hierarchy`] collaborators.
//!
//! # Key Components
//!
//! - [`Remapper`] - Type, field, method, descriptor and signature translation
//! - [`SymbolTableResolver`] - Builds and caches merged per-type symbol tables
//! - [`ClassRemapper`] - Applies a [`Remapper`] to a whole [`crate::model::ClassNode`]
//! - [`MemberOverrides`] - Renames applied to colliding members before lookup
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use jremap::{
//!     classfile::ClassHeaderReader,
//!     hierarchy::MemoryProvider,
//!     mapping::MappingStage,
//!     model::ClassNode,
//!     remap::{ClassRemapper, Remapper},
//! };
//!
//! let stage = MappingStage::from_lines(["CL: a net/example/Widget"])?;
//! let remapper = Remapper::new(stage, Arc::new(MemoryProvider::new()), Arc::new(ClassHeaderReader));
//!
//! let class = ClassNode::new("a", Some("java/lang/Object"));
//! let remapped = ClassRemapper::new(&remapper).remap(&class);
//! assert_eq!(remapped.name, "net/example/Widget");
//! # Ok::<(), jremap::Error>(())
//! ```

mod class;
mod overrides;
mod remapper;
mod resolver;

pub use class::ClassRemapper;
pub use overrides::{MemberOverrides, MemberRule, OwnerPattern};
pub use remapper::Remapper;
pub use resolver::{SymbolTableResolver, MAX_HIERARCHY_DEPTH};
