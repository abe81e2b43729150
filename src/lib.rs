// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # jremap
//!
//! A multi-stage symbol remapper for obfuscated JVM class files.
//!
//! `jremap` loads one or more line-oriented mapping stages (`obfuscated → intermediate`,
//! `intermediate → developer`, ...), composes them into a single translation, and answers
//! type, field, method, descriptor and signature queries in an inheritance-aware way: a member
//! renamed on a superclass is renamed on every subclass that does not rename it itself. The
//! type hierarchy is discovered lazily by reading class headers through a pluggable byte
//! provider, and the merged per-type symbol tables are cached and shared between threads.
//!
//! Alongside the remapper, the crate reconciles access flags between two versions of a type,
//! widening visibility and clearing `final` where a patched binary expects it, and repairs
//! the private dispatch instructions that such a widening would otherwise leave behind.
//!
//! # Architecture
//!
//! - **File Layer**: Memory-mapped and in-memory inputs ([`File`], [`Parser`])
//! - **Class Model**: Owned class, member and instruction trees ([`model`])
//! - **Class Files**: Constant pool, header and body decoding ([`classfile`])
//! - **Mappings**: Record parsing, stage loading and composition ([`mapping`])
//! - **Hierarchy**: Byte providers and the cached parent resolver ([`hierarchy`])
//! - **Remapping**: Symbol table merging and translation ([`remap`])
//! - **Access**: Flag diffing and application ([`access`])
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use jremap::prelude::*;
//!
//! let stage = MappingStage::from_lines([
//!     "CL: a net/example/Widget",
//!     "FD: a/b net/example/Widget/size",
//!     "MD: a/c (La;)V net/example/Widget/attach (Lnet/example/Widget;)V",
//! ])?;
//!
//! let remapper = Remapper::new(stage, Arc::new(MemoryProvider::new()), Arc::new(ClassHeaderReader));
//! assert_eq!(remapper.map_type("a"), "net/example/Widget");
//! assert_eq!(remapper.map_field("a", "b", None), "size");
//! assert_eq!(remapper.map_method("a", "c", "(La;)V"), "attach");
//! assert_eq!(remapper.map_method_descriptor("(La;)V"), "(Lnet/example/Widget;)V");
//! # Ok::<(), jremap::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`Remapper`] is `Send + Sync`. Symbol tables are merged at most once per type under a
//! single merge lock and then served from a concurrent cache, so a remapper can be shared by
//! reference across a [`rayon`] pool (see [`remap::ClassRemapper::remap_all`]).
//!
//! # Error Handling
//!
//! Fallible operations return [`Result`]. Query operations never fail: anything that cannot
//! be translated is returned unchanged.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Input handling for mapping files and class bytes.
///
/// Files are memory-mapped from disk or held in memory, and read through the bounds-checked
/// [`Parser`].
pub mod file;

/// Owned representation of JVM classes, members and instructions.
pub mod model;

/// Class file decoding.
///
/// Decodes full class bodies into [`model::ClassNode`]s and the cheap header subset used for
/// hierarchy discovery.
pub mod classfile;

/// Mapping records, tables, stages and composition.
pub mod mapping;

/// Lazy type hierarchy discovery.
pub mod hierarchy;

/// Inheritance-aware name translation.
pub mod remap;

/// Access flag reconciliation.
pub mod access;

/// Remapper construction options.
pub mod config;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

#[cfg(test)]
pub(crate) mod test;

/// `jremap` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust,no_run
/// use jremap::{mapping::MappingStage, Result};
///
/// fn load(path: &str) -> Result<MappingStage> {
///     MappingStage::from_path(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `jremap` Error type
///
/// The main error type for all fallible operations in this crate.
///
/// # Examples
///
/// ```rust
/// use jremap::{mapping::MappingStage, Error};
///
/// match MappingStage::from_path(std::path::Path::new("does/not/exist.srg")) {
///     Ok(stage) => println!("{} types", stage.types().len()),
///     Err(Error::FileError(e)) => println!("Cannot read: {}", e),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Low-level input access.
///
/// # Example
///
/// ```rust
/// use jremap::Parser;
///
/// let data = [0xCA, 0xFE, 0xBA, 0xBE];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
/// # Ok::<(), jremap::Error>(())
/// ```
pub use file::{parser::Parser, File};

/// Main entry point for translating names.
///
/// See [`remap::Remapper`].
pub use remap::Remapper;

/// Builder-style options for [`Remapper::from_config`].
pub use config::RemapperConfig;
