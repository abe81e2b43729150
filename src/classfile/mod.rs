//! JVM class-file reading.
//!
//! Two entry points share one parsing path:
//!
//! - [`read_header`] stops after the field table. It yields a [`crate::hierarchy::TypeHeader`]
//!   (names, super type, interfaces, field declarations) and is what the hierarchy resolver
//!   needs; method bodies are never touched.
//! - [`read_class`] reads everything into a [`crate::model::ClassNode`], decoding each method's
//!   bytecode into symbolic [`crate::model::Instruction`]s once the `BootstrapMethods`
//!   attribute is known.
//!
//! [`ClassHeaderReader`] adapts [`read_header`] to the [`crate::hierarchy::HeaderReader`]
//! trait.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jremap::classfile::read_class;
//!
//! let bytes = std::fs::read("build/classes/net/minecraft/client/Minecraft.class")?;
//! let class = read_class(&bytes)?;
//! println!("{} extends {:?}", class.name, class.super_name);
//! for method in &class.methods {
//!     println!("  {}{} ({} instructions)", method.name, method.descriptor, method.instructions().count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod constpool;
pub mod decoder;
mod reader;

pub use reader::{read_class, read_header};

use crate::{
    hierarchy::{HeaderReader, TypeHeader},
    Result,
};

/// [`HeaderReader`] backed by the class-file reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassHeaderReader;

impl HeaderReader for ClassHeaderReader {
    fn read(&self, bytes: &[u8]) -> Result<TypeHeader> {
        read_header(bytes)
    }
}
