//! Constant pool parsing and symbolic resolution.
//!
//! Entries are stored as read, with indices into the pool. Resolution into the symbolic
//! [`MemberRef`], [`Handle`] and [`Constant`] forms of [`crate::model`] happens on demand, so
//! header-only reads never pay for it.

use crate::{
    file::parser::Parser,
    model::{Constant, DynamicCall, Handle, MemberRef},
    Error::RecursionLimit,
    Result,
};

/// Nesting limit for `CONSTANT_Dynamic` arguments that are themselves dynamic constants.
const MAX_DYNAMIC_DEPTH: usize = 16;

/// A raw constant pool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    /// Slot 0 and the second slot of `Long`/`Double` entries
    Unusable,
    /// `CONSTANT_Utf8`
    Utf8(String),
    /// `CONSTANT_Integer`
    Integer(i32),
    /// `CONSTANT_Float`
    Float(f32),
    /// `CONSTANT_Long`
    Long(i64),
    /// `CONSTANT_Double`
    Double(f64),
    /// `CONSTANT_Class` with its name index
    Class(u16),
    /// `CONSTANT_String` with its UTF-8 index
    String(u16),
    /// `CONSTANT_Fieldref`
    FieldRef {
        /// Owning class index
        class: u16,
        /// `NameAndType` index
        name_and_type: u16,
    },
    /// `CONSTANT_Methodref`
    MethodRef {
        /// Owning class index
        class: u16,
        /// `NameAndType` index
        name_and_type: u16,
    },
    /// `CONSTANT_InterfaceMethodref`
    InterfaceMethodRef {
        /// Owning interface index
        class: u16,
        /// `NameAndType` index
        name_and_type: u16,
    },
    /// `CONSTANT_NameAndType`
    NameAndType {
        /// Name index
        name: u16,
        /// Descriptor index
        descriptor: u16,
    },
    /// `CONSTANT_MethodHandle`
    MethodHandle {
        /// Reference kind
        kind: u8,
        /// Referenced member index
        reference: u16,
    },
    /// `CONSTANT_MethodType` with its descriptor index
    MethodType(u16),
    /// `CONSTANT_Dynamic`
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap: u16,
        /// `NameAndType` index
        name_and_type: u16,
    },
    /// `CONSTANT_InvokeDynamic`
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap: u16,
        /// `NameAndType` index
        name_and_type: u16,
    },
    /// `CONSTANT_Module` with its name index
    Module(u16),
    /// `CONSTANT_Package` with its name index
    Package(u16),
}

/// One entry of the `BootstrapMethods` class attribute, as raw pool indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    /// `MethodHandle` index of the bootstrap method
    pub method: u16,
    /// Loadable constant indices of the static arguments
    pub arguments: Vec<u16>,
}

/// A parsed constant pool.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<PoolEntry>,
}

impl ConstantPool {
    /// Reads `constant_pool_count` and all entries.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for unknown tags and [`crate::Error::OutOfBounds`] on
    /// truncated input.
    pub fn read(parser: &mut Parser) -> Result<ConstantPool> {
        let count = parser.read_be::<u16>()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(PoolEntry::Unusable);

        while entries.len() < count {
            let tag = parser.read_be::<u8>()?;
            let entry = match tag {
                1 => {
                    let len = parser.read_be::<u16>()? as usize;
                    PoolEntry::Utf8(parser.read_modified_utf8(len)?)
                }
                3 => PoolEntry::Integer(parser.read_be::<i32>()?),
                4 => PoolEntry::Float(parser.read_be::<f32>()?),
                5 => PoolEntry::Long(parser.read_be::<i64>()?),
                6 => PoolEntry::Double(parser.read_be::<f64>()?),
                7 => PoolEntry::Class(parser.read_be::<u16>()?),
                8 => PoolEntry::String(parser.read_be::<u16>()?),
                9 => PoolEntry::FieldRef {
                    class: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                10 => PoolEntry::MethodRef {
                    class: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                11 => PoolEntry::InterfaceMethodRef {
                    class: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                12 => PoolEntry::NameAndType {
                    name: parser.read_be::<u16>()?,
                    descriptor: parser.read_be::<u16>()?,
                },
                15 => PoolEntry::MethodHandle {
                    kind: parser.read_be::<u8>()?,
                    reference: parser.read_be::<u16>()?,
                },
                16 => PoolEntry::MethodType(parser.read_be::<u16>()?),
                17 => PoolEntry::Dynamic {
                    bootstrap: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                18 => PoolEntry::InvokeDynamic {
                    bootstrap: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                19 => PoolEntry::Module(parser.read_be::<u16>()?),
                20 => PoolEntry::Package(parser.read_be::<u16>()?),
                _ => {
                    return Err(malformed_error!(
                        "Invalid constant pool tag {} at entry {}",
                        tag,
                        entries.len()
                    ))
                }
            };

            let wide = matches!(entry, PoolEntry::Long(_) | PoolEntry::Double(_));
            entries.push(entry);
            if wide {
                entries.push(PoolEntry::Unusable);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Returns the number of slots, including slot 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool holds no entries beyond slot 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Returns the raw entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for index 0, unusable slots and out of range indices.
    pub fn get(&self, index: u16) -> Result<&PoolEntry> {
        match self.entries.get(index as usize) {
            Some(PoolEntry::Unusable) | None => Err(malformed_error!(
                "Invalid constant pool index {} (pool has {} slots)",
                index,
                self.entries.len()
            )),
            Some(entry) => Ok(entry),
        }
    }

    /// Resolves a `CONSTANT_Utf8` entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the entry has a different kind.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            PoolEntry::Utf8(value) => Ok(value),
            other => Err(malformed_error!("Expected Utf8 at {}, found {:?}", index, other)),
        }
    }

    /// Resolves a `CONSTANT_Class` entry to its internal name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the entry has a different kind.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            PoolEntry::Class(name) => self.utf8(*name),
            other => Err(malformed_error!("Expected Class at {}, found {:?}", index, other)),
        }
    }

    /// Resolves an optional class index, where 0 means "none" (e.g. `super_class` of `Object`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if a non-zero index is not a class entry.
    pub fn optional_class_name(&self, index: u16) -> Result<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    /// Resolves a `CONSTANT_NameAndType` entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the entry has a different kind.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            PoolEntry::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            other => Err(malformed_error!(
                "Expected NameAndType at {}, found {:?}",
                index,
                other
            )),
        }
    }

    /// Resolves a field, method or interface method reference.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the entry is not a member reference.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef> {
        let (class, name_and_type, interface) = match self.get(index)? {
            PoolEntry::FieldRef {
                class,
                name_and_type,
            }
            | PoolEntry::MethodRef {
                class,
                name_and_type,
            } => (*class, *name_and_type, false),
            PoolEntry::InterfaceMethodRef {
                class,
                name_and_type,
            } => (*class, *name_and_type, true),
            other => {
                return Err(malformed_error!(
                    "Expected member reference at {}, found {:?}",
                    index,
                    other
                ))
            }
        };

        let (name, descriptor) = self.name_and_type(name_and_type)?;
        Ok(MemberRef {
            owner: self.class_name(class)?.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            interface,
        })
    }

    /// Resolves a `CONSTANT_MethodHandle` entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the entry is not a method handle.
    pub fn handle(&self, index: u16) -> Result<Handle> {
        match self.get(index)? {
            PoolEntry::MethodHandle { kind, reference } => Ok(Handle {
                kind: *kind,
                member: self.member_ref(*reference)?,
            }),
            other => Err(malformed_error!(
                "Expected MethodHandle at {}, found {:?}",
                index,
                other
            )),
        }
    }

    /// Resolves a loadable constant (`ldc` operand or bootstrap argument).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the entry is not loadable or references a missing
    /// bootstrap method, and [`crate::Error::RecursionLimit`] for runaway dynamic constant
    /// nesting.
    pub fn constant(&self, index: u16, bootstrap: &[BootstrapMethod]) -> Result<Constant> {
        self.constant_at_depth(index, bootstrap, 0)
    }

    /// Resolves an `invokedynamic` call site.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the entry is not a `CONSTANT_InvokeDynamic` or its
    /// bootstrap method is missing.
    pub fn invoke_dynamic(&self, index: u16, bootstrap: &[BootstrapMethod]) -> Result<DynamicCall> {
        match self.get(index)? {
            PoolEntry::InvokeDynamic {
                bootstrap: bsm,
                name_and_type,
            } => self.dynamic_call(*bsm, *name_and_type, bootstrap, 0),
            other => Err(malformed_error!(
                "Expected InvokeDynamic at {}, found {:?}",
                index,
                other
            )),
        }
    }

    fn constant_at_depth(
        &self,
        index: u16,
        bootstrap: &[BootstrapMethod],
        depth: usize,
    ) -> Result<Constant> {
        if depth > MAX_DYNAMIC_DEPTH {
            return Err(RecursionLimit(MAX_DYNAMIC_DEPTH));
        }

        Ok(match self.get(index)? {
            PoolEntry::Integer(value) => Constant::Int(*value),
            PoolEntry::Float(value) => Constant::Float(*value),
            PoolEntry::Long(value) => Constant::Long(*value),
            PoolEntry::Double(value) => Constant::Double(*value),
            PoolEntry::String(utf8) => Constant::String(self.utf8(*utf8)?.to_string()),
            PoolEntry::Class(name) => Constant::Type(self.utf8(*name)?.to_string()),
            PoolEntry::MethodType(descriptor) => {
                Constant::MethodType(self.utf8(*descriptor)?.to_string())
            }
            PoolEntry::MethodHandle { .. } => Constant::Handle(self.handle(index)?),
            PoolEntry::Dynamic {
                bootstrap: bsm,
                name_and_type,
            } => Constant::Dynamic(Box::new(self.dynamic_call(
                *bsm,
                *name_and_type,
                bootstrap,
                depth + 1,
            )?)),
            other => {
                return Err(malformed_error!(
                    "Entry {} is not loadable: {:?}",
                    index,
                    other
                ))
            }
        })
    }

    fn dynamic_call(
        &self,
        bsm: u16,
        name_and_type: u16,
        bootstrap: &[BootstrapMethod],
        depth: usize,
    ) -> Result<DynamicCall> {
        let Some(method) = bootstrap.get(bsm as usize) else {
            return Err(malformed_error!(
                "Bootstrap method {} missing ({} declared)",
                bsm,
                bootstrap.len()
            ));
        };

        let (name, descriptor) = self.name_and_type(name_and_type)?;
        let arguments = method
            .arguments
            .iter()
            .map(|&argument| self.constant_at_depth(argument, bootstrap, depth))
            .collect::<Result<Vec<_>>>()?;

        Ok(DynamicCall {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            bootstrap: self.handle(method.method)?,
            arguments,
        })
    }
}
