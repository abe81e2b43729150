//! In-memory representation of a compiled JVM type.
//!
//! [`ClassNode`] is the unit both halves of the crate operate on: the class remapper rewrites
//! its names, descriptors and instruction operands, and the access reconciler edits its access
//! flags and dispatch instructions. Access flags are plain mutable fields, so patching a member
//! is an ordinary assignment.
//!
//! # Key Components
//!
//! - [`ClassNode`], [`FieldNode`], [`MethodNode`], [`Code`] - The structural model
//! - [`AccessFlags`], [`Visibility`] - Access bits and ordered visibility levels
//! - [`Instruction`], [`Operand`], [`MemberRef`], [`Constant`] - Decoded bytecode
//!
//! # Examples
//!
//! ```rust
//! use jremap::model::{AccessFlags, ClassNode, MethodNode};
//!
//! let mut class = ClassNode::new("a", Some("java/lang/Object"));
//! class.methods.push(MethodNode::new(AccessFlags::PRIVATE, "b", "()V"));
//!
//! let method = class.method_mut("b", "()V").unwrap();
//! method.access = AccessFlags::PUBLIC;
//! assert!(class.method("b", "()V").unwrap().access.contains(AccessFlags::PUBLIC));
//! ```

mod flags;
mod instruction;

pub use flags::{AccessFlags, Visibility};
pub use instruction::{
    handle_kind, opcodes, Constant, DynamicCall, Handle, Instruction, MemberRef, Operand,
};

/// A field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Access flags
    pub access: AccessFlags,
    /// Field name
    pub name: String,
    /// Field descriptor
    pub descriptor: String,
    /// Generic signature, if any
    pub signature: Option<String>,
    /// `ConstantValue` attribute, if any
    pub value: Option<Constant>,
}

impl FieldNode {
    /// Creates a field without signature or constant value.
    pub fn new(access: AccessFlags, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        FieldNode {
            access,
            name: name.into(),
            descriptor: descriptor.into(),
            signature: None,
            value: None,
        }
    }
}

/// The body of a non-abstract, non-native method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Code {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots
    pub max_locals: u16,
    /// Decoded instructions in code order
    pub instructions: Vec<Instruction>,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodNode {
    /// Access flags
    pub access: AccessFlags,
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Generic signature, if any
    pub signature: Option<String>,
    /// Internal names of declared checked exceptions
    pub exceptions: Vec<String>,
    /// Method body, absent for abstract and native methods
    pub code: Option<Code>,
}

impl MethodNode {
    /// Creates a method without signature, exceptions or body.
    pub fn new(access: AccessFlags, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        MethodNode {
            access,
            name: name.into(),
            descriptor: descriptor.into(),
            signature: None,
            exceptions: Vec::new(),
            code: None,
        }
    }

    /// Returns `true` for instance and static initializers, which are never renamed.
    #[must_use]
    pub fn is_initializer(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }

    /// Iterates over the decoded instructions, empty for methods without a body.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.code.iter().flat_map(|code| code.instructions.iter())
    }

    /// Iterates mutably over the decoded instructions.
    pub fn instructions_mut(&mut self) -> impl Iterator<Item = &mut Instruction> {
        self.code
            .iter_mut()
            .flat_map(|code| code.instructions.iter_mut())
    }
}

/// A compiled JVM type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    /// Class file minor version
    pub minor_version: u16,
    /// Class file major version
    pub major_version: u16,
    /// Access flags
    pub access: AccessFlags,
    /// Internal name, e.g. `net/minecraft/world/World`
    pub name: String,
    /// Internal name of the superclass, absent only for `java/lang/Object` and modules
    pub super_name: Option<String>,
    /// Internal names of directly implemented interfaces, in declaration order
    pub interfaces: Vec<String>,
    /// Generic signature, if any
    pub signature: Option<String>,
    /// Declared fields
    pub fields: Vec<FieldNode>,
    /// Declared methods
    pub methods: Vec<MethodNode>,
}

impl ClassNode {
    /// Creates an empty public class targeting Java 8.
    pub fn new(name: impl Into<String>, super_name: Option<&str>) -> Self {
        ClassNode {
            minor_version: 0,
            major_version: 52,
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            name: name.into(),
            super_name: super_name.map(str::to_string),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Returns `true` if this type is an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.contains(AccessFlags::INTERFACE)
    }

    /// Finds a field by name and descriptor.
    #[must_use]
    pub fn field(&self, name: &str, descriptor: &str) -> Option<&FieldNode> {
        self.fields
            .iter()
            .find(|field| field.name == name && field.descriptor == descriptor)
    }

    /// Finds a field by name and descriptor, mutably.
    pub fn field_mut(&mut self, name: &str, descriptor: &str) -> Option<&mut FieldNode> {
        self.fields
            .iter_mut()
            .find(|field| field.name == name && field.descriptor == descriptor)
    }

    /// Finds a method by name and descriptor.
    #[must_use]
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodNode> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.descriptor == descriptor)
    }

    /// Finds a method by name and descriptor, mutably.
    pub fn method_mut(&mut self, name: &str, descriptor: &str) -> Option<&mut MethodNode> {
        self.methods
            .iter_mut()
            .find(|method| method.name == name && method.descriptor == descriptor)
    }
}
