//! Decoded bytecode instructions and the symbolic operands remapping cares about.
//!
//! Instructions keep their original byte offset and opcode. Operands that reference the
//! constant pool are resolved to symbolic form ([`MemberRef`], [`Constant`], type names) so that
//! the remapper and the access reconciler can rewrite them without any knowledge of constant
//! pool indices. Purely numeric operands (local indices, branch offsets, immediates) are kept
//! as decoded values.

/// Mnemonics for the opcodes the remapping and reconciliation code inspects.
///
/// The full opcode space is decoded by [`crate::classfile`]; only the values referenced by
/// name elsewhere in the crate are listed here.
pub mod opcodes {
    #![allow(missing_docs)]

    pub const NOP: u8 = 0x00;
    pub const ACONST_NULL: u8 = 0x01;
    pub const ICONST_0: u8 = 0x03;
    pub const BIPUSH: u8 = 0x10;
    pub const SIPUSH: u8 = 0x11;
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const LDC2_W: u8 = 0x14;
    pub const ILOAD: u8 = 0x15;
    pub const ALOAD: u8 = 0x19;
    pub const ALOAD_0: u8 = 0x2A;
    pub const ISTORE: u8 = 0x36;
    pub const ASTORE: u8 = 0x3A;
    pub const POP: u8 = 0x57;
    pub const IINC: u8 = 0x84;
    pub const IFEQ: u8 = 0x99;
    pub const IF_ACMPNE: u8 = 0xA6;
    pub const GOTO: u8 = 0xA7;
    pub const JSR: u8 = 0xA8;
    pub const RET: u8 = 0xA9;
    pub const TABLESWITCH: u8 = 0xAA;
    pub const LOOKUPSWITCH: u8 = 0xAB;
    pub const IRETURN: u8 = 0xAC;
    pub const ARETURN: u8 = 0xB0;
    pub const RETURN: u8 = 0xB1;
    pub const GETSTATIC: u8 = 0xB2;
    pub const PUTSTATIC: u8 = 0xB3;
    pub const GETFIELD: u8 = 0xB4;
    pub const PUTFIELD: u8 = 0xB5;
    pub const INVOKEVIRTUAL: u8 = 0xB6;
    pub const INVOKESPECIAL: u8 = 0xB7;
    pub const INVOKESTATIC: u8 = 0xB8;
    pub const INVOKEINTERFACE: u8 = 0xB9;
    pub const INVOKEDYNAMIC: u8 = 0xBA;
    pub const NEW: u8 = 0xBB;
    pub const NEWARRAY: u8 = 0xBC;
    pub const ANEWARRAY: u8 = 0xBD;
    pub const ATHROW: u8 = 0xBF;
    pub const CHECKCAST: u8 = 0xC0;
    pub const INSTANCEOF: u8 = 0xC1;
    pub const WIDE: u8 = 0xC4;
    pub const MULTIANEWARRAY: u8 = 0xC5;
    pub const IFNULL: u8 = 0xC6;
    pub const IFNONNULL: u8 = 0xC7;
    pub const GOTO_W: u8 = 0xC8;
    pub const JSR_W: u8 = 0xC9;
}

/// Method handle reference kinds (JVMS §4.4.8).
pub mod handle_kind {
    #![allow(missing_docs)]

    pub const GET_FIELD: u8 = 1;
    pub const GET_STATIC: u8 = 2;
    pub const PUT_FIELD: u8 = 3;
    pub const PUT_STATIC: u8 = 4;
    pub const INVOKE_VIRTUAL: u8 = 5;
    pub const INVOKE_STATIC: u8 = 6;
    pub const INVOKE_SPECIAL: u8 = 7;
    pub const NEW_INVOKE_SPECIAL: u8 = 8;
    pub const INVOKE_INTERFACE: u8 = 9;

    /// Returns `true` for the kinds that reference a field rather than a method.
    #[must_use]
    pub fn is_field(kind: u8) -> bool {
        (GET_FIELD..=PUT_STATIC).contains(&kind)
    }
}

/// A symbolic reference to a field or method: `Fieldref`, `Methodref` or
/// `InterfaceMethodref` in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Internal name of the owning type (or an array descriptor for array methods)
    pub owner: String,
    /// Member name
    pub name: String,
    /// Field or method descriptor
    pub descriptor: String,
    /// `true` when the owner is an interface (`InterfaceMethodref`)
    pub interface: bool,
}

impl MemberRef {
    /// Creates a new class-owned member reference.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        MemberRef {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            interface: false,
        }
    }
}

/// A `CONSTANT_MethodHandle` resolved to symbolic form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    /// Reference kind, see [`handle_kind`]
    pub kind: u8,
    /// The referenced field or method
    pub member: MemberRef,
}

/// A loadable constant: `ldc` operands and bootstrap method arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// `CONSTANT_Integer`
    Int(i32),
    /// `CONSTANT_Float`
    Float(f32),
    /// `CONSTANT_Long`
    Long(i64),
    /// `CONSTANT_Double`
    Double(f64),
    /// `CONSTANT_String`
    String(String),
    /// `CONSTANT_Class`: internal name or array descriptor
    Type(String),
    /// `CONSTANT_MethodType`: method descriptor
    MethodType(String),
    /// `CONSTANT_MethodHandle`
    Handle(Handle),
    /// `CONSTANT_Dynamic`
    Dynamic(Box<DynamicCall>),
}

/// A dynamically-computed call site or constant (`invokedynamic`, `CONSTANT_Dynamic`).
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicCall {
    /// Name from the `NameAndType` entry
    pub name: String,
    /// Descriptor from the `NameAndType` entry
    pub descriptor: String,
    /// Bootstrap method handle
    pub bootstrap: Handle,
    /// Static bootstrap arguments
    pub arguments: Vec<Constant>,
}

/// The decoded operand of an [`Instruction`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// `bipush`, `sipush`, `newarray` immediate value
    Immediate(i32),
    /// Local variable index (`iload`, `astore`, `ret`, possibly `wide`)
    Local(u16),
    /// `iinc` (possibly `wide`)
    Increment {
        /// Local variable index
        index: u16,
        /// Signed increment
        delta: i16,
    },
    /// Branch target relative to the instruction offset
    Branch(i32),
    /// `tableswitch`
    TableSwitch {
        /// Default branch offset
        default: i32,
        /// Lowest key
        low: i32,
        /// Branch offsets for `low..=high`
        offsets: Vec<i32>,
    },
    /// `lookupswitch`
    LookupSwitch {
        /// Default branch offset
        default: i32,
        /// `(key, offset)` pairs
        pairs: Vec<(i32, i32)>,
    },
    /// Field instruction operand
    Field(MemberRef),
    /// Method invocation operand
    Method(MemberRef),
    /// `invokedynamic` call site
    InvokeDynamic(Box<DynamicCall>),
    /// `new`, `anewarray`, `checkcast`, `instanceof`: internal name or array descriptor
    Type(String),
    /// `ldc`, `ldc_w`, `ldc2_w`
    Constant(Constant),
    /// `multianewarray`
    MultiNewArray {
        /// Array descriptor
        descriptor: String,
        /// Number of dimensions to allocate
        dimensions: u8,
    },
}

/// A single decoded bytecode instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Byte offset within the method's code array
    pub offset: u32,
    /// Opcode; for `wide` forms this is the widened opcode
    pub opcode: u8,
    /// Decoded operand
    pub operand: Operand,
}

impl Instruction {
    /// Returns the method reference for invocation instructions.
    #[must_use]
    pub fn method_ref(&self) -> Option<&MemberRef> {
        match &self.operand {
            Operand::Method(member) => Some(member),
            _ => None,
        }
    }

    /// Returns the field reference for field access instructions.
    #[must_use]
    pub fn field_ref(&self) -> Option<&MemberRef> {
        match &self.operand {
            Operand::Field(member) => Some(member),
            _ => None,
        }
    }
}
