use crate::{
    classfile::{
        constpool::{BootstrapMethod, ConstantPool},
        decoder::decode_code,
    },
    file::parser::Parser,
    hierarchy::{FieldHeader, TypeHeader},
    model::{AccessFlags, ClassNode, Code, FieldNode, MethodNode},
    Error::{Empty, NotSupported},
    Result,
};

const MAGIC: u32 = 0xCAFE_BABE;
/// Java SE 25
const MAX_MAJOR_VERSION: u16 = 69;

/// Everything up to and including the interface table.
struct Prologue {
    minor_version: u16,
    major_version: u16,
    pool: ConstantPool,
    access: AccessFlags,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
}

/// A raw attribute: name index and payload.
struct Attribute<'a> {
    name: u16,
    data: &'a [u8],
}

/// A method whose code is decoded once the bootstrap methods are known.
struct PendingMethod<'a> {
    method: MethodNode,
    code: Option<(u16, u16, &'a [u8])>,
}

fn read_prologue(parser: &mut Parser) -> Result<Prologue> {
    if parser.is_empty() {
        return Err(Empty);
    }

    let magic = parser.read_be::<u32>()?;
    if magic != MAGIC {
        return Err(malformed_error!("Invalid class file magic 0x{:08X}", magic));
    }

    let minor_version = parser.read_be::<u16>()?;
    let major_version = parser.read_be::<u16>()?;
    if major_version > MAX_MAJOR_VERSION {
        return Err(NotSupported);
    }
    let pool = ConstantPool::read(parser)?;

    let access = AccessFlags::from_bits_retain(parser.read_be::<u16>()?);
    let name = pool.class_name(parser.read_be::<u16>()?)?.to_string();
    let super_name = pool
        .optional_class_name(parser.read_be::<u16>()?)?
        .map(str::to_string);

    let interface_count = parser.read_be::<u16>()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(parser.read_be::<u16>()?)?.to_string());
    }

    Ok(Prologue {
        minor_version,
        major_version,
        pool,
        access,
        name,
        super_name,
        interfaces,
    })
}

fn read_attributes<'a>(parser: &mut Parser<'a>) -> Result<Vec<Attribute<'a>>> {
    let count = parser.read_be::<u16>()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = parser.read_be::<u16>()?;
        let len = parser.read_be::<u32>()? as usize;
        attributes.push(Attribute {
            name,
            data: parser.read_bytes(len)?,
        });
    }
    Ok(attributes)
}

fn read_u16_index(data: &[u8]) -> Result<u16> {
    Parser::new(data).read_be::<u16>()
}

/// Reads only the structural header: names, super type, interfaces and field declarations.
///
/// Method bodies and attributes are never decoded, which keeps hierarchy lookups cheap.
///
/// # Errors
///
/// Returns [`crate::Error::Empty`] for empty input, [`crate::Error::Malformed`] for invalid
/// class files, [`crate::Error::NotSupported`] for versions past Java 25 and
/// [`crate::Error::OutOfBounds`] for truncated ones.
pub fn read_header(data: &[u8]) -> Result<TypeHeader> {
    let mut parser = Parser::new(data);
    let prologue = read_prologue(&mut parser)?;

    let field_count = parser.read_be::<u16>()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let access = AccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let name = prologue.pool.utf8(parser.read_be::<u16>()?)?.to_string();
        let descriptor = prologue.pool.utf8(parser.read_be::<u16>()?)?.to_string();
        read_attributes(&mut parser)?;
        fields.push(FieldHeader {
            access,
            name,
            descriptor,
        });
    }

    Ok(TypeHeader {
        name: prologue.name,
        access: prologue.access,
        super_type: prologue.super_name,
        interfaces: prologue.interfaces,
        fields,
    })
}

/// Reads a complete class file into a [`ClassNode`], decoding all method bodies.
///
/// # Errors
///
/// Returns [`crate::Error::Empty`] for empty input, [`crate::Error::Malformed`] for invalid
/// class files or bytecode, [`crate::Error::NotSupported`] for versions past Java 25 and
/// [`crate::Error::OutOfBounds`] for truncated ones.
pub fn read_class(data: &[u8]) -> Result<ClassNode> {
    let mut parser = Parser::new(data);
    let prologue = read_prologue(&mut parser)?;
    let pool = &prologue.pool;

    let field_count = parser.read_be::<u16>()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let access = AccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let mut field = FieldNode::new(
            access,
            pool.utf8(parser.read_be::<u16>()?)?,
            pool.utf8(parser.read_be::<u16>()?)?,
        );

        for attribute in read_attributes(&mut parser)? {
            match pool.utf8(attribute.name)? {
                "Signature" => {
                    field.signature = Some(pool.utf8(read_u16_index(attribute.data)?)?.to_string());
                }
                "ConstantValue" => {
                    field.value = Some(pool.constant(read_u16_index(attribute.data)?, &[])?);
                }
                _ => {}
            }
        }
        fields.push(field);
    }

    let method_count = parser.read_be::<u16>()?;
    let mut pending = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let access = AccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let mut method = MethodNode::new(
            access,
            pool.utf8(parser.read_be::<u16>()?)?,
            pool.utf8(parser.read_be::<u16>()?)?,
        );
        let mut code = None;

        for attribute in read_attributes(&mut parser)? {
            match pool.utf8(attribute.name)? {
                "Code" => {
                    let mut body = Parser::new(attribute.data);
                    let max_stack = body.read_be::<u16>()?;
                    let max_locals = body.read_be::<u16>()?;
                    let code_length = body.read_be::<u32>()? as usize;
                    code = Some((max_stack, max_locals, body.read_bytes(code_length)?));
                }
                "Signature" => {
                    method.signature =
                        Some(pool.utf8(read_u16_index(attribute.data)?)?.to_string());
                }
                "Exceptions" => {
                    let mut table = Parser::new(attribute.data);
                    let count = table.read_be::<u16>()?;
                    for _ in 0..count {
                        method
                            .exceptions
                            .push(pool.class_name(table.read_be::<u16>()?)?.to_string());
                    }
                }
                _ => {}
            }
        }
        pending.push(PendingMethod { method, code });
    }

    let mut signature = None;
    let mut bootstrap = Vec::new();
    for attribute in read_attributes(&mut parser)? {
        match pool.utf8(attribute.name)? {
            "Signature" => {
                signature = Some(pool.utf8(read_u16_index(attribute.data)?)?.to_string());
            }
            "BootstrapMethods" => bootstrap = read_bootstrap_methods(attribute.data)?,
            _ => {}
        }
    }

    let methods = pending
        .into_iter()
        .map(|PendingMethod { mut method, code }| {
            if let Some((max_stack, max_locals, bytes)) = code {
                method.code = Some(Code {
                    max_stack,
                    max_locals,
                    instructions: decode_code(bytes, pool, &bootstrap)?,
                });
            }
            Ok(method)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ClassNode {
        minor_version: prologue.minor_version,
        major_version: prologue.major_version,
        access: prologue.access,
        name: prologue.name,
        super_name: prologue.super_name,
        interfaces: prologue.interfaces,
        signature,
        fields,
        methods,
    })
}

fn read_bootstrap_methods(data: &[u8]) -> Result<Vec<BootstrapMethod>> {
    let mut parser = Parser::new(data);
    let count = parser.read_be::<u16>()?;
    let mut methods = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let method = parser.read_be::<u16>()?;
        let argument_count = parser.read_be::<u16>()?;
        let arguments = (0..argument_count)
            .map(|_| parser.read_be::<u16>())
            .collect::<Result<Vec<_>>>()?;
        methods.push(BootstrapMethod { method, arguments });
    }
    Ok(methods)
}
