//! Bytecode decoding for method bodies.
//!
//! Decodes a `Code` attribute's byte array into [`Instruction`]s, resolving constant pool
//! operands to symbolic form. Operand lengths follow the JVM instruction set, including the
//! variable-length `tableswitch`/`lookupswitch` (padded to a 4-byte boundary relative to the
//! start of the code array) and the `wide` prefix.

use crate::{
    classfile::constpool::{BootstrapMethod, ConstantPool},
    file::parser::Parser,
    model::{opcodes::*, Instruction, Operand},
    Result,
};

/// Decodes a complete code array.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] on invalid opcodes or operands and
/// [`crate::Error::OutOfBounds`] if an instruction is truncated.
pub fn decode_code(
    code: &[u8],
    pool: &ConstantPool,
    bootstrap: &[BootstrapMethod],
) -> Result<Vec<Instruction>> {
    let mut parser = Parser::new(code);
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(&mut parser, pool, bootstrap)?);
    }

    Ok(instructions)
}

/// Decodes a single instruction at the parser position.
///
/// The parser must be positioned over a code array that starts at offset 0, since switch
/// padding is computed relative to it.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] on invalid opcodes or operands and
/// [`crate::Error::OutOfBounds`] if the instruction is truncated.
pub fn decode_instruction(
    parser: &mut Parser,
    pool: &ConstantPool,
    bootstrap: &[BootstrapMethod],
) -> Result<Instruction> {
    let offset = parser.pos();
    let mut opcode = parser.read_be::<u8>()?;

    let operand = match opcode {
        NOP..=0x0F | 0x1A..=0x35 | 0x3B..=0x83 | 0x85..=0x98 | IRETURN..=RETURN => Operand::None,
        0xBE | ATHROW | 0xC2 | 0xC3 => Operand::None,
        BIPUSH => Operand::Immediate(i32::from(parser.read_be::<i8>()?)),
        SIPUSH => Operand::Immediate(i32::from(parser.read_be::<i16>()?)),
        NEWARRAY => Operand::Immediate(i32::from(parser.read_be::<u8>()?)),
        LDC => Operand::Constant(pool.constant(u16::from(parser.read_be::<u8>()?), bootstrap)?),
        LDC_W | LDC2_W => Operand::Constant(pool.constant(parser.read_be::<u16>()?, bootstrap)?),
        ILOAD..=ALOAD | ISTORE..=ASTORE | RET => Operand::Local(u16::from(parser.read_be::<u8>()?)),
        IINC => Operand::Increment {
            index: u16::from(parser.read_be::<u8>()?),
            delta: i16::from(parser.read_be::<i8>()?),
        },
        IFEQ..=JSR | IFNULL | IFNONNULL => Operand::Branch(i32::from(parser.read_be::<i16>()?)),
        GOTO_W | JSR_W => Operand::Branch(parser.read_be::<i32>()?),
        TABLESWITCH => {
            parser.align(0, 4)?;
            let default = parser.read_be::<i32>()?;
            let low = parser.read_be::<i32>()?;
            let high = parser.read_be::<i32>()?;
            if high < low {
                return Err(malformed_error!(
                    "tableswitch at {} has high {} < low {}",
                    offset,
                    high,
                    low
                ));
            }

            let count = (i64::from(high) - i64::from(low) + 1) as usize;
            if count > parser.len() / 4 {
                return Err(malformed_error!(
                    "tableswitch at {} declares {} targets",
                    offset,
                    count
                ));
            }

            let offsets = (0..count)
                .map(|_| parser.read_be::<i32>())
                .collect::<Result<Vec<_>>>()?;
            Operand::TableSwitch {
                default,
                low,
                offsets,
            }
        }
        LOOKUPSWITCH => {
            parser.align(0, 4)?;
            let default = parser.read_be::<i32>()?;
            let npairs = parser.read_be::<i32>()?;
            if npairs < 0 || npairs as usize > parser.len() / 8 {
                return Err(malformed_error!(
                    "lookupswitch at {} declares {} pairs",
                    offset,
                    npairs
                ));
            }

            let pairs = (0..npairs)
                .map(|_| -> Result<(i32, i32)> {
                    Ok((parser.read_be::<i32>()?, parser.read_be::<i32>()?))
                })
                .collect::<Result<Vec<_>>>()?;
            Operand::LookupSwitch { default, pairs }
        }
        GETSTATIC..=PUTFIELD => Operand::Field(pool.member_ref(parser.read_be::<u16>()?)?),
        INVOKEVIRTUAL..=INVOKESTATIC => {
            Operand::Method(pool.member_ref(parser.read_be::<u16>()?)?)
        }
        INVOKEINTERFACE => {
            let member = pool.member_ref(parser.read_be::<u16>()?)?;
            // count and the reserved zero byte
            parser.advance_by(2)?;
            Operand::Method(member)
        }
        INVOKEDYNAMIC => {
            let call = pool.invoke_dynamic(parser.read_be::<u16>()?, bootstrap)?;
            parser.advance_by(2)?;
            Operand::InvokeDynamic(Box::new(call))
        }
        NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
            Operand::Type(pool.class_name(parser.read_be::<u16>()?)?.to_string())
        }
        MULTIANEWARRAY => Operand::MultiNewArray {
            descriptor: pool.class_name(parser.read_be::<u16>()?)?.to_string(),
            dimensions: parser.read_be::<u8>()?,
        },
        WIDE => {
            opcode = parser.read_be::<u8>()?;
            match opcode {
                IINC => Operand::Increment {
                    index: parser.read_be::<u16>()?,
                    delta: parser.read_be::<i16>()?,
                },
                ILOAD..=ALOAD | ISTORE..=ASTORE | RET => Operand::Local(parser.read_be::<u16>()?),
                _ => {
                    return Err(malformed_error!(
                        "Invalid wide opcode 0x{:02X} at {}",
                        opcode,
                        offset
                    ))
                }
            }
        }
        _ => {
            return Err(malformed_error!(
                "Invalid opcode 0x{:02X} at {}",
                opcode,
                offset
            ))
        }
    };

    Ok(Instruction {
        offset: offset as u32,
        opcode,
        operand,
    })
}
