//! CIL instruction decoding.
//!
//! Low-level functions for decoding raw CIL bytecode into [`Instruction`] values.
//! Branch displacements (which the IL encodes relative to the following
//! instruction) are resolved to absolute method-body offsets during decoding, so
//! the flow graph builder can treat every target as a plain offset.
//!
//! # Example
//!
//! ```rust
//! use cilflow::il::{decode_instruction, Parser};
//!
//! let code = [0x2B, 0x0A]; // br.s +10
//! let mut parser = Parser::new(&code);
//! let instr = decode_instruction(&mut parser)?;
//! assert_eq!(instr.mnemonic, "br.s");
//! assert_eq!(instr.branch_target()?, 12); // next instruction (2) + displacement (10)
//! # Ok::<(), cilflow::Error>(())
//! ```

use crate::{
    il::{
        FlowType, Instruction, OpSpec, Operand, OperandKind, Parser, FE_PREFIX, INSTRUCTIONS,
        INSTRUCTIONS_FE,
    },
    Error, Result,
};

/// Decodes a single CIL instruction from the current parser position.
///
/// Handles both single-byte and `0xFE`-prefixed opcodes and all operand
/// encodings. The parser is advanced past the instruction; the instruction's
/// offset is the parser position at entry.
///
/// # Errors
///
/// - [`Error::InvalidOpcode`] for undefined or reserved encodings
/// - [`Error::OutOfBounds`] if the operand extends past the end of the data
///
/// # Examples
///
/// ```rust
/// use cilflow::il::{decode_instruction, Operand, Parser};
///
/// let code = [0x1F, 0x2A]; // ldc.i4.s 42
/// let mut parser = Parser::new(&code);
/// let instr = decode_instruction(&mut parser)?;
/// assert_eq!(instr.mnemonic, "ldc.i4.s");
/// assert_eq!(instr.operand, Operand::Int8(42));
/// # Ok::<(), cilflow::Error>(())
/// ```
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let offset = truncate_offset(parser.pos());
    let first_byte = parser.read_le::<u8>()?;

    let (spec, prefix, opcode): (&OpSpec, u8, u8) = if first_byte == FE_PREFIX {
        let second_byte = parser.read_le::<u8>()?;
        match INSTRUCTIONS_FE.get(usize::from(second_byte)) {
            Some(spec) => (spec, FE_PREFIX, second_byte),
            None => {
                return Err(Error::InvalidOpcode {
                    offset,
                    opcode: second_byte,
                })
            }
        }
    } else {
        (&INSTRUCTIONS[usize::from(first_byte)], 0, first_byte)
    };

    if spec.mnemonic.is_empty() {
        return Err(Error::InvalidOpcode { offset, opcode });
    }

    let operand = match spec.operand {
        OperandKind::None => Operand::None,
        OperandKind::Int8 => Operand::Int8(parser.read_le::<i8>()?),
        OperandKind::UInt8 => Operand::UInt8(parser.read_le::<u8>()?),
        OperandKind::UInt16 => Operand::UInt16(parser.read_le::<u16>()?),
        OperandKind::Int32 => Operand::Int32(parser.read_le::<i32>()?),
        OperandKind::Int64 => Operand::Int64(parser.read_le::<i64>()?),
        OperandKind::Float32 => Operand::Float32(parser.read_le::<f32>()?),
        OperandKind::Float64 => Operand::Float64(parser.read_le::<f64>()?),
        OperandKind::Token => Operand::Token(parser.read_le::<u32>()?),
        OperandKind::Target8 => {
            let displacement = i32::from(parser.read_le::<i8>()?);
            Operand::Target(resolve_target(parser.pos(), displacement))
        }
        OperandKind::Target32 => {
            let displacement = parser.read_le::<i32>()?;
            Operand::Target(resolve_target(parser.pos(), displacement))
        }
        OperandKind::Switch => {
            let case_count = parser.read_le::<u32>()?;

            // A bogus count would otherwise reserve gigabytes before the reads fail.
            let capacity = usize::min(case_count as usize, parser.len() / 4);
            let mut displacements = Vec::with_capacity(capacity);
            for _ in 0..case_count {
                displacements.push(parser.read_le::<i32>()?);
            }

            let next = parser.pos();
            Operand::Switch(
                displacements
                    .into_iter()
                    .map(|d| resolve_target(next, d))
                    .collect(),
            )
        }
    };

    Ok(Instruction {
        offset,
        size: truncate_offset(parser.pos()) - offset,
        opcode,
        prefix,
        mnemonic: spec.mnemonic,
        flow_type: spec.flow,
        operand,
    })
}

/// Decodes a complete linear stream of CIL instructions.
///
/// Instructions are decoded sequentially from the parser's current position
/// until the end of the data. No control flow analysis is performed; use
/// [`FlowGraphBuilder`](crate::flow::FlowGraphBuilder) on the result to build
/// basic blocks.
///
/// # Errors
///
/// Any error from [`decode_instruction`]; decoding stops at the first failure.
///
/// # Examples
///
/// ```rust
/// use cilflow::il::{decode_stream, Parser};
///
/// let code = [0x00, 0x06, 0x2A]; // nop, ldloc.0, ret
/// let mut parser = Parser::new(&code);
/// let instructions = decode_stream(&mut parser)?;
///
/// assert_eq!(instructions.len(), 3);
/// assert_eq!(instructions[2].offset, 2);
/// # Ok::<(), cilflow::Error>(())
/// ```
pub fn decode_stream(parser: &mut Parser) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(parser)?);
    }

    Ok(instructions)
}

/// Resolves a branch displacement into an absolute method-body offset.
///
/// Displacements are relative to the instruction following the branch, which is
/// the parser position after the operand has been read. Wrapping arithmetic
/// mirrors the CLR's 32-bit offset space; invalid results are rejected later as
/// dangling targets.
fn resolve_target(next_pos: usize, displacement: i32) -> u32 {
    truncate_offset(next_pos).wrapping_add(displacement as u32)
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_offset(pos: usize) -> u32 {
    // Method bodies are capped well below 4 GiB; parser positions fit in u32.
    pos as u32
}
