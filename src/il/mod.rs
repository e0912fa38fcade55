//! CIL instruction decoding and the typed instruction model.
//!
//! This module provides the instruction representation consumed by the flow graph
//! builder, together with low-level functions for decoding raw CIL bytecode. Branch
//! displacements are resolved to absolute method-body offsets during decoding, so
//! downstream analysis never deals with relative encodings.
//!
//! # Key Types
//! - [`Instruction`] - Represents a decoded CIL instruction
//! - [`Operand`] - Instruction operands (immediates, tokens, targets)
//! - [`FlowType`] - How instructions affect control flow
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a complete linear instruction stream
//!
//! # Example
//! ```rust
//! use cilflow::il::{decode_stream, Parser};
//!
//! let bytecode = &[0x00, 0x2A]; // nop, ret
//! let mut parser = Parser::new(bytecode);
//! let instructions = decode_stream(&mut parser)?;
//! assert_eq!(instructions[0].mnemonic, "nop");
//! # Ok::<(), cilflow::Error>(())
//! ```

mod decoder;
mod instruction;
mod opcodes;
mod parser;

pub use decoder::{decode_instruction, decode_stream};
pub use instruction::{FlowType, Instruction, Operand};
pub use opcodes::FE_PREFIX;
pub use parser::{IlRead, Parser};

pub(crate) use opcodes::{OpSpec, OperandKind, INSTRUCTIONS, INSTRUCTIONS_FE};
